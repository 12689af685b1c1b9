use core::fmt;

/// One addressable memory location.
pub type Cell = i64;

/// Operand value reserved for I/O and halting.
///
/// `-1 b c` reads input into `b`, `a -1 c` writes the value at `a`, and
/// `-1 -1 c` halts with status `c`.
pub const SENTINEL: Cell = -1;

/// The operands of one `subleq a b c` primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triple {
    pub a: Cell,
    pub b: Cell,
    pub c: Cell,
}

impl Triple {
    pub const fn new(a: Cell, b: Cell, c: Cell) -> Self {
        Self { a, b, c }
    }

    pub const fn to_cells(self) -> [Cell; 3] {
        [self.a, self.b, self.c]
    }

    #[inline]
    pub fn is_halt(&self) -> bool {
        self.a == SENTINEL && self.b == SENTINEL
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.a == SENTINEL && self.b != SENTINEL
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.a != SENTINEL && self.b == SENTINEL
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.a, self.b, self.c)
    }
}

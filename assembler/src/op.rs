use core::fmt;

/// Pseudo-operations understood by the assembler.
///
/// Every variant lowers to a fixed template of `subleq` triples (or raw
/// cells for [`Int`](Op::Int) and [`Bytes`](Op::Bytes)); see
/// [`IsaConfig::spec`](crate::IsaConfig::spec) for arity and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// No effect, falls through.
    Noop,
    /// The primitive itself: `subleq a b c`.
    Subleq,
    /// `b += a`, `a` untouched.
    Add,
    /// `b -= a`.
    Sub,
    /// `a = 0`.
    Zer,
    /// `d = s`, `s` untouched.
    Mov,
    /// Unconditional jump.
    Jmp,
    /// Jump if `x == 0`.
    Beq,
    /// Jump if `a == b`.
    Cmp,
    /// Read one character code into `a`.
    In,
    /// Write the value at `a`.
    Out,
    /// One raw cell.
    Int,
    /// One raw cell per character of a string literal.
    Bytes,
    /// Stop with status 0.
    Halt,
    /// Stop with the given status.
    Exit,
}

impl Op {
    pub const ALL: [Op; 15] = [
        Op::Noop,
        Op::Subleq,
        Op::Add,
        Op::Sub,
        Op::Zer,
        Op::Mov,
        Op::Jmp,
        Op::Beq,
        Op::Cmp,
        Op::In,
        Op::Out,
        Op::Int,
        Op::Bytes,
        Op::Halt,
        Op::Exit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Op::Noop => "noop",
            Op::Subleq => "subleq",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Zer => "zer",
            Op::Mov => "mov",
            Op::Jmp => "jmp",
            Op::Beq => "beq",
            Op::Cmp => "cmp",
            Op::In => "in",
            Op::Out => "out",
            Op::Int => "int",
            Op::Bytes => "bytes",
            Op::Halt => "halt",
            Op::Exit => "exit",
        }
    }

    pub fn from_name(name: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

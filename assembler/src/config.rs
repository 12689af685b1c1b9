use image::Cell;

use crate::op::Op;

/// How many cells one instance of an operation occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Fixed(usize),
    /// One cell per character of the string operand.
    LiteralLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpSpec {
    /// Operand tokens consumed after the operation name.
    pub arity: usize,
    pub size: Size,
}

impl OpSpec {
    const fn fixed(arity: usize, size: usize) -> Self {
        Self {
            arity,
            size: Size::Fixed(size),
        }
    }
}

/// Memory layout and operation table shared by the resolver and the
/// generator.
///
/// The default layout starts every image with the preamble
/// `[3, 3, 6, 0, 0, 0]`: cells 0..3 hold `subleq 3 3 6`, which always
/// branches to the address in cell 2 (patched by `#set ENTRY=label`), and
/// cells 3, 4, 5 are the scratch cells `$X`, `$Y`, `$Z`.
///
/// I/O and halt triples always use [`image::SENTINEL`], the value the
/// machine recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsaConfig {
    pub preamble: Vec<Cell>,
    /// Cell holding the branch target of the bootstrap triple.
    pub entry_cell: usize,
    /// Scratch used by every template; kept at zero between statements.
    pub scratch_x: usize,
    /// Second scratch, holds the difference inside `cmp`.
    pub scratch_y: usize,
    /// Never touched by templates; free for programs as `$Z`.
    pub scratch_z: usize,
    /// Status used by a plain `halt`.
    pub halt_status: Cell,
}

impl Default for IsaConfig {
    fn default() -> Self {
        Self {
            preamble: vec![3, 3, 6, 0, 0, 0],
            entry_cell: 2,
            scratch_x: 3,
            scratch_y: 4,
            scratch_z: 5,
            halt_status: 0,
        }
    }
}

impl IsaConfig {
    pub fn preamble_len(&self) -> usize {
        self.preamble.len()
    }

    /// Label names bound before any source is read.
    pub fn reserved_labels(&self) -> [(&'static str, usize); 3] {
        [
            ("$X", self.scratch_x),
            ("$Y", self.scratch_y),
            ("$Z", self.scratch_z),
        ]
    }

    pub fn spec(&self, op: Op) -> OpSpec {
        match op {
            Op::Noop => OpSpec::fixed(0, 3),
            Op::Subleq => OpSpec::fixed(3, 3),
            Op::Add => OpSpec::fixed(2, 9),
            Op::Sub => OpSpec::fixed(2, 3),
            Op::Zer => OpSpec::fixed(1, 3),
            Op::Mov => OpSpec::fixed(2, 12),
            Op::Jmp => OpSpec::fixed(1, 3),
            Op::Beq => OpSpec::fixed(2, 12),
            Op::Cmp => OpSpec::fixed(3, 27),
            Op::In => OpSpec::fixed(1, 3),
            Op::Out => OpSpec::fixed(1, 3),
            Op::Int => OpSpec::fixed(1, 1),
            Op::Bytes => OpSpec {
                arity: 1,
                size: Size::LiteralLength,
            },
            Op::Halt => OpSpec::fixed(0, 3),
            Op::Exit => OpSpec::fixed(1, 3),
        }
    }
}

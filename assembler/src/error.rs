use std::fmt;

use parser::Location;

use crate::op::Op;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    UnrecognizedToken { token: String, at: Location },
    DuplicateLabel { name: String, at: Location },
    MissingOperand { op: Op, expected: usize, at: Location },
    UnrecognizedConstant { constant: String, at: Location },
    UnknownSymbol { operand: String, at: Location },
    InvalidOffset { operand: String, at: Location },
    UnknownEntry { label: String, at: Location },
}

impl AssembleError {
    pub fn location(&self) -> &Location {
        match self {
            Self::UnrecognizedToken { at, .. }
            | Self::DuplicateLabel { at, .. }
            | Self::MissingOperand { at, .. }
            | Self::UnrecognizedConstant { at, .. }
            | Self::UnknownSymbol { at, .. }
            | Self::InvalidOffset { at, .. }
            | Self::UnknownEntry { at, .. } => at,
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedToken { token, at } => {
                write!(f, "{at}: unrecognized token `{token}`")
            }
            Self::DuplicateLabel { name, at } => {
                write!(f, "{at}: label `{name}` declared multiple times")
            }
            Self::MissingOperand { op, expected, at } => {
                write!(f, "{at}: `{op}` takes {expected} operand(s)")
            }
            Self::UnrecognizedConstant { constant, at } => {
                write!(f, "{at}: unrecognized constant `{constant}`")
            }
            Self::UnknownSymbol { operand, at } => {
                write!(f, "{at}: `{operand}` is not a label, constant or number")
            }
            Self::InvalidOffset { operand, at } => {
                write!(f, "{at}: bad offset in `{operand}`")
            }
            Self::UnknownEntry { label, at } => {
                write!(f, "{at}: entry point `{label}` is not a declared label")
            }
        }
    }
}

impl std::error::Error for AssembleError {}

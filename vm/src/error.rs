use std::fmt;
use std::io;

use image::Cell;

#[derive(Debug)]
pub enum RuntimeError {
    /// A negative address outside of the I/O and halt forms.
    NegativeAddress { address: Cell, ip: usize },
    AddressOutOfRange { address: usize, ip: usize },
    MemoryLimit { address: usize, limit: usize },
    InputExhausted { ip: usize },
    InvalidCharacter { value: Cell, ip: usize },
    StepLimit { steps: u64 },
    Io(io::Error),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAddress { address, ip } => {
                write!(f, "[{ip:04x}] negative address {address}")
            }
            Self::AddressOutOfRange { address, ip } => {
                write!(f, "[{ip:04x}] address {address} is out of range")
            }
            Self::MemoryLimit { address, limit } => write!(
                f,
                "address {address} exceeds the memory limit of {limit} cells"
            ),
            Self::InputExhausted { ip } => {
                write!(f, "[{ip:04x}] input requested after end of input")
            }
            Self::InvalidCharacter { value, ip } => {
                write!(f, "[{ip:04x}] {value} is not a character code")
            }
            Self::StepLimit { steps } => {
                write!(f, "step limit of {steps} reached")
            }
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

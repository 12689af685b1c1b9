//! # Assembler
//!
//! Lowers SUBLEQ assembly into a flat [`MemoryImage`].
//!
//! ```text
//!  Program { tokens, directives }
//!      │
//!      ▼  resolve    label addresses, constant pool layout
//!      ▼  generate   statements → subleq triples
//!      ▼  finalize   entry cell, constant cells
//!  MemoryImage
//! ```
//!
//! Both passes walk the same statements with the same [`IsaConfig`], and the
//! generator asserts that every statement starts at the address the
//! resolver gave it.
//!
//! ```rust
//! let assembly = assembler::assemble_str("demo.sq", "out [42]\nhalt").unwrap();
//! let cells = assembly.image.cells();
//! assert_eq!(&cells[6..9], &[12, -1, 9]);
//! assert_eq!(cells[12], 42);
//! ```

mod config;
mod emit;
mod error;
mod finalize;
mod generate;
mod listing;
mod op;
mod operand;
mod resolve;

use std::fmt;
use std::path::Path;

use image::MemoryImage;
use parser::{FileLoader, ParseError, Preprocessor, Program, Token};

pub use config::{IsaConfig, OpSpec, Size};
pub use emit::Emitter;
pub use error::AssembleError;
pub use finalize::ENTRY_DIRECTIVE;
pub use listing::{Listing, ListingEntry};
pub use op::Op;
pub use resolve::{
    Constant, ConstantPool, Resolution, Statement, SymbolTable, resolve,
};

/// Result of a successful assembly run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub image: MemoryImage,
    pub labels: SymbolTable,
    pub constants: ConstantPool,
    /// One past the last instruction cell.
    pub code_end: usize,
    pub listing: Listing,
}

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Assemble(AssembleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Assemble(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Assemble(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<AssembleError> for Error {
    fn from(err: AssembleError) -> Self {
        Self::Assemble(err)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: IsaConfig,
}

impl Assembler {
    pub fn new(config: IsaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IsaConfig {
        &self.config
    }

    /// Assemble preprocessed tokens. Nothing is produced unless every
    /// stage succeeds.
    pub fn assemble(&self, program: &Program) -> Result<Assembly, AssembleError> {
        self.assemble_tokens(&program.tokens, &program.directives)
    }

    pub fn assemble_tokens(
        &self,
        tokens: &[Token],
        directives: &parser::Directives,
    ) -> Result<Assembly, AssembleError> {
        let resolution = resolve::resolve(tokens, &self.config)?;
        let generated = generate::generate(&resolution, &self.config)?;
        let image = finalize::finalize(
            generated.cells,
            &resolution,
            directives,
            &self.config,
        )?;

        log::debug!(
            "assembled {} cells ({} code, {} constants)",
            image.len(),
            resolution.code_end,
            resolution.constants.len()
        );

        Ok(Assembly {
            image,
            labels: resolution.labels,
            constants: resolution.constants,
            code_end: resolution.code_end,
            listing: generated.listing,
        })
    }
}

/// Assemble a file with the default layout; `#include`s are read from disk.
pub fn assemble_file(path: &Path) -> Result<Assembly, Error> {
    let program = Preprocessor::new(FileLoader).preprocess_file(path)?;
    Ok(Assembler::default().assemble(&program)?)
}

/// Assemble in-memory source with the default layout. `name` is used in
/// diagnostics; `#include`s are read from disk relative to it.
pub fn assemble_str(name: &str, source: &str) -> Result<Assembly, Error> {
    let program = Preprocessor::new(FileLoader).preprocess_str(name, source)?;
    Ok(Assembler::default().assemble(&program)?)
}

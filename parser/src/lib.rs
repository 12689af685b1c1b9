//! # Parser
//!
//! Turns SUBLEQ assembly source into the flat token sequence the assembler
//! consumes.
//!
//! ## Architecture
//!
//! ```text
//!  source text
//!      │
//!      ▼
//!  ┌────────┐   Vec<Token>   ┌──────────────┐   Program { tokens, directives }
//!  │ Lexer  │ ─────────────▶ │ Preprocessor │ ─────────────────────────────▶
//!  └────────┘                └──────────────┘
//!                                  │  #include
//!                                  ▼
//!                            SourceLoader
//! ```
//!
//! ```rust
//! use parser::{MemoryLoader, Preprocessor};
//!
//! let mut pp = Preprocessor::new(MemoryLoader::new());
//! let program = pp.preprocess_str("demo.sq", "#set ENTRY=main\nmain: halt").unwrap();
//! assert_eq!(program.tokens.len(), 2);
//! assert_eq!(program.directives["ENTRY"].value, "main");
//! ```

pub mod error;
pub mod lexer;
pub mod preprocess;
pub mod span;
pub mod token;

pub use error::ParseError;
pub use lexer::Lexer;
pub use preprocess::{
    Directive, Directives, FileLoader, MemoryLoader, Preprocessor, Program, SourceLoader,
};
pub use span::{Location, Pos};
pub use token::Token;

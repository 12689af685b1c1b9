//! Directive expansion on top of the [`Lexer`].
//!
//! Two directives are understood, both taking the next token as argument:
//!
//! - `#include <path>` splices the tokens of another file in place. The path
//!   is relative to the directory of the including file.
//! - `#set KEY=VALUE` records a directive for the assembler.
//!
//! Directives set by an included file are kept unless the including file
//! sets the same key itself.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::span::Location;
use crate::token::Token;

pub const INCLUDE_DIRECTIVE: &str = "#include";
pub const SET_DIRECTIVE: &str = "#set";

/// A `#set` value and the location of its `KEY=VALUE` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub value: String,
    pub location: Location,
}

pub type Directives = IndexMap<String, Directive>;

/// Ordered tokens plus the directives gathered while producing them.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub tokens: Vec<Token>,
    pub directives: Directives,
}

/// Where included files come from.
pub trait SourceLoader {
    fn load(&mut self, path: &Path) -> io::Result<String>;
}

/// Reads sources from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl SourceLoader for FileLoader {
    fn load(&mut self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Serves sources from memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&mut self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no such source")
        })
    }
}

pub struct Preprocessor<L: SourceLoader> {
    loader: L,
    /// Files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
}

impl<L: SourceLoader> Preprocessor<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            stack: Vec::new(),
        }
    }

    pub fn preprocess_file(
        &mut self,
        path: &Path,
    ) -> Result<Program, ParseError> {
        let text = self.loader.load(path).map_err(|source| {
            ParseError::Include {
                path: path.to_path_buf(),
                at: None,
                source,
            }
        })?;
        self.stack.push(path.to_path_buf());
        let result = self.expand(path, &text);
        self.stack.pop();
        result
    }

    /// Preprocess text that did not come from a file. Includes resolve
    /// relative to the current directory.
    pub fn preprocess_str(
        &mut self,
        name: &str,
        text: &str,
    ) -> Result<Program, ParseError> {
        self.expand(Path::new(name), text)
    }

    fn expand(
        &mut self,
        path: &Path,
        text: &str,
    ) -> Result<Program, ParseError> {
        let name = path.display().to_string();
        let base = path.parent().unwrap_or(Path::new(""));
        let mut program = Program::default();
        let mut tokens = Lexer::new(name, text).tokenize()?.into_iter();

        while let Some(token) = tokens.next() {
            if token.quoted {
                program.tokens.push(token);
                continue;
            }

            match token.as_str() {
                INCLUDE_DIRECTIVE => {
                    let arg = directive_argument(&token, tokens.next())?;
                    let included = self.include(base, &arg)?;
                    program.tokens.extend(included.tokens);
                    for (key, value) in included.directives {
                        program.directives.entry(key).or_insert(value);
                    }
                }
                SET_DIRECTIVE => {
                    let arg = directive_argument(&token, tokens.next())?;
                    let Some((key, value)) = arg.text.split_once('=') else {
                        return Err(ParseError::MalformedDirective {
                            text: arg.text,
                            at: arg.location,
                        });
                    };
                    log::debug!("{}: #set {key}={value}", arg.location);
                    program.directives.insert(
                        key.to_string(),
                        Directive {
                            value: value.to_string(),
                            location: arg.location.clone(),
                        },
                    );
                }
                _ => program.tokens.push(token),
            }
        }

        Ok(program)
    }

    fn include(
        &mut self,
        base: &Path,
        arg: &Token,
    ) -> Result<Program, ParseError> {
        let path = base.join(include_path(arg));
        if self.stack.contains(&path) {
            return Err(ParseError::IncludeCycle {
                path,
                at: arg.location.clone(),
            });
        }

        let text = self.loader.load(&path).map_err(|source| {
            ParseError::Include {
                path: path.clone(),
                at: Some(arg.location.clone()),
                source,
            }
        })?;

        self.stack.push(path.clone());
        let result = self.expand(&path, &text);
        self.stack.pop();

        let program = result?;
        log::debug!(
            "{}: included {} ({} tokens)",
            arg.location,
            path.display(),
            program.tokens.len()
        );
        Ok(program)
    }
}

/// `<lib.sq>`, `"lib.sq"` and `lib.sq` all name `lib.sq`.
fn include_path(arg: &Token) -> &str {
    if arg.quoted {
        return &arg.text;
    }
    arg.text
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(&arg.text)
}

fn directive_argument(
    directive: &Token,
    next: Option<Token>,
) -> Result<Token, ParseError> {
    next.ok_or_else(|| ParseError::MissingDirectiveArgument {
        directive: directive.text.clone(),
        at: directive.location.clone(),
    })
}

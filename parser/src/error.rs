use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::span::Location;

#[derive(Debug)]
pub enum ParseError {
    UnexpectedCharacter { ch: char, at: Location },
    UnexpectedEscape { at: Location },
    UnterminatedString { at: Location },
    MissingDirectiveArgument { directive: String, at: Location },
    MalformedDirective { text: String, at: Location },
    Include {
        path: PathBuf,
        at: Option<Location>,
        source: io::Error,
    },
    IncludeCycle { path: PathBuf, at: Location },
}

impl ParseError {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::UnexpectedCharacter { at, .. }
            | Self::UnexpectedEscape { at }
            | Self::UnterminatedString { at }
            | Self::MissingDirectiveArgument { at, .. }
            | Self::MalformedDirective { at, .. }
            | Self::IncludeCycle { at, .. } => Some(at),
            Self::Include { at, .. } => at.as_ref(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter { ch, at } => {
                write!(f, "{at}: unexpected character {ch:?}")
            }
            Self::UnexpectedEscape { at } => {
                write!(f, "{at}: escape character outside of a string")
            }
            Self::UnterminatedString { at } => {
                write!(f, "{at}: string literal runs past end of line")
            }
            Self::MissingDirectiveArgument { directive, at } => {
                write!(f, "{at}: `{directive}` needs an argument")
            }
            Self::MalformedDirective { text, at } => {
                write!(f, "{at}: expected KEY=VALUE, got `{text}`")
            }
            Self::Include { path, at, source } => match at {
                Some(at) => write!(
                    f,
                    "{at}: could not include {}: {source}",
                    path.display()
                ),
                None => write!(f, "could not read {}: {source}", path.display()),
            },
            Self::IncludeCycle { path, at } => {
                write!(f, "{at}: {} includes itself", path.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Include { source, .. } => Some(source),
            _ => None,
        }
    }
}

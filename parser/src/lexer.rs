/// Line-oriented lexer for SUBLEQ assembly.
///
/// | Syntax      | Meaning                                         |
/// |-------------|-------------------------------------------------|
/// | `; …`       | Comment to end of line                          |
/// | `"…"`       | Quoted text, kept verbatim (spaces included)    |
/// | `\x`        | Inside quotes: the character `x` itself         |
/// | space `,`   | Token delimiters (tabs count as spaces)         |
///
/// Quotes may be glued to unquoted text: `ab"c d"` lexes as the single
/// token `abc d`. A string literal may not span lines.
use std::sync::Arc;

use crate::error::ParseError;
use crate::span::{Location, Pos};
use crate::token::Token;

/// Punctuation accepted outside of string literals.
const SOURCE_PUNCTUATION: &str = "\"#$+,-./:;<=>?@[\\]^_";

fn is_source_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_whitespace()
        || SOURCE_PUNCTUATION.contains(c)
}

fn is_delimiter(c: char) -> bool {
    c == ',' || c.is_ascii_whitespace()
}

pub struct Lexer<'src> {
    source: Arc<str>,
    text: &'src str,
}

/// Token being accumulated on the current line.
#[derive(Default)]
struct Pending {
    text: String,
    quoted: bool,
    start: Option<usize>,
}

impl<'src> Lexer<'src> {
    /// `source` names the text in diagnostics (usually its path).
    pub fn new(source: impl Into<Arc<str>>, text: &'src str) -> Self {
        Self {
            source: source.into(),
            text,
        }
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        for (idx, line) in self.text.lines().enumerate() {
            self.scan_line(idx + 1, line, &mut tokens)?;
        }
        Ok(tokens)
    }

    fn location(&self, line: usize, column: usize) -> Location {
        Location::new(self.source.clone(), Pos::new(line, column))
    }

    fn flush(&self, line: usize, pending: &mut Pending, out: &mut Vec<Token>) {
        let token = std::mem::take(pending);
        if let Some(start) = token.start {
            if !token.text.is_empty() || token.quoted {
                out.push(Token::new(
                    token.text,
                    token.quoted,
                    self.location(line, start),
                ));
            }
        }
    }

    fn scan_line(
        &self,
        line_no: usize,
        line: &str,
        out: &mut Vec<Token>,
    ) -> Result<(), ParseError> {
        let mut pending = Pending::default();
        let mut in_string = false;
        let mut chars = line.chars().enumerate();

        while let Some((idx, ch)) = chars.next() {
            let column = idx + 1;

            if in_string {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => pending.text.push(escaped),
                        None => {
                            return Err(ParseError::UnterminatedString {
                                at: self.location(line_no, column),
                            });
                        }
                    },
                    '"' => in_string = false,
                    _ => pending.text.push(ch),
                }
                continue;
            }

            match ch {
                ';' => break,
                '"' => {
                    in_string = true;
                    pending.quoted = true;
                    pending.start.get_or_insert(column);
                }
                '\\' => {
                    return Err(ParseError::UnexpectedEscape {
                        at: self.location(line_no, column),
                    });
                }
                c if is_delimiter(c) => self.flush(line_no, &mut pending, out),
                c if !is_source_char(c) => {
                    return Err(ParseError::UnexpectedCharacter {
                        ch: c,
                        at: self.location(line_no, column),
                    });
                }
                _ => {
                    pending.start.get_or_insert(column);
                    pending.text.push(ch);
                }
            }
        }

        if in_string {
            let column = line.chars().count() + 1;
            return Err(ParseError::UnterminatedString {
                at: self.location(line_no, column),
            });
        }

        self.flush(line_no, &mut pending, out);
        Ok(())
    }
}

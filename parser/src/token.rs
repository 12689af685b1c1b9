use std::fmt;

use crate::span::Location;

/// One whitespace-delimited word of assembly source.
///
/// Quotes are not part of `text`; `quoted` records that some of it came
/// from a double-quoted literal, which keeps `";"` or `"add"` from being
/// mistaken for a comment or an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
    pub location: Location,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        quoted: bool,
        location: Location,
    ) -> Self {
        Self {
            text: text.into(),
            quoted,
            location,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `name:` declares the label `name`.
    pub fn label_declaration(&self) -> Option<&str> {
        if self.quoted {
            return None;
        }
        self.text.strip_suffix(':').filter(|name| !name.is_empty())
    }

    /// `[..]` refers to a pooled constant.
    pub fn is_constant_ref(&self) -> bool {
        !self.quoted
            && self.text.len() >= 2
            && self.text.starts_with('[')
            && self.text.ends_with(']')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "{:?}", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

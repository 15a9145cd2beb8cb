//! Error types for grammar compilation and rule registration.
//!
//! Scanning, tokenizing, and build failures abort the whole compile of a rule;
//! no partial grammar is ever registered. Match-time non-matches are ordinary
//! control flow (`Option`/`bool`), never an error type.

use std::fmt;

use crate::grammar::tokenizer::GroupKind;

/// Errors that can occur while compiling rule text into an element tree.
///
/// Positions are absolute byte offsets into the rule text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A leading character no tokenizer rule recognizes.
    UnexpectedChar { position: usize, found: char },
    /// An occurrence spec that is not `N*M`, `*`, `N*`, or a single digit.
    MalformedOccurrence { position: usize },
    /// A quoted literal whose closing quote never arrives.
    UnterminatedLiteral { position: usize },
    /// A `%`-literal with a bad base marker, digits, or range bounds.
    MalformedNumeric { position: usize, reason: String },
    /// A group close with no matching open frame, or an open group left
    /// dangling at end of input.
    UnbalancedGroup { kind: GroupKind },
    /// Rule text that contains no grammar elements at all.
    EmptyRule,
    /// Literal content that is not valid UTF-8.
    InvalidText { position: usize, message: String },
    /// The underlying source failed to read.
    Io(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedChar { position, found } => {
                write!(f, "unexpected character '{found}' at offset {position}")
            }
            ParseError::MalformedOccurrence { position } => {
                write!(f, "malformed occurrence spec at offset {position}")
            }
            ParseError::UnterminatedLiteral { position } => {
                write!(f, "unterminated quoted literal starting at offset {position}")
            }
            ParseError::MalformedNumeric { position, reason } => {
                write!(f, "malformed numeric literal at offset {position}: {reason}")
            }
            ParseError::UnbalancedGroup { kind } => {
                let delimiters = match kind {
                    GroupKind::Strict => "( )",
                    GroupKind::Optional => "[ ]",
                };
                write!(f, "unbalanced group delimiters {delimiters}")
            }
            ParseError::EmptyRule => write!(f, "rule text contains no grammar elements"),
            ParseError::InvalidText { position, message } => {
                write!(f, "invalid literal text at offset {position}: {message}")
            }
            ParseError::Io(message) => write!(f, "read error: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Outcome of registering a rule under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineError {
    /// The name is already taken (case-insensitively); the original
    /// definition is retained.
    AlreadyDefined(String),
    /// The rule text failed to compile; nothing was registered.
    Parse(ParseError),
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::AlreadyDefined(name) => write!(f, "rule '{name}' is already defined"),
            DefineError::Parse(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for DefineError {}

impl From<ParseError> for DefineError {
    fn from(error: ParseError) -> Self {
        DefineError::Parse(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::UnexpectedChar {
            position: 4,
            found: '#',
        };
        assert_eq!(format!("{err}"), "unexpected character '#' at offset 4");

        let err = ParseError::UnbalancedGroup {
            kind: GroupKind::Optional,
        };
        assert_eq!(format!("{err}"), "unbalanced group delimiters [ ]");
    }

    #[test]
    fn define_error_wraps_parse_error() {
        let parse = ParseError::EmptyRule;
        let define: DefineError = parse.clone().into();
        assert_eq!(define, DefineError::Parse(parse));
        assert_eq!(
            format!("{}", DefineError::AlreadyDefined("digit".to_string())),
            "rule 'digit' is already defined"
        );
    }
}

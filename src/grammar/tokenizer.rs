//! Fragment scanner for rule text.
//!
//! The scanner pulls bytes through a [`LookaheadBuffer`] and emits one
//! [`Fragment`] per lexical construct: quoted literals, numeric literal
//! specs, rule references, occurrence quantifiers, group delimiters,
//! alternation markers, and comments. Whitespace between fragments is
//! consumed here and surfaces only as the `padded` flag on the following
//! fragment.

use std::io;

use serde::{Deserialize, Serialize};

use crate::grammar::buffer::{LookaheadBuffer, ScanOutcome};
use crate::grammar::charspec;
use crate::grammar::error::ParseError;

/// Which bracket pair a group fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// `( ... )`, a plain grouping.
    Strict,
    /// `[ ... ]`, a group that matches zero or one time.
    Optional,
}

/// The lexical payload of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentKind {
    /// Quoted literal text, quotes stripped.
    Text(String),
    /// A numeric literal spec in its source spelling, `%` stripped
    /// (for example `x41-5A` or `d72.73`). Validation happens when the
    /// element is built.
    Numeric(String),
    /// A rule reference by name.
    Reference(String),
    /// An occurrence quantifier; `max` of `None` means unbounded.
    Occurrence { min: u32, max: Option<u32> },
    GroupOpen(GroupKind),
    GroupClose(GroupKind),
    /// The alternation separator `/`.
    Or,
    /// A `;` comment, running to end of line (marker stripped).
    Comment(String),
}

/// One lexical event from the rule text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// Whether whitespace preceded this fragment.
    pub padded: bool,
    /// Byte offset of the fragment's first character in the rule text.
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum ScannerState {
    Scanning,
    Terminated,
}

/// Event-producing tokenizer over a byte source of rule text.
#[derive(Debug)]
pub struct FragmentScanner<R> {
    buffer: LookaheadBuffer<R>,
    state: ScannerState,
}

impl FragmentScanner<io::Cursor<Vec<u8>>> {
    /// Scans rule text held in memory.
    pub fn from_text(text: &str) -> Self {
        FragmentScanner::new(io::Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: io::Read> FragmentScanner<R> {
    pub fn new(source: R) -> Self {
        FragmentScanner {
            buffer: LookaheadBuffer::new(source),
            state: ScannerState::Scanning,
        }
    }

    /// Produces the next fragment, or `None` once the source is drained.
    pub fn next_fragment(&mut self) -> Result<Option<Fragment>, ParseError> {
        if self.state == ScannerState::Terminated {
            return Ok(None);
        }
        let padded = self.buffer.skip_whitespace_runs()?;
        let position = self.buffer.offset();
        let byte = match self.buffer.peek()? {
            Some(byte) => byte,
            None => {
                self.state = ScannerState::Terminated;
                return Ok(None);
            }
        };
        let kind = match byte {
            charspec::TEXT_QUOTE | charspec::TEXT_QUOTE_ALT => self.scan_text(byte, position)?,
            charspec::NUMERIC_MARKER => self.scan_numeric()?,
            charspec::OCCURRENCE_INDICATOR => {
                self.buffer.advance(1);
                let max = self.scan_digit()?;
                FragmentKind::Occurrence { min: 0, max }
            }
            b'0'..=b'9' => self.scan_occurrence(position)?,
            charspec::GROUP_OPENING => {
                self.buffer.advance(1);
                FragmentKind::GroupOpen(GroupKind::Strict)
            }
            charspec::GROUP_CLOSING => {
                self.buffer.advance(1);
                FragmentKind::GroupClose(GroupKind::Strict)
            }
            charspec::OPTIONAL_OPENING => {
                self.buffer.advance(1);
                FragmentKind::GroupOpen(GroupKind::Optional)
            }
            charspec::OPTIONAL_CLOSING => {
                self.buffer.advance(1);
                FragmentKind::GroupClose(GroupKind::Optional)
            }
            charspec::OR_DELIMITER => {
                self.buffer.advance(1);
                FragmentKind::Or
            }
            charspec::COMMENT_MARKER => self.scan_comment()?,
            byte if charspec::is_reference_start(byte) => self.scan_reference()?,
            byte => {
                return Err(ParseError::UnexpectedChar {
                    position,
                    found: byte as char,
                })
            }
        };
        Ok(Some(Fragment {
            kind,
            padded,
            position,
        }))
    }

    /// Scans a quoted literal, both quote styles, quotes stripped.
    fn scan_text(&mut self, quote: u8, position: usize) -> Result<FragmentKind, ParseError> {
        self.buffer.advance(1);
        let mut raw = Vec::new();
        match self.buffer.scan_until(&[quote], &mut raw, false)? {
            ScanOutcome::DelimiterFound => {}
            _ => return Err(ParseError::UnterminatedLiteral { position }),
        }
        let text = String::from_utf8(raw).map_err(|e| ParseError::InvalidText {
            position,
            message: e.to_string(),
        })?;
        Ok(FragmentKind::Text(text))
    }

    /// Scans the spelling of a `%`-literal; the base marker, digits, `.`
    /// joins, and `-` range bound all pass through untouched.
    fn scan_numeric(&mut self) -> Result<FragmentKind, ParseError> {
        self.buffer.advance(1);
        let mut spec = String::new();
        while let Some(byte) = self.buffer.peek()? {
            if byte.is_ascii_alphanumeric()
                || byte == charspec::VALUE_SEQUENCE_DELIMITER
                || byte == charspec::RANGE_DELIMITER
            {
                spec.push(byte as char);
                self.buffer.advance(1);
            } else {
                break;
            }
        }
        Ok(FragmentKind::Numeric(spec))
    }

    /// Scans a quantifier that starts with a digit: `N*M`, `N*`, or a bare
    /// `N` meaning at most N occurrences. A bare `N*` discards its digit
    /// and means zero or more, the same as `*`.
    fn scan_occurrence(&mut self, position: usize) -> Result<FragmentKind, ParseError> {
        let min = match self.scan_digit()? {
            Some(min) => min,
            None => return Err(ParseError::MalformedOccurrence { position }),
        };
        match self.buffer.peek()? {
            Some(charspec::OCCURRENCE_INDICATOR) => {
                self.buffer.advance(1);
                match self.scan_digit()? {
                    Some(max) => {
                        if max < min {
                            return Err(ParseError::MalformedOccurrence { position });
                        }
                        Ok(FragmentKind::Occurrence {
                            min,
                            max: Some(max),
                        })
                    }
                    None => Ok(FragmentKind::Occurrence { min: 0, max: None }),
                }
            }
            _ => Ok(FragmentKind::Occurrence {
                min: 0,
                max: Some(min),
            }),
        }
    }

    /// Reads a single decimal digit if one is next. Occurrence bounds are
    /// single digits in this dialect.
    fn scan_digit(&mut self) -> Result<Option<u32>, ParseError> {
        match self.buffer.peek()? {
            Some(byte @ b'0'..=b'9') => {
                self.buffer.advance(1);
                Ok(Some(u32::from(byte - b'0')))
            }
            _ => Ok(None),
        }
    }

    fn scan_reference(&mut self) -> Result<FragmentKind, ParseError> {
        let mut name = String::new();
        while let Some(byte) = self.buffer.peek()? {
            if charspec::is_reference_part(byte) {
                name.push(byte as char);
                self.buffer.advance(1);
            } else {
                break;
            }
        }
        Ok(FragmentKind::Reference(name))
    }

    /// Scans a `;` comment to end of line; the newline stays unconsumed so
    /// the next fragment is reported as padded.
    fn scan_comment(&mut self) -> Result<FragmentKind, ParseError> {
        self.buffer.advance(1);
        let mut raw = Vec::new();
        self.buffer
            .scan_until(&[charspec::LINE_FEED], &mut raw, true)?;
        Ok(FragmentKind::Comment(
            String::from_utf8_lossy(&raw).into_owned(),
        ))
    }
}

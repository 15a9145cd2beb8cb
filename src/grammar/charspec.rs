//! Fixed charset specification for the grammar dialect.
//!
//! Every structural delimiter of the rule syntax is a single ASCII byte,
//! following the rule notation of RFC 2234. The tokenizer classifies input
//! bytes exclusively through this module so the dialect stays in one place.

/// `LF = %x0A`, the only line terminator the dialect recognizes.
pub const LINE_FEED: u8 = 0x0A;

/// `SP = %x20`, the separator between adjacent rule elements.
pub const SPACE: u8 = 0x20;

/// Opening delimiter of a quoted literal, `"`.
pub const TEXT_QUOTE: u8 = 0x22;

/// Alternative quote for literals, `'`; both quote styles mean the same
/// literal-text construct.
pub const TEXT_QUOTE_ALT: u8 = 0x27;

/// Marker introducing a numeric literal, `%`.
pub const NUMERIC_MARKER: u8 = 0x25;

/// Strict group delimiters, `(` and `)`.
pub const GROUP_OPENING: u8 = 0x28;
pub const GROUP_CLOSING: u8 = 0x29;

/// Optional group delimiters, `[` and `]`.
pub const OPTIONAL_OPENING: u8 = 0x5B;
pub const OPTIONAL_CLOSING: u8 = 0x5D;

/// Quantifier marker, `*`.
pub const OCCURRENCE_INDICATOR: u8 = 0x2A;

/// Alternation separator, `/`.
pub const OR_DELIMITER: u8 = 0x2F;

/// Joins the code points of a numeric concatenation, `.`.
pub const VALUE_SEQUENCE_DELIMITER: u8 = 0x2E;

/// Separates the two bounds of a numeric range, `-`.
pub const RANGE_DELIMITER: u8 = 0x2D;

/// Comment marker, `;`; a comment runs to end of line.
pub const COMMENT_MARKER: u8 = 0x3B;

pub fn is_space(byte: u8) -> bool {
    byte == SPACE
}

pub fn is_newline(byte: u8) -> bool {
    byte == LINE_FEED
}

/// Space or newline; the separator runs skipped between fragments.
pub fn is_whitespace(byte: u8) -> bool {
    is_space(byte) || is_newline(byte)
}

/// A rule reference starts with an alphabetic character.
pub fn is_reference_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic()
}

/// Subsequent reference characters: alphanumeric, `-`, or `_`.
pub fn is_reference_part(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == RANGE_DELIMITER || byte == b'_'
}

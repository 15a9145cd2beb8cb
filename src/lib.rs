//! # abnf-nano
//!
//! A library that compiles Augmented-BNF-style grammar rules from text into
//! an in-memory grammar tree and evaluates whether an input string matches a
//! given rule.
//!
//! The dialect is a lightweight subset of the ABNF defined by RFC 2234:
//!
//! ```text
//! mail = 1*ALPHA "@" 1*ALPHA [ "." ( "com" / "de" ) ]   ; a mail address
//! ```
//!
//! Rules are registered in a [`grammar::RuleSet`] and matched with prefix
//! semantics: a match succeeds as soon as the rule consumes a prefix of the
//! input, regardless of trailing characters.

pub mod grammar;

pub use grammar::{compile, DefineError, Element, ParseError, RuleSet};

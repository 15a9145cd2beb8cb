//! Grammar compilation and matching.
//!
//! The module is organized as a pipeline:
//!
//! 1. [`buffer`] — a rolling lookahead window over a byte source
//! 2. [`tokenizer`] — the fragment scanner turning bytes into lexical events
//! 3. [`builder`] — the recursive-descent consumer assembling [`Element`] trees
//! 4. [`registry`] — the case-insensitive rule table and match entry points
//!
//! Matching itself lives in a private evaluator module; it is reached through
//! [`RuleSet::matches`] and [`RuleSet::matches_rule`].

pub mod buffer;
pub mod builder;
pub mod charspec;
pub mod element;
pub mod error;
pub mod registry;
pub mod tokenizer;

mod matcher;

pub use buffer::{LookaheadBuffer, ScanOutcome};
pub use builder::{compile, GrammarBuilder};
pub use element::{Bracketing, Combinator, Element, ElementKind};
pub use error::{DefineError, ParseError};
pub use registry::{core_rules, RuleSet};
pub use tokenizer::{Fragment, FragmentKind, FragmentScanner, GroupKind};

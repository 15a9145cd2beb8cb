//! The grammar element model.
//!
//! An [`Element`] is one node of a compiled grammar tree: a literal, a
//! numeric character form, a reference to another rule, a repetition, or a
//! sequence combining children by concatenation or alternation. Every
//! element carries a display name rendered from its structure, so a tree
//! prints back as rule text in the dialect's own notation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::error::ParseError;

/// How a sequence combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    /// Children must match one after another.
    And,
    /// The first matching child wins.
    Or,
}

/// Which delimiters a sequence was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bracketing {
    /// A top-level sequence, no delimiters.
    None,
    /// `( ... )`.
    Strict,
    /// `[ ... ]`; the enclosing repetition supplies the zero-or-one
    /// semantics, the bracketing only affects rendering.
    Optional,
}

/// Structural payload of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Quoted literal text, matched case-sensitively.
    Literal(String),
    /// A single character given numerically, for example `%x41`.
    SingleChar(char),
    /// A `.`-joined run of characters, for example `%x41.42.43`.
    CharConcat(Vec<char>),
    /// An inclusive character range, for example `%x41-5A`.
    CharRange { low: char, high: char },
    /// A late-bound reference to a named rule.
    Reference(String),
    /// `min` to `max` occurrences of the child; `None` means unbounded.
    Repetition {
        min: u32,
        max: Option<u32>,
        child: Box<Element>,
    },
    /// An ordered combination of children.
    Sequence {
        combinator: Combinator,
        bracketing: Bracketing,
        children: Vec<Element>,
    },
}

/// One node of a compiled grammar tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    name: String,
    kind: ElementKind,
}

impl Element {
    /// Quoted literal text.
    pub fn literal(text: &str) -> Element {
        Element {
            name: format!("\"{text}\""),
            kind: ElementKind::Literal(text.to_string()),
        }
    }

    /// A reference to a rule resolved at match time.
    pub fn reference(name: &str) -> Element {
        Element {
            name: name.to_string(),
            kind: ElementKind::Reference(name.to_string()),
        }
    }

    /// Parses a numeric literal spec (base marker plus digits, already
    /// stripped of its `%`). The source spelling becomes the display name.
    pub fn numeric_at(spec: &str, position: usize) -> Result<Element, ParseError> {
        let malformed = |reason: &str| ParseError::MalformedNumeric {
            position,
            reason: reason.to_string(),
        };
        let mut chars = spec.chars();
        let radix = match chars.next() {
            Some('d') => 10,
            Some('x') => 16,
            Some('b') => 2,
            _ => return Err(malformed("expected base marker d, x, or b")),
        };
        let body = chars.as_str();
        if body.is_empty() {
            return Err(malformed("missing digits"));
        }
        let parse_char = |digits: &str| -> Result<char, ParseError> {
            let value = u32::from_str_radix(digits, radix)
                .map_err(|_| malformed("invalid digits for base"))?;
            char::from_u32(value).ok_or_else(|| malformed("value is not a character"))
        };
        let kind = if body.contains('-') {
            let mut bounds = body.splitn(3, '-');
            let low = parse_char(bounds.next().unwrap_or_default())?;
            let high = parse_char(bounds.next().unwrap_or_default())?;
            if bounds.next().is_some() {
                return Err(malformed("a range has exactly two bounds"));
            }
            if low > high {
                return Err(malformed("range bounds are inverted"));
            }
            ElementKind::CharRange { low, high }
        } else if body.contains('.') {
            let mut sequence = Vec::new();
            for digits in body.split('.') {
                sequence.push(parse_char(digits)?);
            }
            ElementKind::CharConcat(sequence)
        } else {
            ElementKind::SingleChar(parse_char(body)?)
        };
        Ok(Element {
            name: format!("%{spec}"),
            kind,
        })
    }

    /// Builds a sequence node directly; the builder uses this to seed a
    /// nesting level.
    pub fn sequence(combinator: Combinator, bracketing: Bracketing, children: Vec<Element>) -> Element {
        let mut element = Element {
            name: String::new(),
            kind: ElementKind::Sequence {
                combinator,
                bracketing,
                children,
            },
        };
        element.rerender();
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Concatenates: `self other`. An existing concatenation absorbs the
    /// new child instead of nesting.
    pub fn append(self, other: Element) -> Element {
        self.combine(other, Combinator::And)
    }

    /// Alternates: `self / other`. An existing alternation absorbs the new
    /// branch instead of nesting.
    pub fn alternate(self, other: Element) -> Element {
        self.combine(other, Combinator::Or)
    }

    /// Concatenates without absorbing, always producing a fresh `( ... )`
    /// sequence around the pair.
    pub fn strict_append(self, other: Element) -> Element {
        Element::sequence(Combinator::And, Bracketing::Strict, vec![self, other])
    }

    /// Wraps in a repetition of `min` to `max` occurrences.
    pub fn quantify(self, min: u32, max: Option<u32>) -> Element {
        let mut element = Element {
            name: String::new(),
            kind: ElementKind::Repetition {
                min,
                max,
                child: Box::new(self),
            },
        };
        element.rerender();
        element
    }

    /// Exactly one occurrence.
    pub fn exactly_once(self) -> Element {
        self.quantify(1, Some(1))
    }

    /// At most `n` occurrences, as written `*nelem`.
    pub fn at_most_n(self, n: u32) -> Element {
        self.quantify(0, Some(n))
    }

    /// Zero or one occurrence, as written `[ ... ]`.
    pub fn optional(self) -> Element {
        self.quantify(0, Some(1))
    }

    /// Zero or more occurrences, as written `*elem`.
    pub fn repeated(self) -> Element {
        self.quantify(0, None)
    }

    /// Re-brackets an unbracketed sequence in place; any other element is
    /// wrapped in a one-member sequence carrying the bracketing.
    pub(crate) fn with_bracketing(self, bracketing: Bracketing) -> Element {
        match self.kind {
            ElementKind::Sequence {
                combinator,
                bracketing: Bracketing::None,
                children,
            } => Element::sequence(combinator, bracketing, children),
            _ => Element::sequence(Combinator::And, bracketing, vec![self]),
        }
    }

    fn combine(self, other: Element, combinator: Combinator) -> Element {
        match self.kind {
            ElementKind::Sequence {
                combinator: existing,
                bracketing,
                mut children,
            } if existing == combinator && bracketing == Bracketing::None => {
                children.push(other);
                Element::sequence(combinator, bracketing, children)
            }
            _ => Element::sequence(combinator, Bracketing::None, vec![self, other]),
        }
    }

    fn rerender(&mut self) {
        self.name = render_name(&self.kind);
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Renders rule-text notation for a node from its structure; leaf names are
/// fixed at construction and reused here.
fn render_name(kind: &ElementKind) -> String {
    match kind {
        ElementKind::Literal(_)
        | ElementKind::SingleChar(_)
        | ElementKind::CharConcat(_)
        | ElementKind::CharRange { .. }
        | ElementKind::Reference(_) => unreachable!("leaf names are fixed at construction"),
        ElementKind::Repetition { min, max, child } => match (min, max) {
            (0, Some(1)) => {
                // An optional group already prints its own brackets.
                if matches!(
                    child.kind(),
                    ElementKind::Sequence {
                        bracketing: Bracketing::Optional,
                        ..
                    }
                ) {
                    child.name().to_string()
                } else {
                    format!("[ {} ]", child.name())
                }
            }
            (min, Some(max)) if min == max => format!("{min}{}", child.name()),
            (0, None) => format!("*{}", child.name()),
            (0, Some(max)) => format!("*{max}{}", child.name()),
            (min, None) => format!("{min}*{}", child.name()),
            (min, Some(max)) => format!("{min}*{max}{}", child.name()),
        },
        ElementKind::Sequence {
            combinator,
            bracketing,
            children,
        } => {
            let separator = match combinator {
                Combinator::And => " ",
                Combinator::Or => " / ",
            };
            let joined = children
                .iter()
                .map(Element::name)
                .collect::<Vec<_>>()
                .join(separator);
            match bracketing {
                Bracketing::None => joined,
                Bracketing::Strict => format!("( {joined} )"),
                Bracketing::Optional => format!("[ {joined} ]"),
            }
        }
    }
}

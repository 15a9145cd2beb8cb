//! Recursive-descent grammar builder.
//!
//! The builder consumes fragments from a [`FragmentScanner`] and assembles
//! an [`Element`] tree, one recursion level per group nesting level. Each
//! level accumulates the concatenation branch under construction plus the
//! alternation branches already flushed by a `/` separator, and a queued
//! quantifier that applies to the next member produced.

use std::io;

use crate::grammar::element::{Bracketing, Combinator, Element};
use crate::grammar::error::ParseError;
use crate::grammar::tokenizer::{FragmentKind, FragmentScanner, GroupKind};

/// Compiles rule text into an element tree.
pub fn compile(text: &str) -> Result<Element, ParseError> {
    GrammarBuilder::from_text(text).build()
}

/// Consumes tokenizer events and assembles the grammar tree.
#[derive(Debug)]
pub struct GrammarBuilder<R> {
    scanner: FragmentScanner<R>,
}

/// Per-nesting-level accumulator.
struct Level {
    bracketing: Bracketing,
    /// Alternation branches already separated by `/`.
    branches: Vec<Element>,
    /// The concatenation branch under construction.
    current: Option<Element>,
    /// A quantifier waiting for the next member, with its source position.
    queued: Option<(u32, Option<u32>, usize)>,
}

impl Level {
    fn new(bracketing: Bracketing) -> Self {
        Level {
            bracketing,
            branches: Vec::new(),
            current: None,
            queued: None,
        }
    }

    /// Applies any queued quantifier and joins the member into the branch
    /// under construction.
    fn push_member(&mut self, member: Element) {
        let member = match self.queued.take() {
            Some((min, max, _)) => member.quantify(min, max),
            None => member,
        };
        self.current = Some(match self.current.take() {
            Some(branch) => branch.append(member),
            None => member,
        });
    }

    /// Flushes the branch under construction at a `/` separator. A
    /// separator with no branch before it is ignored.
    fn flush_branch(&mut self) {
        if let Some(branch) = self.current.take() {
            self.branches.push(branch);
        }
    }

    /// Finalizes the level into a sequence node carrying its bracketing.
    /// An empty level yields `None`.
    fn finish(mut self) -> Result<Option<Element>, ParseError> {
        if let Some((_, _, position)) = self.queued {
            return Err(ParseError::MalformedOccurrence { position });
        }
        let mut branches = self.branches;
        if let Some(branch) = self.current.take() {
            branches.push(branch);
        }
        if branches.len() == 1 {
            // A lone branch keeps its own shape; an accumulated
            // concatenation is re-bracketed, not nested.
            return Ok(branches.pop().map(|b| b.with_bracketing(self.bracketing)));
        }
        if branches.is_empty() {
            return Ok(None);
        }
        Ok(Some(Element::sequence(
            Combinator::Or,
            self.bracketing,
            branches,
        )))
    }
}

impl GrammarBuilder<io::Cursor<Vec<u8>>> {
    /// Builds from rule text held in memory.
    pub fn from_text(text: &str) -> Self {
        GrammarBuilder {
            scanner: FragmentScanner::from_text(text),
        }
    }
}

impl<R: io::Read> GrammarBuilder<R> {
    pub fn new(source: R) -> Self {
        GrammarBuilder {
            scanner: FragmentScanner::new(source),
        }
    }

    /// Consumes the whole fragment stream into one element tree.
    pub fn build(mut self) -> Result<Element, ParseError> {
        self.build_group(None)?.ok_or(ParseError::EmptyRule)
    }

    /// Reads fragments until the close of `enclosing` (or end of stream at
    /// the top level) and returns the accumulated element for that level.
    fn build_group(&mut self, enclosing: Option<GroupKind>) -> Result<Option<Element>, ParseError> {
        let bracketing = match enclosing {
            None => Bracketing::None,
            Some(GroupKind::Strict) => Bracketing::Strict,
            Some(GroupKind::Optional) => Bracketing::Optional,
        };
        let mut level = Level::new(bracketing);
        while let Some(fragment) = self.scanner.next_fragment()? {
            match fragment.kind {
                FragmentKind::Text(text) => level.push_member(Element::literal(&text)),
                FragmentKind::Numeric(spec) => {
                    level.push_member(Element::numeric_at(&spec, fragment.position)?)
                }
                FragmentKind::Reference(name) => level.push_member(Element::reference(&name)),
                FragmentKind::Occurrence { min, max } => {
                    if level.queued.is_some() {
                        return Err(ParseError::MalformedOccurrence {
                            position: fragment.position,
                        });
                    }
                    level.queued = Some((min, max, fragment.position));
                }
                FragmentKind::GroupOpen(kind) => {
                    let inner = self
                        .build_group(Some(kind))?
                        .ok_or(ParseError::EmptyRule)?;
                    let member = match kind {
                        GroupKind::Strict => inner,
                        // The optional bracket pair means zero or one
                        // occurrence of its content.
                        GroupKind::Optional => inner.optional(),
                    };
                    level.push_member(member);
                }
                FragmentKind::GroupClose(kind) => {
                    if enclosing == Some(kind) {
                        return level.finish();
                    }
                    return Err(ParseError::UnbalancedGroup { kind });
                }
                FragmentKind::Or => level.flush_branch(),
                FragmentKind::Comment(_) => {}
            }
        }
        if let Some(kind) = enclosing {
            return Err(ParseError::UnbalancedGroup { kind });
        }
        level.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::element::ElementKind;

    #[test]
    fn single_literal_is_wrapped_in_a_one_member_sequence() {
        let element = compile("\"hello\"").unwrap();
        match element.kind() {
            ElementKind::Sequence {
                combinator: Combinator::And,
                bracketing: Bracketing::None,
                children,
            } => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].kind(), &ElementKind::Literal("hello".to_string()));
            }
            other => panic!("expected one-member sequence, got {other:?}"),
        }
        assert_eq!(element.to_string(), "\"hello\"");
    }

    #[test]
    fn concatenation_stays_flat() {
        let element = compile("\"a\" \"b\" \"c\"").unwrap();
        assert_eq!(element.to_string(), "\"a\" \"b\" \"c\"");
    }

    #[test]
    fn consecutive_alternation_builds_one_alternation_level() {
        let element = compile("\"a\" / \"b\" / \"c\"").unwrap();
        match element.kind() {
            ElementKind::Sequence {
                combinator: Combinator::Or,
                children,
                ..
            } => assert_eq!(children.len(), 3),
            other => panic!("expected three-way alternation, got {other:?}"),
        }
    }

    #[test]
    fn alternation_branches_are_concatenations() {
        let element = compile("\"a\" \"b\" / \"c\" \"d\"").unwrap();
        assert_eq!(element.to_string(), "\"a\" \"b\" / \"c\" \"d\"");
        match element.kind() {
            ElementKind::Sequence {
                combinator: Combinator::Or,
                children,
                ..
            } => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].to_string(), "\"a\" \"b\"");
            }
            other => panic!("expected alternation of branches, got {other:?}"),
        }
    }

    #[test]
    fn quantifier_applies_to_the_next_member() {
        let element = compile("1*5ALPHA \"x\"").unwrap();
        assert_eq!(element.to_string(), "1*5ALPHA \"x\"");
    }

    #[test]
    fn quantifier_applies_to_a_whole_group() {
        let element = compile("2*( \"ab\" )").unwrap();
        assert_eq!(element.to_string(), "2*( \"ab\" )");
    }

    #[test]
    fn bare_digit_means_at_most_that_many() {
        let element = compile("3DIGIT").unwrap();
        match element.kind() {
            ElementKind::Sequence { children, .. } => match children[0].kind() {
                ElementKind::Repetition { min, max, .. } => {
                    assert_eq!(*min, 0);
                    assert_eq!(*max, Some(3));
                }
                other => panic!("expected repetition, got {other:?}"),
            },
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn optional_group_becomes_a_zero_or_one_repetition() {
        let element = compile("\"a\" [ \"b\" ]").unwrap();
        assert_eq!(element.to_string(), "\"a\" [ \"b\" ]");
        match element.kind() {
            ElementKind::Sequence { children, .. } => match children[1].kind() {
                ElementKind::Repetition { min, max, .. } => {
                    assert_eq!(*min, 0);
                    assert_eq!(*max, Some(1));
                }
                other => panic!("expected repetition, got {other:?}"),
            },
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn a_single_branch_level_stays_flat() {
        let element = compile("\"a\" [ \"b\" ] \"c\"").unwrap();
        match element.kind() {
            ElementKind::Sequence {
                combinator: Combinator::And,
                bracketing: Bracketing::None,
                children,
            } => {
                assert_eq!(children.len(), 3);
                assert!(matches!(
                    children[1].kind(),
                    ElementKind::Repetition { .. }
                ));
            }
            other => panic!("expected a flat three-member sequence, got {other:?}"),
        }
    }

    #[test]
    fn bare_digit_star_discards_its_digit() {
        let element = compile("2*DIGIT").unwrap();
        match element.kind() {
            ElementKind::Sequence { children, .. } => match children[0].kind() {
                ElementKind::Repetition { min, max, .. } => {
                    assert_eq!(*min, 0);
                    assert_eq!(*max, None);
                }
                other => panic!("expected repetition, got {other:?}"),
            },
            other => panic!("expected sequence, got {other:?}"),
        }
        assert_eq!(element.to_string(), "*DIGIT");
    }

    #[test]
    fn leading_or_separator_is_ignored() {
        let element = compile("/ \"a\" / \"b\"").unwrap();
        assert_eq!(element.to_string(), "\"a\" / \"b\"");
        let element = compile("\"a\" / / \"b\"").unwrap();
        assert_eq!(element.to_string(), "\"a\" / \"b\"");
    }

    #[test]
    fn nested_groups_round_trip() {
        let element = compile("( \"a\" / ( \"b\" \"c\" ) ) [ DIGIT ]").unwrap();
        assert_eq!(element.to_string(), "( \"a\" / ( \"b\" \"c\" ) ) [ DIGIT ]");
    }

    #[test]
    fn comments_are_discarded() {
        let element = compile("\"a\" ; comment here\n\"b\"").unwrap();
        assert_eq!(element.to_string(), "\"a\" \"b\"");
    }

    #[test]
    fn empty_rule_text_is_rejected() {
        assert_eq!(compile("").unwrap_err(), ParseError::EmptyRule);
        assert_eq!(compile("  ; only a comment").unwrap_err(), ParseError::EmptyRule);
    }

    #[test]
    fn unbalanced_groups_are_rejected() {
        assert_eq!(
            compile("( \"a\"").unwrap_err(),
            ParseError::UnbalancedGroup {
                kind: GroupKind::Strict
            }
        );
        assert_eq!(
            compile("\"a\" ]").unwrap_err(),
            ParseError::UnbalancedGroup {
                kind: GroupKind::Optional
            }
        );
        assert_eq!(
            compile("[ \"a\" )").unwrap_err(),
            ParseError::UnbalancedGroup {
                kind: GroupKind::Strict
            }
        );
    }

    #[test]
    fn dangling_quantifier_is_rejected() {
        assert_eq!(
            compile("\"a\" 2*").unwrap_err(),
            ParseError::MalformedOccurrence { position: 4 }
        );
        assert_eq!(
            compile("2*3 *ALPHA").unwrap_err(),
            ParseError::MalformedOccurrence { position: 4 }
        );
    }

    #[test]
    fn numeric_literals_build_character_forms() {
        let element = compile("%x41-5A %d72.73 %x0A").unwrap();
        assert_eq!(element.to_string(), "%x41-5A %d72.73 %x0A");
    }
}

//! Recursive grammar evaluator.
//!
//! `eval` returns the number of characters an element consumes starting at
//! `offset`, or `None` on non-match. Non-matches are ordinary control flow
//! on this path; nothing here allocates or raises. Matching is prefix-based,
//! trailing unconsumed input is the caller's concern.

use crate::grammar::element::{Combinator, Element, ElementKind};
use crate::grammar::registry::RuleSet;

/// Ceiling on reference hops during one evaluation. A cyclic grammar that
/// makes no input progress runs out of depth and reports a non-match
/// instead of overflowing the stack.
const MAX_REFERENCE_DEPTH: usize = 128;

pub(crate) fn eval(
    rules: &RuleSet,
    element: &Element,
    input: &[char],
    offset: usize,
    depth: usize,
) -> Option<usize> {
    match element.kind() {
        ElementKind::Literal(text) => match_chars(input, offset, text.chars()),
        ElementKind::SingleChar(expected) => {
            match_chars(input, offset, std::iter::once(*expected))
        }
        ElementKind::CharConcat(sequence) => match_chars(input, offset, sequence.iter().copied()),
        ElementKind::CharRange { low, high } => {
            let found = *input.get(offset)?;
            if *low <= found && found <= *high {
                Some(1)
            } else {
                None
            }
        }
        ElementKind::Reference(name) => {
            if depth >= MAX_REFERENCE_DEPTH {
                return None;
            }
            let target = rules.resolve(name)?;
            eval(rules, target, input, offset, depth + 1)
        }
        ElementKind::Repetition { min, max, child } => {
            eval_repetition(rules, child, *min, *max, input, offset, depth)
        }
        ElementKind::Sequence {
            combinator: Combinator::And,
            children,
            ..
        } => {
            let mut consumed = 0;
            for child in children {
                consumed += eval(rules, child, input, offset + consumed, depth)?;
            }
            Some(consumed)
        }
        ElementKind::Sequence {
            combinator: Combinator::Or,
            children,
            ..
        } => children
            .iter()
            .find_map(|child| eval(rules, child, input, offset, depth)),
    }
}

/// Matches an exact character run.
fn match_chars(
    input: &[char],
    offset: usize,
    expected: impl Iterator<Item = char>,
) -> Option<usize> {
    let mut consumed = 0;
    for expected in expected {
        if *input.get(offset + consumed)? != expected {
            return None;
        }
        consumed += 1;
    }
    Some(consumed)
}

/// Evaluates `min` to `max` consecutive occurrences of `child`.
///
/// The unbounded case is greedy with no backtracking. In the bounded case
/// the `max - min` repeats past the minimum are required to succeed, the
/// same way the required repeats up to `min` are; the one escape is the
/// very first attempt failing with `min == 0`, which consumes nothing.
fn eval_repetition(
    rules: &RuleSet,
    child: &Element,
    min: u32,
    max: Option<u32>,
    input: &[char],
    offset: usize,
    depth: usize,
) -> Option<usize> {
    let mut consumed = match eval(rules, child, input, offset, depth) {
        Some(n) => n,
        None => return if min == 0 { Some(0) } else { None },
    };
    for _ in 1..min {
        if offset + consumed >= input.len() {
            return None;
        }
        consumed += eval(rules, child, input, offset + consumed, depth)?;
    }
    match max {
        Some(max) => {
            for _ in min..max {
                if offset + consumed >= input.len() {
                    return None;
                }
                consumed += eval(rules, child, input, offset + consumed, depth)?;
            }
            Some(consumed)
        }
        None => loop {
            if offset + consumed >= input.len() {
                return Some(consumed);
            }
            match eval(rules, child, input, offset + consumed, depth) {
                // A zero-width success makes no progress; stop instead of
                // looping forever.
                Some(0) | None => return Some(consumed),
                Some(n) => consumed += n,
            }
        },
    }
}

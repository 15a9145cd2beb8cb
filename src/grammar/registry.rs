//! Case-insensitive rule registry and match entry points.
//!
//! A [`RuleSet`] maps rule names to compiled elements. Names are compared
//! case-insensitively and registration is append-only: a second definition
//! under an existing name is rejected and the original is retained.
//! References are resolved against the owning set lazily at match time, so
//! rules may be registered in any order as long as every referenced name
//! exists by first use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::grammar::builder::compile;
use crate::grammar::element::Element;
use crate::grammar::error::DefineError;
use crate::grammar::matcher;

/// The core rules of RFC 2234 appendix A, available through
/// [`core_rules`] and [`RuleSet::with_core_rules`].
const CORE_RULES: &[(&str, &str)] = &[
    ("ALPHA", "%x41-5A / %x61-7A"),
    ("BIT", "\"0\" / \"1\""),
    ("CR", "%x0D"),
    ("CRLF", "%x0D.0A"),
    ("CTL", "%x00-1F / %x7F"),
    ("DIGIT", "%x30-39"),
    ("DQUOTE", "%x22"),
    ("HEXDIG", "DIGIT / \"A\" / \"B\" / \"C\" / \"D\" / \"E\" / \"F\""),
    ("HTAB", "%x09"),
    ("LF", "%x0A"),
    ("OCTET", "%x00-FF"),
    ("SP", "%x20"),
    ("VCHAR", "%x21-7E"),
    ("WSP", "SP / HTAB"),
];

static CORE: Lazy<RuleSet> = Lazy::new(|| {
    let mut rules = RuleSet::new();
    for (name, text) in CORE_RULES {
        rules.define(name, text).expect("core rule must compile");
    }
    rules
});

/// The shared read-only set of core rules.
pub fn core_rules() -> &'static RuleSet {
    &CORE
}

/// A named-rule table with case-insensitive lookup.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Element>,
}

impl RuleSet {
    /// An empty set.
    pub fn new() -> Self {
        RuleSet {
            rules: HashMap::new(),
        }
    }

    /// A fresh set pre-populated with the core rules.
    pub fn with_core_rules() -> Self {
        core_rules().clone()
    }

    /// Compiles `text` and registers it under `name`. The element is
    /// returned for direct use.
    pub fn define(&mut self, name: &str, text: &str) -> Result<&Element, DefineError> {
        let element = compile(text)?;
        self.define_element(name, element)
    }

    /// Registers an already-built element under `name`.
    pub fn define_element(&mut self, name: &str, element: Element) -> Result<&Element, DefineError> {
        let key = name.to_lowercase();
        if self.rules.contains_key(&key) {
            return Err(DefineError::AlreadyDefined(name.to_string()));
        }
        Ok(self.rules.entry(key).or_insert(element))
    }

    /// Looks up a rule by name, case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&Element> {
        self.rules.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `element` matches a prefix of `input`. References inside the
    /// element resolve against this set.
    pub fn matches(&self, element: &Element, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        matcher::eval(self, element, &chars, 0, 0).is_some()
    }

    /// Whether the named rule matches a prefix of `input`; an undefined
    /// name never matches.
    pub fn matches_rule(&self, name: &str, input: &str) -> bool {
        match self.resolve(name) {
            Some(element) => self.matches(element, input),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_are_case_insensitive_and_append_only() {
        let mut rules = RuleSet::new();
        rules.define("Digit", "%x30-39").unwrap();
        let err = rules.define("DIGIT", "\"0\"").unwrap_err();
        assert_eq!(err, DefineError::AlreadyDefined("DIGIT".to_string()));
        // The original definition is retained.
        assert!(rules.matches_rule("digit", "7"));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn parse_failure_registers_nothing() {
        let mut rules = RuleSet::new();
        assert!(rules.define("broken", "( \"a\"").is_err());
        assert!(!rules.contains("broken"));
        assert!(rules.is_empty());
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let mut rules = RuleSet::new();
        rules.define("My-Rule", "\"x\"").unwrap();
        assert!(rules.resolve("my-rule").is_some());
        assert!(rules.resolve("MY-RULE").is_some());
        assert!(rules.resolve("other").is_none());
    }

    #[test]
    fn matching_is_prefix_based() {
        let mut rules = RuleSet::new();
        rules.define("greeting", "\"ab\"").unwrap();
        assert!(rules.matches_rule("greeting", "abXYZ"));
        assert!(!rules.matches_rule("greeting", "aXYZ"));
    }

    #[test]
    fn undefined_rule_never_matches() {
        let rules = RuleSet::new();
        assert!(!rules.matches_rule("ghost", "anything"));
    }

    #[test]
    fn core_rules_cover_the_usual_suspects() {
        let rules = core_rules();
        assert!(rules.matches_rule("ALPHA", "q"));
        assert!(!rules.matches_rule("ALPHA", "9"));
        assert!(rules.matches_rule("DIGIT", "9"));
        assert!(rules.matches_rule("HEXDIG", "F"));
        assert!(rules.matches_rule("HEXDIG", "3"));
        assert!(rules.matches_rule("CRLF", "\r\n"));
        assert!(rules.matches_rule("WSP", "\t"));
        assert!(rules.matches_rule("VCHAR", "~"));
        assert!(!rules.matches_rule("VCHAR", " "));
    }

    #[test]
    fn with_core_rules_is_an_independent_copy() {
        let mut rules = RuleSet::with_core_rules();
        rules.define("word", "1*ALPHA").unwrap();
        assert!(rules.matches_rule("word", "hello"));
        assert!(!core_rules().contains("word"));
    }

    #[test]
    fn elements_can_be_registered_directly() {
        let mut rules = RuleSet::new();
        let element = Element::literal("yes").alternate(Element::literal("no"));
        rules.define_element("answer", element).unwrap();
        assert!(rules.matches_rule("answer", "no way"));
        assert!(!rules.matches_rule("answer", "maybe"));
    }
}

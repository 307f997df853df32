//! Rule registration: an ordered sequence of (label, rule) pairs.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::rule::Rule;

static UNKNOWN_LABEL: Lazy<Arc<str>> = Lazy::new(|| Arc::from("UNKNOWN"));

/// An opaque label identifying a kind of lexeme. Cheap to clone (backed by
/// `Arc<str>`) since the winning label is copied out of the processor on
/// every successful match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LexemeType(Arc<str>);

impl LexemeType {
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self(label.into())
    }

    /// The well-known label reserved for unmatched positions.
    pub fn unknown() -> Self {
        Self(UNKNOWN_LABEL.clone())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.as_ref() == UNKNOWN_LABEL.as_ref()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LexemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LexemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LexemeType {
    fn from(s: &str) -> Self {
        Self::new(Arc::from(s))
    }
}

impl From<String> for LexemeType {
    fn from(s: String) -> Self {
        Self::new(Arc::from(s.into_boxed_str()))
    }
}

/// Failure reasons for registering a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleRegistrationError {
    EmptyLabel,
    DuplicateLabel(LexemeType),
}

impl std::error::Error for RuleRegistrationError {}

impl fmt::Display for RuleRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleRegistrationError::EmptyLabel => write!(f, "lexeme type label must not be empty"),
            RuleRegistrationError::DuplicateLabel(label) => {
                write!(f, "lexeme type '{}' is already registered", label)
            }
        }
    }
}

/// One entry in a [`RuleRegistration`]: a label and the rule's pristine,
/// never-stepped entry point. The entry point is cloned fresh at the start
/// of every lexing cycle rather than stepped directly.
pub(crate) struct RegisteredRule {
    pub(crate) label: LexemeType,
    pub(crate) initial: Box<dyn Rule>,
}

/// An ordered sequence of (label, rule) pairs. Registration order is
/// preserved and defines tie-breaking among equal-length matches.
#[derive(Default)]
pub struct RuleRegistration {
    pub(crate) entries: Vec<RegisteredRule>,
}

impl RuleRegistration {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a rule under `label`. Fails when the label is empty or
    /// already registered.
    pub fn add(
        &mut self,
        label: impl Into<LexemeType>,
        rule: Box<dyn Rule>,
    ) -> Result<(), RuleRegistrationError> {
        let label = label.into();
        if label.as_str().is_empty() {
            return Err(RuleRegistrationError::EmptyLabel);
        }
        if self.entries.iter().any(|e| e.label == label) {
            return Err(RuleRegistrationError::DuplicateLabel(label));
        }
        self.entries.push(RegisteredRule { label, initial: rule });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::accept_always;

    #[test]
    fn rejects_empty_label() {
        let mut reg = RuleRegistration::new();
        let err = reg.add("", accept_always()).unwrap_err();
        assert_eq!(err, RuleRegistrationError::EmptyLabel);
    }

    #[test]
    fn rejects_duplicate_label() {
        let mut reg = RuleRegistration::new();
        reg.add("A", accept_always()).unwrap();
        let err = reg.add("A", accept_always()).unwrap_err();
        assert_eq!(err, RuleRegistrationError::DuplicateLabel(LexemeType::from("A")));
    }

    #[test]
    fn preserves_registration_order() {
        let mut reg = RuleRegistration::new();
        reg.add("A", accept_always()).unwrap();
        reg.add("B", accept_always()).unwrap();
        let labels: Vec<_> = reg.entries.iter().map(|e| e.label.as_str().to_owned()).collect();
        assert_eq!(labels, vec!["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn unknown_label_is_well_known() {
        let a = LexemeType::unknown();
        let b = LexemeType::unknown();
        assert_eq!(a, b);
        assert!(a.is_unknown());
        assert!(!LexemeType::from("WORD").is_unknown());
    }
}

//! Error types. Grounded on this codebase's established style: a plain
//! `enum` with a hand-written `Display`, no `source()` override beyond what
//! the default provides.

use std::error;
use std::fmt;

use crate::registration::RuleRegistrationError;

/// Everything that can go wrong while registering rules or reading lexemes.
///
/// End of stream is not a variant here: a [`crate::Lexer`] reports it as
/// `Ok(None)`, the idiomatic Rust rendering of "no more lexemes," not as an
/// error.
#[derive(Debug)]
pub enum LexError {
    /// `next()` was called on a lexer with no rules registered.
    NoRulesDefined,
    /// `add_rule` was rejected by the underlying [`RuleRegistration`](crate::registration::RuleRegistration).
    RuleRegistration(RuleRegistrationError),
    /// `add_rule` was called after the lexer had already produced its first lexeme.
    RulesLockedAfterFirstNext,
    /// The underlying source failed to produce the next rune.
    ReaderFailure(Box<dyn error::Error + Send + Sync>),
    /// Every active rule rejected or is still `CONTINUE` at end of stream,
    /// with no rule ever having reported `ACCEPT`. Logged at `warn` by the
    /// driver before being returned, since it usually means a grammar gap
    /// rather than a caller mistake.
    InconclusiveAtEndOfStream,
    /// A rule violated the protocol (e.g. a push-back that unwound past the
    /// buffered history). Logged at `error` by the driver: this always
    /// indicates a bug in a user-supplied rule, not in the input.
    EngineInvariant(String),
}

impl error::Error for LexError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LexError::RuleRegistration(e) => Some(e),
            LexError::ReaderFailure(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LexError::*;

        match self {
            NoRulesDefined => write!(f, "no rules registered; call add_rule before next"),
            RuleRegistration(e) => write!(f, "{e}"),
            RulesLockedAfterFirstNext => {
                write!(f, "rules cannot be added once the lexer has produced a lexeme")
            }
            ReaderFailure(e) => write!(f, "reader failed: {e}"),
            InconclusiveAtEndOfStream => {
                write!(f, "reached end of stream with no rule ever accepting")
            }
            EngineInvariant(msg) => write!(f, "engine invariant violated: {msg}"),
        }
    }
}

impl From<RuleRegistrationError> for LexError {
    fn from(e: RuleRegistrationError) -> Self {
        LexError::RuleRegistration(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_registration_error_converts_and_displays() {
        let err: LexError = RuleRegistrationError::EmptyLabel.into();
        assert_eq!(err.to_string(), "lexeme type label must not be empty");
    }

    #[test]
    fn engine_invariant_carries_message() {
        let err = LexError::EngineInvariant("push-back exceeded buffered history".to_owned());
        assert!(err.to_string().contains("push-back exceeded buffered history"));
    }
}

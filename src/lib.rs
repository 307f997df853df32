//! rulelex - a rule-based lexical analyzer.
//!
//! Converts a stream of runes into a stream of labeled lexemes according to
//! user-supplied rules. Rules run in parallel on every input position and
//! the longest accepted match wins ("maximal munch"); ties are broken by
//! registration order. See [`Lexer`] for the entry point.

pub mod combinators;
pub mod error;
pub mod lexeme;
pub mod processor;
pub mod reader;
pub mod registration;
pub mod rule;
pub mod symbol;
pub mod verdict;

mod lexer;

#[cfg(test)]
mod tests;

pub use error::LexError;
pub use lexeme::Lexeme;
pub use lexer::Lexer;
pub use reader::{IterSource, ReadSource, RuneSource, StrSource};
pub use registration::{LexemeType, RuleRegistrationError};
pub use rule::Rule;
pub use symbol::{Symbol, SymbolFlags};
pub use verdict::Verdict;

//! The lexer driver: owns the rune source, the symbol buffer, positional
//! state, and the registered rules; turns `process` decisions into
//! emitted [`Lexeme`]s.
//!
//! Shape is grounded on the teacher's `LexingIterator` (`char_indices`-driven,
//! one state machine, `impl Iterator` yielding `Result<Token, Error>`); the
//! content (parallel rule dispatch via [`crate::processor::RulesProcessor`]
//! instead of one hand-written state enum) is this crate's own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use log::{debug, warn};

use crate::error::LexError;
use crate::lexeme::Lexeme;
use crate::processor::{Decision, RulesProcessor};
use crate::reader::{IterSource, ReadSource, RuneSource, StrSource};
use crate::registration::{LexemeType, RuleRegistration};
use crate::rule::Rule;
use crate::symbol::{is_newline, Symbol, SymbolFlags};

struct CycleState<R> {
    reader: R,
    /// Symbols read but not yet emitted as part of a lexeme. A fresh cycle
    /// always starts by re-feeding whatever is left over here before
    /// reading anything new.
    buffer: Vec<Symbol>,
    /// Offset of `buffer[0]`, in runes, from the start of the source.
    global_offset: usize,
    line: usize,
    column: usize,
    ever_produced: bool,
    prev_was_newline: bool,
    eof_reached: bool,
}

impl<R: RuneSource> CycleState<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            global_offset: 0,
            line: 1,
            column: 1,
            ever_produced: false,
            prev_was_newline: false,
            eof_reached: false,
        }
    }

    fn flags_for(&self, rune_is_newline: bool) -> SymbolFlags {
        let mut flags = SymbolFlags::NONE;
        if !self.ever_produced {
            flags.insert(SymbolFlags::BOF);
        }
        if self.prev_was_newline || !self.ever_produced {
            flags.insert(SymbolFlags::BOL);
        }
        if rune_is_newline {
            flags.insert(SymbolFlags::EOL);
        }
        flags
    }

    /// Returns the next symbol for this cycle: reused from the buffer if
    /// `r` hasn't caught up to it yet, freshly read otherwise. Appends
    /// freshly read (non-EOF) symbols to the buffer.
    fn symbol_at(&mut self, r: usize) -> Result<Symbol, LexError> {
        if r < self.buffer.len() {
            return Ok(self.buffer[r]);
        }
        if self.eof_reached {
            return Ok(Symbol::eof(self.flags_for(false)));
        }
        match self.reader.next_rune() {
            Ok(Some(rune)) => {
                let flags = self.flags_for(is_newline(rune));
                let sym = Symbol::new(rune, flags);
                self.buffer.push(sym);
                self.ever_produced = true;
                self.prev_was_newline = is_newline(rune);
                Ok(sym)
            }
            Ok(None) => {
                self.eof_reached = true;
                Ok(Symbol::eof(self.flags_for(false)))
            }
            Err(e) => Err(LexError::ReaderFailure(e)),
        }
    }

    /// Materializes a [`Lexeme`] from the first `length` buffered symbols,
    /// advances positional state, and compacts the buffer.
    fn emit(&mut self, lexeme_type: LexemeType, length: usize) -> Lexeme {
        let taken: Vec<Symbol> = self.buffer.drain(..length).collect();
        let text: String = taken.iter().map(|s| s.rune).collect();
        let offset = self.global_offset;
        self.global_offset += length;
        for s in &taken {
            if is_newline(s.rune) {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        Lexeme::new(lexeme_type, text, offset)
    }
}

/// A rule-based lexical analyzer over a [`RuneSource`] `R`.
///
/// Thread-safe: `next_lexeme` serializes on an internal mutex, and rule
/// registration uses a separate reader-writer lock so adding rules never
/// blocks a reader that has already released it. See the crate-level
/// design notes on the two-lock concurrency model.
pub struct Lexer<R> {
    registration: RwLock<RuleRegistration>,
    cycle: Mutex<CycleState<R>>,
    started: AtomicBool,
}

impl<R: RuneSource> Lexer<R> {
    /// Builds a lexer over `reader` with no rules registered yet.
    pub fn new(reader: R) -> Self {
        Self {
            registration: RwLock::new(RuleRegistration::new()),
            cycle: Mutex::new(CycleState::new(reader)),
            started: AtomicBool::new(false),
        }
    }

    /// Registers a rule under `label`. Fails if the label is empty or
    /// already registered, or if `next_lexeme` has already been called once
    /// on this lexer (see [`LexError::RulesLockedAfterFirstNext`]).
    pub fn add_rule(
        &self,
        label: impl Into<LexemeType>,
        rule: Box<dyn Rule>,
    ) -> Result<(), LexError> {
        if self.started.load(Ordering::SeqCst) {
            return Err(LexError::RulesLockedAfterFirstNext);
        }
        let label = label.into();
        let mut reg = self.registration.write().expect("registration lock poisoned");
        reg.add(label.clone(), rule)?;
        debug!("registered rule '{label}'");
        Ok(())
    }

    /// Produces the next lexeme, or `Ok(None)` at end of stream.
    pub fn next_lexeme(&self) -> Result<Option<Lexeme>, LexError> {
        let reg = self.registration.read().expect("registration lock poisoned");
        if reg.is_empty() {
            return Err(LexError::NoRulesDefined);
        }
        self.started.store(true, Ordering::SeqCst);

        let mut cycle = self.cycle.lock().expect("cycle lock poisoned");

        let mut processor = RulesProcessor::new(&reg.entries);
        let mut r = 0usize;

        loop {
            let symbol = cycle.symbol_at(r)?;
            r += 1;

            match processor.process(symbol) {
                Decision::NeedMore => {
                    if symbol.is_eof() {
                        warn!("reached end of stream with a rule still requesting more input");
                        return Err(LexError::InconclusiveAtEndOfStream);
                    }
                }
                Decision::NoMatch => {
                    if cycle.buffer.is_empty() && symbol.is_eof() {
                        return Ok(None);
                    }
                    return Ok(Some(cycle.emit(LexemeType::unknown(), 1)));
                }
                Decision::Matched { label, length } => {
                    // The processor counts the synthetic EOF symbol like any
                    // other when a rule accepts directly on it; EOF is never
                    // real text, so clamp to what's actually buffered.
                    let length = length.min(cycle.buffer.len());
                    if length == 0 {
                        if cycle.buffer.is_empty() {
                            if symbol.is_eof() {
                                return Ok(None);
                            }
                            return Err(LexError::EngineInvariant(
                                "zero-length match on a real symbol with nothing buffered".into(),
                            ));
                        }
                        return Ok(Some(cycle.emit(LexemeType::unknown(), 1)));
                    }
                    return Ok(Some(cycle.emit(label, length)));
                }
            }
        }
    }

    /// Current (line, column) of the next symbol this lexer will read,
    /// both 1-based.
    pub fn position(&self) -> (usize, usize) {
        let cycle = self.cycle.lock().expect("cycle lock poisoned");
        (cycle.line, cycle.column)
    }
}

impl<'a> Lexer<StrSource<'a>> {
    pub fn from_str(source: &'a str) -> Self {
        Self::new(StrSource::new(source))
    }
}

impl<I: Iterator<Item = char>> Lexer<IterSource<I>> {
    pub fn from_chars(iter: I) -> Self {
        Self::new(IterSource::new(iter))
    }
}

impl<Rd: std::io::Read> Lexer<ReadSource<Rd>> {
    pub fn from_reader(reader: Rd) -> Self {
        Self::new(ReadSource::new(reader))
    }
}

impl<R: RuneSource> Iterator for Lexer<R> {
    type Item = Result<Lexeme, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_lexeme() {
            Ok(Some(lexeme)) => Some(Ok(lexeme)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{literal, one_or_more, zero_or_more};

    #[test]
    fn next_lexeme_before_any_rule_registered_errors() {
        let lexer = Lexer::from_str("x");
        match lexer.next_lexeme() {
            Err(LexError::NoRulesDefined) => {}
            other => panic!("expected NoRulesDefined, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_immediate_end_of_stream() {
        let lexer = Lexer::from_str("");
        lexer.add_rule("WORD", one_or_more(|c: char| c.is_alphabetic())).unwrap();
        assert!(matches!(lexer.next_lexeme(), Ok(None)));
    }

    #[test]
    fn add_rule_after_first_next_is_locked() {
        let lexer = Lexer::from_str("a");
        lexer.add_rule("WORD", one_or_more(|c: char| c.is_alphabetic())).unwrap();
        lexer.next_lexeme().unwrap();
        match lexer.add_rule("MORE", literal("x")) {
            Err(LexError::RulesLockedAfterFirstNext) => {}
            other => panic!("expected RulesLockedAfterFirstNext, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fallback_consumes_one_rune_at_a_time() {
        let lexer = Lexer::from_str("!@#1");
        lexer.add_rule("INT", one_or_more(|c: char| c.is_ascii_digit())).unwrap();
        let mut out = Vec::new();
        while let Some(lex) = lexer.next_lexeme().unwrap() {
            out.push((lex.r#type().as_str().to_owned(), lex.text().to_owned()));
        }
        assert_eq!(
            out,
            vec![
                ("UNKNOWN".to_owned(), "!".to_owned()),
                ("UNKNOWN".to_owned(), "@".to_owned()),
                ("UNKNOWN".to_owned(), "#".to_owned()),
                ("INT".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn longest_match_wins_over_shorter_prefix() {
        let lexer = Lexer::from_str("ifelse");
        lexer.add_rule("IF", literal("if")).unwrap();
        lexer.add_rule("IFELSE", literal("ifelse")).unwrap();
        let lex = lexer.next_lexeme().unwrap().unwrap();
        assert_eq!(lex.r#type().as_str(), "IFELSE");
        assert_eq!(lex.text(), "ifelse");
    }

    #[test]
    fn iterator_adapter_yields_results_then_stops() {
        let mut lexer = Lexer::from_str("ab");
        lexer.add_rule("A", literal("a")).unwrap();
        lexer.add_rule("B", literal("b")).unwrap();
        let items: Vec<_> = (&mut lexer).take(5).collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn zero_or_more_sign_then_digits_folds_whitespace() {
        let lexer = Lexer::from_str("- 12");
        let num = crate::combinators::sequence(vec![
            zero_or_more(|c: char| c == '+' || c == '-'),
            zero_or_more(|c: char| c == ' '),
            one_or_more(|c: char| c.is_ascii_digit()),
        ]);
        lexer.add_rule("NUM", num).unwrap();
        let lex = lexer.next_lexeme().unwrap().unwrap();
        assert_eq!(lex.r#type().as_str(), "NUM");
        assert_eq!(lex.text(), "- 12");
    }

    #[test]
    fn concatenation_of_lexemes_equals_input() {
        let input = "say hello to the world";
        let lexer = Lexer::from_str(input);
        lexer.add_rule("KEYWORD", literal("say")).unwrap();
        lexer.add_rule("WORD", one_or_more(|c: char| c.is_alphabetic())).unwrap();
        lexer.add_rule("WS", one_or_more(|c: char| c == ' ')).unwrap();
        let mut rebuilt = String::new();
        while let Some(lex) = lexer.next_lexeme().unwrap() {
            rebuilt.push_str(lex.text());
        }
        assert_eq!(rebuilt, input);
    }
}

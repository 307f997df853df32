//! The rules processor: runs every registered rule in parallel over one
//! lexing cycle's symbol buffer and decides, symbol by symbol, whether any
//! rule can still extend its match.
//!
//! This is the core original engineering of the crate: there is no direct
//! teacher analogue, since `typho-litua`'s lexer hand-codes a single state
//! machine rather than running a set of independently-registered rules in
//! parallel. Built straight from the algorithm in this codebase's design
//! notes, in the teacher's error-handling and naming idiom.

use log::debug;

use crate::registration::{LexemeType, RegisteredRule};
use crate::rule::{resolve_push_back, Rule};
use crate::symbol::Symbol;
use crate::verdict::Verdict;

/// What `process` decided after being fed the most recent symbol.
pub(crate) enum Decision {
    /// At least one rule is still active; feed another symbol.
    NeedMore,
    /// Every rule is now inactive, and the longest one accepted `length`
    /// symbols under `label`.
    Matched { label: LexemeType, length: usize },
    /// Every rule is now inactive and none ever accepted.
    NoMatch,
}

struct ActiveRule {
    label: LexemeType,
    current: Option<Box<dyn Rule>>,
    last_accept: Option<usize>,
}

/// Runs one lexing cycle's worth of parallel rule evaluation. Reset (i.e.
/// rebuilt) at the start of every `next()` call on the driver.
pub(crate) struct RulesProcessor {
    active: Vec<ActiveRule>,
    history: Vec<Symbol>,
}

impl RulesProcessor {
    /// Builds a fresh processor from the registered rules, cloning each
    /// entry's pristine (never-stepped) rule object.
    pub(crate) fn new(entries: &[RegisteredRule]) -> Self {
        let active = entries
            .iter()
            .map(|e| ActiveRule {
                label: e.label.clone(),
                current: Some(e.initial.clone()),
                last_accept: None,
            })
            .collect();
        Self {
            active,
            history: Vec::new(),
        }
    }

    /// Feeds one symbol to every still-active rule and reports the outcome.
    pub(crate) fn process(&mut self, symbol: Symbol) -> Decision {
        self.history.push(symbol);
        let buffer_len = self.history.len();

        for rule in self.active.iter_mut() {
            let current = match rule.current.take() {
                Some(c) => c,
                None => continue,
            };
            let (next, verdict, k) = resolve_push_back(current, symbol, &self.history);
            match verdict {
                Verdict::Reject => {
                    rule.current = None;
                }
                Verdict::Accept => {
                    let len = buffer_len - k;
                    rule.last_accept = Some(rule.last_accept.map_or(len, |l| l.max(len)));
                    rule.current = next;
                }
                Verdict::Continue => {
                    rule.current = next;
                }
                Verdict::PushBack => unreachable!("resolve_push_back never returns PushBack"),
            }
        }

        let active_count = self.active.iter().filter(|r| r.current.is_some()).count();
        if active_count > 0 {
            return Decision::NeedMore;
        }

        let winner = self
            .active
            .iter()
            .filter_map(|r| r.last_accept.map(|len| (&r.label, len)))
            .fold(None, |best: Option<(&LexemeType, usize)>, (label, len)| {
                match best {
                    Some((_, blen)) if blen >= len => best,
                    _ => Some((label, len)),
                }
            });

        match winner {
            Some((label, len)) => {
                debug!("rule '{label}' won this cycle with {len} symbol(s)");
                Decision::Matched {
                    label: label.clone(),
                    length: len,
                }
            }
            None => Decision::NoMatch,
        }
    }
}

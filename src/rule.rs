//! The rule protocol: a function from a symbol to (next continuation, verdict).

use crate::symbol::Symbol;
use crate::verdict::Verdict;

/// A rule is a function-shaped value that decides, symbol by symbol,
/// whether a prefix is (still) matching.
///
/// `step` consumes `self` by value and returns the next continuation (or
/// `None` if the rule has terminated) together with a [`Verdict`]. Any
/// internal state a rule needs travels entirely in the value it returns;
/// there is no shared mutable state between steps.
///
/// Rule authors must also be `Clone` (via the blanket [`RuleClone`] impl
/// below) so the engine can restore a rule's registered entry point at the
/// start of every lexing cycle without re-running it, and `Send + Sync` so a
/// [`crate::Lexer`] built over it may itself be shared (not just moved)
/// across threads: the rule registration lives behind an `RwLock`, and an
/// `RwLock<T>` is only `Sync` when `T` is both `Send` and `Sync`.
pub trait Rule: RuleClone + Send + Sync {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict);
}

/// Supports cloning a boxed trait object. Implemented automatically for any
/// `'static + Clone` rule; this is the standard "clone a `Box<dyn Trait>`"
/// pattern, needed here because `Rule` objects are stepped by consuming
/// `self`, so the registered (never-stepped) instance must be cheaply
/// restorable at `Reset`.
pub trait RuleClone {
    fn clone_rule(&self) -> Box<dyn Rule>;
}

impl<T> RuleClone for T
where
    T: 'static + Rule + Clone,
{
    fn clone_rule(&self) -> Box<dyn Rule> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Rule> {
    fn clone(&self) -> Box<dyn Rule> {
        self.clone_rule()
    }
}

/// Runs `rule.step(current)` and, if the result is a push-back, unwinds
/// against `history` (the symbols fed so far in this invocation's scope,
/// oldest first, with `current` as the last element) until it resolves to
/// a non-push-back verdict or the buffered history is exhausted.
///
/// This is the one piece of push-back bookkeeping in the crate; both the
/// top-level [`crate::processor::RulesProcessor`] and the nested
/// combinators in [`crate::combinators`] call it, each supplying their own
/// notion of "history" (the processor's whole-cycle buffer, or a
/// combinator's private per-child history).
///
/// Returns `(next, verdict, k)` where `k` is the push-back depth consumed
/// (`0` if no push-back occurred). A push-back that would exceed `history`
/// resolves to `Reject` per the protocol.
pub(crate) fn resolve_push_back(
    rule: Box<dyn Rule>,
    current: Symbol,
    history: &[Symbol],
) -> (Option<Box<dyn Rule>>, Verdict, usize) {
    let (mut next, mut verdict) = rule.step(current);
    let mut k = 0usize;
    while verdict == Verdict::PushBack {
        k += 1;
        let idx = match history.len().checked_sub(k) {
            Some(i) => i,
            None => return (None, Verdict::Reject, 0),
        };
        let r = match next {
            Some(r) => r,
            None => return (None, Verdict::Reject, 0),
        };
        let refeed = history[idx];
        let (n2, v2) = r.step(refeed);
        next = n2;
        verdict = v2;
    }
    (next, verdict, k)
}

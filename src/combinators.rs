//! The reference rule toolkit.
//!
//! A small library of ready-made rules built on top of the [`crate::Rule`]
//! protocol: constant accept/reject, literal and case-insensitive literal
//! matching, a greedy character class, and the three structural combinators
//! (`sequence`, `any_of`, `not`). Loosely grounded on the pluggable-rule
//! shape sketched in `k0nserv/coolc-rs`'s `lexer/src/rule.rs`, adapted to
//! this crate's own by-value continuation protocol.
//!
//! None of this module is required to use the engine: [`crate::Rule`] is a
//! public trait and callers are free to implement it directly, but most
//! lexers are built almost entirely out of these pieces.

use std::sync::Arc;

use crate::rule::{resolve_push_back, Rule};
use crate::symbol::Symbol;
use crate::verdict::Verdict;

/// A rule that accepts unconditionally on the first symbol it sees.
#[derive(Clone)]
struct AcceptAlways;

impl Rule for AcceptAlways {
    fn step(self: Box<Self>, _symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        (None, Verdict::Accept)
    }
}

/// A constant rule that always accepts, immediately, on whatever symbol it
/// is fed. Useful as a placeholder entry point and as a building block for
/// the push-back helpers below.
pub fn accept_always() -> Box<dyn Rule> {
    Box::new(AcceptAlways)
}

#[derive(Clone)]
struct RejectAlways;

impl Rule for RejectAlways {
    fn step(self: Box<Self>, _symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        (None, Verdict::Reject)
    }
}

/// A constant rule that always rejects. Mostly useful as a sentinel in
/// tests and as the degenerate case of [`any_of`] over an empty set.
pub fn reject_always() -> Box<dyn Rule> {
    Box::new(RejectAlways)
}

/// Signals "accept the prefix before this symbol; this symbol belongs to
/// the next lexeme", a push-back of depth one followed by an accept.
///
/// Internally this is the `n == 1` case of [`push_back_and_accept`]: the
/// first call always reports `PUSH_BACK`, which the engine resolves by
/// re-feeding this same symbol to the continuation, which then reports
/// `ACCEPT`, for a net push-back depth of one.
#[derive(Clone)]
struct PushBackChain {
    /// How many *additional* `PUSH_BACK` verdicts must occur, after this
    /// one, before the chain settles on `ACCEPT`.
    remaining_after_this: u32,
}

impl Rule for PushBackChain {
    fn step(self: Box<Self>, _symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        if self.remaining_after_this == 0 {
            (Some(Box::new(AcceptAlways)), Verdict::PushBack)
        } else {
            let next = PushBackChain {
                remaining_after_this: self.remaining_after_this - 1,
            };
            (Some(Box::new(next)), Verdict::PushBack)
        }
    }
}

/// The common "this symbol belongs to the next lexeme" helper: push back
/// exactly one symbol, then accept.
pub fn accept_then_push_back_one() -> Box<dyn Rule> {
    push_back_and_accept(1)
}

/// Pushes back the most recent `n` symbols and accepts the rest. `n` must
/// be at least one; use [`accept_always`] directly for a plain, unconditional
/// accept with no push-back.
pub fn push_back_and_accept(n: u32) -> Box<dyn Rule> {
    assert!(n >= 1, "push_back_and_accept requires n >= 1");
    Box::new(PushBackChain {
        remaining_after_this: n - 1,
    })
}

/// Matches one fixed sequence of runes exactly, case-sensitively.
pub fn literal(text: &str) -> Box<dyn Rule> {
    build_literal(text, false)
}

/// Matches one fixed sequence of runes, ignoring ASCII case.
pub fn literal_ci(text: &str) -> Box<dyn Rule> {
    build_literal(text, true)
}

fn build_literal(text: &str, case_insensitive: bool) -> Box<dyn Rule> {
    let target: Arc<[char]> = text.chars().collect::<Vec<_>>().into();
    assert!(!target.is_empty(), "literal rule requires non-empty text");
    Box::new(LiteralRule {
        target,
        pos: 0,
        case_insensitive,
    })
}

#[derive(Clone)]
struct LiteralRule {
    target: Arc<[char]>,
    pos: usize,
    case_insensitive: bool,
}

impl Rule for LiteralRule {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        let want = self.target[self.pos];
        let matches = if self.case_insensitive {
            symbol.rune.eq_ignore_ascii_case(&want)
        } else {
            symbol.rune == want
        };
        if !matches {
            return (None, Verdict::Reject);
        }
        let next_pos = self.pos + 1;
        if next_pos == self.target.len() {
            (None, Verdict::Accept)
        } else {
            let next = LiteralRule {
                target: self.target.clone(),
                pos: next_pos,
                case_insensitive: self.case_insensitive,
            };
            (Some(Box::new(next)), Verdict::Continue)
        }
    }
}

/// A greedy run of one or more runes satisfying `pred`.
pub fn one_or_more<F>(pred: F) -> Box<dyn Rule>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Box::new(CharClassRule {
        pred: Arc::new(pred),
        first: true,
        allow_empty: false,
    })
}

/// A greedy run of zero or more runes satisfying `pred`. Matches a
/// zero-length prefix (via push-back) when the very first rune fails the
/// predicate.
pub fn zero_or_more<F>(pred: F) -> Box<dyn Rule>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Box::new(CharClassRule {
        pred: Arc::new(pred),
        first: true,
        allow_empty: true,
    })
}

#[derive(Clone)]
struct CharClassRule {
    pred: Arc<dyn Fn(char) -> bool + Send + Sync>,
    first: bool,
    allow_empty: bool,
}

impl Rule for CharClassRule {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        if (self.pred)(symbol.rune) {
            let next = CharClassRule {
                pred: self.pred.clone(),
                first: false,
                allow_empty: self.allow_empty,
            };
            (Some(Box::new(next)), Verdict::Accept)
        } else if self.first && self.allow_empty {
            (Some(Box::new(AcceptAlways)), Verdict::PushBack)
        } else {
            // A prior ACCEPT (if any) stands; this symbol just doesn't extend the run.
            (None, Verdict::Reject)
        }
    }
}

/// Runs each child rule to completion in turn, feeding the symbol stream
/// through child `i` until it accepts, then handing the remainder (any
/// symbols the child pushed back) to child `i + 1`.
///
/// Accepts once every child has accepted in turn; rejects as soon as any
/// child does.
pub fn sequence(rules: Vec<Box<dyn Rule>>) -> Box<dyn Rule> {
    assert!(!rules.is_empty(), "sequence requires at least one rule");
    let children: Arc<[Box<dyn Rule>]> = rules.into();
    let first = children[0].clone();
    Box::new(SequenceRule {
        children,
        index: 0,
        current: first,
        history: Vec::new(),
    })
}

#[derive(Clone)]
struct SequenceRule {
    children: Arc<[Box<dyn Rule>]>,
    index: usize,
    current: Box<dyn Rule>,
    history: Vec<Symbol>,
}

impl SequenceRule {
    /// Moves on to `children[next_index]`, replaying any `carry`-ed-over
    /// symbols (pushed back by the child that just finished) into it first.
    fn advance(
        children: Arc<[Box<dyn Rule>]>,
        next_index: usize,
        carry: Vec<Symbol>,
    ) -> (Option<Box<dyn Rule>>, Verdict) {
        if next_index >= children.len() {
            return match carry.len() {
                0 => (None, Verdict::Accept),
                n => (Some(push_back_and_accept(n as u32)), Verdict::PushBack),
            };
        }

        let mut current = children[next_index].clone();
        if carry.is_empty() {
            let state = SequenceRule {
                children,
                index: next_index,
                current,
                history: Vec::new(),
            };
            return (Some(Box::new(state)), Verdict::Continue);
        }

        let mut history = Vec::new();
        let mut iter = carry.into_iter();
        while let Some(sym) = iter.next() {
            history.push(sym);
            let (next, verdict, k) = resolve_push_back(current, sym, &history);
            match verdict {
                Verdict::Reject => return (None, Verdict::Reject),
                Verdict::Continue => {
                    current = match next {
                        Some(n) => n,
                        None => return (None, Verdict::Reject),
                    };
                }
                Verdict::Accept => {
                    let mut remaining_carry = history.split_off(history.len() - k);
                    remaining_carry.extend(iter);
                    return Self::advance(children, next_index + 1, remaining_carry);
                }
                Verdict::PushBack => unreachable!("resolve_push_back never returns PushBack"),
            }
        }

        let state = SequenceRule {
            children,
            index: next_index,
            current,
            history,
        };
        (Some(Box::new(state)), Verdict::Continue)
    }
}

impl Rule for SequenceRule {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        let mut history = self.history;
        history.push(symbol);
        let (next, verdict, k) = resolve_push_back(self.current, symbol, &history);
        match verdict {
            Verdict::Reject => (None, Verdict::Reject),
            Verdict::Continue => match next {
                Some(n) => {
                    let state = SequenceRule {
                        children: self.children,
                        index: self.index,
                        current: n,
                        history,
                    };
                    (Some(Box::new(state)), Verdict::Continue)
                }
                None => (None, Verdict::Reject),
            },
            Verdict::Accept => {
                let carry = history.split_off(history.len() - k);
                Self::advance(self.children, self.index + 1, carry)
            }
            Verdict::PushBack => unreachable!("resolve_push_back never returns PushBack"),
        }
    }
}

/// Runs every child rule in parallel and keeps the longest match, breaking
/// ties by the order `rules` were given: a nested maximal-munch, scoped to
/// just these children.
pub fn any_of(rules: Vec<Box<dyn Rule>>) -> Box<dyn Rule> {
    assert!(!rules.is_empty(), "any_of requires at least one rule");
    let children = rules
        .into_iter()
        .map(|r| AnyOfChild {
            current: Some(r),
            last_accept: None,
        })
        .collect();
    Box::new(AnyOfRule {
        children,
        history: Vec::new(),
    })
}

#[derive(Clone)]
struct AnyOfChild {
    current: Option<Box<dyn Rule>>,
    last_accept: Option<usize>,
}

#[derive(Clone)]
struct AnyOfRule {
    children: Vec<AnyOfChild>,
    history: Vec<Symbol>,
}

impl Rule for AnyOfRule {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        let mut children = self.children;
        let mut history = self.history;
        history.push(symbol);

        let mut any_active = false;
        for child in children.iter_mut() {
            let rule = match child.current.take() {
                Some(r) => r,
                None => continue,
            };
            let (next, verdict, k) = resolve_push_back(rule, symbol, &history);
            match verdict {
                Verdict::Reject => {}
                Verdict::Accept => {
                    let len = history.len() - k;
                    child.last_accept = Some(child.last_accept.map_or(len, |l| l.max(len)));
                    child.current = next;
                }
                Verdict::Continue => {
                    child.current = next;
                }
                Verdict::PushBack => unreachable!("resolve_push_back never returns PushBack"),
            }
            if child.current.is_some() {
                any_active = true;
            }
        }

        if any_active {
            let state = AnyOfRule { children, history };
            return (Some(Box::new(state)), Verdict::Continue);
        }

        let winner = children
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.last_accept.map(|len| (i, len)))
            .fold(None, |best: Option<(usize, usize)>, (i, len)| match best {
                Some((_, blen)) if blen >= len => best,
                _ => Some((i, len)),
            });

        match winner {
            Some((_, len)) if len > 0 => {
                let behind = history.len() - len;
                if behind == 0 {
                    (None, Verdict::Accept)
                } else {
                    (Some(push_back_and_accept(behind as u32)), Verdict::PushBack)
                }
            }
            _ => (None, Verdict::Reject),
        }
    }
}

/// Negates a single-symbol rule: accepts a greedy run of runes the wrapped
/// rule would *not* accept or continue on, probing it fresh against one
/// symbol at a time on a private shadow cycle so its bookkeeping never
/// leaks into the parent's.
///
/// Suited to wrapping single-symbol rules (e.g. negating a character
/// class); a `child` that needs more than one symbol to decide will still
/// be probed one symbol at a time, which is unlikely to be the intended
/// negation for a genuinely multi-symbol rule.
pub fn not(child: Box<dyn Rule>) -> Box<dyn Rule> {
    Box::new(NotRule {
        child_initial: child,
        first: true,
    })
}

#[derive(Clone)]
struct NotRule {
    child_initial: Box<dyn Rule>,
    first: bool,
}

impl Rule for NotRule {
    fn step(self: Box<Self>, symbol: Symbol) -> (Option<Box<dyn Rule>>, Verdict) {
        let probe = self.child_initial.clone();
        let history = [symbol];
        let (_, verdict, _k) = resolve_push_back(probe, symbol, &history);
        match verdict {
            Verdict::Reject => {
                let next = NotRule {
                    child_initial: self.child_initial.clone(),
                    first: false,
                };
                (Some(Box::new(next)), Verdict::Accept)
            }
            _ if self.first => (None, Verdict::Reject),
            _ => (Some(accept_then_push_back_one()), Verdict::PushBack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolFlags;

    fn sym(c: char) -> Symbol {
        Symbol::new(c, SymbolFlags::NONE)
    }

    #[test]
    fn accept_always_accepts_first_symbol() {
        let rule = accept_always();
        let (next, verdict) = rule.step(sym('x'));
        assert_eq!(verdict, Verdict::Accept);
        assert!(next.is_none());
    }

    #[test]
    fn reject_always_rejects_first_symbol() {
        let rule = reject_always();
        let (_, verdict) = rule.step(sym('x'));
        assert_eq!(verdict, Verdict::Reject);
    }

    #[test]
    fn literal_matches_exact_text() {
        let rule = literal("if");
        let history = [sym('i'), sym('f')];
        let (next, v0) = rule.step(history[0]);
        assert_eq!(v0, Verdict::Continue);
        let (next, v1) = next.unwrap().step(history[1]);
        assert_eq!(v1, Verdict::Accept);
        assert!(next.is_none());
    }

    #[test]
    fn literal_rejects_on_mismatch() {
        let rule = literal("if");
        let (_, v) = rule.step(sym('x'));
        assert_eq!(v, Verdict::Reject);
    }

    #[test]
    fn literal_ci_matches_any_case() {
        let rule = literal_ci("IF");
        let (next, v0) = rule.step(sym('i'));
        assert_eq!(v0, Verdict::Continue);
        let (_, v1) = next.unwrap().step(sym('F'));
        assert_eq!(v1, Verdict::Accept);
    }

    #[test]
    fn one_or_more_rejects_empty_run() {
        let rule = one_or_more(|c: char| c.is_ascii_digit());
        let (_, v) = rule.step(sym('a'));
        assert_eq!(v, Verdict::Reject);
    }

    #[test]
    fn one_or_more_is_greedy_then_stops() {
        let rule = one_or_more(|c: char| c.is_ascii_digit());
        let history = [sym('1'), sym('2'), sym('a')];
        let (next, v0) = rule.step(history[0]);
        assert_eq!(v0, Verdict::Accept);
        let (next, v1) = next.unwrap().step(history[1]);
        assert_eq!(v1, Verdict::Accept);
        let (_, v2) = next.unwrap().step(history[2]);
        assert_eq!(v2, Verdict::Reject);
    }

    #[test]
    fn zero_or_more_pushes_back_on_immediate_mismatch() {
        let rule = zero_or_more(|c: char| c.is_ascii_digit());
        let history = [sym('a')];
        let (next, v) = resolve_push_back(rule, sym('a'), &history);
        assert_eq!(v, Verdict::Accept);
        assert!(next.is_none());
    }

    #[test]
    fn sequence_of_two_literals_accepts() {
        let rule = sequence(vec![literal("a"), literal("b")]);
        let history = [sym('a'), sym('b')];
        let (next, v0) = rule.step(history[0]);
        assert_eq!(v0, Verdict::Continue);
        let (_, v1) = next.unwrap().step(history[1]);
        assert_eq!(v1, Verdict::Accept);
    }

    #[test]
    fn sequence_propagates_push_back_across_boundary() {
        // first child: zero_or_more digits (matches empty, pushes back), second: literal "x"
        let rule = sequence(vec![zero_or_more(|c: char| c.is_ascii_digit()), literal("x")]);
        let history = [sym('x')];
        let (next, v, k) = resolve_push_back(rule, sym('x'), &history);
        assert_eq!(v, Verdict::Accept);
        assert_eq!(k, 0);
        assert!(next.is_none());
    }

    #[test]
    fn any_of_picks_longest_match() {
        let rule = any_of(vec![literal("a"), literal("ab")]);
        let history = [sym('a'), sym('b')];
        let (next, v0) = rule.step(history[0]);
        assert_eq!(v0, Verdict::Continue);
        let (_, v1) = next.unwrap().step(history[1]);
        assert_eq!(v1, Verdict::Accept);
    }

    #[test]
    fn any_of_breaks_ties_by_registration_order() {
        let rule = any_of(vec![literal("a"), literal("a")]);
        let (_, v) = rule.step(sym('a'));
        assert_eq!(v, Verdict::Accept);
    }

    #[test]
    fn not_accepts_runes_the_child_rejects() {
        let rule = not(literal("\""));
        let history = [sym('a'), sym('b')];
        let (next, v0) = rule.step(history[0]);
        assert_eq!(v0, Verdict::Accept);
        let (_, v1) = next.unwrap().step(history[1]);
        assert_eq!(v1, Verdict::Accept);
    }

    #[test]
    fn not_rejects_immediately_when_child_would_match() {
        let rule = not(literal("\""));
        let (_, v) = rule.step(sym('"'));
        assert_eq!(v, Verdict::Reject);
    }
}

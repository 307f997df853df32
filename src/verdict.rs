//! The closed set of verdicts a [`crate::Rule`] may return for one symbol.

/// A tagged variant with four cases and no payload.
///
/// The engine treats these as the only outcomes a rule may report. Because
/// the type is a closed Rust enum, there is no runtime "unrecognized
/// verdict" case to defend against the way the distilled specification's
/// prose worries about; the processor still reports an
/// [`crate::LexError::EngineInvariant`] if push-back unwinding runs past the
/// buffered history, which is the one way a rule can still misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Rule needs more input; advance.
    Continue,
    /// Rule has matched the buffered prefix up to (and including, unless
    /// accompanied by push-back) the current symbol.
    Accept,
    /// Rule cannot match this prefix; removed from the active set.
    Reject,
    /// The current symbol is not part of the match; re-feed it (and
    /// possibly earlier symbols) to the continuation.
    PushBack,
}

//! Symbols: a rune plus the positional flags rules may want to anchor on.

use std::fmt;

/// `U+FFFF`, used as the rune carried by the synthetic end-of-file symbol.
/// Not a valid Unicode scalar value for real input, so it can never be
/// confused with a rune the reader actually produced.
pub const EOF_SENTINEL: char = '\u{FFFF}';

/// A bit-set of positional flags from {BOF, EOF, BOL, EOL}.
///
/// Stored as a plain `u8` bitset rather than pulling in a flags-generating
/// crate: the set is small, fixed, and known ahead of time.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SymbolFlags(u8);

impl SymbolFlags {
    /// Beginning of file: this is the very first symbol this lexer ever produced.
    pub const BOF: SymbolFlags = SymbolFlags(1 << 0);
    /// End of file: the synthetic terminal symbol.
    pub const EOF: SymbolFlags = SymbolFlags(1 << 1);
    /// Beginning of line: the previous symbol produced was a newline, or BOF holds.
    pub const BOL: SymbolFlags = SymbolFlags(1 << 2);
    /// End of line: this symbol's rune is a newline.
    pub const EOL: SymbolFlags = SymbolFlags(1 << 3);

    pub const NONE: SymbolFlags = SymbolFlags(0);

    pub const fn contains(self, flag: SymbolFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub const fn union(self, other: SymbolFlags) -> SymbolFlags {
        SymbolFlags(self.0 | other.0)
    }

    pub fn insert(&mut self, flag: SymbolFlags) {
        self.0 |= flag.0;
    }

    pub const fn is_bof(self) -> bool {
        self.contains(Self::BOF)
    }

    pub const fn is_eof(self) -> bool {
        self.contains(Self::EOF)
    }

    pub const fn is_bol(self) -> bool {
        self.contains(Self::BOL)
    }

    pub const fn is_eol(self) -> bool {
        self.contains(Self::EOL)
    }
}

impl fmt::Debug for SymbolFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.is_bof() {
            parts.push("BOF");
        }
        if self.is_eof() {
            parts.push("EOF");
        }
        if self.is_bol() {
            parts.push("BOL");
        }
        if self.is_eol() {
            parts.push("EOL");
        }
        write!(f, "SymbolFlags({})", parts.join("|"))
    }
}

impl std::ops::BitOr for SymbolFlags {
    type Output = SymbolFlags;

    fn bitor(self, rhs: SymbolFlags) -> SymbolFlags {
        self.union(rhs)
    }
}

/// A rune together with positional flags. Symbols are immutable once
/// created: the driver creates each one exactly once and stores it in the
/// buffer; cheap to copy, so the protocol and processor pass them by value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub rune: char,
    pub flags: SymbolFlags,
}

impl Symbol {
    pub const fn new(rune: char, flags: SymbolFlags) -> Self {
        Self { rune, flags }
    }

    /// Builds the synthetic terminal symbol produced once the reader is exhausted.
    pub const fn eof(flags: SymbolFlags) -> Self {
        Self::new(EOF_SENTINEL, SymbolFlags::EOF.union(flags))
    }

    pub const fn is_eof(&self) -> bool {
        self.flags.is_eof()
    }
}

/// The set of Unicode hard line-break characters a rune must belong to in
/// order to be classified as a newline for `SymbolFlags::EOL`/`BOL` purposes.
/// Mirrors the line-terminator set this codebase's own text handling already
/// uses (Unicode UAX #14 rules LB4/LB5), applied per-symbol rather than
/// across a pre-split list of lines.
pub fn is_newline(rune: char) -> bool {
    matches!(
        rune,
        '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

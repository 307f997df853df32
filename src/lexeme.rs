//! The output of a successful match: a labeled span of source text.

use crate::registration::LexemeType;

/// One recognized token: a label, the matched text, and its offset in
/// *runes* (not bytes) from the start of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    lexeme_type: LexemeType,
    text: String,
    offset: usize,
}

impl Lexeme {
    pub(crate) fn new(lexeme_type: LexemeType, text: String, offset: usize) -> Self {
        Self {
            lexeme_type,
            text,
            offset,
        }
    }

    /// The label of the rule that produced this lexeme (or
    /// [`LexemeType::unknown`] if no rule matched).
    pub fn r#type(&self) -> &LexemeType {
        &self.lexeme_type
    }

    /// The matched source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Offset of the first rune of this lexeme, in rune units from the
    /// start of the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the matched text, in runes.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_report_constructed_fields() {
        let lex = Lexeme::new(LexemeType::from("WORD"), "hello".to_owned(), 3);
        assert_eq!(lex.r#type().as_str(), "WORD");
        assert_eq!(lex.text(), "hello");
        assert_eq!(lex.offset(), 3);
        assert_eq!(lex.len(), 5);
        assert!(!lex.is_empty());
    }

    #[test]
    fn len_counts_runes_not_bytes() {
        let lex = Lexeme::new(LexemeType::from("WORD"), "caf\u{00e9}".to_owned(), 0);
        assert_eq!(lex.len(), 4);
        assert_ne!(lex.len(), lex.text().len());
    }
}

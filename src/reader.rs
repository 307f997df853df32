//! Rune sources: the adapters a [`crate::Lexer`] pulls runes from.
//!
//! The engine itself only needs "give me the next rune, or tell me you're
//! done, or fail." [`RuneSource`] is that seam; [`StrSource`] and
//! [`IterSource`] are zero-cost adapters over data already in memory,
//! [`ReadSource`] incrementally decodes UTF-8 out of a [`std::io::Read`] the
//! way the teacher's own `Lexer` walked a `&str` via `char_indices`, just
//! one read buffer removed from the byte source.

use std::error;
use std::io::{self, Read};
use std::str::Chars;

/// A source of runes. The engine calls `next_rune` once per symbol it
/// needs; `Ok(None)` signals a clean end of stream.
pub trait RuneSource {
    fn next_rune(&mut self) -> Result<Option<char>, Box<dyn error::Error + Send + Sync>>;
}

/// Reads runes out of a borrowed `&str`, the cheapest possible source.
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars(),
        }
    }
}

impl RuneSource for StrSource<'_> {
    fn next_rune(&mut self) -> Result<Option<char>, Box<dyn error::Error + Send + Sync>> {
        Ok(self.chars.next())
    }
}

/// Reads runes out of any `Iterator<Item = char>`, for callers already
/// holding a char iterator (e.g. chained or filtered sources).
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = char>> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator<Item = char>> RuneSource for IterSource<I> {
    fn next_rune(&mut self) -> Result<Option<char>, Box<dyn error::Error + Send + Sync>> {
        Ok(self.iter.next())
    }
}

/// Reads runes incrementally out of a [`std::io::Read`], decoding UTF-8 as
/// bytes arrive rather than requiring the whole input up front.
pub struct ReadSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pos: 0,
        }
    }

    fn fill_one_byte(&mut self) -> io::Result<bool> {
        let mut byte = [0u8; 1];
        let n = self.reader.read(&mut byte)?;
        if n == 0 {
            return Ok(false);
        }
        self.buf.push(byte[0]);
        Ok(true)
    }
}

impl<R: Read> RuneSource for ReadSource<R> {
    fn next_rune(&mut self) -> Result<Option<char>, Box<dyn error::Error + Send + Sync>> {
        self.buf.drain(..self.pos);
        self.pos = 0;

        loop {
            match std::str::from_utf8(&self.buf) {
                Ok(s) => {
                    if let Some(c) = s.chars().next() {
                        self.pos = c.len_utf8();
                        return Ok(Some(c));
                    }
                }
                Err(e) if e.error_len().is_none() => {
                    // valid prefix, incomplete trailing sequence: keep reading
                }
                Err(e) => {
                    return Err(Box::new(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid UTF-8 in source: {e}"),
                    )));
                }
            }
            if !self.fill_one_byte().map_err(|e| Box::new(e) as Box<dyn error::Error + Send + Sync>)? {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(Box::new(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "source ended mid-UTF-8-sequence",
                    )))
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_source_yields_runes_in_order() {
        let mut src = StrSource::new("ab");
        assert_eq!(src.next_rune().unwrap(), Some('a'));
        assert_eq!(src.next_rune().unwrap(), Some('b'));
        assert_eq!(src.next_rune().unwrap(), None);
    }

    #[test]
    fn iter_source_wraps_any_char_iterator() {
        let mut src = IterSource::new("xy".chars());
        assert_eq!(src.next_rune().unwrap(), Some('x'));
        assert_eq!(src.next_rune().unwrap(), Some('y'));
        assert_eq!(src.next_rune().unwrap(), None);
    }

    #[test]
    fn read_source_decodes_utf8_incrementally() {
        let bytes = "h\u{00e9}llo".as_bytes().to_vec();
        let mut src = ReadSource::new(io::Cursor::new(bytes));
        let mut out = String::new();
        while let Some(c) = src.next_rune().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "h\u{00e9}llo");
    }

    #[test]
    fn read_source_matches_str_source_on_multibyte_text() {
        let text = "caf\u{00e9} \u{4f60}\u{597d}";
        let mut a = StrSource::new(text);
        let mut b = ReadSource::new(io::Cursor::new(text.as_bytes().to_vec()));
        loop {
            let ra = a.next_rune().unwrap();
            let rb = b.next_rune().unwrap();
            assert_eq!(ra, rb);
            if ra.is_none() {
                break;
            }
        }
    }
}

//! Character cursor over LaTeX math source
//!
//! Position is a byte offset into the source; every consuming method
//! advances by whole characters.

/// Cursor with single-character lookahead.
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    /// Byte offset of the next character
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Peek at the next character without consuming it
    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Consume and return the next character
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `expected` if it is next
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returns true if any was skipped
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        self.read_while(char::is_whitespace);
        self.pos > start
    }

    /// Consume the longest prefix whose characters satisfy `pred`
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    /// Read a control sequence name after the backslash: a run of ASCII
    /// letters, or else the single next character. Empty at end of input.
    pub fn read_command_name(&mut self) -> &'a str {
        let letters = self.read_while(|c| c.is_ascii_alphabetic());
        if !letters.is_empty() {
            return letters;
        }
        let start = self.pos;
        self.advance();
        &self.src[start..self.pos]
    }
}

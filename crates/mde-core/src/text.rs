//! Text buffer abstraction for document storage.
//!
//! The `TextBuffer` trait is the read side the commands need: slicing and
//! line addressing by character offset. `EditorRope` is the ropey-backed
//! implementation used by [`Document`](crate::document::Document).

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// A single line of the document.
///
/// `from`/`to` are character offsets; `to` excludes the line break.
/// `number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub from: usize,
    pub to: usize,
    pub number: usize,
    pub text: SmolStr,
}

impl Line {
    /// Length in chars, excluding the line break.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Whether the line holds only whitespace.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.text)
    }
}

/// A text buffer addressable by character offset and by line number.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in bytes (UTF-8).
    fn len_bytes(&self) -> usize;

    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    ///
    /// SmolStr is used for efficiency: strings ≤23 bytes are stored inline
    /// (no heap allocation), longer strings are Arc'd (cheap to clone).
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Get character at offset. Returns None if out of bounds.
    fn char_at(&self, char_offset: usize) -> Option<char>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// Convert char offset to byte offset.
    fn char_to_byte(&self, char_offset: usize) -> usize;

    /// Convert byte offset to char offset.
    fn byte_to_char(&self, byte_offset: usize) -> usize;

    /// Number of lines. An empty buffer has one (empty) line.
    fn lines(&self) -> usize;

    /// The line containing `char_offset`. Offsets past the end resolve to
    /// the last line.
    fn line_at(&self, char_offset: usize) -> Line;

    /// Line by 1-based number. Returns None if out of range.
    fn line(&self, number: usize) -> Option<Line>;
}

/// Ropey-backed text buffer.
///
/// Provides O(log n) slicing and offset conversions; clones are cheap, which
/// is what lets every edit produce a fresh snapshot.
#[derive(Clone, Default, Debug)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Get a reference to the underlying rope (for advanced operations).
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }

    /// Replace a char range in place. Used when applying change sets to a
    /// fresh clone; snapshots handed out are never mutated.
    pub(crate) fn replace(&mut self, char_range: Range<usize>, text: &str) {
        if !char_range.is_empty() {
            self.rope.remove(char_range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(char_range.start, text);
        }
    }

    fn line_by_index(&self, idx: usize) -> Line {
        let from = self.rope.line_to_char(idx);
        let slice = self.rope.line(idx);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        Line {
            from,
            to: from + len,
            number: idx + 1,
            text: slice.slice(..len).to_smolstr(),
        }
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.end > self.len_chars() || char_range.start > char_range.end {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.rope.char_to_byte(char_offset.min(self.rope.len_chars()))
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        self.rope.byte_to_char(byte_offset.min(self.rope.len_bytes()))
    }

    fn lines(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_at(&self, char_offset: usize) -> Line {
        let offset = char_offset.min(self.rope.len_chars());
        self.line_by_index(self.rope.char_to_line(offset))
    }

    fn line(&self, number: usize) -> Option<Line> {
        if number == 0 || number > self.rope.len_lines() {
            return None;
        }
        Some(self.line_by_index(number - 1))
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

/// Whether `text` holds only whitespace (or nothing).
pub fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// The leading run of whitespace in `text`.
pub fn leading_whitespace(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_at() {
        let rope = EditorRope::from_str("hello");
        assert_eq!(rope.char_at(0), Some('h'));
        assert_eq!(rope.char_at(4), Some('o'));
        assert_eq!(rope.char_at(5), None);
    }

    #[test]
    fn test_slice() {
        let rope = EditorRope::from_str("hello world");
        assert_eq!(rope.slice(0..5).as_deref(), Some("hello"));
        assert_eq!(rope.slice(6..11).as_deref(), Some("world"));
        assert_eq!(rope.slice(0..100), None);
    }

    #[test]
    fn test_offset_conversion() {
        // "hello 🌍" - emoji is 4 bytes, 1 char
        let rope = EditorRope::from_str("hello 🌍");
        assert_eq!(rope.len_chars(), 7);
        assert_eq!(rope.len_bytes(), 10);

        assert_eq!(rope.char_to_byte(6), 6);
        assert_eq!(rope.char_to_byte(7), 10);
        assert_eq!(rope.byte_to_char(6), 6);
        assert_eq!(rope.byte_to_char(10), 7);
    }

    #[test]
    fn test_line_addressing() {
        let rope = EditorRope::from_str("one\ntwo\n\nfour");
        assert_eq!(rope.lines(), 4);

        let line = rope.line_at(5);
        assert_eq!((line.from, line.to, line.number), (4, 7, 2));
        assert_eq!(line.text, "two");

        // The newline itself belongs to the line it ends.
        assert_eq!(rope.line_at(3).number, 1);

        let blank = rope.line(3).unwrap();
        assert!(blank.is_empty());
        assert!(blank.is_blank());

        assert_eq!(rope.line(4).unwrap().text, "four");
        assert!(rope.line(5).is_none());
        assert!(rope.line(0).is_none());
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let rope = EditorRope::from_str("a\n");
        assert_eq!(rope.lines(), 2);
        let last = rope.line_at(2);
        assert_eq!((last.from, last.to, last.number), (2, 2, 2));
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let rope = EditorRope::new();
        assert_eq!(rope.lines(), 1);
        let line = rope.line_at(0);
        assert_eq!((line.from, line.to, line.number), (0, 0, 1));
    }

    #[test]
    fn test_replace() {
        let mut rope = EditorRope::from_str("hello world");
        rope.replace(6..11, "rust");
        assert_eq!(rope.to_string(), "hello rust");
        rope.replace(5..5, ",");
        assert_eq!(rope.to_string(), "hello, rust");
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("  \tx y"), "  \t");
        assert_eq!(leading_whitespace("x"), "");
        assert_eq!(leading_whitespace("   "), "   ");
    }
}

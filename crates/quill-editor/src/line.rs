//! One row of the compose buffer.
//!
//! A [`CodepointLine`] is a plain `Vec<char>`: every index is a code point,
//! so edits can never split a multi-byte character. It never holds a line
//! terminator; row breaks are structural, between lines.

use std::fmt;

use unicode_width::UnicodeWidthChar;

/// Whether `ch` ends a line: LF, CR, VT, FF, NEL, LS or PS.
#[inline]
#[must_use]
pub const fn is_line_terminator(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// An ordered run of code points with no line terminator.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CodepointLine {
    chars: Vec<char>,
}

impl CodepointLine {
    #[must_use]
    pub const fn new() -> Self {
        Self { chars: Vec::new() }
    }

    /// Build a line from `text`, dropping any line terminators in it.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            chars: text.chars().filter(|&c| !is_line_terminator(c)).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    #[inline]
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Terminal columns the line occupies.
    #[must_use]
    pub fn width(&self) -> usize {
        self.chars.iter().map(|c| c.width().unwrap_or(0)).sum()
    }

    /// Insert `chars` before index `at`. `at` must be `<= len()`.
    pub(crate) fn insert(&mut self, at: usize, chars: &[char]) {
        debug_assert!(chars.iter().all(|&c| !is_line_terminator(c)));
        self.chars.splice(at..at, chars.iter().copied());
    }

    /// Remove and return the code point at `at`.
    pub(crate) fn remove(&mut self, at: usize) -> Option<char> {
        (at < self.chars.len()).then(|| self.chars.remove(at))
    }

    /// Split off everything from `at` onward as a new line.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        Self {
            chars: self.chars.split_off(at),
        }
    }

    /// Move all of `other` onto the end of this line.
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.chars.append(&mut other.chars);
    }

    /// Put `head` in front of the existing content.
    pub(crate) fn prepend(&mut self, mut head: Self) {
        head.chars.append(&mut self.chars);
        self.chars = head.chars;
    }
}

impl fmt::Display for CodepointLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for &c in &self.chars {
            f.write_char(c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CodepointLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminators() {
        for ch in ['\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}'] {
            assert!(is_line_terminator(ch), "{ch:?}");
        }
        assert!(!is_line_terminator('\t'));
        assert!(!is_line_terminator('a'));
    }

    #[test]
    fn from_text_strips_terminators() {
        let line = CodepointLine::from_text("a\nb\r\nc");
        assert_eq!(line.to_string(), "abc");
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn indexes_code_points_not_bytes() {
        let line = CodepointLine::from_text("héllo🦀");
        assert_eq!(line.len(), 6);
        assert_eq!(line.get(1), Some('é'));
        assert_eq!(line.get(5), Some('🦀'));
        assert_eq!(line.get(6), None);
    }

    #[test]
    fn insert_remove() {
        let mut line = CodepointLine::from_text("ac");
        line.insert(1, &['b']);
        line.insert(3, &['d', 'e']);
        assert_eq!(line.to_string(), "abcde");
        assert_eq!(line.remove(0), Some('a'));
        assert_eq!(line.remove(10), None);
        assert_eq!(line.to_string(), "bcde");
    }

    #[test]
    fn split_append_prepend() {
        let mut line = CodepointLine::from_text("Hello World");
        let mut tail = line.split_off(5);
        assert_eq!(line.to_string(), "Hello");
        assert_eq!(tail.to_string(), " World");

        line.append(&mut tail);
        assert!(tail.is_empty());
        assert_eq!(line.to_string(), "Hello World");

        line.prepend(CodepointLine::from_text(">> "));
        assert_eq!(line.to_string(), ">> Hello World");
    }

    #[test]
    fn width_counts_wide_chars_twice() {
        assert_eq!(CodepointLine::from_text("a中").width(), 3);
    }
}

// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A wide character (CJK, most emoji) spans two columns: the first cell holds
// the character, the second is a continuation cell carrying only the style
// so the background still fills. The renderer never prints a continuation.

use crate::style::Style;

/// Marker stored in the second column of a wide character.
const CONTINUATION: char = '\0';

/// A styled character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A blank cell with terminal defaults.
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// A blank cell that still paints `style` (for background fills).
    #[inline]
    #[must_use]
    pub const fn blank(style: Style) -> Self {
        Self { ch: ' ', style }
    }

    /// The trailing half of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self {
            ch: CONTINUATION,
            style,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The printable character, or `None` for a continuation cell.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.is_continuation() {
            None
        } else {
            Some(self.ch)
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// SPDX-License-Identifier: MIT
//
// FrameBuffer, the grid every widget paints into.
//
// Row-major `Vec<Cell>`: a row is a contiguous slice, which is what lets the
// renderer compare whole rows with a single slice equality. Painting is
// clipped to the buffer; anything outside is silently dropped.
//
// Wide characters take two cells (character + continuation). Painting over
// either half of an existing wide character blanks the other half so the
// terminal never receives half a glyph.

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::style::Style;

/// A fixed-size grid of styled cells.
///
/// ```
/// use quill_term::frame::FrameBuffer;
/// use quill_term::style::Style;
///
/// let mut frame = FrameBuffer::new(10, 2);
/// frame.paint_text(0, 1, "hi", Style::PLAIN, 10);
/// assert_eq!(frame.get(1, 1).and_then(|c| c.character()), Some('i'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.in_bounds(x, y).then(|| &self.cells[self.index(x, y)])
    }

    /// One full row, or `None` past the bottom edge.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Reset every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy another buffer of identical size into this one without
    /// reallocating. Mismatched sizes fall back to a clone.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }

    /// Write one cell. Returns `false` when `(x, y)` is off the grid.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.split_wide_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Blank out whichever half of a wide character sits at `(x, y)`.
    fn split_wide_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            let owner = idx - 1;
            self.cells[owner] = Cell::blank(self.cells[owner].style);
        }
        if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1] = Cell::blank(self.cells[idx + 1].style);
        }
    }

    /// Fill `width` cells of row `y`, starting at `x`, with blanks in `style`.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, style: Style) {
        let end = x.saturating_add(width).min(self.width);
        for col in x..end {
            self.set(col, y, Cell::blank(style));
        }
    }

    /// Paint `text` left to right from `(x, y)`, using at most `max_cols`
    /// columns. Zero-width characters are dropped; a wide character that
    /// would straddle the limit becomes a space.
    ///
    /// Returns the number of columns consumed.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style, max_cols: u16) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = x.saturating_add(max_cols).min(self.width);
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if w == 2 {
                if col + 1 >= limit {
                    self.set(col, y, Cell::blank(style));
                    col += 1;
                    break;
                }
                self.set(col, y, Cell::new(ch, style));
                self.set(col + 1, y, Cell::continuation(style));
                col += 2;
            } else {
                self.set(col, y, Cell::new(ch, style));
                col += 1;
            }
        }

        col - x
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Width Helpers ───────────────────────────────────────────────────────────

/// Terminal columns occupied by `ch`: 0 for control and combining
/// characters, 2 for wide characters, 1 otherwise.
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Terminal columns occupied by `s`.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

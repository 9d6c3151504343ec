//! Compose area rendering.
//!
//! [`ViewRenderer::render`] is a pure function of the buffer and viewport:
//! it produces the visible rows with the cursor glyph marked and never
//! mutates either input. The cursor glyph overlays the character under the
//! cursor; in the append position a blank marker cell is added after the
//! row instead. [`RenderedView::paint`] then copies the result into a
//! region of a [`FrameBuffer`].

use quill_term::frame::{FrameBuffer, char_width};
use quill_term::style::Style;
use quill_theme::Theme;

use crate::buffer::LineBuffer;
use crate::viewport::Viewport;

/// The glyph drawn when the cursor sits past the last character.
pub const CURSOR_MARKER: char = ' ';

// ---------------------------------------------------------------------------
// RenderedView
// ---------------------------------------------------------------------------

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// Row text, with [`CURSOR_MARKER`] appended when the cursor is at the end.
    pub text: String,
    /// Code point index in `text` drawn with the cursor style.
    pub highlight: Option<usize>,
}

/// The visible part of a buffer, ready to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub rows: Vec<RenderedRow>,
    /// Cursor as `(column, row)` in screen cells relative to the top-left of
    /// the view, or `None` when the cursor row is scrolled out.
    pub cursor: Option<(usize, usize)>,
    normal: Style,
    cursor_style: Style,
}

impl RenderedView {
    /// Visible rows joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Paint into the `width` x `height` region at `(x, y)`. The whole region
    /// is filled with the normal style first; rows and columns that do not
    /// fit are clipped.
    pub fn paint(&self, frame: &mut FrameBuffer, x: u16, y: u16, width: u16, height: u16) {
        for dy in 0..height {
            frame.fill(x, y.saturating_add(dy), width, self.normal);
        }

        for (dy, row) in (0..height).zip(&self.rows) {
            let yy = y.saturating_add(dy);
            let mut col = x;
            let end = x.saturating_add(width);
            let mut utf8 = [0u8; 4];

            for (idx, ch) in row.text.chars().enumerate() {
                if col >= end {
                    break;
                }
                let style = if row.highlight == Some(idx) {
                    self.cursor_style
                } else {
                    self.normal
                };
                col += frame.paint_text(col, yy, ch.encode_utf8(&mut utf8), style, end - col);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ViewRenderer
// ---------------------------------------------------------------------------

/// Turns buffer state into a [`RenderedView`] using the styles of a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRenderer {
    normal: Style,
    cursor: Style,
}

impl ViewRenderer {
    #[must_use]
    pub fn new(theme: &Theme) -> Self {
        Self {
            normal: theme.normal.style(),
            cursor: theme.cursor.style(),
        }
    }

    #[must_use]
    pub fn render(&self, buffer: &LineBuffer, viewport: &Viewport) -> RenderedView {
        let lines = buffer.lines();
        let at = buffer.cursor();
        let visible = viewport.visible(lines.len());

        let mut cursor = None;
        let rows = visible
            .zip(0..)
            .map(|(row, screen_row)| {
                let chars = lines[row].as_chars();
                let mut text: String = chars.iter().collect();
                let mut highlight = None;

                if row == at.row {
                    let col = at.col.min(chars.len());
                    if col == chars.len() {
                        text.push(CURSOR_MARKER);
                    }
                    highlight = Some(col);
                    let screen_col = chars[..col].iter().map(|&c| char_width(c)).sum();
                    cursor = Some((screen_col, screen_row));
                }

                RenderedRow { text, highlight }
            })
            .collect();

        RenderedView {
            rows,
            cursor,
            normal: self.normal,
            cursor_style: self.cursor,
        }
    }
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new(&Theme::terminal())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The compose buffer: wrapped lines plus an edit cursor.
//!
//! [`LineBuffer`] stores its text as rows of [`CodepointLine`], each at most
//! `max_width` code points long. Every mutation ends with a forward reflow:
//! overflow at the end of a row is pushed onto the front of the next one,
//! cascading down and opening a new row at the bottom if needed. Rows that an
//! edit leaves short stay short; text is never pulled back up.
//!
//! # Invariants
//!
//! Between operations:
//!
//! - there is at least one row;
//! - the cursor row exists and `col <= len(row)`;
//! - no row is longer than `max_width`;
//! - a row is empty only if it is the sole row or the cursor's row.
//!
//! A broken invariant is a bug in the caller or in this module. Debug builds
//! assert on it; release builds clamp back into a valid state and log a
//! warning.

use tracing::{debug, warn};

use crate::cursor::Motion;
use crate::line::{CodepointLine, is_line_terminator};
use crate::position::Position;

/// Separator placed between rows by [`LineBuffer::submit`].
pub const ROW_SEPARATOR: char = '\n';

/// Wrapped, cursor-addressed text.
///
/// ```
/// use quill_editor::buffer::LineBuffer;
///
/// let mut buf = LineBuffer::new(6);
/// buf.insert_text("Hello, World");
/// assert_eq!(buf.lines_as_strings(), ["Hello,", " World"]);
/// assert_eq!(buf.submit(), "Hello,\n World");
/// assert!(buf.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<CodepointLine>,
    cursor: Position,
    max_width: usize,
}

impl LineBuffer {
    /// One empty row, cursor at the origin. A `max_width` of 0 is raised to 1.
    #[must_use]
    pub fn new(max_width: usize) -> Self {
        Self {
            lines: vec![CodepointLine::new()],
            cursor: Position::ZERO,
            max_width: max_width.max(1),
        }
    }

    /// A buffer holding `lines` as-is, with no reflow. Terminators inside a
    /// line are dropped and `cursor` is clamped to the content.
    #[must_use]
    pub fn from_lines<I, S>(lines: I, max_width: usize, cursor: Position) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<CodepointLine> = lines
            .into_iter()
            .map(|l| CodepointLine::from_text(l.as_ref()))
            .collect();
        if lines.is_empty() {
            lines.push(CodepointLine::new());
        }
        let mut buf = Self {
            lines,
            cursor: Position::ZERO,
            max_width: max_width.max(1),
        };
        buf.cursor = buf.clamp(cursor);
        buf
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[CodepointLine] {
        &self.lines
    }

    #[must_use]
    pub fn lines_as_strings(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// True when there is no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(CodepointLine::is_empty)
    }

    /// Total code points across all rows.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(CodepointLine::len).sum()
    }

    /// The text [`submit`](Self::submit) would return, without resetting.
    /// Rows are joined with [`ROW_SEPARATOR`]; an empty cursor row
    /// contributes nothing, so there is never a trailing separator.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut out = String::with_capacity(self.char_count() + self.lines.len());
        for line in self.lines.iter().filter(|l| !l.is_empty()) {
            if !out.is_empty() {
                out.push(ROW_SEPARATOR);
            }
            out.extend(line.as_chars());
        }
        out
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert `text` at the cursor and advance past it, then reflow.
    ///
    /// `text` must not contain a line terminator; use
    /// [`split_at_cursor`](Self::split_at_cursor) between lines.
    pub fn insert_text(&mut self, text: &str) {
        self.ensure_valid_cursor();

        let mut chars: Vec<char> = text.chars().collect();
        let has_terminator = chars.iter().any(|&c| is_line_terminator(c));
        debug_assert!(!has_terminator, "line terminator in inserted text {text:?}");
        if has_terminator {
            warn!(text, "dropping line terminators from inserted text");
            chars.retain(|&c| !is_line_terminator(c));
        }
        if chars.is_empty() {
            return;
        }

        let Position { row, col } = self.cursor;
        self.lines[row].insert(col, &chars);
        self.cursor.col += chars.len();
        self.reflow(row);
        self.prune_empty_lines();
    }

    /// Delete the code point before the cursor. At the start of a row the
    /// row is merged onto the end of the previous one and reflowed from
    /// there, which may push the merged text straight back down.
    pub fn backspace(&mut self) {
        self.ensure_valid_cursor();

        let Position { row, col } = self.cursor;
        if col > 0 {
            self.lines[row].remove(col - 1);
            self.cursor.col -= 1;
        } else if row > 0 {
            let mut merged = self.lines.remove(row);
            let joint = self.lines[row - 1].len();
            self.lines[row - 1].append(&mut merged);
            self.cursor = Position::new(row - 1, joint);
            self.reflow(row - 1);
        }
        self.prune_empty_lines();
    }

    /// Enter: everything from the cursor to the end of its row moves to a
    /// new row below, and the cursor goes to the start of that row.
    ///
    /// At column 0 of a non-empty row this leaves an empty row behind the
    /// cursor, which is pruned, so the text is unchanged.
    pub fn split_at_cursor(&mut self) {
        self.ensure_valid_cursor();

        let Position { row, col } = self.cursor;
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, tail);
        self.cursor = Position::new(row + 1, 0);
        self.prune_empty_lines();
    }

    /// Move the cursor. Content is untouched apart from dropping an empty
    /// row the cursor just left.
    pub fn move_cursor(&mut self, motion: Motion) {
        self.ensure_valid_cursor();
        self.cursor = motion.apply(&self.lines, self.cursor);
        self.prune_empty_lines();
    }

    /// Push overflow forward starting at `start`, until a row fits.
    ///
    /// Running it again without an edit in between changes nothing.
    pub fn reflow(&mut self, start: usize) {
        let max = self.max_width;
        let mut row = start;

        while row < self.lines.len() && self.lines[row].len() > max {
            let overflow = self.lines[row].split_off(max);
            let moved = overflow.len();
            if row + 1 == self.lines.len() {
                debug!(row = row + 1, "reflow opened a row");
                self.lines.push(CodepointLine::new());
            }
            self.lines[row + 1].prepend(overflow);

            if self.cursor.row == row && self.cursor.col > max {
                self.cursor = Position::new(row + 1, self.cursor.col - max);
            } else if self.cursor.row == row + 1 {
                self.cursor.col += moved;
            }
            row += 1;
        }
    }

    /// Change the wrap width and reflow every row. A width of 0 is raised
    /// to 1. Rows are not re-joined when the width grows.
    pub fn set_max_width(&mut self, max_width: usize) {
        let max_width = max_width.max(1);
        if max_width == self.max_width {
            return;
        }
        debug!(from = self.max_width, to = max_width, "rewrapping compose buffer");
        self.max_width = max_width;

        let mut row = 0;
        while row < self.lines.len() {
            self.reflow(row);
            row += 1;
        }
        self.prune_empty_lines();
    }

    /// Return the joined text and reset to a single empty row.
    pub fn submit(&mut self) -> String {
        let text = self.contents();
        debug!(rows = self.lines.len(), chars = text.chars().count(), "submit");
        self.clear();
        text
    }

    /// Back to one empty row with the cursor at the origin.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.lines.push(CodepointLine::new());
        self.cursor = Position::ZERO;
    }

    // -- Internals ----------------------------------------------------------

    fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.lines.len().saturating_sub(1));
        let len = self.lines.get(row).map_or(0, CodepointLine::len);
        Position::new(row, pos.col.min(len))
    }

    fn ensure_valid_cursor(&mut self) {
        debug_assert!(!self.lines.is_empty(), "line buffer lost its last row");
        if self.lines.is_empty() {
            warn!("line buffer had no rows; restoring one");
            self.lines.push(CodepointLine::new());
        }
        let valid = self.clamp(self.cursor);
        if valid != self.cursor {
            debug_assert_eq!(self.cursor, valid, "cursor out of range");
            warn!(cursor = ?self.cursor, clamped = ?valid, "cursor out of range; clamping");
            self.cursor = valid;
        }
    }

    /// Drop empty rows other than the cursor's, keeping the cursor on its row.
    fn prune_empty_lines(&mut self) {
        if self.lines.len() <= 1 {
            return;
        }
        let cursor_row = self.cursor.row;
        let above = self.lines[..cursor_row]
            .iter()
            .filter(|l| l.is_empty())
            .count();

        let mut row = 0;
        self.lines.retain(|line| {
            let keep = !line.is_empty() || row == cursor_row;
            row += 1;
            keep
        });
        self.cursor.row -= above;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(80)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

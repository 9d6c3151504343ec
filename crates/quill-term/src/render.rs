// SPDX-License-Identifier: MIT
//
// Differential frame output.
//
// The renderer keeps the last frame it sent. Each new frame is compared row
// by row; identical rows are skipped with one slice comparison and only the
// differing cells are encoded. A `Pen` remembers the terminal's cursor
// position and current style so consecutive cells in the same style cost
// exactly their UTF-8 bytes.
//
// The whole frame is accumulated in memory and written with a single
// `write_all`, wrapped in synchronized-output markers so the terminal never
// shows a half-drawn frame.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::frame::FrameBuffer;
use crate::style::Style;

// ─── Pen ─────────────────────────────────────────────────────────────────────

/// The terminal's state as far as the last emitted bytes are concerned.
#[derive(Debug, Clone, Copy)]
struct Pen {
    /// Where the next printed character will land, if known.
    at: Option<(u16, u16)>,
    /// Style in effect, if known.
    style: Option<Style>,
}

impl Pen {
    const UNKNOWN: Self = Self {
        at: None,
        style: None,
    };

    /// Encode `cell` at `(x, y)`, emitting only the sequences that change
    /// something.
    fn draw(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() {
            // The wide character to the left already covered this column.
            if self.at == Some((x.saturating_add(1), y)) {
                return Ok(());
            }
            self.move_to(out, x, y)?;
            self.apply(out, cell.style)?;
            out.push(b' ');
            self.at = Some((x + 1, y));
            return Ok(());
        }

        self.move_to(out, x, y)?;
        self.apply(out, cell.style)?;
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());
        let width = u16::try_from(crate::frame::char_width(cell.ch).max(1)).unwrap_or(1);
        self.at = Some((x.saturating_add(width), y));
        Ok(())
    }

    fn move_to(&mut self, out: &mut Vec<u8>, x: u16, y: u16) -> io::Result<()> {
        if self.at != Some((x, y)) {
            ansi::cursor_to(out, x, y)?;
            self.at = Some((x, y));
        }
        Ok(())
    }

    fn apply(&mut self, out: &mut Vec<u8>, style: Style) -> io::Result<()> {
        let Some(current) = self.style else {
            ansi::reset(out)?;
            ansi::attrs(out, style.attrs)?;
            ansi::fg(out, style.fg)?;
            ansi::bg(out, style.bg)?;
            self.style = Some(style);
            return Ok(());
        };
        if current == style {
            return Ok(());
        }
        if current.attrs == style.attrs {
            if current.fg != style.fg {
                ansi::fg(out, style.fg)?;
            }
            if current.bg != style.bg {
                ansi::bg(out, style.bg)?;
            }
        } else {
            // Attributes can only be cleared wholesale, which also drops colors.
            ansi::reset(out)?;
            ansi::attrs(out, style.attrs)?;
            ansi::fg(out, style.fg)?;
            ansi::bg(out, style.bg)?;
        }
        self.style = Some(style);
        Ok(())
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Counters from one [`Renderer::render`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_drawn: usize,
    pub cells_skipped: usize,
    pub bytes: usize,
}

/// Emits the minimal byte stream that turns the previous frame into the
/// next one.
///
/// ```
/// use quill_term::frame::FrameBuffer;
/// use quill_term::render::Renderer;
/// use quill_term::style::Style;
///
/// let mut renderer = Renderer::new();
/// let mut frame = FrameBuffer::new(8, 1);
/// frame.paint_text(0, 0, "hello", Style::PLAIN, 8);
/// let first = renderer.render(&frame).unwrap();
/// assert_eq!(first.cells_drawn, 8);
/// let second = renderer.render(&frame).unwrap();
/// assert_eq!(second.cells_drawn, 0);
/// ```
#[derive(Debug, Default)]
pub struct Renderer {
    out: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(16 * 1024),
            previous: None,
        }
    }

    /// Diff `frame` against the last rendered frame into the internal buffer.
    ///
    /// # Errors
    ///
    /// Only if encoding into the in-memory buffer fails, which it does not in
    /// practice.
    pub fn render(&mut self, frame: &FrameBuffer) -> io::Result<RenderStats> {
        self.out.clear();
        let mut stats = RenderStats::default();
        let (width, height) = (frame.width(), frame.height());

        if width == 0 || height == 0 {
            self.remember(frame);
            return Ok(stats);
        }

        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == width && p.height() == height);

        ansi::begin_sync(&mut self.out)?;
        if previous.is_none() {
            ansi::clear_screen(&mut self.out)?;
        }

        let mut pen = Pen::UNKNOWN;
        for y in 0..height {
            let Some(row) = frame.row(y) else { break };
            let old_row = previous.as_ref().and_then(|p| p.row(y));
            if old_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                let unchanged = old_row.is_some_and(|old| old[usize::from(x)] == *cell);
                if unchanged {
                    stats.cells_skipped += 1;
                    continue;
                }
                pen.draw(&mut self.out, x, y, cell)?;
                stats.cells_drawn += 1;
            }
        }

        ansi::reset(&mut self.out)?;
        ansi::end_sync(&mut self.out)?;
        stats.bytes = self.out.len();

        self.previous = previous;
        self.remember(frame);
        Ok(stats)
    }

    /// Bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    /// Write the pending bytes to stdout.
    ///
    /// # Errors
    ///
    /// Propagates stdout write failures.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write the pending bytes to `w` and clear them.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `w`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.out.is_empty() {
            w.write_all(&self.out)?;
            w.flush()?;
            self.out.clear();
        }
        Ok(())
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    fn remember(&mut self, frame: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(frame),
            None => self.previous = Some(frame.clone()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Attr, CellColor};

    fn output_of(renderer: &Renderer) -> String {
        String::from_utf8_lossy(renderer.output()).into_owned()
    }

    fn frame_with(text: &str, width: u16) -> FrameBuffer {
        let mut frame = FrameBuffer::new(width, 1);
        frame.paint_text(0, 0, text, Style::PLAIN, width);
        frame
    }

    // ── First frame ─────────────────────────────────────────────

    #[test]
    fn first_render_draws_everything() {
        let mut r = Renderer::new();
        let stats = r.render(&FrameBuffer::new(4, 3)).unwrap();
        assert_eq!(stats.cells_drawn, 12);
        assert_eq!(stats.cells_skipped, 0);
    }

    #[test]
    fn first_render_clears_and_syncs() {
        let mut r = Renderer::new();
        r.render(&frame_with("ab", 2)).unwrap();
        let out = output_of(&r);
        assert!(out.starts_with("\x1b[?2026h\x1b[2J"));
        assert!(out.ends_with("\x1b[0m\x1b[?2026l"));
        assert!(out.contains("ab"));
    }

    // ── Diffing ─────────────────────────────────────────────────

    #[test]
    fn identical_frame_draws_nothing() {
        let mut r = Renderer::new();
        let frame = frame_with("same", 4);
        r.render(&frame).unwrap();
        let stats = r.render(&frame).unwrap();
        assert_eq!(stats.cells_drawn, 0);
        assert_eq!(stats.cells_skipped, 4);
        assert!(!output_of(&r).contains("\x1b[2J"));
    }

    #[test]
    fn single_change_moves_cursor_once() {
        let mut r = Renderer::new();
        r.render(&frame_with("abcd", 4)).unwrap();
        let stats = r.render(&frame_with("abXd", 4)).unwrap();
        assert_eq!(stats.cells_drawn, 1);
        let out = output_of(&r);
        assert_eq!(out.matches("H").count(), 1);
        assert!(out.contains("\x1b[1;3H"));
        assert!(out.ends_with("X\x1b[0m\x1b[?2026l"));
    }

    #[test]
    fn adjacent_changes_share_one_cursor_move() {
        let mut r = Renderer::new();
        r.render(&frame_with("aaaa", 4)).unwrap();
        r.render(&frame_with("abba", 4)).unwrap();
        let out = output_of(&r);
        assert_eq!(out.matches("H").count(), 1);
        assert!(out.contains("bb"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = Renderer::new();
        r.render(&FrameBuffer::new(2, 1)).unwrap();
        let stats = r.render(&FrameBuffer::new(3, 1)).unwrap();
        assert_eq!(stats.cells_drawn, 3);
        assert!(output_of(&r).contains("\x1b[2J"));
    }

    #[test]
    fn invalidate_forces_full_redraw() {
        let mut r = Renderer::new();
        let frame = frame_with("xy", 2);
        r.render(&frame).unwrap();
        r.invalidate();
        let stats = r.render(&frame).unwrap();
        assert_eq!(stats.cells_drawn, 2);
    }

    #[test]
    fn zero_size_frame_is_silent() {
        let mut r = Renderer::new();
        let stats = r.render(&FrameBuffer::new(0, 0)).unwrap();
        assert_eq!(stats, RenderStats::default());
        assert!(r.output().is_empty());
    }

    // ── Styles ──────────────────────────────────────────────────

    #[test]
    fn style_emitted_once_for_a_run() {
        let bold = Style::new(CellColor::Ansi256(1), CellColor::Default, Attr::BOLD);
        let mut frame = FrameBuffer::new(3, 1);
        frame.paint_text(0, 0, "abc", bold, 3);
        let mut r = Renderer::new();
        r.render(&frame).unwrap();
        let out = output_of(&r);
        assert_eq!(out.matches("\x1b[1m").count(), 1);
        assert!(out.contains("\x1b[31m"));
        assert!(out.contains("abc"));
    }

    #[test]
    fn color_only_change_skips_reset() {
        let mut frame = FrameBuffer::new(2, 1);
        frame.paint_text(0, 0, "a", Style::fg(CellColor::Ansi256(1)), 1);
        frame.paint_text(1, 0, "b", Style::fg(CellColor::Ansi256(2)), 1);
        let mut r = Renderer::new();
        r.render(&frame).unwrap();
        let out = output_of(&r);
        // One reset when the pen starts, one at frame end.
        assert_eq!(out.matches("\x1b[0m").count(), 2);
        assert!(out.contains("a\x1b[32mb"));
    }

    #[test]
    fn wide_char_continuation_not_printed() {
        let mut r = Renderer::new();
        r.render(&frame_with("中", 2)).unwrap();
        let out = output_of(&r);
        assert!(out.contains('中'));
        assert!(!out.contains('\0'));
    }

    // ── Flush ───────────────────────────────────────────────────

    #[test]
    fn flush_to_drains_output() {
        let mut r = Renderer::new();
        r.render(&frame_with("q", 1)).unwrap();
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output().is_empty());
    }
}

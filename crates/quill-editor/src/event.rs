//! Input events and the [`Composer`] that applies them.
//!
//! The composer owns the buffer and its viewport and is the only thing that
//! mutates them. Each event is applied completely before the next one. Edits
//! and cursor moves scroll the viewport just enough to keep the cursor row
//! visible; the vertical arrows scroll the viewport and leave the cursor
//! where it is.

use crate::buffer::LineBuffer;
use crate::cursor::Motion;
use crate::line::is_line_terminator;
use crate::view::{RenderedView, ViewRenderer};
use crate::viewport::Viewport;

/// Spaces substituted for a pasted tab.
const TAB_SPACES: &str = "    ";

/// Everything the compose area reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Text without line terminators.
    InsertText(String),
    Backspace,
    Enter,
    ArrowLeft,
    ArrowRight,
    /// Scroll the view up one row.
    ArrowUp,
    /// Scroll the view down one row.
    ArrowDown,
    Home,
    End,
    /// New wrap width (code points) and visible height (rows).
    Resize { width: usize, height: usize },
    Submit,
}

impl InputEvent {
    /// Break pasted text into insert and Enter events. `\r\n` counts as one
    /// break, tabs become spaces and other control characters are dropped.
    #[must_use]
    pub fn from_paste(text: &str) -> Vec<Self> {
        let mut events = Vec::new();
        let mut run = String::new();
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if is_line_terminator(ch) {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if !run.is_empty() {
                    events.push(Self::InsertText(std::mem::take(&mut run)));
                }
                events.push(Self::Enter);
            } else if ch == '\t' {
                run.push_str(TAB_SPACES);
            } else if !ch.is_control() {
                run.push(ch);
            }
        }
        if !run.is_empty() {
            events.push(Self::InsertText(run));
        }
        events
    }
}

/// The compose area's state: text plus scroll position.
///
/// ```
/// use quill_editor::event::{Composer, InputEvent};
///
/// let mut composer = Composer::new(20, 3);
/// composer.apply(InputEvent::InsertText("Hi".into()));
/// assert_eq!(composer.apply(InputEvent::Submit), Some("Hi".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    buffer: LineBuffer,
    viewport: Viewport,
}

impl Composer {
    #[must_use]
    pub fn new(max_width: usize, height: usize) -> Self {
        Self {
            buffer: LineBuffer::new(max_width),
            viewport: Viewport::new(height),
        }
    }

    #[must_use]
    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Apply one event. Returns the submitted text for [`InputEvent::Submit`].
    pub fn apply(&mut self, event: InputEvent) -> Option<String> {
        let mut submitted = None;
        let mut follow_cursor = true;

        match event {
            InputEvent::InsertText(text) => {
                for event in InputEvent::from_paste(&text) {
                    match event {
                        InputEvent::InsertText(run) => self.buffer.insert_text(&run),
                        InputEvent::Enter => self.buffer.split_at_cursor(),
                        _ => {}
                    }
                }
            }
            InputEvent::Backspace => self.buffer.backspace(),
            InputEvent::Enter => self.buffer.split_at_cursor(),
            InputEvent::ArrowLeft => self.buffer.move_cursor(Motion::Left),
            InputEvent::ArrowRight => self.buffer.move_cursor(Motion::Right),
            InputEvent::Home => self.buffer.move_cursor(Motion::Home),
            InputEvent::End => self.buffer.move_cursor(Motion::End),
            InputEvent::ArrowUp => {
                self.viewport.scroll_up(1, self.buffer.line_count());
                follow_cursor = false;
            }
            InputEvent::ArrowDown => {
                self.viewport.scroll_down(1, self.buffer.line_count());
                follow_cursor = false;
            }
            InputEvent::Resize { width, height } => {
                self.buffer.set_max_width(width);
                self.viewport.set_height(height, self.buffer.line_count());
            }
            InputEvent::Submit => submitted = Some(self.buffer.submit()),
        }

        let line_count = self.buffer.line_count();
        if follow_cursor {
            self.viewport.reveal(self.buffer.cursor().row, line_count);
        } else {
            self.viewport.clamp(line_count);
        }
        submitted
    }

    /// Current view of the compose area.
    #[must_use]
    pub fn render(&self, renderer: &ViewRenderer) -> RenderedView {
        renderer.render(&self.buffer, &self.viewport)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn typed(composer: &mut Composer, text: &str) {
        composer.apply(InputEvent::InsertText(text.into()));
    }

    // -- Paste --------------------------------------------------------------

    #[test]
    fn paste_splits_on_line_breaks() {
        assert_eq!(
            InputEvent::from_paste("ab\r\ncd\n"),
            [
                InputEvent::InsertText("ab".into()),
                InputEvent::Enter,
                InputEvent::InsertText("cd".into()),
                InputEvent::Enter,
            ]
        );
    }

    #[test]
    fn paste_expands_tabs_and_drops_controls() {
        assert_eq!(
            InputEvent::from_paste("a\tb\x07"),
            [InputEvent::InsertText("a    b".into())]
        );
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_with_newlines_is_split_into_rows() {
        let mut c = Composer::new(20, 5);
        typed(&mut c, "one\ntwo");
        assert_eq!(c.buffer().lines_as_strings(), ["one", "two"]);
        assert_eq!(c.buffer().cursor(), Position::new(1, 3));
    }

    #[test]
    fn inserted_text_is_cleaned_like_a_paste() {
        let mut plain = Composer::new(20, 5);
        typed(&mut plain, "a\tb\x07");
        let mut pasted = Composer::new(20, 5);
        typed(&mut pasted, "a\tb\x07\n");

        assert_eq!(plain.buffer().lines_as_strings(), ["a    b"]);
        assert_eq!(pasted.buffer().lines_as_strings(), ["a    b", ""]);
        assert_eq!(plain.buffer().cursor(), Position::new(0, 6));

        let renderer = ViewRenderer::new(&quill_theme::Theme::terminal());
        assert_eq!(plain.render(&renderer).cursor, Some((6, 0)));
        assert_eq!(plain.apply(InputEvent::Submit), Some("a    b".to_string()));
    }

    #[test]
    fn submit_yields_text_and_resets() {
        let mut c = Composer::new(10, 3);
        typed(&mut c, "Hi");
        assert_eq!(c.apply(InputEvent::Submit).as_deref(), Some("Hi"));
        assert!(c.buffer().is_empty());
        assert_eq!(c.apply(InputEvent::Submit).as_deref(), Some(""));
    }

    #[test]
    fn other_events_return_nothing() {
        let mut c = Composer::new(10, 3);
        assert_eq!(c.apply(InputEvent::InsertText("x".into())), None);
        assert_eq!(c.apply(InputEvent::Backspace), None);
    }

    // -- Scrolling ----------------------------------------------------------

    #[test]
    fn arrow_down_clamps_at_last_page() {
        let mut c = Composer::new(1, 3);
        typed(&mut c, "abcde");
        assert_eq!(c.buffer().line_count(), 5);
        for _ in 0..20 {
            c.apply(InputEvent::ArrowLeft);
        }
        assert_eq!(c.buffer().cursor(), Position::ZERO);
        assert_eq!(c.viewport().offset(), 0);

        for _ in 0..10 {
            c.apply(InputEvent::ArrowDown);
        }
        assert_eq!(c.viewport().offset(), 2);
        assert_eq!(c.buffer().cursor(), Position::new(0, 0));
    }

    #[test]
    fn typing_keeps_cursor_row_visible() {
        let mut c = Composer::new(2, 2);
        typed(&mut c, "abcdefgh");
        assert_eq!(c.buffer().cursor().row, 3);
        assert_eq!(c.viewport().offset(), 2);
        let view = c.render(&ViewRenderer::default());
        assert_eq!(view.cursor, Some((2, 1)));
    }

    #[test]
    fn resize_rewraps_and_reclamps() {
        let mut c = Composer::new(4, 2);
        typed(&mut c, "abcdefgh");
        c.apply(InputEvent::Resize { width: 2, height: 3 });
        assert_eq!(c.buffer().lines_as_strings(), ["ab", "cd", "ef", "gh"]);
        assert_eq!(c.viewport().height(), 3);
        assert_eq!(c.viewport().offset(), 1);
    }
}

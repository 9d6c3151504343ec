// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// The frame loop.
//
// Each iteration waits on the stdin channel for at most one tick. Bytes that
// arrive are decoded and handed to the `App`; a quiet tick flushes a pending
// lone ESC as the Escape key. Then the loop checks for SIGWINCH, gives the
// app its `on_tick` (where streamed model output gets drained), and repaints
// only when something reported a change. Painting goes into a `FrameBuffer`
// which the diffing `Renderer` turns into terminal output.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::frame::FrameBuffer;
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::render::Renderer;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn watch_resize() {
    // SAFETY: the handler only stores to an atomic, which is signal-safe.
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn watch_resize() {}

// ─── App ─────────────────────────────────────────────────────────────────────

/// What to do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// The application driven by [`EventLoop`].
pub trait App {
    /// One decoded input event.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// The frame has already been resized when this runs.
    fn on_resize(&mut self, _size: Size) {}

    /// Runs once per loop iteration. Return `true` to request a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Draw the whole UI. The frame arrives cleared.
    fn paint(&mut self, frame: &mut FrameBuffer);

    /// Where to park the hardware cursor after a paint, if anywhere.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Default wait per iteration. Also bounds how long a lone ESC stays
/// ambiguous before it becomes the Escape key.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Owns the terminal for the lifetime of [`run`](Self::run).
///
/// ```no_run
/// use quill_term::event_loop::{Action, App, EventLoop};
/// use quill_term::frame::FrameBuffer;
/// use quill_term::input::{Event, KeyCode, KeyEvent};
/// use quill_term::style::Style;
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_event(&mut self, event: &Event) -> Action {
///         match event {
///             Event::Key(KeyEvent { code: KeyCode::Char('q'), .. }) => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, frame: &mut FrameBuffer) {
///         let width = frame.width();
///         frame.paint_text(0, 0, "press q", Style::PLAIN, width);
///     }
/// }
///
/// EventLoop::new().run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    tick: Duration,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    #[must_use]
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: Renderer::new(),
            tick,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    /// Take over the terminal and run `app` until it quits or stdin closes.
    /// The terminal is restored whether or not the loop fails.
    ///
    /// # Errors
    ///
    /// Terminal mode changes, the reader thread or output writes failed.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        watch_resize();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.pump(app, &rx);
                reader.stop();
                result
            }
            Err(err) => Err(err),
        };

        let left = self.terminal.leave();
        result.and(left)
    }

    fn pump(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        app.on_resize(size);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.tick) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                frame.resize(size.cols, size.rows);
                self.renderer.invalidate();
                app.on_resize(size);
                dirty = true;
            }

            dirty |= app.on_tick();

            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame)?;
                self.renderer.flush()?;
                place_cursor(app.cursor())?;
                dirty = false;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

fn place_cursor(cursor: Option<(u16, u16, CursorShape)>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match cursor {
        Some((x, y, shape)) => {
            ansi::cursor_to(&mut out, x, y)?;
            ansi::set_cursor_shape(&mut out, shape)?;
            ansi::cursor_show(&mut out)?;
        }
        None => ansi::cursor_hide(&mut out)?,
    }
    out.flush()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

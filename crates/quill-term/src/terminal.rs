// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal mode control.
//
// `Terminal` puts the tty into raw mode on the alternate screen with
// bracketed paste and the kitty keyboard protocol enabled, and undoes all of
// it on `leave` or drop. A panic hook writes a fixed restore sequence straight
// to fd 1 and reapplies the saved termios, so a crash mid-frame still hands
// the shell back in a usable state. It cannot take the stdout lock there:
// the panic may have happened while it was held.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be queried (pipes, CI).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Current size of the terminal on stdout, via `TIOCGWINSZ`.
#[cfg(unix)]
#[must_use]
pub fn query_size() -> Option<Size> {
    // SAFETY: winsize is plain data; ioctl only writes into it.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn query_size() -> Option<Size> {
    None
}

/// Whether stdin is a tty.
#[cfg(unix)]
#[must_use]
pub fn stdin_is_tty() -> bool {
    // SAFETY: isatty has no preconditions.
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn stdin_is_tty() -> bool {
    false
}

// ─── Crash Restore ───────────────────────────────────────────────────────────

/// Copy of the cooked-mode termios for the panic hook.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Everything `enter` turns on, turned off. Alt screen exit goes last so the
/// shell's screen comes back clean.
#[rustfmt::skip]
const RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[<u\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static HOOK: Once = Once::new();

fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_raw();
            #[cfg(unix)]
            if let Some(termios) = SAVED_TERMIOS.lock().ok().and_then(|saved| *saved) {
                // SAFETY: `termios` came from tcgetattr on the same fd.
                unsafe {
                    libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const termios);
                }
            }
            previous(info);
        }));
    });
}

fn write_restore_raw() {
    #[cfg(unix)]
    // SAFETY: writes a static byte string to fd 1.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            RESTORE.as_ptr().cast::<libc::c_void>(),
            RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Owner of the tty's mode. Restores the terminal when dropped.
pub struct Terminal {
    #[cfg(unix)]
    cooked: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle in cooked mode, sized from the OS when possible.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            cooked: None,
            size: query_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-read the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = query_size() {
            self.size = size;
        }
        self.size
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, bracketed paste and kitty
    /// disambiguation. No-op when already active.
    ///
    /// # Errors
    ///
    /// Propagates termios and stdout failures.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw_mode()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::enable_bracketed_paste(&mut out)?;
        ansi::enable_kitty_keyboard(&mut out, 1)?;
        out.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). No-op when inactive.
    ///
    /// # Errors
    ///
    /// Propagates termios and stdout failures.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let mut out = io::stdout().lock();
        ansi::end_sync(&mut out)?;
        ansi::disable_kitty_keyboard(&mut out)?;
        ansi::disable_bracketed_paste(&mut out)?;
        ansi::reset(&mut out)?;
        ansi::set_cursor_shape(&mut out, ansi::CursorShape::Default)?;
        ansi::cursor_show(&mut out)?;
        ansi::exit_alt_screen(&mut out)?;
        out.flush()?;
        drop(out);

        self.cooked_mode()?;
        self.active = false;
        Ok(())
    }

    #[cfg(unix)]
    fn raw_mode(&mut self) -> io::Result<()> {
        if !stdin_is_tty() {
            return Ok(());
        }
        let fd = libc::STDIN_FILENO;

        // SAFETY: termios is plain data filled in by tcgetattr.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        self.cooked = Some(termios);
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(termios);
        }

        // SAFETY: cfmakeraw only edits the struct in place.
        unsafe { libc::cfmakeraw(&raw mut termios) };
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;

        // SAFETY: `termios` is a fully initialised struct for this fd.
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn cooked_mode(&mut self) -> io::Result<()> {
        let Some(termios) = self.cooked.take() else {
            return Ok(());
        };
        // SAFETY: restoring the struct tcgetattr gave us.
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) } != 0
        {
            return Err(io::Error::last_os_error());
        }
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn cooked_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

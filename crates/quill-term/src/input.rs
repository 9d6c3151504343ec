// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Raw stdin bytes in, key and paste events out. Covered encodings:
//
// - plain bytes: printable ASCII, control characters, UTF-8
// - `ESC x`: Alt+key, including Alt+Enter (`ESC CR`)
// - CSI: arrows and editing keys, with xterm modifier parameters
// - SS3: arrows and Home/End as sent by some terminals in application mode
// - CSI-u: the kitty keyboard protocol's disambiguated keys
// - bracketed paste, delivered as one `Paste` event
//
// A sequence may be split across reads, so undecodable tails stay buffered
// until more bytes arrive. A lone ESC is indistinguishable from the start of
// a sequence; the event loop calls [`Parser::flush`] once input goes quiet to
// turn it into an Escape keypress.

use bitflags::bitflags;

// ─── Events ──────────────────────────────────────────────────────────────────

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text delivered through bracketed paste, verbatim.
    Paste(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers held.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Whether `mods` are all held.
    #[must_use]
    pub const fn has(self, mods: Modifiers) -> bool {
        self.modifiers.contains(mods)
    }
}

/// Which key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Held modifier keys. Bit layout follows the xterm/kitty encoding,
    /// where the wire parameter is `1 + bits`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

const PASTE_OPEN: &[u8] = b"\x1b[200~";
const PASTE_CLOSE: &[u8] = b"\x1b[201~";

/// Incremental decoder for terminal input.
///
/// ```
/// use quill_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"hi\x1b[A");
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[2], Event::Key(KeyEvent::plain(KeyCode::Up)));
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    pending: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and decode as many complete events as possible.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.pending.len() {
            let rest = &self.pending[pos..];

            if self.in_paste {
                let Some(end) = find(rest, PASTE_CLOSE) else {
                    break;
                };
                events.push(Event::Paste(String::from_utf8_lossy(&rest[..end]).into_owned()));
                pos += end + PASTE_CLOSE.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_OPEN) {
                self.in_paste = true;
                pos += PASTE_OPEN.len();
                continue;
            }
            // `ESC [ 2 0` could still become a paste opener.
            if rest.len() < PASTE_OPEN.len() && rest.len() > 2 && PASTE_OPEN.starts_with(rest) {
                break;
            }

            match decode(rest) {
                Step::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Step::NeedMore => break,
                Step::Skip(n) => pos += n,
            }
        }

        self.pending.drain(..pos);
        events
    }

    /// Whether undecoded bytes are waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Give up waiting on the buffered bytes and emit them as individual
    /// keys. An unfinished paste is delivered as-is.
    pub fn flush(&mut self) -> Vec<Event> {
        let bytes = std::mem::take(&mut self.pending);
        if self.in_paste {
            self.in_paste = false;
            return vec![Event::Paste(String::from_utf8_lossy(&bytes).into_owned())];
        }
        bytes
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(char::from(b)))),
                0x7F => Some(KeyEvent::plain(KeyCode::Backspace)),
                _ => control_key(b),
            })
            .map(Event::Key)
            .collect()
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Outcome of decoding at the head of the buffer.
enum Step {
    /// An event and the number of bytes it used.
    Event(Event, usize),
    /// The head is a valid prefix; wait for more input.
    NeedMore,
    /// Unrecognised; drop this many bytes.
    Skip(usize),
}

fn key(code: KeyCode, modifiers: Modifiers, used: usize) -> Step {
    Step::Event(Event::Key(KeyEvent::new(code, modifiers)), used)
}

fn decode(buf: &[u8]) -> Step {
    let Some(&first) = buf.first() else {
        return Step::Skip(0);
    };
    match first {
        0x1B => decode_escape(buf),
        0x20..=0x7E => key(KeyCode::Char(char::from(first)), Modifiers::empty(), 1),
        0x80..=0xFF => decode_utf8(buf),
        _ => control_key(first).map_or(Step::Skip(1), |k| Step::Event(Event::Key(k), 1)),
    }
}

/// Single-byte C0 controls and DEL.
fn control_key(b: u8) -> Option<KeyEvent> {
    let k = match b {
        0x0D | 0x0A => KeyEvent::plain(KeyCode::Enter),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x00 => KeyEvent::new(KeyCode::Char(' '), Modifiers::CTRL),
        0x01..=0x1A => KeyEvent::new(KeyCode::Char(char::from(b - 1 + b'a')), Modifiers::CTRL),
        _ => return None,
    };
    Some(k)
}

fn decode_escape(buf: &[u8]) -> Step {
    let Some(&second) = buf.get(1) else {
        return Step::NeedMore;
    };
    match second {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        0x0D | 0x0A => key(KeyCode::Enter, Modifiers::ALT, 2),
        0x7F => key(KeyCode::Backspace, Modifiers::ALT, 2),
        0x1B => key(KeyCode::Escape, Modifiers::ALT, 2),
        0x20..=0x7E => key(KeyCode::Char(char::from(second)), Modifiers::ALT, 2),
        0x01..=0x1A => match control_key(second) {
            Some(k) => key(k.code, k.modifiers | Modifiers::ALT, 2),
            None => Step::Skip(2),
        },
        _ => key(KeyCode::Escape, Modifiers::empty(), 1),
    }
}

fn decode_ss3(buf: &[u8]) -> Step {
    let Some(&last) = buf.get(2) else {
        return Step::NeedMore;
    };
    let code = match last {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'M' => KeyCode::Enter,
        _ => return Step::Skip(3),
    };
    key(code, Modifiers::empty(), 3)
}

fn decode_csi(buf: &[u8]) -> Step {
    // Parameters and intermediates run up to a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Step::NeedMore;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Step::Skip(end + 1);
        }
        end += 1;
    }

    let used = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => KeyCode::BackTab,
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Step::Skip(used),
        },
        b'u' => {
            let Some(code) = params.first().and_then(|&cp| kitty_key(cp)) else {
                return Step::Skip(used);
            };
            code
        }
        _ => return Step::Skip(used),
    };
    key(code, modifiers, used)
}

/// Key identity for a kitty CSI-u codepoint.
fn kitty_key(cp: u32) -> Option<KeyCode> {
    Some(match cp {
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        27 | 57344 => KeyCode::Escape,
        127 | 8 | 57347 => KeyCode::Backspace,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        // Remaining private-use codepoints are keys we do not bind.
        57344..=63743 => return None,
        _ => KeyCode::Char(char::from_u32(cp)?),
    })
}

fn decode_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Step::Skip(1),
    };
    if buf.len() < len {
        return if buf[1..].iter().all(|b| b & 0xC0 == 0x80) {
            Step::NeedMore
        } else {
            Step::Skip(1)
        };
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => key(KeyCode::Char(ch), Modifiers::empty(), len),
        None => Step::Skip(1),
    }
}

/// Semicolon-separated numeric parameters. Kitty's `:`-separated
/// sub-parameters (event types, alternate keys) are ignored.
fn parse_params(raw: &[u8]) -> Vec<u32> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u32, |acc, &d| {
                    acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
                })
        })
        .collect()
}

/// Wire modifier parameter (`1 + bits`) to flags.
fn decode_modifiers(param: u32) -> Modifiers {
    let bits = param.saturating_sub(1) & 0xFF;
    Modifiers::from_bits_truncate(u8::try_from(bits).unwrap_or(0))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

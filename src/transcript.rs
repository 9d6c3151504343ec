// SPDX-License-Identifier: MIT
//
// The conversation as shown on screen.
//
// Entries are kept as plain text and wrapped to the current width on every
// paint, so a resize never needs bookkeeping here. Scrolling is a row offset
// into the wrapped lines plus a `follow` flag: while following, the window
// sticks to the bottom as new text streams in; scrolling up releases it and
// scrolling back down to the end picks it up again.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB: &str = "    ";

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Where an assistant response stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    Streaming,
    Complete,
    /// The stream ended before the server said it was done.
    Incomplete,
    /// Cancelled from the keyboard.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    User(String),
    Assistant { text: String, state: ResponseState },
    Error(String),
}

// ─── Lines ───────────────────────────────────────────────────────────────────

/// How a wrapped line is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    UserLabel,
    User,
    AssistantLabel,
    Assistant,
    /// Text of an incomplete or cancelled response.
    Partial,
    Error,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

// ─── Transcript ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<Entry>,
    offset: usize,
    follow: bool,
}

impl Transcript {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            offset: 0,
            follow: true,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::User(text.into()));
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::Error(text.into()));
    }

    /// Open an empty streaming response.
    pub fn begin_response(&mut self) {
        self.entries.push(Entry::Assistant {
            text: String::new(),
            state: ResponseState::Streaming,
        });
    }

    /// Append to the streaming response. Ignored when nothing is streaming.
    pub fn append_fragment(&mut self, fragment: &str) {
        if let Some(Entry::Assistant {
            text,
            state: ResponseState::Streaming,
        }) = self.entries.last_mut()
        {
            text.push_str(fragment);
        }
    }

    /// Close the streaming response as `state`. When `text` is given it
    /// replaces what was streamed.
    pub fn finish_response(&mut self, state: ResponseState, text: Option<String>) {
        if let Some(Entry::Assistant {
            text: current,
            state: current_state @ ResponseState::Streaming,
        }) = self.entries.last_mut()
        {
            *current_state = state;
            if let Some(text) = text {
                *current = text;
            }
        }
    }

    /// The request behind the streaming response failed. An empty response
    /// is removed; one that already has text is kept as incomplete.
    pub fn abandon_response(&mut self) {
        let Some(Entry::Assistant {
            text,
            state: state @ ResponseState::Streaming,
        }) = self.entries.last_mut()
        else {
            return;
        };
        if text.is_empty() {
            self.entries.pop();
        } else {
            *state = ResponseState::Incomplete;
        }
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(
            self.entries.last(),
            Some(Entry::Assistant {
                state: ResponseState::Streaming,
                ..
            })
        )
    }

    #[must_use]
    pub const fn is_following(&self) -> bool {
        self.follow
    }

    /// Every entry wrapped to `width` columns.
    #[must_use]
    pub fn lines(&self, width: usize) -> Vec<Line> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            match entry {
                Entry::User(text) => {
                    lines.push(Line::new("You", LineKind::UserLabel));
                    push_wrapped(&mut lines, text, width, LineKind::User);
                }
                Entry::Assistant { text, state } => {
                    let (label, kind) = match state {
                        ResponseState::Streaming => ("Assistant …", LineKind::Assistant),
                        ResponseState::Complete => ("Assistant", LineKind::Assistant),
                        ResponseState::Incomplete => ("Assistant (incomplete)", LineKind::Partial),
                        ResponseState::Cancelled => ("Assistant (cancelled)", LineKind::Partial),
                    };
                    lines.push(Line::new(label, LineKind::AssistantLabel));
                    if !text.is_empty() {
                        push_wrapped(&mut lines, text, width, kind);
                    }
                }
                Entry::Error(text) => {
                    push_wrapped(&mut lines, &format!("error: {text}"), width, LineKind::Error);
                }
            }
            lines.push(Line::new("", LineKind::Blank));
        }
        lines
    }

    /// The `height` lines currently in view.
    #[must_use]
    pub fn window(&self, width: usize, height: usize) -> Vec<Line> {
        let lines = self.lines(width);
        let start = self.start(lines.len(), height);
        lines.into_iter().skip(start).take(height).collect()
    }

    /// Scroll position as `(first visible row, total rows)`.
    #[must_use]
    pub fn position(&self, width: usize, height: usize) -> (usize, usize) {
        let total = self.lines(width).len();
        (self.start(total, height), total)
    }

    pub fn scroll_up(&mut self, rows: usize, width: usize, height: usize) {
        let total = self.lines(width).len();
        self.offset = self.start(total, height).saturating_sub(rows);
        self.follow = self.offset >= total.saturating_sub(height);
    }

    pub fn scroll_down(&mut self, rows: usize, width: usize, height: usize) {
        let total = self.lines(width).len();
        let max = total.saturating_sub(height);
        self.offset = self.start(total, height).saturating_add(rows).min(max);
        self.follow = self.offset >= max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    fn start(&self, total: usize, height: usize) -> usize {
        let max = total.saturating_sub(height);
        if self.follow { max } else { self.offset.min(max) }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, width: usize, kind: LineKind) {
    lines.extend(wrap(text, width).into_iter().map(|row| Line::new(row, kind)));
}

// ─── Wrapping ────────────────────────────────────────────────────────────────

/// Word-wrap `text` to `width` display columns. Existing line breaks are
/// kept, breaks fall between words, and a word wider than a whole row is
/// split between graphemes.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for paragraph in text.split('\n') {
        let clean: String = paragraph
            .trim_end_matches('\r')
            .chars()
            .flat_map(|ch| {
                let expanded = if ch == '\t' { TAB } else { "" };
                let keep = (!ch.is_control()).then_some(ch);
                expanded.chars().chain(keep)
            })
            .collect();
        wrap_paragraph(&clean, width, &mut rows);
    }
    rows
}

fn wrap_paragraph(paragraph: &str, width: usize, rows: &mut Vec<String>) {
    let mut row = String::new();
    let mut used = 0;
    // Set right after a wrap so the whitespace that caused it is dropped.
    let mut fresh = false;

    for token in paragraph.split_word_bounds() {
        let w = token.width();
        let blank = token.chars().all(char::is_whitespace);

        if blank {
            if fresh {
                continue;
            }
            if used + w <= width {
                row.push_str(token);
                used += w;
            } else {
                rows.push(std::mem::take(&mut row).trim_end().to_owned());
                used = 0;
                fresh = true;
            }
            continue;
        }
        fresh = false;

        if used + w <= width {
            row.push_str(token);
            used += w;
        } else if w <= width {
            rows.push(std::mem::take(&mut row).trim_end().to_owned());
            row.push_str(token);
            used = w;
        } else {
            if used > 0 {
                rows.push(std::mem::take(&mut row).trim_end().to_owned());
                used = 0;
            }
            for grapheme in token.graphemes(true) {
                let gw = grapheme.width();
                if used > 0 && used + gw > width {
                    rows.push(std::mem::take(&mut row));
                    used = 0;
                }
                row.push_str(grapheme);
                used += gw;
            }
        }
    }

    if !(fresh && row.is_empty()) {
        rows.push(row.trim_end().to_owned());
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

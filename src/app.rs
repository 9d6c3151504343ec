// SPDX-License-Identifier: MIT
//
// The chat screen.
//
// `ChatState` is a reducer: every input, resize and stream event comes in as
// a `Msg`, mutates the state, and returns the `Effect`s the outside world has
// to carry out. It never touches the network or the terminal, which keeps
// the whole interaction testable. `ChatApp` is the shell around it that
// implements the event loop's `App` trait, owns the generation session and
// runs the effects.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ header: title, model         │  1 row
//   ├──────────────────────────────┤
//   │ transcript                   │  the rest
//   ├── key hints ─────────────────┤  1 row
//   │ > compose area               │  --prompt-height rows
//   ├──────────────────────────────┤
//   │ message line                 │  1 row
//   └──────────────────────────────┘

use quill_editor::{Composer, InputEvent, ViewRenderer};
use quill_llm::{Exchange, Generation, Session, StreamEvent};
use quill_term::ansi::CursorShape;
use quill_term::event_loop::{Action, App};
use quill_term::frame::{FrameBuffer, string_width};
use quill_term::input::{Event, KeyEvent};
use quill_term::style::{Attr, Style};
use quill_term::terminal::Size;
use quill_theme::Theme;
use tracing::{debug, info, warn};

use crate::keymap::{self, Focus, KeyAction};
use crate::transcript::{LineKind, ResponseState, Transcript};

const TITLE: &str = " quill ";

/// Columns taken by the `> ` in front of the compose area.
const GUTTER: u16 = 2;

const HINTS: &str = " Alt+Enter send · Esc cancel/focus · PgUp/PgDn scroll · Ctrl+C quit ";

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Row assignments for one terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub transcript_top: u16,
    pub transcript_height: u16,
    pub separator: u16,
    pub compose_top: u16,
    pub compose_height: u16,
    pub status: u16,
}

impl Layout {
    #[must_use]
    pub fn new(size: Size, prompt_height: u16) -> Self {
        let fixed = 3;
        let compose_height = prompt_height.min(size.rows.saturating_sub(fixed)).max(1);
        let transcript_height = size.rows.saturating_sub(fixed.saturating_add(compose_height));
        let separator = 1 + transcript_height;
        let compose_top = separator + 1;
        Self {
            width: size.cols,
            transcript_top: 1,
            transcript_height,
            separator,
            compose_top,
            compose_height,
            status: compose_top + compose_height,
        }
    }

    /// Wrap width of the compose buffer, in code points. One column is kept
    /// free for the cursor when it sits past the last character.
    #[must_use]
    pub fn compose_width(&self) -> usize {
        usize::from(self.width.saturating_sub(GUTTER + 1)).max(1)
    }

    /// Transcript text width, one column of margin each side.
    #[must_use]
    pub fn transcript_width(&self) -> usize {
        usize::from(self.width.saturating_sub(2)).max(1)
    }
}

// ─── Messages and effects ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Paste(String),
    Resize(Size),
    Stream(StreamEvent),
}

/// Work the shell has to do on the state's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartGeneration(String),
    CancelGeneration,
    /// A response finished; the session should remember the exchange.
    Record(Exchange),
    Quit,
}

/// One line of feedback on the message row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub error: bool,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: true,
        }
    }
}

// ─── ChatState ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatState {
    model: String,
    prompt_height: u16,
    size: Size,
    composer: Composer,
    transcript: Transcript,
    focus: Focus,
    generating: bool,
    notice: Option<Notice>,
}

impl ChatState {
    #[must_use]
    pub fn new(model: impl Into<String>, prompt_height: u16, size: Size) -> Self {
        let layout = Layout::new(size, prompt_height);
        Self {
            model: model.into(),
            prompt_height,
            size,
            composer: Composer::new(layout.compose_width(), usize::from(layout.compose_height)),
            transcript: Transcript::new(),
            focus: Focus::Compose,
            generating: false,
            notice: None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::new(self.size, self.prompt_height)
    }

    #[must_use]
    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub const fn is_generating(&self) -> bool {
        self.generating
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) => self.on_key(key),
            Msg::Paste(text) => {
                self.focus = Focus::Compose;
                self.composer.apply(InputEvent::InsertText(text));
                Vec::new()
            }
            Msg::Resize(size) => {
                self.size = size;
                let layout = self.layout();
                self.composer.apply(InputEvent::Resize {
                    width: layout.compose_width(),
                    height: usize::from(layout.compose_height),
                });
                Vec::new()
            }
            Msg::Stream(event) => self.on_stream(event),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(action) = keymap::resolve(key, self.focus) else {
            return Vec::new();
        };
        if !matches!(action, KeyAction::Submit) {
            self.notice = self.notice.take().filter(|notice| notice.error);
        }

        let layout = self.layout();
        let width = layout.transcript_width();
        let height = usize::from(layout.transcript_height);
        let page = height.saturating_sub(1).max(1);

        match action {
            KeyAction::Quit => return vec![Effect::Quit],
            KeyAction::Submit => return self.submit(),
            KeyAction::Escape => return self.escape(),
            KeyAction::Edit(event) => {
                self.notice = None;
                self.composer.apply(event);
            }
            KeyAction::ScrollUp => self.transcript.scroll_up(1, width, height),
            KeyAction::ScrollDown => self.transcript.scroll_down(1, width, height),
            KeyAction::PageUp => self.transcript.scroll_up(page, width, height),
            KeyAction::PageDown => self.transcript.scroll_down(page, width, height),
            KeyAction::FocusCompose => self.focus = Focus::Compose,
        }
        Vec::new()
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.generating {
            self.notice = Some(Notice::info(
                "a response is still streaming; press Esc to cancel it",
            ));
            return Vec::new();
        }
        if self.composer.buffer().contents().trim().is_empty() {
            return Vec::new();
        }
        let Some(prompt) = self.composer.apply(InputEvent::Submit) else {
            return Vec::new();
        };

        info!(chars = prompt.chars().count(), "submitting prompt");
        self.transcript.push_user(prompt.clone());
        self.transcript.begin_response();
        self.transcript.scroll_to_bottom();
        self.generating = true;
        self.focus = Focus::Compose;
        self.notice = None;
        vec![Effect::StartGeneration(prompt)]
    }

    fn escape(&mut self) -> Vec<Effect> {
        if self.generating {
            info!("cancelling generation");
            self.transcript
                .finish_response(ResponseState::Cancelled, None);
            self.generating = false;
            self.notice = Some(Notice::info("cancelled"));
            return vec![Effect::CancelGeneration];
        }
        self.focus = match self.focus {
            Focus::Compose => Focus::Transcript,
            Focus::Transcript => Focus::Compose,
        };
        Vec::new()
    }

    fn on_stream(&mut self, event: StreamEvent) -> Vec<Effect> {
        if !self.generating {
            debug!(?event, "stream event after the generation ended");
            return Vec::new();
        }
        match event {
            StreamEvent::Fragment(text) => {
                self.transcript.append_fragment(&text);
                Vec::new()
            }
            StreamEvent::Finished(exchange) => {
                self.generating = false;
                self.transcript
                    .finish_response(ResponseState::Complete, Some(exchange.response.clone()));
                vec![Effect::Record(exchange)]
            }
            StreamEvent::Incomplete { partial } => {
                self.generating = false;
                warn!(chars = partial.chars().count(), "response ended early");
                self.transcript
                    .finish_response(ResponseState::Incomplete, Some(partial));
                self.notice = Some(Notice::error(
                    "the response ended before the model finished",
                ));
                Vec::new()
            }
            StreamEvent::Failed(err) => {
                self.generating = false;
                warn!(error = %err, "generation failed");
                self.transcript.abandon_response();
                self.transcript.push_error(err.to_string());
                self.notice = Some(Notice::error(err.to_string()));
                Vec::new()
            }
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Draw the whole screen. Returns the hardware cursor position when the
    /// compose area has focus and its cursor is visible.
    pub fn paint(
        &self,
        frame: &mut FrameBuffer,
        theme: &Theme,
        renderer: &ViewRenderer,
    ) -> Option<(u16, u16)> {
        let layout = self.layout();
        self.paint_header(frame, theme, layout);
        self.paint_transcript(frame, theme, layout);
        paint_separator(frame, theme, layout);
        let cursor = self.paint_compose(frame, theme, renderer, layout);
        self.paint_status(frame, theme, layout);
        cursor
    }

    fn paint_header(&self, frame: &mut FrameBuffer, theme: &Theme, layout: Layout) {
        let style = theme.header.style();
        let width = layout.width;
        frame.fill(0, 0, width, style);

        let mut x = frame.paint_text(0, 0, TITLE, style.with_attrs(Attr::BOLD), width);
        x += frame.paint_text(x, 0, &format!("· {}", self.model), style, width.saturating_sub(x));

        if self.generating {
            let busy = "streaming… ";
            let busy_width = u16::try_from(string_width(busy)).unwrap_or(u16::MAX);
            let right = width.saturating_sub(busy_width);
            if right > x {
                frame.paint_text(right, 0, busy, style, busy_width);
            }
        }
    }

    fn paint_transcript(&self, frame: &mut FrameBuffer, theme: &Theme, layout: Layout) {
        let normal = theme.normal.style();
        for dy in 0..layout.transcript_height {
            frame.fill(0, layout.transcript_top + dy, layout.width, normal);
        }

        let lines = self
            .transcript
            .window(layout.transcript_width(), usize::from(layout.transcript_height));
        let text_width = layout.width.saturating_sub(2);
        for (dy, line) in (0..layout.transcript_height).zip(&lines) {
            let style = line_style(theme, line.kind);
            frame.paint_text(1, layout.transcript_top + dy, &line.text, style, text_width);
        }
    }

    fn paint_compose(
        &self,
        frame: &mut FrameBuffer,
        theme: &Theme,
        renderer: &ViewRenderer,
        layout: Layout,
    ) -> Option<(u16, u16)> {
        let normal = theme.normal.style();
        for dy in 0..layout.compose_height {
            frame.fill(0, layout.compose_top + dy, GUTTER, normal);
        }
        let prefix = match self.focus {
            Focus::Compose => theme.prompt_prefix.style(),
            Focus::Transcript => theme.border.style(),
        };
        frame.paint_text(0, layout.compose_top, "> ", prefix, GUTTER);

        let area_width = layout.width.saturating_sub(GUTTER);
        let view = self.composer.render(renderer);
        view.paint(frame, GUTTER, layout.compose_top, area_width, layout.compose_height);

        if self.focus != Focus::Compose || area_width == 0 {
            return None;
        }
        let (col, row) = view.cursor?;
        let col = u16::try_from(col).unwrap_or(u16::MAX).min(area_width - 1);
        let row = u16::try_from(row).ok()?;
        (row < layout.compose_height).then_some((GUTTER + col, layout.compose_top + row))
    }

    fn paint_status(&self, frame: &mut FrameBuffer, theme: &Theme, layout: Layout) {
        let style = theme.status.style();
        frame.fill(0, layout.status, layout.width, style);

        let (text, style) = match &self.notice {
            Some(notice) if notice.error => (notice.text.clone(), theme.error.style()),
            Some(notice) => (notice.text.clone(), style),
            None => (self.idle_status(layout), style),
        };
        frame.paint_text(1, layout.status, &text, style, layout.width.saturating_sub(1));
    }

    fn idle_status(&self, layout: Layout) -> String {
        let mut parts = Vec::new();
        if self.focus == Focus::Transcript {
            parts.push("transcript: ↑/↓ scroll, Enter to type".to_owned());
        }
        if !self.transcript.is_following() {
            let height = usize::from(layout.transcript_height);
            let (start, total) = self
                .transcript
                .position(layout.transcript_width(), height);
            parts.push(format!(
                "lines {}-{} of {total}",
                start + 1,
                (start + height).min(total)
            ));
        }
        parts.join("  ")
    }
}

fn paint_separator(frame: &mut FrameBuffer, theme: &Theme, layout: Layout) {
    let rule = "─".repeat(usize::from(layout.width));
    frame.paint_text(0, layout.separator, &rule, theme.border.style(), layout.width);
    frame.paint_text(
        1,
        layout.separator,
        HINTS,
        theme.hint.style(),
        layout.width.saturating_sub(2),
    );
}

fn line_style(theme: &Theme, kind: LineKind) -> Style {
    match kind {
        LineKind::UserLabel => theme.user.style().with_attrs(Attr::BOLD),
        LineKind::User => theme.user.style(),
        LineKind::AssistantLabel => theme.assistant.style().with_attrs(Attr::BOLD),
        LineKind::Assistant => theme.assistant.style(),
        LineKind::Partial => theme.incomplete.style(),
        LineKind::Error => theme.error.style(),
        LineKind::Blank => theme.normal.style(),
    }
}

// ─── ChatApp ─────────────────────────────────────────────────────────────────

/// The state plus everything with side effects: the session, the running
/// generation and the theme.
pub struct ChatApp {
    state: ChatState,
    session: Session,
    generation: Option<Generation>,
    theme: Theme,
    renderer: ViewRenderer,
    cursor: Option<(u16, u16)>,
}

impl ChatApp {
    #[must_use]
    pub fn new(session: Session, theme: Theme, prompt_height: u16, size: Size) -> Self {
        let state = ChatState::new(session.model(), prompt_height, size);
        let renderer = ViewRenderer::new(&theme);
        Self {
            state,
            session,
            generation: None,
            theme,
            renderer,
            cursor: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Action {
        let effects = self.state.update(msg);
        self.run(effects)
    }

    fn run(&mut self, effects: Vec<Effect>) -> Action {
        for effect in effects {
            match effect {
                Effect::StartGeneration(prompt) => {
                    self.generation = Some(self.session.start(&prompt));
                }
                Effect::CancelGeneration => self.generation = None,
                Effect::Record(exchange) => self.session.record(exchange),
                Effect::Quit => return Action::Quit,
            }
        }
        Action::Continue
    }
}

impl App for ChatApp {
    fn on_event(&mut self, event: &Event) -> Action {
        let msg = match event {
            Event::Key(key) => Msg::Key(*key),
            Event::Paste(text) => Msg::Paste(text.clone()),
        };
        self.dispatch(msg)
    }

    fn on_resize(&mut self, size: Size) {
        self.dispatch(Msg::Resize(size));
    }

    fn on_tick(&mut self) -> bool {
        let mut changed = false;
        while let Some(generation) = self.generation.as_mut() {
            let Some(event) = generation.try_next() else {
                break;
            };
            if generation.is_settled() {
                self.generation = None;
            }
            self.dispatch(Msg::Stream(event));
            changed = true;
        }
        changed
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        self.cursor = self.state.paint(frame, &self.theme, &self.renderer);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor.map(|(x, y)| (x, y, CursorShape::SteadyBar))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

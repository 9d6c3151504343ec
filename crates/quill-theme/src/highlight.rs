//! Named highlight groups and the [`Theme`] that bundles them.

use quill_term::style::{Attr, CellColor, Style};

// ---------------------------------------------------------------------------
// HighlightGroup
// ---------------------------------------------------------------------------

/// The style of one kind of screen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightGroup {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl HighlightGroup {
    #[must_use]
    pub const fn fg_only(fg: CellColor) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    #[must_use]
    pub const fn fg_attrs(fg: CellColor, attrs: Attr) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs,
        }
    }

    #[must_use]
    pub const fn fg_bg(fg: CellColor, bg: CellColor) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    /// Attributes only, terminal default colors.
    #[must_use]
    pub const fn attrs_only(attrs: Attr) -> Self {
        Self {
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs,
        }
    }

    /// The cell style this group paints with.
    #[must_use]
    pub const fn style(self) -> Style {
        Style::new(self.fg, self.bg, self.attrs)
    }
}

impl From<HighlightGroup> for Style {
    fn from(group: HighlightGroup) -> Self {
        group.style()
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Every style the chat screen uses, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,

    /// Body text, including the compose area.
    pub normal: HighlightGroup,
    /// The header row.
    pub header: HighlightGroup,
    /// Separator rules between panes.
    pub border: HighlightGroup,
    /// Key hints drawn on the separator.
    pub hint: HighlightGroup,
    /// The `> ` gutter in front of the compose area.
    pub prompt_prefix: HighlightGroup,
    /// Label and text of the user's turns in the transcript.
    pub user: HighlightGroup,
    /// Label and text of the model's turns.
    pub assistant: HighlightGroup,
    /// A response that was cut short.
    pub incomplete: HighlightGroup,
    /// Error entries and error messages.
    pub error: HighlightGroup,
    /// The message line at the bottom.
    pub status: HighlightGroup,
    /// The glyph under the edit cursor.
    pub cursor: HighlightGroup,
}

impl Theme {
    /// Uses only the terminal's own palette and defaults, so it follows the
    /// user's color scheme.
    #[must_use]
    pub fn terminal() -> Self {
        use CellColor::{Ansi256, Default};

        Self {
            name: "terminal".to_string(),
            normal: HighlightGroup::default(),
            header: HighlightGroup::attrs_only(Attr::BOLD.union(Attr::INVERSE)),
            border: HighlightGroup::fg_attrs(Ansi256(8), Attr::empty()),
            hint: HighlightGroup::fg_attrs(Ansi256(8), Attr::ITALIC),
            prompt_prefix: HighlightGroup::fg_attrs(Ansi256(4), Attr::BOLD),
            user: HighlightGroup::fg_attrs(Ansi256(6), Attr::empty()),
            assistant: HighlightGroup::fg_only(Default),
            incomplete: HighlightGroup::fg_attrs(Default, Attr::DIM),
            error: HighlightGroup::fg_attrs(Ansi256(1), Attr::BOLD),
            status: HighlightGroup::fg_attrs(Default, Attr::DIM),
            cursor: HighlightGroup::attrs_only(Attr::INVERSE),
        }
    }

    /// No color at all; roles are told apart by attributes.
    #[must_use]
    pub fn mono() -> Self {
        Self {
            name: "mono".to_string(),
            normal: HighlightGroup::default(),
            header: HighlightGroup::attrs_only(Attr::INVERSE),
            border: HighlightGroup::attrs_only(Attr::DIM),
            hint: HighlightGroup::attrs_only(Attr::DIM),
            prompt_prefix: HighlightGroup::attrs_only(Attr::BOLD),
            user: HighlightGroup::attrs_only(Attr::BOLD),
            assistant: HighlightGroup::default(),
            incomplete: HighlightGroup::attrs_only(Attr::DIM.union(Attr::ITALIC)),
            error: HighlightGroup::attrs_only(Attr::BOLD.union(Attr::UNDERLINE)),
            status: HighlightGroup::attrs_only(Attr::DIM),
            cursor: HighlightGroup::attrs_only(Attr::INVERSE),
        }
    }

    /// A truecolor theme from a handful of hex colors. `bg` fills the body;
    /// `accent` marks the user's turns and the prompt gutter.
    ///
    /// Returns `None` when a color fails to parse.
    #[must_use]
    pub fn from_hex(
        name: &str,
        fg: &str,
        bg: &str,
        muted: &str,
        accent: &str,
        alert: &str,
    ) -> Option<Self> {
        let fg = CellColor::from_hex(fg)?;
        let bg = CellColor::from_hex(bg)?;
        let muted = CellColor::from_hex(muted)?;
        let accent = CellColor::from_hex(accent)?;
        let alert = CellColor::from_hex(alert)?;

        let on_bg = |fg: CellColor, attrs: Attr| HighlightGroup { fg, bg, attrs };

        Some(Self {
            name: name.to_string(),
            normal: on_bg(fg, Attr::empty()),
            header: HighlightGroup {
                fg: bg,
                bg: accent,
                attrs: Attr::BOLD,
            },
            border: on_bg(muted, Attr::empty()),
            hint: on_bg(muted, Attr::ITALIC),
            prompt_prefix: on_bg(accent, Attr::BOLD),
            user: on_bg(accent, Attr::empty()),
            assistant: on_bg(fg, Attr::empty()),
            incomplete: on_bg(muted, Attr::empty()),
            error: on_bg(alert, Attr::BOLD),
            status: on_bg(muted, Attr::empty()),
            cursor: HighlightGroup::fg_bg(bg, fg),
        })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_converts_to_style() {
        let group = HighlightGroup::fg_attrs(CellColor::Ansi256(2), Attr::BOLD);
        let style: Style = group.into();
        assert_eq!(style.fg, CellColor::Ansi256(2));
        assert_eq!(style.bg, CellColor::Default);
        assert!(style.attrs.contains(Attr::BOLD));
    }

    #[test]
    fn terminal_theme_uses_no_truecolor() {
        let t = Theme::terminal();
        for group in [t.normal, t.header, t.border, t.user, t.assistant, t.error, t.cursor] {
            assert!(!matches!(group.fg, CellColor::Rgb(..)));
            assert!(!matches!(group.bg, CellColor::Rgb(..)));
        }
    }

    #[test]
    fn cursor_is_visible_in_every_builtin_without_color() {
        assert!(Theme::terminal().cursor.attrs.contains(Attr::INVERSE));
        assert!(Theme::mono().cursor.attrs.contains(Attr::INVERSE));
    }

    #[test]
    fn from_hex_fills_background() {
        let t = Theme::from_hex("t", "#eeeeee", "#101010", "#777777", "#33aaff", "#ff3333").unwrap();
        assert_eq!(t.normal.bg, CellColor::Rgb(0x10, 0x10, 0x10));
        assert_eq!(t.user.fg, CellColor::Rgb(0x33, 0xaa, 0xff));
        assert_eq!(t.cursor.fg, t.normal.bg);
    }

    #[test]
    fn from_hex_rejects_bad_color() {
        assert!(Theme::from_hex("t", "#eee", "#101010", "#777777", "#33aaff", "#ff3333").is_none());
    }

    #[test]
    fn default_is_terminal() {
        assert_eq!(Theme::default().name, "terminal");
    }
}

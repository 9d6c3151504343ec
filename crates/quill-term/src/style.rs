// SPDX-License-Identifier: MIT
//
// Cell styling: colors, text attributes and the `Style` bundle.
//
// Everything here is already terminal-ready: a `CellColor` maps one-to-one
// onto an SGR color parameter and `Attr` onto SGR attribute codes. Themes
// resolve their colors into these types once, so painting a frame never
// does color work beyond copying a few bytes.

use std::fmt;

// ─── CellColor ───────────────────────────────────────────────────────────────

/// A color as the terminal understands it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit truecolor.
    Rgb(u8, u8, u8),
    /// Index into the 256-color palette. 0–15 are the user's ANSI colors.
    Ansi256(u8),
    /// Whatever the terminal's configured default is.
    #[default]
    Default,
}

impl CellColor {
    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// SGR text attributes.
    ///
    /// ```
    /// use quill_term::style::Attr;
    ///
    /// let a = Attr::BOLD | Attr::INVERSE;
    /// assert!(a.contains(Attr::BOLD));
    /// assert!(!a.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1.
        const BOLD      = 1 << 0;
        /// SGR 2.
        const DIM       = 1 << 1;
        /// SGR 3.
        const ITALIC    = 1 << 2;
        /// SGR 4.
        const UNDERLINE = 1 << 3;
        /// SGR 7, swaps foreground and background.
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background and attributes applied to painted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[must_use]
    pub const fn new(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self { fg, bg, attrs }
    }

    #[must_use]
    pub const fn fg(fg: CellColor) -> Self {
        Self {
            fg,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Same colors with `extra` attributes added.
    #[must_use]
    pub const fn with_attrs(self, extra: Attr) -> Self {
        Self {
            attrs: self.attrs.union(extra),
            ..self
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

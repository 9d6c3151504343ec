//! Named preset themes.

use crate::highlight::Theme;

/// Look up a preset by name.
#[must_use]
pub fn builtin_theme(name: &str) -> Option<Theme> {
    match name {
        "terminal" | "default" => Some(Theme::terminal()),
        "mono" => Some(Theme::mono()),
        "dusk" => Theme::from_hex("dusk", "#d8d4e8", "#1b1a26", "#6e6a86", "#9ccfd8", "#eb6f92"),
        "paper" => Theme::from_hex("paper", "#2b2b2b", "#f7f3e8", "#8a8580", "#2f6f9f", "#b3261e"),
        "forest" => Theme::from_hex("forest", "#d3c6aa", "#232a2e", "#7a8478", "#a7c080", "#e67e80"),
        _ => None,
    }
}

/// Names accepted by [`builtin_theme`].
#[must_use]
pub const fn builtin_names() -> &'static [&'static str] {
    &["terminal", "default", "mono", "dusk", "paper", "forest"]
}

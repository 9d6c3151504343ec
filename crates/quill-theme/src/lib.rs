//! # quill-theme
//!
//! Styles for every element of the chat screen, grouped into a [`Theme`].
//! A theme is resolved once at startup and passed by value into whatever
//! paints; nothing here is global. Colors are stored as terminal-ready
//! [`quill_term::style::CellColor`] values, so painting never converts.

pub mod builtin;
pub mod highlight;

pub use builtin::{builtin_names, builtin_theme};
pub use highlight::{HighlightGroup, Theme};

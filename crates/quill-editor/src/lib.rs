//! # quill-editor: the compose area
//!
//! A line-oriented text store with an edit cursor that rewraps itself after
//! every mutation, independent of any rope or text engine.
//!
//! - **[`line`]**: `CodepointLine`, one terminator-free row of code points
//! - **[`position`]**: `Position` (row, col), 0-indexed
//! - **[`buffer`]**: `LineBuffer`, the rows, the cursor and the reflow engine
//! - **[`cursor`]**: `Motion`, cursor-only movement with row wrapping
//! - **[`viewport`]**: `Viewport`, the clamped scroll window
//! - **[`view`]**: `ViewRenderer`, buffer and viewport to styled rows
//! - **[`event`]**: `InputEvent` and the `Composer` that applies them

pub mod buffer;
pub mod cursor;
pub mod event;
pub mod line;
pub mod position;
pub mod view;
pub mod viewport;

pub use buffer::LineBuffer;
pub use cursor::Motion;
pub use event::{Composer, InputEvent};
pub use line::CodepointLine;
pub use position::Position;
pub use view::{RenderedView, ViewRenderer};
pub use viewport::Viewport;

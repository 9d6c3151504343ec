// SPDX-License-Identifier: MIT
//
// quill-term: the terminal layer under the quill chat client.
//
// Raw termios control, a byte-level input decoder, a cell framebuffer and
// a differential renderer that only rewrites the cells a frame changed.
// The event loop ties them together behind the `App` trait so the chat
// front end never touches escape sequences directly.
//
// No TUI framework sits underneath: terminal state is driven with ANSI
// sequences and libc calls owned by this crate.

pub mod ansi;
pub mod cell;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod render;
pub mod style;
pub mod terminal;

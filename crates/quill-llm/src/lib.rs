//! # quill-llm: everything between a submitted prompt and the model
//!
//! - **[`command`]**: the `@name(arg, ...)` scanner
//! - **[`embed`]**: byte splicing and command expansion (files, links, text)
//! - **[`history`]**: completed exchanges and prompt framing
//! - **[`session`]**: the streaming generation client and its worker thread
//! - **[`error`]**: typed failures for each stage

pub mod command;
pub mod embed;
pub mod error;
pub mod history;
pub mod session;

pub use command::{Command, parse_commands};
pub use embed::{CommandKind, HttpResolver, Resolver, expand_commands, splice};
pub use error::{ExpandError, SessionError, SpliceError};
pub use history::{Exchange, History};
pub use session::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, Generation, Session, SessionConfig, StreamEvent,
    StreamOutcome, decode_stream,
};

//! Failures for splicing, command expansion and generation.

use std::io;

use thiserror::Error;

/// A byte range that cannot be cut out of its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("range {start}..{end} is outside the {len}-byte input")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("range start {start} is past its end {end}")]
    Inverted { start: usize, end: usize },
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error(
        "invalid command {name:?}; accepted commands are: attach-file, file, attach-link, link, text"
    )]
    UnknownCommand { name: String },

    #[error("could not read {path:?}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("could not fetch {url:?}: {reason}")]
    FetchLink { url: String, reason: String },

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to execute prompt commands: {0}")]
    Expand(#[from] ExpandError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{model} is either not running or is not a valid model")]
    ModelUnavailable { model: String },

    #[error("generation server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not start generation worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("generation worker stopped without a result")]
    WorkerLost,
}

//! Command expansion: replacing each directive in a prompt with what it names.
//!
//! `@file(path, ...)` / `@attach-file(...)` embed file contents,
//! `@link(url, ...)` / `@attach-link(...)` embed fetched pages and
//! `@text(a, b)` embeds its own arguments. Every directive is resolved before
//! the prompt changes, and splices run from the last directive to the first so
//! the byte ranges of earlier ones stay valid. Any failure returns an error
//! and the caller keeps its original prompt.

use std::fs;
use std::ops::Range;

use reqwest::blocking::Client;
use tracing::debug;

use crate::command::{Command, parse_commands};
use crate::error::{ExpandError, SpliceError};

// ---------------------------------------------------------------------------
// Splice
// ---------------------------------------------------------------------------

/// `input` with `range` cut out and `replacement` put in its place.
///
/// An empty range returns `input` unchanged.
///
/// # Errors
///
/// The range is inverted or reaches past the end of `input`.
pub fn splice(
    input: &[u8],
    range: Range<usize>,
    replacement: &[u8],
) -> Result<Vec<u8>, SpliceError> {
    let Range { start, end } = range;
    if start > end {
        return Err(SpliceError::Inverted { start, end });
    }
    if end > input.len() {
        return Err(SpliceError::OutOfBounds {
            start,
            end,
            len: input.len(),
        });
    }
    if start == end {
        return Ok(input.to_vec());
    }

    let mut out = Vec::with_capacity(input.len() - (end - start) + replacement.len());
    out.extend_from_slice(&input[..start]);
    out.extend_from_slice(replacement);
    out.extend_from_slice(&input[end..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Command kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    File,
    Link,
    Text,
}

impl CommandKind {
    /// # Errors
    ///
    /// `name` is not one of the accepted command names.
    pub fn from_name(name: &str) -> Result<Self, ExpandError> {
        match name {
            "attach-file" | "file" => Ok(Self::File),
            "attach-link" | "link" => Ok(Self::Link),
            "text" => Ok(Self::Text),
            _ => Err(ExpandError::UnknownCommand {
                name: name.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Where file and link contents come from.
pub trait Resolver: Send + Sync {
    /// # Errors
    ///
    /// The file could not be read.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, ExpandError>;

    /// # Errors
    ///
    /// The request failed or came back with a non-success status.
    fn fetch_link(&self, url: &str) -> Result<Vec<u8>, ExpandError>;
}

/// Reads from the local filesystem and fetches links with HTTP GET.
#[derive(Debug, Clone, Default)]
pub struct HttpResolver {
    client: Client,
}

impl HttpResolver {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Resolver for HttpResolver {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, ExpandError> {
        fs::read(path).map_err(|source| ExpandError::ReadFile {
            path: path.to_owned(),
            source,
        })
    }

    fn fetch_link(&self, url: &str) -> Result<Vec<u8>, ExpandError> {
        let fail = |reason: String| ExpandError::FetchLink {
            url: url.to_owned(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| fail(err.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }
        let body = resp.bytes().map_err(|err| fail(err.to_string()))?;
        debug!(url, bytes = body.len(), "fetched link");
        Ok(body.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// `prompt` with every directive replaced by its expansion.
///
/// Names are validated before anything is read or fetched.
///
/// # Errors
///
/// An unknown command name, or a file or link that could not be resolved.
pub fn expand_commands(prompt: &str, resolver: &dyn Resolver) -> Result<String, ExpandError> {
    let commands = parse_commands(prompt);
    if commands.is_empty() {
        return Ok(prompt.to_owned());
    }
    let kinds = commands
        .iter()
        .map(|command| CommandKind::from_name(&command.name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut bytes = prompt.as_bytes().to_vec();
    for (command, kind) in commands.iter().zip(kinds).rev() {
        let Some(replacement) = expansion(command, kind, resolver)? else {
            continue;
        };
        bytes = splice(&bytes, command.range.clone(), &replacement)?;
    }
    debug!(
        commands = commands.len(),
        bytes = bytes.len(),
        "expanded prompt"
    );

    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()))
}

/// `None` leaves the directive's text in place.
fn expansion(
    command: &Command,
    kind: CommandKind,
    resolver: &dyn Resolver,
) -> Result<Option<Vec<u8>>, ExpandError> {
    match kind {
        CommandKind::Text => Ok(Some(command.arguments.join(", ").into_bytes())),
        _ if command.has_no_arguments() => {
            debug!(%command, "directive without arguments left as text");
            Ok(None)
        }
        CommandKind::File => {
            let parts = command
                .arguments
                .iter()
                .map(|path| -> Result<Vec<u8>, ExpandError> {
                    let contents = resolver.read_file(path)?;
                    Ok(wrap(&format!("<file name={path:?}>"), &contents, "</file>"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(parts.concat()))
        }
        CommandKind::Link => {
            let parts = command
                .arguments
                .iter()
                .map(|url| -> Result<Vec<u8>, ExpandError> {
                    let body = resolver.fetch_link(url)?;
                    Ok(wrap(&format!("<link url={url:?}>"), &body, "</link>"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(parts.concat()))
        }
    }
}

fn wrap(open: &str, body: &[u8], close: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(open.len() + body.len() + close.len() + 3);
    out.extend_from_slice(open.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(body);
    out.push(b'\n');
    out.extend_from_slice(close.as_bytes());
    out.push(b'\n');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// SPDX-License-Identifier: MIT
//
// Log setup.
//
// The terminal is in raw mode on the alternate screen for the whole run, so
// logs can only go to a file. Nothing is installed unless `--log-file` is
// given or `DEBUG` is set to something non-empty.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, anyhow};
use tracing_subscriber::EnvFilter;

/// Log file used when only `DEBUG` is set.
pub const DEFAULT_LOG_FILE: &str = "debug.log";

/// Filter directives, `RUST_LOG` style.
pub const FILTER_ENV: &str = "QUILL_LOG";

/// Install the file subscriber if logging is enabled. Returns the path being
/// written, if any.
///
/// # Errors
///
/// The log file could not be opened or a subscriber was already installed.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = destination(log_file, std::env::var_os("DEBUG")) else {
        return Ok(None);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("could not install logger: {err}"))?;

    Ok(Some(path))
}

fn destination(flag: Option<&Path>, debug_env: Option<OsString>) -> Option<PathBuf> {
    match flag {
        Some(path) => Some(path.to_path_buf()),
        None if debug_env.is_some_and(|value| !value.is_empty()) => {
            Some(PathBuf::from(DEFAULT_LOG_FILE))
        }
        None => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use quill_llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL, SessionConfig};
use quill_theme::{Theme, builtin_names, builtin_theme};

#[derive(Debug, Clone, Parser)]
#[command(name = "quill", version)]
#[command(about = "Chat with a locally served language model from the terminal", long_about = None)]
pub struct Config {
    /// Model name sent with every request.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Generation endpoint that accepts streaming requests.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Seconds to wait for the connection to the endpoint.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Limit on a whole request, streaming included. Unlimited by default.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Rows in the compose area.
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..))]
    pub prompt_height: u16,

    /// Color theme.
    #[arg(long, default_value = "terminal", value_parser = theme_name)]
    pub theme: String,

    /// Write debug logs to this file. Setting `DEBUG` logs to `debug.log`.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    /// The selected theme. Names are validated while parsing, so this only
    /// falls back to the terminal theme for configs built by hand.
    #[must_use]
    pub fn theme(&self) -> Theme {
        builtin_theme(&self.theme).unwrap_or_else(Theme::terminal)
    }
}

fn theme_name(name: &str) -> Result<String, String> {
    if builtin_theme(name).is_some() {
        Ok(name.to_owned())
    } else {
        Err(format!(
            "unknown theme; expected one of: {}",
            builtin_names().join(", ")
        ))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

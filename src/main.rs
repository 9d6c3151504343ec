// SPDX-License-Identifier: MIT
//
// quill: chat with a locally served language model from the terminal.
//
// This is the binary that wires the crates together:
//
//   quill-term   → terminal control, rendering, input parsing, event loop
//   quill-editor → the compose buffer, its cursor, viewport and view
//   quill-theme  → highlight groups and built-in themes
//   quill-llm    → @command expansion, history and the streaming session
//
// ChatApp implements quill-term's App trait. Each keypress flows through:
//
//   stdin → parser → on_event → keymap → ChatState::update → effects
//   worker → Generation → on_tick → ChatState::update → transcript
//   paint → framebuffer → diff renderer → terminal

mod app;
mod config;
mod keymap;
mod logging;
mod transcript;

use std::process;

use anyhow::Context;
use clap::Parser;
use quill_llm::Session;
use quill_term::event_loop::EventLoop;
use tracing::info;

use crate::app::ChatApp;
use crate::config::Config;

fn run() -> anyhow::Result<()> {
    let config = Config::parse();
    if let Some(path) = logging::init(config.log_file.as_deref())? {
        info!(path = %path.display(), "logging enabled");
    }

    let session = Session::new(config.session_config()).context("could not set up the HTTP client")?;
    info!(model = session.model(), endpoint = %config.endpoint, "starting");

    let mut event_loop = EventLoop::new();
    let mut app = ChatApp::new(session, config.theme(), config.prompt_height, event_loop.size());
    event_loop
        .run(&mut app)
        .context("terminal session failed")?;

    info!("exiting");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("quill: {err:#}");
        process::exit(1);
    }
}

//! Quote widget client — a CLI that stores quotes in a local JSON file,
//! shows a random quote filtered by category, adds/imports/exports quotes,
//! and reconciles the local collection with a mock remote source, either on
//! demand (`sync`) or on a fixed interval (`watch`).
//!
//! Usage examples:
//! ```bash
//! qotd_client show --category Motivation
//! qotd_client add --text "..." --category Life
//! qotd_client import --path ./more_quotes.json
//! qotd_client sync --policy remote-wins
//! qotd_client watch --interval-secs 30
//! ```
//!
//! The selected category filter is remembered across runs in a sibling state
//! file next to the store; the remote address defaults to a locally running
//! `qotd_server`.
#![warn(missing_docs)]
mod args;
mod remote;
mod sync;
mod widget;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use qotd_common::Result;
use qotd_common::net::{COMMAND_PORT, addr};
use qotd_common::store::{QuoteStore, WidgetState};

use crate::args::{Args, WidgetCommand};
use crate::remote::TcpRemote;

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let store_path = normalize_path(&args.store);
    let mut store = QuoteStore::open(&store_path)?;
    let mut state = WidgetState::open(state_path_for(&store_path))?;
    let server_ip = args.server_ip.trim().replace("\"", "");

    match args.command {
        WidgetCommand::Show { category } => widget::show(&store, &mut state, category),
        WidgetCommand::Add { text, category } => widget::add(&mut store, &text, &category),
        WidgetCommand::Import { path } => widget::import(&mut store, &normalize_path(&path)),
        WidgetCommand::Export { path } => widget::export(&store, &normalize_path(&path)),
        WidgetCommand::Categories => {
            widget::categories(&store);
            Ok(())
        }
        WidgetCommand::Sync { policy } => {
            let remote = TcpRemote::new(addr(&server_ip, COMMAND_PORT));
            sync::run_sync(&mut store, &remote, policy).map(|_| ())
        }
        WidgetCommand::Watch {
            policy,
            interval_secs,
        } => {
            let remote = TcpRemote::new(addr(&server_ip, COMMAND_PORT));
            sync::watch(
                &mut store,
                &remote,
                policy,
                Duration::from_secs(interval_secs),
            )
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Derive the widget-state path from the store path
/// (`quotes.json` → `quotes.state.json`).
fn state_path_for(store: &Path) -> PathBuf {
    store.with_extension("state.json")
}

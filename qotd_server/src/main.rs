//! Mock remote quote source.
//!
//! This binary plays the "server" side of the quote widget: it owns its own
//! JSON-file quote collection and answers TCP commands from clients:
//!
//! - `FETCH` — reply with the current server collection.
//! - `PUSH` — validate the payload and replace the collection wholesale.
//!
//! Concurrency and error handling:
//! - Each accepted connection is handled on its own thread, so a malformed
//!   command from one client never takes the accept loop down; the error is
//!   logged and the server keeps serving.
//! - The collection is guarded by a `Mutex`; lock poisoning surfaces as
//!   `QotdError` and turns into an error response for that client.
//!
//! Network protocol (high-level):
//! - Bind address: `0.0.0.0:8080` by default (see `qotd_common::net`).
//! - One JSON-encoded `Command` per connection; the server replies with a
//!   JSON `Response` envelope and closes.
#![warn(missing_docs)]
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use log::info;
use qotd_common::Result;
use qotd_common::net::{COMMAND_PORT, addr};
use qotd_common::store::QuoteStore;

use crate::receiver::CommandReceiver;

mod receiver;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON file backing the server's quote collection.
    #[clap(long, default_value = "server_quotes.json")]
    store: PathBuf,

    /// TCP port to listen on for client commands.
    #[clap(long, default_value_t = COMMAND_PORT)]
    port: u16,
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let store = QuoteStore::open(&args.store)?;
    info!(
        "Serving {} quotes from {}",
        store.len(),
        store.path().display()
    );
    let store = Arc::new(Mutex::new(store));

    let receiver = CommandReceiver::new(&addr("0.0.0.0", args.port))?;
    receiver.serve(store)
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

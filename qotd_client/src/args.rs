//! Command-line arguments for the quote widget.
//!
//! This module defines the CLI interface using `clap`. See `main` for
//! end-to-end usage.
use clap::{Parser, Subcommand};
use qotd_common::net::DEFAULT_HOST;
use qotd_common::reconcile::MergePolicy;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Server IP address (IPv4 or IPv6) where the mock remote source is running.
    #[clap(long, default_value = DEFAULT_HOST)]
    pub server_ip: String,

    /// Path to the JSON file backing the local quote store.
    #[clap(long, default_value = "quotes.json")]
    pub store: String,

    /// Widget operation to run.
    #[command(subcommand)]
    pub command: WidgetCommand,
}

/// Widget operations.
#[derive(Debug, Subcommand)]
pub enum WidgetCommand {
    /// Show a random quote, honoring the selected category filter.
    Show {
        /// Category to filter by; it is remembered for later runs.
        /// Pass `all` to clear the saved filter.
        #[clap(long)]
        category: Option<String>,
    },
    /// Add a new quote to the local store.
    Add {
        /// Quote text.
        #[clap(long)]
        text: String,
        /// Quote category.
        #[clap(long)]
        category: String,
    },
    /// Import quotes from a JSON file into the local store.
    Import {
        /// Path to a JSON array of quote objects.
        #[clap(long)]
        path: String,
    },
    /// Export the local store to a JSON file.
    Export {
        /// Destination path for the JSON dump.
        #[clap(long)]
        path: String,
    },
    /// List the distinct categories present in the local store.
    Categories,
    /// Reconcile once with the remote source.
    Sync {
        /// Conflict resolution policy.
        #[clap(long, value_enum, default_value_t = MergePolicy::LatestTimestamp)]
        policy: MergePolicy,
    },
    /// Reconcile with the remote source on a fixed interval until Ctrl+C.
    Watch {
        /// Conflict resolution policy.
        #[clap(long, value_enum, default_value_t = MergePolicy::LatestTimestamp)]
        policy: MergePolicy,
        /// Seconds between reconciliation passes.
        #[clap(long, default_value_t = 30)]
        interval_secs: u64,
    },
}

//! Shared protocol command type used by client and server.
//!
//! A `Command` either asks the server for its quote collection (`FETCH`) or
//! replaces it wholesale (`PUSH`) with the quotes carried in the payload.
//! The server answers every command with a `Response` envelope. Both sides
//! exchange values as JSON, one command per connection.
use serde::{Deserialize, Serialize};

use crate::quote::{Quote, QuoteRecord};

/// Header value for fetch commands.
pub const FETCH: &str = "FETCH";
/// Header value for push commands.
pub const PUSH: &str = "PUSH";

/// Response status for a handled command.
pub const STATUS_OK: &str = "ok";
/// Response status for a rejected command.
pub const STATUS_ERROR: &str = "error";

/// Command payload sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Command kind. Either `FETCH` or `PUSH`.
    pub header: String,
    /// Quotes carried by a `PUSH` (empty for `FETCH`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<QuoteRecord>,
}

impl Command {
    /// Creates a new `FETCH` command.
    pub fn fetch() -> Self {
        Command {
            header: String::from(FETCH),
            quotes: Vec::new(),
        }
    }

    /// Creates a new `PUSH` command carrying `quotes`.
    pub fn push(quotes: &[Quote]) -> Self {
        Command {
            header: String::from(PUSH),
            quotes: quotes.iter().map(QuoteRecord::from).collect(),
        }
    }
}

/// Response envelope sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// `ok` or `error`.
    pub status: String,
    /// Human-readable outcome description.
    pub message: String,
    /// Quote payload for a successful `FETCH` (empty otherwise).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<QuoteRecord>,
}

impl Response {
    /// Successful response without a payload.
    pub fn ok(message: &str) -> Self {
        Response {
            status: String::from(STATUS_OK),
            message: String::from(message),
            quotes: Vec::new(),
        }
    }

    /// Successful response carrying the server's quote collection.
    pub fn with_quotes(quotes: &[Quote]) -> Self {
        Response {
            status: String::from(STATUS_OK),
            message: format!("{} quotes", quotes.len()),
            quotes: quotes.iter().map(QuoteRecord::from).collect(),
        }
    }

    /// Error response with a reason.
    pub fn error(message: &str) -> Self {
        Response {
            status: String::from(STATUS_ERROR),
            message: String::from(message),
            quotes: Vec::new(),
        }
    }

    /// Whether the command was handled successfully.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{error, info, warn};
use qotd_common::command::{Command, FETCH, PUSH, Response};
use qotd_common::quote::{Quote, sanitize};
use qotd_common::store::QuoteStore;
use qotd_common::{QotdError, Result};

/// TCP command receiver that accepts client fetch/push requests.
///
/// Creates a listening socket and parses incoming `Command` messages from
/// clients. Every command is answered with a `Response` envelope; a command
/// the server cannot decode or apply yields an error response for that
/// client only.
pub struct CommandReceiver {
    pub(crate) socket: TcpListener,
}

impl CommandReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:8080`).
    pub fn new(bind_addr: &str) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Blocking accept loop. Each connection is handled on its own thread so
    /// one misbehaving client cannot stop the server from serving others.
    pub fn serve(self, store: Arc<Mutex<QuoteStore>>) -> Result<()> {
        info!(
            "Command TCP server is started on {}",
            self.socket.local_addr()?
        );

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, store) {
                            error!("Client connection error: {}", e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

/// Read one command from `stream`, apply it to the store, write the response.
fn handle_connection(mut stream: TcpStream, store: Arc<Mutex<QuoteStore>>) -> Result<()> {
    let peer = stream.peer_addr()?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;

    let response = match serde_json::from_slice::<Command>(&buf) {
        Ok(cmd) => {
            info!("Received {} command from {}", cmd.header, peer);
            respond(cmd, &store)
        }
        Err(e) => {
            warn!("Undecodable command from {}: {}", peer, e);
            Response::error(&format!("invalid command: {}", e))
        }
    };

    stream.write_all(&serde_json::to_vec(&response)?)?;
    Ok(())
}

/// Apply a decoded command to the store and build the response payload.
pub(crate) fn respond(cmd: Command, store: &Mutex<QuoteStore>) -> Response {
    match apply(cmd, store) {
        Ok(response) => response,
        Err(e) => Response::error(&e.to_string()),
    }
}

fn apply(cmd: Command, store: &Mutex<QuoteStore>) -> Result<Response> {
    match cmd.header.as_str() {
        FETCH => {
            let guard = store.lock()?;
            Ok(Response::with_quotes(guard.quotes()))
        }
        PUSH => {
            let (quotes, dropped) = sanitize(cmd.quotes, Quote::now_millis());
            if dropped > 0 {
                warn!("Dropped {} malformed quote entries from push payload", dropped);
            }
            let mut guard = store.lock()?;
            guard.replace(quotes)?;
            Ok(Response::ok(&format!("stored {} quotes", guard.len())))
        }
        other => Err(QotdError::Format(format!(
            "unknown command header: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qotd_common::quote::QuoteRecord;
    use tempfile::TempDir;

    fn q(text: &str, category: &str, updated_at: u64) -> Quote {
        Quote {
            text: String::from(text),
            category: String::from(category),
            updated_at,
        }
    }

    fn store_with(dir: &TempDir, quotes: Vec<Quote>) -> Mutex<QuoteStore> {
        let mut store = QuoteStore::open(dir.path().join("server_quotes.json")).unwrap();
        store.replace(quotes).unwrap();
        Mutex::new(store)
    }

    #[test]
    fn fetch_returns_store_contents() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, vec![q("A", "X", 1)]);

        let response = respond(Command::fetch(), &store);
        assert!(response.is_ok());
        assert_eq!(response.quotes.len(), 1);
        assert_eq!(response.quotes[0].text.as_deref(), Some("A"));
    }

    #[test]
    fn push_replaces_collection_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, vec![q("old", "X", 1)]);

        let response = respond(Command::push(&[q("new", "Y", 2)]), &store);
        assert!(response.is_ok());

        let reopened =
            QuoteStore::open(dir.path().join("server_quotes.json")).unwrap();
        assert_eq!(reopened.quotes(), &[q("new", "Y", 2)]);
    }

    #[test]
    fn push_filters_malformed_records() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, vec![]);

        let cmd = Command {
            header: String::from(PUSH),
            quotes: vec![
                QuoteRecord::from(&q("good", "X", 1)),
                QuoteRecord {
                    text: None,
                    category: Some(String::from("orphan")),
                    updated_at: None,
                },
            ],
        };
        let response = respond(cmd, &store);
        assert!(response.is_ok());
        assert_eq!(store.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, vec![q("A", "X", 1)]);

        let cmd = Command {
            header: String::from("DELETE"),
            quotes: Vec::new(),
        };
        let response = respond(cmd, &store);
        assert!(!response.is_ok());
        // the store is untouched
        assert_eq!(store.lock().unwrap().len(), 1);
    }
}

//! Talking to the mock remote source over TCP.
//!
//! This module provides the `RemoteSource` abstraction the sync loop works
//! against and its TCP implementation speaking the shared `Command`/`Response`
//! protocol: one JSON command per connection, then the write half is shut
//! down and the response is read to end.
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use log::{debug, warn};
use qotd_common::command::{Command, Response};
use qotd_common::quote::{Quote, sanitize};
use qotd_common::{QotdError, Result};

/// Read timeout applied to remote calls so a stalled server cannot hang a
/// sync pass forever.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote quote source consumed by the sync loop.
///
/// Fetch failures are the caller's to surface; the reconciler itself never
/// performs network I/O.
pub trait RemoteSource {
    /// Fetch the remote quote collection.
    fn fetch(&self) -> Result<Vec<Quote>>;
    /// Replace the remote collection with `quotes`.
    fn push(&self, quotes: &[Quote]) -> Result<()>;
}

/// TCP-backed remote source.
pub struct TcpRemote {
    addr: String,
}

impl TcpRemote {
    /// Create a remote client for `addr` ("ip:port").
    pub fn new(addr: String) -> Self {
        Self { addr }
    }

    fn exchange(&self, command: &Command) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.addr)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;

        stream.write_all(&serde_json::to_vec(command)?)?;
        stream.shutdown(Shutdown::Write)?;

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        let response: Response = serde_json::from_slice(&buf)?;
        if !response.is_ok() {
            return Err(QotdError::Format(format!(
                "server rejected {}: {}",
                command.header, response.message
            )));
        }
        Ok(response)
    }
}

impl RemoteSource for TcpRemote {
    fn fetch(&self) -> Result<Vec<Quote>> {
        let response = self.exchange(&Command::fetch())?;
        let (quotes, dropped) = sanitize(response.quotes, Quote::now_millis());
        if dropped > 0 {
            warn!("Dropped {} malformed entries from remote payload", dropped);
        }
        debug!("Fetched {} quotes from {}", quotes.len(), self.addr);
        Ok(quotes)
    }

    fn push(&self, quotes: &[Quote]) -> Result<()> {
        let response = self.exchange(&Command::push(quotes))?;
        debug!("Push acknowledged: {}", response.message);
        Ok(())
    }
}

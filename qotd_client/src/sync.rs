//! One-shot and periodic reconciliation against the remote source.
//!
//! A sync pass is: fetch the remote collection, merge it with the local one
//! through the reconciler, persist the merged result locally, and push it
//! back so both sides converge (the original widget writes the merged list
//! to both stores as well).
//!
//! The watch loop runs passes on a fixed interval:
//! - a `crossbeam_channel` ticker supplies the interval,
//! - a Ctrl+C handler feeds a shutdown channel,
//! - `select!` multiplexes the two.
//!
//! Passes are serialized by construction: the loop thread runs one sync at a
//! time and drains ticks that piled up while a pass was in flight, so a slow
//! pass is skipped over rather than queued up.
use std::time::Duration;

use crossbeam_channel::{select, tick, unbounded};
use log::{error, info, warn};
use qotd_common::reconcile::{MergePolicy, Reconciliation, reconcile};
use qotd_common::store::QuoteStore;
use qotd_common::{QotdError, Result};

use crate::remote::RemoteSource;

/// Run one reconciliation pass against `remote`.
///
/// A fetch failure degrades to a local-only pass: the merge runs against an
/// empty remote collection and nothing is pushed back. A push failure after
/// a successful merge is reported but does not undo the local result.
pub fn run_sync(
    store: &mut QuoteStore,
    remote: &dyn RemoteSource,
    policy: MergePolicy,
) -> Result<Reconciliation> {
    let (remote_quotes, remote_available) = match remote.fetch() {
        Ok(quotes) => (quotes, true),
        Err(e) => {
            warn!("Remote source unavailable, keeping local quotes: {}", e);
            (Vec::new(), false)
        }
    };

    let outcome = reconcile(store.quotes(), &remote_quotes, policy);
    report_conflicts(&outcome);
    store.replace(outcome.merged.clone())?;

    if remote_available {
        if let Err(e) = remote.push(&outcome.merged) {
            warn!("Failed to push merged quotes back: {}", e);
        }
    }

    info!(
        "Sync complete under {} policy: {} quotes, {} conflicts",
        policy,
        outcome.merged.len(),
        outcome.conflicts.len()
    );
    Ok(outcome)
}

fn report_conflicts(outcome: &Reconciliation) {
    for conflict in &outcome.conflicts {
        info!(
            "Conflict on \"{}\": local updatedAt={} vs remote updatedAt={}",
            conflict.local.identity_key(),
            conflict.local.updated_at,
            conflict.remote.updated_at
        );
    }
}

/// Reconcile on a fixed interval until Ctrl+C.
pub fn watch(
    store: &mut QuoteStore,
    remote: &dyn RemoteSource,
    policy: MergePolicy,
    interval: Duration,
) -> Result<()> {
    if interval.is_zero() {
        return Err(QotdError::Format(String::from(
            "watch interval must be at least one second",
        )));
    }

    let ticks = tick(interval);
    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| QotdError::Format(format!("failed to set Ctrl+C handler: {}", e)))?;

    info!(
        "Watching: reconciling every {}s. Press Ctrl+C to exit.",
        interval.as_secs()
    );

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(ticks) -> msg => match msg {
                Ok(_) => {
                    if let Err(e) = run_sync(store, remote, policy) {
                        error!("Sync pass failed: {}", e);
                    }
                    // a pass can outlast the interval; skip ticks that piled up meanwhile
                    while ticks.try_recv().is_ok() {}
                }
                Err(e) => return Err(QotdError::ChannelRecv(e.to_string())),
            }
        }
    }
    info!("Watch loop stopping...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qotd_common::Quote;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn q(text: &str, category: &str, updated_at: u64) -> Quote {
        Quote {
            text: String::from(text),
            category: String::from(category),
            updated_at,
        }
    }

    struct FakeRemote {
        available: bool,
        quotes: Vec<Quote>,
        pushed: RefCell<Option<Vec<Quote>>>,
    }

    impl FakeRemote {
        fn up(quotes: Vec<Quote>) -> Self {
            Self { available: true, quotes, pushed: RefCell::new(None) }
        }

        fn down() -> Self {
            Self { available: false, quotes: Vec::new(), pushed: RefCell::new(None) }
        }
    }

    impl RemoteSource for FakeRemote {
        fn fetch(&self) -> Result<Vec<Quote>> {
            if self.available {
                Ok(self.quotes.clone())
            } else {
                Err(QotdError::Format(String::from("connection refused")))
            }
        }

        fn push(&self, quotes: &[Quote]) -> Result<()> {
            *self.pushed.borrow_mut() = Some(quotes.to_vec());
            Ok(())
        }
    }

    fn store_with(dir: &TempDir, quotes: Vec<Quote>) -> QuoteStore {
        let mut store = QuoteStore::open(dir.path().join("quotes.json")).unwrap();
        store.replace(quotes).unwrap();
        store
    }

    #[test]
    fn successful_sync_merges_persists_and_pushes_back() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![q("A", "X", 1)]);
        let remote = FakeRemote::up(vec![q("A", "X", 2), q("B", "Y", 1)]);

        let outcome = run_sync(&mut store, &remote, MergePolicy::LatestTimestamp).unwrap();
        assert_eq!(outcome.merged, vec![q("A", "X", 2), q("B", "Y", 1)]);
        assert_eq!(outcome.conflicts.len(), 1);

        // persisted locally and pushed back
        let reopened = QuoteStore::open(dir.path().join("quotes.json")).unwrap();
        assert_eq!(reopened.quotes(), outcome.merged.as_slice());
        assert_eq!(remote.pushed.borrow().as_deref(), Some(outcome.merged.as_slice()));
    }

    #[test]
    fn fetch_failure_degrades_to_local_pass_through() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![q("A", "X", 1), q("B", "Y", 2)]);
        let remote = FakeRemote::down();

        let outcome = run_sync(&mut store, &remote, MergePolicy::LatestTimestamp).unwrap();
        assert_eq!(outcome.merged, vec![q("A", "X", 1), q("B", "Y", 2)]);
        assert!(outcome.conflicts.is_empty());
        assert!(remote.pushed.borrow().is_none());
    }

    #[test]
    fn remote_wins_policy_flows_through_sync() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![q("A", "X", 9)]);
        let remote = FakeRemote::up(vec![q("A", "X", 2)]);

        let outcome = run_sync(&mut store, &remote, MergePolicy::RemoteWins).unwrap();
        assert_eq!(outcome.merged, vec![q("A", "X", 2)]);
        assert_eq!(store.quotes(), &[q("A", "X", 2)]);
    }

    #[test]
    fn watch_rejects_zero_interval() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![]);
        let remote = FakeRemote::down();
        assert!(watch(&mut store, &remote, MergePolicy::LatestTimestamp, Duration::ZERO).is_err());
    }
}

//! JSON-file persistence for the quote collection and widget state.
//!
//! The store is a flat key-value layout: one JSON array of quote objects,
//! rewritten wholesale on every mutation. There is no incremental format and
//! no schema versioning. A store opened from a missing file starts with the
//! built-in quotes.
//!
//! Widget state (the selected category filter) lives in a separate small
//! JSON file so wiping one store file never loses the other concern.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::quote::{Quote, QuoteRecord, sanitize};
use crate::result::Result;

/// File-backed quote collection, loaded eagerly and written wholesale.
///
/// The reconciler never touches this type; callers load quotes, merge them,
/// and persist the result through [`QuoteStore::replace`].
pub struct QuoteStore {
    path: PathBuf,
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields the starter quotes without writing anything;
    /// the file appears on the first mutation. Malformed entries in an
    /// existing file are dropped with a warning, matching the validation
    /// boundary for every other external input.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let quotes = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let records: Vec<QuoteRecord> = serde_json::from_str(&raw)?;
            let (quotes, dropped) = sanitize(records, Quote::now_millis());
            if dropped > 0 {
                warn!(
                    "Dropped {} malformed quote entries from {}",
                    dropped,
                    path.display()
                );
            }
            quotes
        } else {
            info!(
                "No store file at {}, starting with the built-in quotes",
                path.display()
            );
            Quote::starter_set()
        };
        Ok(Self { path, quotes })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current collection.
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Number of quotes currently held.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Append one quote and persist.
    pub fn push(&mut self, quote: Quote) -> Result<()> {
        self.quotes.push(quote);
        self.save()
    }

    /// Replace the whole collection and persist.
    pub fn replace(&mut self, quotes: Vec<Quote>) -> Result<()> {
        self.quotes = quotes;
        self.save()
    }

    /// Write the collection to disk as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.quotes)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for quote in &self.quotes {
            if !seen.iter().any(|c| c == &quote.category) {
                seen.push(quote.category.clone());
            }
        }
        seen
    }

    /// Quotes matching `category`, or all quotes when `None`.
    pub fn filtered(&self, category: Option<&str>) -> Vec<&Quote> {
        match category {
            Some(wanted) => self
                .quotes
                .iter()
                .filter(|q| q.category == wanted)
                .collect(),
            None => self.quotes.iter().collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_category: Option<String>,
}

/// Persisted widget state: the category filter selected last time.
///
/// The last-viewed quote is deliberately not stored here; it is
/// process-lifetime state only.
pub struct WidgetState {
    path: PathBuf,
    /// Currently selected category filter, `None` meaning all categories.
    pub selected_category: Option<String>,
}

impl WidgetState {
    /// Open the state file at `path`; missing or unreadable state starts fresh.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<StateFile>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Ignoring unreadable widget state {}: {}", path.display(), e);
                    StateFile::default()
                }
            }
        } else {
            StateFile::default()
        };
        Ok(Self {
            path,
            selected_category: state.selected_category,
        })
    }

    /// Persist the current state.
    pub fn save(&self) -> Result<()> {
        let state = StateFile {
            selected_category: self.selected_category.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&state)?)?;
        Ok(())
    }
}

//! Widget operations over the local store: random pick, add, import/export,
//! category listing.
//!
//! These are the user-facing actions; each one loads nothing itself and
//! mutates only through the store, so the persisted file is rewritten
//! wholesale on every change.
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};
use qotd_common::quote::{Quote, QuoteParser, QuoteRecord, sanitize};
use qotd_common::reconcile::{MergePolicy, reconcile};
use qotd_common::store::{QuoteStore, WidgetState};
use qotd_common::Result;
use rand::Rng;

/// Category filter value that matches every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Show a random quote under the effective category filter.
///
/// A `--category` given on the command line becomes the remembered filter
/// (the special value `all` clears it); without one, the remembered filter
/// applies.
pub fn show(store: &QuoteStore, state: &mut WidgetState, category: Option<String>) -> Result<()> {
    if let Some(selected) = category {
        state.selected_category = if selected == ALL_CATEGORIES {
            None
        } else {
            Some(selected)
        };
        state.save()?;
    }

    match pick_random(store, state.selected_category.as_deref()) {
        Some(quote) => println!("{}\n[{}]", quote.text, quote.category),
        None => println!("No quotes in this category."),
    }
    Ok(())
}

/// Pick a uniformly random quote among those matching `category`.
pub(crate) fn pick_random<'a>(store: &'a QuoteStore, category: Option<&str>) -> Option<&'a Quote> {
    let candidates = store.filtered(category);
    if candidates.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    let index = rng.random_range(0..candidates.len());
    Some(candidates[index])
}

/// Validate user input and append a freshly stamped quote.
pub fn add(store: &mut QuoteStore, text: &str, category: &str) -> Result<()> {
    let quote = Quote::new(text, category)?;
    store.push(quote)?;
    info!("New quote added, {} total", store.len());
    Ok(())
}

/// Import a JSON file of quotes, merging them into the local store.
///
/// Malformed entries are skipped with a notice rather than failing the whole
/// import. The surviving entries go through the reconciler under the
/// latest-timestamp policy so the store stays deduplicated by identity key.
pub fn import(store: &mut QuoteStore, path: &Path) -> Result<()> {
    let file = File::open(path)?;
    let records = QuoteRecord::parse_from_reader(BufReader::new(file))?;
    let (imported, dropped) = sanitize(records, Quote::now_millis());
    if dropped > 0 {
        warn!(
            "Skipped {} malformed entries in {}",
            dropped,
            path.display()
        );
    }

    let outcome = reconcile(store.quotes(), &imported, MergePolicy::LatestTimestamp);
    if !outcome.conflicts.is_empty() {
        info!(
            "{} existing quotes were replaced by newer imported entries",
            outcome.conflicts.len()
        );
    }
    info!(
        "Imported {} quotes, {} total after merge",
        imported.len(),
        outcome.merged.len()
    );
    store.replace(outcome.merged)
}

/// Export the local collection to `path` as pretty-printed JSON.
pub fn export(store: &QuoteStore, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(store.quotes())?;
    fs::write(path, json)?;
    info!("Exported {} quotes to {}", store.len(), path.display());
    Ok(())
}

/// Print the distinct categories of the local collection, first-seen order.
pub fn categories(store: &QuoteStore) {
    for category in store.categories() {
        println!("{}", category);
    }
}

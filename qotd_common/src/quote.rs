//! Quote data model and boundary validation.
//!
//! A `Quote` is the unit of data in the system: a text/category pair with a
//! mandatory update timestamp in milliseconds since the Unix epoch. The
//! timestamp is assigned by whichever component constructs the quote, so the
//! merge never has to compare an undefined value.
//!
//! External inputs (imports, remote payloads, hand-edited store files) arrive
//! as loosely-shaped [`QuoteRecord`] values and pass through [`sanitize`]
//! before they reach the reconciler: entries with a missing or blank text or
//! category are dropped, whitespace is trimmed, and a missing timestamp is
//! defaulted to the caller-provided stamp.

use std::io::BufRead;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::QotdError;

/// Separator used when rendering an identity key for display and logging.
pub const KEY_SEPARATOR: &str = "::";

/// A single quote: the unit of data in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quote text.
    pub text: String,
    /// Free-form category the quote belongs to.
    pub category: String,
    /// Last-modified time in milliseconds since the Unix epoch.
    #[serde(rename = "updatedAt")]
    pub updated_at: u64,
}

impl Quote {
    /// Create a quote from user input, stamping it with the current time.
    ///
    /// Both fields are trimmed; blank input is rejected so malformed quotes
    /// never enter a collection.
    pub fn new(text: &str, category: &str) -> Result<Quote, QotdError> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(QotdError::InvalidQuote(String::from(
                "both text and category are required",
            )));
        }
        Ok(Quote {
            text: String::from(text),
            category: String::from(category),
            updated_at: Quote::now_millis(),
        })
    }

    /// The identity key pair deduplicating quotes during a merge.
    ///
    /// Two quotes are the same entity exactly when both text and category
    /// match, case-sensitively.
    pub fn key(&self) -> (&str, &str) {
        (&self.text, &self.category)
    }

    /// Display form of the identity key, `text::category`.
    pub fn identity_key(&self) -> String {
        format!("{}{}{}", self.text, KEY_SEPARATOR, self.category)
    }

    /// Current UTC time in milliseconds since the Unix epoch.
    pub fn now_millis() -> u64 {
        Utc::now().timestamp_millis() as u64
    }

    /// The built-in quotes a fresh store starts with.
    pub fn starter_set() -> Vec<Quote> {
        let stamp = Quote::now_millis();
        [
            (
                "The best way to get started is to quit talking and begin doing.",
                "Motivation",
            ),
            (
                "Success is not in what you have, but who you are.",
                "Success",
            ),
            (
                "Your time is limited, so don’t waste it living someone else’s life.",
                "Life",
            ),
        ]
        .into_iter()
        .map(|(text, category)| Quote {
            text: String::from(text),
            category: String::from(category),
            updated_at: stamp,
        })
        .collect()
    }
}

/// Loosely-shaped quote record as it appears in external JSON.
///
/// Every field is optional on input; [`sanitize`] decides what survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// The quote text, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The category, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Last-modified time in milliseconds, if present.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl From<&Quote> for QuoteRecord {
    fn from(quote: &Quote) -> Self {
        QuoteRecord {
            text: Some(quote.text.clone()),
            category: Some(quote.category.clone()),
            updated_at: Some(quote.updated_at),
        }
    }
}

/// Trait providing file parsing for quote records.
pub trait QuoteParser {
    /// Parses a JSON array of quote-shaped records from a buffered reader.
    ///
    /// The payload must be a JSON array; individual entries may be missing
    /// fields and are validated separately by [`sanitize`].
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<QuoteRecord>, QotdError>;
}

impl QuoteParser for QuoteRecord {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, QotdError> {
        let records: Vec<QuoteRecord> = serde_json::from_reader(reader)?;
        Ok(records)
    }
}

/// Validate raw records into quotes, dropping malformed entries.
///
/// Text and category are trimmed; entries where either is missing or blank
/// are discarded. A missing timestamp is defaulted to `stamp`. Returns the
/// surviving quotes in input order together with the number of dropped
/// entries so callers can surface a notice.
pub fn sanitize(records: Vec<QuoteRecord>, stamp: u64) -> (Vec<Quote>, usize) {
    let total = records.len();
    let quotes: Vec<Quote> = records
        .into_iter()
        .filter_map(|record| {
            let text = record.text.as_deref().unwrap_or("").trim().to_owned();
            let category = record.category.as_deref().unwrap_or("").trim().to_owned();
            if text.is_empty() || category.is_empty() {
                return None;
            }
            Some(Quote {
                text,
                category,
                updated_at: record.updated_at.unwrap_or(stamp),
            })
        })
        .collect();
    let dropped = total - quotes.len();
    (quotes, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(text: Option<&str>, category: Option<&str>, updated_at: Option<u64>) -> QuoteRecord {
        QuoteRecord {
            text: text.map(String::from),
            category: category.map(String::from),
            updated_at,
        }
    }

    #[test]
    fn new_trims_and_stamps() {
        let quote = Quote::new("  stay hungry  ", " Life ").unwrap();
        assert_eq!(quote.text, "stay hungry");
        assert_eq!(quote.category, "Life");
        assert!(quote.updated_at > 0);
    }

    #[test]
    fn new_rejects_blank_input() {
        assert!(Quote::new("", "Life").is_err());
        assert!(Quote::new("text", "   ").is_err());
    }

    #[test]
    fn identity_key_joins_text_and_category() {
        let quote = Quote::new("A", "X").unwrap();
        assert_eq!(quote.identity_key(), "A::X");
        assert_eq!(quote.key(), ("A", "X"));
    }

    #[test]
    fn sanitize_filters_malformed_entries() {
        let records = vec![
            record(Some("keep me"), Some("Life"), Some(7)),
            record(None, Some("Life"), Some(7)),
            record(Some("no category"), None, None),
            record(Some("   "), Some("Life"), None),
        ];
        let (quotes, dropped) = sanitize(records, 42);
        assert_eq!(quotes.len(), 1);
        assert_eq!(dropped, 3);
        assert_eq!(quotes[0].text, "keep me");
    }

    #[test]
    fn sanitize_defaults_missing_timestamp() {
        let records = vec![record(Some("A"), Some("X"), None)];
        let (quotes, dropped) = sanitize(records, 42);
        assert_eq!(dropped, 0);
        assert_eq!(quotes[0].updated_at, 42);
    }

    #[test]
    fn sanitize_keeps_explicit_timestamp() {
        let records = vec![record(Some("A"), Some("X"), Some(7))];
        let (quotes, _) = sanitize(records, 42);
        assert_eq!(quotes[0].updated_at, 7);
    }

    #[test]
    fn parse_from_reader_accepts_partial_records() {
        let json = r#"[{"text":"A","category":"X","updatedAt":1},{"text":"B"}]"#;
        let records = QuoteRecord::parse_from_reader(Cursor::new(json)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].category, None);
    }

    #[test]
    fn parse_from_reader_rejects_non_array_payload() {
        let json = r#"{"text":"A"}"#;
        assert!(QuoteRecord::parse_from_reader(Cursor::new(json)).is_err());
    }
}

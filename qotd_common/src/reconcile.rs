//! Merging local and remote quote collections.
//!
//! The reconciler takes a local and a remote sequence of quotes and produces
//! a merged collection plus a conflict report. It is pure: no I/O, no store
//! access. Callers persist the returned collection.
//!
//! Merge rules:
//! - Quotes are keyed by identity (text + category, case-sensitive).
//! - The union is scanned exactly once, local first, then remote; the policy
//!   comparison is applied at each insertion, so duplicates within one
//!   sequence also collapse to a single entry.
//! - Output preserves the first-seen order of keys in the union scan.
//! - A key present on both sides with differing values is reported as a
//!   [`Conflict`] carrying both candidates; identical values on both sides
//!   are a no-op and not reported.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use clap::ValueEnum;
use strum_macros::{Display, EnumString};

use crate::quote::Quote;

/// Conflict resolution policy applied when a key exists on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MergePolicy {
    /// Keep the entry with the greater `updatedAt`; ties favor remote.
    LatestTimestamp,
    /// Remote entries always override local ones, regardless of timestamp.
    RemoteWins,
}

/// A key that existed on both sides with differing values.
///
/// Both candidates are reported so the losing side stays visible to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The surviving local candidate for the key.
    pub local: Quote,
    /// The surviving remote candidate for the key.
    pub remote: Quote,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Merged collection, deduplicated by identity key, first-seen order.
    pub merged: Vec<Quote>,
    /// Keys present on both sides whose values differed.
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Local,
    Remote,
}

/// Per-key merge state: the current winner and the surviving candidate from
/// each side, used for conflict reporting once the scan is done.
struct Slot {
    winner: Quote,
    winner_side: Side,
    local: Option<Quote>,
    remote: Option<Quote>,
}

/// Merge `local` and `remote` under `policy`.
///
/// Order of inputs is irrelevant for correctness; duplicates within either
/// sequence are permitted and collapse by the same policy comparison. No
/// entry is dropped except by key collision.
pub fn reconcile(local: &[Quote], remote: &[Quote], policy: MergePolicy) -> Reconciliation {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut slots: HashMap<(String, String), Slot> = HashMap::new();

    for (side, quotes) in [(Side::Local, local), (Side::Remote, remote)] {
        for quote in quotes {
            let key = (quote.text.clone(), quote.category.clone());
            match slots.entry(key) {
                Entry::Vacant(entry) => {
                    order.push(entry.key().clone());
                    entry.insert(Slot {
                        winner: quote.clone(),
                        winner_side: side,
                        local: (side == Side::Local).then(|| quote.clone()),
                        remote: (side == Side::Remote).then(|| quote.clone()),
                    });
                }
                Entry::Occupied(mut entry) => {
                    let slot = entry.get_mut();
                    let candidate = match side {
                        Side::Local => &mut slot.local,
                        Side::Remote => &mut slot.remote,
                    };
                    let replace_candidate = match candidate {
                        Some(current) => supersedes(quote, side, current, side, policy),
                        None => true,
                    };
                    if replace_candidate {
                        *candidate = Some(quote.clone());
                    }
                    if supersedes(quote, side, &slot.winner, slot.winner_side, policy) {
                        slot.winner = quote.clone();
                        slot.winner_side = side;
                    }
                }
            }
        }
    }

    let mut merged = Vec::with_capacity(order.len());
    let mut conflicts = Vec::new();
    for key in &order {
        if let Some(slot) = slots.remove(key) {
            if let (Some(local_rep), Some(remote_rep)) = (&slot.local, &slot.remote) {
                if local_rep != remote_rep {
                    conflicts.push(Conflict {
                        local: local_rep.clone(),
                        remote: remote_rep.clone(),
                    });
                }
            }
            merged.push(slot.winner);
        }
    }

    Reconciliation { merged, conflicts }
}

/// Whether `incoming` replaces `current` under `policy`.
///
/// Ties on timestamp favor the remote side; within one side the later entry
/// of the scan wins, so intra-sequence duplicates collapse to the last one
/// of equal standing.
fn supersedes(
    incoming: &Quote,
    incoming_side: Side,
    current: &Quote,
    current_side: Side,
    policy: MergePolicy,
) -> bool {
    match policy {
        MergePolicy::RemoteWins => match (incoming_side, current_side) {
            (Side::Remote, _) => true,
            (Side::Local, Side::Local) => true,
            (Side::Local, Side::Remote) => false,
        },
        MergePolicy::LatestTimestamp => {
            if incoming.updated_at != current.updated_at {
                incoming.updated_at > current.updated_at
            } else {
                !(incoming_side == Side::Local && current_side == Side::Remote)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str, category: &str, updated_at: u64) -> Quote {
        Quote {
            text: String::from(text),
            category: String::from(category),
            updated_at,
        }
    }

    #[test]
    fn disjoint_inputs_union_without_conflicts() {
        let local = vec![q("A", "X", 1)];
        let remote = vec![q("B", "Y", 2)];
        for policy in [MergePolicy::LatestTimestamp, MergePolicy::RemoteWins] {
            let outcome = reconcile(&local, &remote, policy);
            assert_eq!(outcome.merged, vec![q("A", "X", 1), q("B", "Y", 2)]);
            assert!(outcome.conflicts.is_empty());
        }
    }

    #[test]
    fn latest_timestamp_keeps_newer_remote_entry() {
        let local = vec![q("A", "X", 1)];
        let remote = vec![q("A", "X", 2)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        assert_eq!(outcome.merged, vec![q("A", "X", 2)]);
        assert_eq!(
            outcome.conflicts,
            vec![Conflict {
                local: q("A", "X", 1),
                remote: q("A", "X", 2),
            }]
        );
    }

    #[test]
    fn latest_timestamp_keeps_newer_local_entry() {
        let local = vec![q("A", "X", 5)];
        let remote = vec![q("A", "X", 2)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        assert_eq!(outcome.merged, vec![q("A", "X", 5)]);
        assert_eq!(outcome.conflicts.len(), 1);
    }

    #[test]
    fn identical_entries_on_both_sides_are_a_no_op() {
        // Equal key and equal timestamp means equal values; the tie resolves
        // to the remote entry, which is indistinguishable from the local one,
        // and no conflict is reported.
        let local = vec![q("A", "X", 4)];
        let remote = vec![q("A", "X", 4)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        assert_eq!(outcome.merged, vec![q("A", "X", 4)]);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn remote_wins_overrides_newer_local() {
        let local = vec![q("A", "X", 9)];
        let remote = vec![q("A", "X", 2)];
        let outcome = reconcile(&local, &remote, MergePolicy::RemoteWins);
        assert_eq!(outcome.merged, vec![q("A", "X", 2)]);
        assert_eq!(
            outcome.conflicts,
            vec![Conflict {
                local: q("A", "X", 9),
                remote: q("A", "X", 2),
            }]
        );
    }

    #[test]
    fn remote_wins_keeps_local_only_keys() {
        let local = vec![q("A", "X", 9), q("C", "Z", 3)];
        let remote = vec![q("A", "X", 2)];
        let outcome = reconcile(&local, &remote, MergePolicy::RemoteWins);
        assert_eq!(outcome.merged, vec![q("A", "X", 2), q("C", "Z", 3)]);
    }

    #[test]
    fn duplicate_keys_within_local_collapse_by_timestamp() {
        let local = vec![q("A", "X", 1), q("A", "X", 3)];
        let outcome = reconcile(&local, &[], MergePolicy::LatestTimestamp);
        assert_eq!(outcome.merged, vec![q("A", "X", 3)]);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn duplicate_remote_keys_collapse_to_last_under_remote_wins() {
        let remote = vec![q("A", "X", 5), q("A", "X", 1)];
        let outcome = reconcile(&[], &remote, MergePolicy::RemoteWins);
        assert_eq!(outcome.merged, vec![q("A", "X", 1)]);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let local = vec![q("A", "X", 1), q("B", "Y", 1)];
        let remote = vec![q("C", "Z", 1), q("A", "X", 8)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        let keys: Vec<String> = outcome.merged.iter().map(Quote::identity_key).collect();
        assert_eq!(keys, vec!["A::X", "B::Y", "C::Z"]);
        assert_eq!(outcome.merged[0].updated_at, 8);
    }

    #[test]
    fn same_text_in_different_categories_are_distinct_entities() {
        let local = vec![q("A", "X", 1)];
        let remote = vec![q("A", "Y", 2)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        assert_eq!(outcome.merged.len(), 2);
        assert!(outcome.conflicts.is_empty());
    }

    #[test]
    fn remerge_against_empty_remote_is_identity() {
        let local = vec![q("A", "X", 1), q("B", "Y", 4), q("A", "X", 2)];
        let remote = vec![q("A", "X", 3), q("C", "Z", 1)];
        let outcome = reconcile(&local, &remote, MergePolicy::LatestTimestamp);
        let again = reconcile(&outcome.merged, &[], MergePolicy::LatestTimestamp);
        assert_eq!(again.merged, outcome.merged);
        assert!(again.conflicts.is_empty());
    }
}

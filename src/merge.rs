//! Combines the stored snapshot of a period with a freshly fetched batch.
//!
//! Conflict policy: when a story is present on both sides the fresh record wins
//! as a whole, so its score and comment count replace the stored ones. Stories
//! only present in the snapshot (they scrolled off the live listing) are carried
//! over unchanged.

use std::collections::HashSet;

use crate::config::DuplicateKey;
use crate::record::{renumber, ItemRecord, RecordBatch};

/// Merges `stored` and `fresh` into one batch ranked `1..=N`.
///
/// Fresh records come first in their fetched order, followed by the stored
/// records that were not refetched, in their stored order. Every key appears
/// exactly once; a duplicate inside either input keeps its first occurrence.
/// Records with an empty key (the field could not be parsed) never collide and
/// are all kept.
pub fn merge(stored: &[ItemRecord], fresh: &[ItemRecord], field: DuplicateKey) -> RecordBatch {
    let mut seen = HashSet::with_capacity(stored.len() + fresh.len());
    let mut merged = Vec::with_capacity(stored.len() + fresh.len());

    for record in fresh.iter().chain(stored) {
        let key = record.key(field);
        if key.is_empty() || seen.insert(key) {
            merged.push(record.clone());
        }
    }

    renumber(&mut merged);
    merged
}

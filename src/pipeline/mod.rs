//! Transformation pipelines
//!
//! Two linear, single-pass pipelines share one execution context: the
//! catalog pipeline produces the songs and artists dimensions, the event
//! pipeline produces the users and time dimensions plus the songplays fact
//! table. They do not share intermediate state; the event pipeline re-reads
//! the catalog input for its join.

mod catalog;
mod events;

pub use catalog::{process_catalog, SONG_DATA_PATTERN};
pub use events::{process_events, LOG_DATA_PATTERN};

use std::collections::HashSet;
use std::hash::Hash;

/// Keep one representative row per key, first-seen over iteration order
///
/// Iteration order here is the lexicographic file read order, so a
/// single-process run is stable; which representative a distributed backend
/// would keep is unspecified, and callers must not rely on it.
pub(crate) fn dedup_by<T, K, I, F>(rows: I, key: F) -> Vec<T>
where
    K: Eq + Hash,
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}

//! Per-user record of already-reported lot identities.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How long a monitored identity is remembered before it may be
/// reported as new again.
pub const RETENTION_DAYS: i64 = 7;

/// Map of lot identity to the timestamp it was first observed.
///
/// Only the polling path consults this; on-demand search reports all
/// matches regardless of prior sightings. Entries are evicted lazily
/// once per poll cycle, after that cycle's new lots have been
/// recorded, so eviction never suppresses detection within a cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watchlist {
    entries: HashMap<String, DateTime<Utc>>,
}

impl Watchlist {
    /// Whether this identity has already been reported.
    pub fn seen(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Remember an identity with its first-seen timestamp.
    pub fn record(&mut self, identity: String, first_seen: DateTime<Utc>) {
        self.entries.entry(identity).or_insert(first_seen);
    }

    /// Drop entries first seen before `cutoff`. Returns how many were
    /// removed.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, first_seen| *first_seen >= cutoff);
        before - self.entries.len()
    }

    /// Cutoff for the standard retention window, relative to `now`.
    pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(RETENTION_DAYS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay buffer: bounded, in-memory only. In-flight messages are not
//! durable across broker crashes, so unlike the write-ahead log this
//! mirrors in shape, there is no file behind it at all — it lives only in
//! the broker process and is discarded on exit.

use std::collections::HashMap;
use symposium_core::{Envelope, Tag};

/// Configuration bounds for the replay buffer.
#[derive(Debug, Clone, Copy)]
pub struct ReplayBounds {
    pub max_entries_per_type: usize,
    pub max_total_entries: usize,
    pub max_age_ms: u64,
}

impl Default for ReplayBounds {
    fn default() -> Self {
        Self {
            max_entries_per_type: 256,
            max_total_entries: 2048,
            max_age_ms: 10 * 60 * 1000,
        }
    }
}

struct Entry {
    envelope: Envelope,
    stored_at_ms: u64,
}

/// Bounded ordered sequence of replayable envelopes, owned exclusively by
/// the broker event loop.
pub struct ReplayBuffer {
    bounds: ReplayBounds,
    by_type: HashMap<Tag, Vec<Entry>>,
    total: usize,
}

impl ReplayBuffer {
    pub fn new(bounds: ReplayBounds) -> Self {
        Self {
            bounds,
            by_type: HashMap::new(),
            total: 0,
        }
    }

    /// Append an envelope whose tag belongs to the replayable set. Callers
    /// are responsible for checking `tag.is_replayable()` first — this
    /// buffer doesn't special-case it so it can be unit-tested directly.
    pub fn append(&mut self, envelope: Envelope, now_ms: u64) {
        let tag = envelope.tag.clone();
        let entries = self.by_type.entry(tag).or_default();
        entries.push(Entry {
            envelope,
            stored_at_ms: now_ms,
        });
        self.total += 1;

        if entries.len() > self.bounds.max_entries_per_type {
            entries.remove(0);
            self.total -= 1;
        }

        self.evict_expired(now_ms);
        self.evict_over_total();
    }

    fn evict_expired(&mut self, now_ms: u64) {
        let max_age = self.bounds.max_age_ms;
        for entries in self.by_type.values_mut() {
            let before = entries.len();
            entries.retain(|e| now_ms.saturating_sub(e.stored_at_ms) <= max_age);
            self.total -= before - entries.len();
        }
    }

    fn evict_over_total(&mut self) {
        while self.total > self.bounds.max_total_entries {
            // Evict the globally oldest entry across all types.
            let oldest_tag = self
                .by_type
                .iter()
                .filter(|(_, entries)| !entries.is_empty())
                .min_by_key(|(_, entries)| entries[0].stored_at_ms)
                .map(|(tag, _)| tag.clone());

            match oldest_tag {
                Some(tag) => {
                    if let Some(entries) = self.by_type.get_mut(&tag) {
                        entries.remove(0);
                        self.total -= 1;
                    }
                }
                None => break,
            }
        }
    }

    /// Every stored envelope whose type is in `subscription`, in stored
    /// order, for replay to a newly-connected peer.
    pub fn snapshot_for(&self, accepts: impl Fn(&Tag) -> bool) -> Vec<Envelope> {
        let mut matched: Vec<&Entry> = self
            .by_type
            .iter()
            .filter(|(tag, _)| accepts(tag))
            .flat_map(|(_, entries)| entries.iter())
            .collect();
        matched.sort_by_key(|e| e.envelope.seq.unwrap_or(0));
        matched.into_iter().map(|e| e.envelope.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;

// src/dedup.rs
//! Item identity and the bounded memory of identifiers already announced.

use std::collections::{HashSet, VecDeque};

use crate::sources::types::{CandidateItem, ItemCategory};

/// Identifiers retained after a cycle's eviction pass.
pub const SEEN_CAP: usize = 100;

/// Stable identifier for a candidate. Announcements are keyed by subject
/// (the same unreleased title reappears in subsequent fetches); feed posts
/// are keyed by the originating post instance's creation timestamp.
pub fn item_id(item: &CandidateItem) -> String {
    match item.category {
        ItemCategory::NewAnnouncement => format!("announcement:{}", item.title),
        ItemCategory::FeedPost => format!("feed:{}", item.posted_at),
    }
}

/// Insertion-ordered set of announced identifiers, bounded at `SEEN_CAP`.
/// In-memory only; the set starts empty on every process start.
#[derive(Debug)]
pub struct SeenSet {
    order: VecDeque<String>,
    index: HashSet<String>,
    cap: usize,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::with_capacity(SEEN_CAP)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(cap.saturating_add(1)),
            index: HashSet::with_capacity(cap.saturating_add(1)),
            cap,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// True iff the item's identifier has not been recorded.
    pub fn is_new(&self, item: &CandidateItem) -> bool {
        !self.contains(&item_id(item))
    }

    /// Append an identifier. Recording an existing identifier is a no-op:
    /// no duplicate entry, no reordering.
    pub fn record(&mut self, id: String) {
        if self.index.insert(id.clone()) {
            self.order.push_back(id);
        }
    }

    /// Drop oldest-inserted identifiers until the bound holds. Relative
    /// order of survivors is preserved.
    pub fn evict_over_capacity(&mut self) {
        while self.order.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.index.remove(&old);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

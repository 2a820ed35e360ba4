//! Fixed-capacity FIFO history of recently used decoration items.

use std::collections::VecDeque;

/// Default number of remembered items per channel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded FIFO. Pushing past capacity evicts the oldest entry; re-pushing an
/// item already present does not refresh its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory {
    items: VecDeque<String>,
    capacity: usize,
}

impl BoundedHistory {
    /// Empty history holding at most `capacity` items (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `item`, evicting the oldest entry when full.
    pub fn push(&mut self, item: impl Into<String>) {
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item.into());
    }

    /// Whether `item` is currently remembered.
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Number of remembered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of remembered items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remembered items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

/// Per-instance decoration history: one queue per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleHistory {
    /// Recently used openers.
    pub openers: BoundedHistory,
    /// Recently used emojis.
    pub emojis: BoundedHistory,
    /// Recently used hashtags.
    pub hashtags: BoundedHistory,
}

impl StyleHistory {
    /// Three empty queues of the same capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            openers: BoundedHistory::new(capacity),
            emojis: BoundedHistory::new(capacity),
            hashtags: BoundedHistory::new(capacity),
        }
    }
}

impl Default for StyleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

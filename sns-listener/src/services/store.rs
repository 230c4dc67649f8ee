use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::NotificationRecord;

/// In-memory log of received notifications plus per-topic counters.
///
/// Both live behind one lock so every reader sees counters that add up to
/// the number of records. The lock is only held for in-memory work.
#[derive(Debug, Default)]
pub struct MessageStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: Vec<NotificationRecord>,
    topics: BTreeMap<String, u64>,
}

/// Consistent copy of the store contents, records in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub records: Vec<NotificationRecord>,
    pub topics: BTreeMap<String, u64>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and bump its topic counter. Returns the new count for
    /// that topic.
    pub fn record(&self, record: NotificationRecord) -> u64 {
        let mut inner = self.lock();
        let count = inner.topics.entry(record.topic_name.clone()).or_insert(0);
        *count += 1;
        let count = *count;
        inner.records.push(record);
        count
    }

    /// Drop every record and counter. Returns the contents as they stand
    /// right after clearing, before any other writer gets the lock.
    pub fn clear(&self) -> StoreSnapshot {
        let mut inner = self.lock();
        inner.records.clear();
        inner.topics.clear();
        inner.snapshot()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn topic_count(&self, topic_name: &str) -> u64 {
        self.lock().topics.get(topic_name).copied().unwrap_or(0)
    }

    // A panic while holding the guard cannot leave the data half-updated
    // (push and increment do not unwind), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StoreInner {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
            topics: self.topics.clone(),
        }
    }
}

impl StoreSnapshot {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter().rev()
    }
}

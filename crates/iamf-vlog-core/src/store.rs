//! Ordered buffer of pending log records.
//!
//! The decoder emits records interleaved across categories and not always in
//! key order. Each category gets its own bucket, kept sorted by key on every
//! insert, so closing the log is a linear drain.
//!
//! ## Ordering
//!
//! ```text
//! insert(Record, 5, a)   bucket: [5a]
//! insert(Record, 2, b)   bucket: [2b, 5a]
//! insert(Record, 5, c)   bucket: [2b, 5a, 5c]   equal keys keep emission order
//! insert(Record, 9, d)   bucket: [2b, 5a, 5c, 9d]
//! ```

use tracing::trace;

use crate::category::Category;
use crate::error::{VlogError, VlogResult};
use crate::record::{LogRecord, Payload};

/// Per-category sorted record buckets.
#[derive(Debug, Default)]
pub struct OrderedLogStore {
    open: bool,
    buckets: [Vec<LogRecord>; Category::COUNT],
}

impl OrderedLogStore {
    /// Create a closed, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store, discarding anything still buffered.
    pub fn open(&mut self) {
        self.clear();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Insert a record, keeping its bucket ascending by key.
    ///
    /// The record goes after every existing record whose key is `<= key`, so
    /// records sharing a key keep the order they were inserted in.
    pub fn insert(&mut self, category: Category, key: u64, payload: Payload) -> VlogResult<()> {
        if !self.open {
            return Err(VlogError::NotOpen);
        }

        let bucket = &mut self.buckets[category.index()];
        let record = LogRecord::new(category, key, payload);

        // Common case: the decoder emits mostly in order.
        if bucket.last().map_or(true, |last| last.key <= key) {
            bucket.push(record);
        } else {
            let position = bucket.partition_point(|existing| existing.key <= key);
            bucket.insert(position, record);
        }

        debug_assert!(
            bucket.windows(2).all(|pair| pair[0].key <= pair[1].key),
            "{} bucket out of order after inserting key {}",
            category,
            key
        );
        trace!(%category, key, len = bucket.len(), "Buffered log record");
        Ok(())
    }

    /// Empty every bucket and close the store.
    ///
    /// Returns the records of each category in `order`, each run ascending by
    /// key. Buckets not named in `order` are emptied too; their records are
    /// dropped.
    pub fn drain_all(&mut self, order: &[Category]) -> Vec<LogRecord> {
        let mut drained = Vec::with_capacity(self.len());
        for category in order {
            drained.append(&mut self.buckets[category.index()]);
        }
        self.clear();
        self.open = false;
        drained
    }

    /// Records currently buffered for `category`, in drain order.
    pub fn bucket(&self, category: Category) -> &[LogRecord] {
        &self.buckets[category.index()]
    }

    /// Total records buffered across all categories.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Total payload bytes buffered across all categories.
    pub fn pending_bytes(&self) -> usize {
        self.buckets
            .iter()
            .flatten()
            .map(|record| record.payload.len())
            .sum()
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            // Release the allocation, not just the elements.
            *bucket = Vec::new();
        }
    }
}

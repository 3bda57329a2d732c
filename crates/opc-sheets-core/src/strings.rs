//! Write-side shared string table

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::style::InternPool;

/// Deduplicating string table for one write session
///
/// Ids ascend in order of first occurrence. Every call to
/// [`intern`](Self::intern) counts towards [`total_count`](Self::total_count),
/// which the table header reports next to the unique count.
#[derive(Debug, Default)]
pub struct StringCache {
    pool: InternPool<Arc<str>>,
    total: AtomicU64,
}

impl StringCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or assign the id of `text`
    pub fn intern(&self, text: &str) -> u32 {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.pool.intern_with(text, || Arc::from(text))
    }

    /// Get a string by id
    pub fn get(&self, id: u32) -> Option<Arc<str>> {
        self.pool.get(id)
    }

    /// Number of references handed out, duplicates included
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Number of distinct strings
    pub fn unique_count(&self) -> usize {
        self.pool.len()
    }

    /// Run `f` over all strings in id order
    pub fn with_strings<R>(&self, f: impl FnOnce(&[Arc<str>]) -> R) -> R {
        self.pool.with_values(f)
    }
}

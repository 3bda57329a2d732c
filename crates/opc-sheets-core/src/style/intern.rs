//! Deduplicating id pools

use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;
use parking_lot::RwLock;

/// Assigns compact ids to values in first-seen order
///
/// Insertion is safe from several threads at once: a lookup takes the read
/// lock, and only a miss escalates to the write lock.
#[derive(Debug)]
pub struct InternPool<K> {
    inner: RwLock<PoolInner<K>>,
}

#[derive(Debug)]
struct PoolInner<K> {
    values: Vec<K>,
    index_map: AHashMap<K, u32>,
}

impl<K: Clone + Eq + Hash> InternPool<K> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(PoolInner {
                values: Vec::with_capacity(64),
                index_map: AHashMap::with_capacity(64),
            }),
        }
    }

    /// Create a pool whose first ids are taken by `seed`
    pub fn with_seed<I: IntoIterator<Item = K>>(seed: I) -> Self {
        let pool = Self::new();
        for value in seed {
            pool.intern(value);
        }
        pool
    }

    /// Get or assign the id of `value`
    pub fn intern(&self, value: K) -> u32 {
        if let Some(&id) = self.inner.read().index_map.get(&value) {
            return id;
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race between the two locks
        if let Some(&id) = inner.index_map.get(&value) {
            return id;
        }
        let id = inner.values.len() as u32;
        inner.values.push(value.clone());
        inner.index_map.insert(value, id);
        id
    }

    /// Like [`intern`](Self::intern), but only builds the owned value on a miss
    pub fn intern_with<Q>(&self, key: &Q, to_owned: impl FnOnce() -> K) -> u32
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(&id) = self.inner.read().index_map.get(key) {
            return id;
        }

        let mut inner = self.inner.write();
        if let Some(&id) = inner.index_map.get(key) {
            return id;
        }
        let value = to_owned();
        let id = inner.values.len() as u32;
        inner.values.push(value.clone());
        inner.index_map.insert(value, id);
        id
    }

    /// Get a value by id
    pub fn get(&self, id: u32) -> Option<K> {
        self.inner.read().values.get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over all values in id order
    pub fn with_values<R>(&self, f: impl FnOnce(&[K]) -> R) -> R {
        f(&self.inner.read().values)
    }
}

impl<K: Clone + Eq + Hash> Default for InternPool<K> {
    fn default() -> Self {
        Self::new()
    }
}

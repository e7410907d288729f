use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::error::StoreError;
use crate::core::record::BidRecord;
use crate::memory::BidList;
use crate::storage::PersistentStore;

/// Counters for cache traffic
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub backfills: AtomicU64,
    pub write_failures: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub backfills: u64,
    pub write_failures: u64,
}

impl CacheStats {
    #[inline(always)]
    fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            backfills: self.backfills.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Keeps the in-memory bid list in step with a persistent store.
///
/// Writes go to the persistent store first and touch the cache only once
/// that succeeds. Reads prefer the cache and backfill it on a miss. The
/// cache can always be rebuilt with [`BidCacheCoordinator::reload`].
pub struct BidCacheCoordinator<P: PersistentStore> {
    persistent: P,
    cache: BidList,
    stats: CacheStats,
}

impl<P: PersistentStore> BidCacheCoordinator<P> {
    /// Wraps the persistent store and fills the cache from it
    pub fn open(persistent: P) -> Result<Self, StoreError> {
        let mut coordinator = Self {
            persistent,
            cache: BidList::new(),
            stats: CacheStats::default(),
        };
        coordinator.reload()?;
        Ok(coordinator)
    }

    /// Rebuilds the cache from durable state, returning how many bids loaded
    pub fn reload(&mut self) -> Result<usize, StoreError> {
        let records = self.persistent.query_all()?;
        self.cache.clear();
        for record in records {
            self.cache.append(record);
        }
        info!(bids = self.cache.len(), "bid cache loaded from persistent store");
        Ok(self.cache.len())
    }

    pub fn add(&mut self, record: BidRecord) -> Result<(), StoreError> {
        record.validate()?;
        if let Err(e) = self.persistent.insert(&record) {
            self.note_write_failure("insert", record.key(), &e);
            return Err(e);
        }

        // A cached entry under this key can only be stale at this point
        if self.cache.remove(record.key()).is_some() {
            warn!(key = record.key(), "dropped stale cache entry before append");
        }
        debug!(key = record.key(), "bid added");
        self.cache.append(record);
        Ok(())
    }

    pub fn get(&mut self, key: &str) -> Result<BidRecord, StoreError> {
        if let Some(record) = self.cache.search(key) {
            CacheStats::increment(&self.stats.hits);
            return Ok(record);
        }
        CacheStats::increment(&self.stats.misses);

        match self.persistent.query_by_key(key)? {
            Some(record) => {
                debug!(key, "cache miss, backfilled from persistent store");
                CacheStats::increment(&self.stats.backfills);
                self.cache.append(record.clone());
                Ok(record)
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    /// Cached bids in current link order
    pub fn get_all(&self) -> Vec<BidRecord> {
        self.cache.get_all()
    }

    /// Replaces a bid. The new value is appended, so it moves to the end of
    /// the cache order.
    pub fn update(&mut self, record: BidRecord) -> Result<(), StoreError> {
        record.validate()?;
        if let Err(e) = self.persistent.update(&record) {
            self.note_write_failure("update", record.key(), &e);
            return Err(e);
        }

        self.cache.remove(record.key());
        debug!(key = record.key(), "bid updated");
        self.cache.append(record);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if let Err(e) = self.persistent.delete(key) {
            self.note_write_failure("delete", key, &e);
            return Err(e);
        }

        self.cache.remove(key);
        debug!(key, "bid deleted");
        Ok(())
    }

    /// Reorders the live cache
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&BidRecord, &BidRecord) -> CmpOrdering,
    {
        self.cache.sort_by(compare);
    }

    /// Sorted copy of the cache; the live order is left alone
    pub fn sorted_bids<F>(&self, compare: F) -> Vec<BidRecord>
    where
        F: FnMut(&BidRecord, &BidRecord) -> CmpOrdering,
    {
        let mut snapshot = self.cache.clone();
        snapshot.sort_by(compare);
        snapshot.get_all()
    }

    /// Binary search over the cache. Leaves the cache sorted by key.
    pub fn binary_search(&mut self, key: &str) -> Result<BidRecord, StoreError> {
        self.cache
            .binary_search(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn persistent(&self) -> &P {
        &self.persistent
    }

    fn note_write_failure(&self, op: &'static str, key: &str, err: &StoreError) {
        CacheStats::increment(&self.stats.write_failures);
        match err {
            StoreError::Conflict(_) | StoreError::NotFound(_) => {
                debug!(op, key, error = %err, "persistent write rejected")
            }
            _ => error!(op, key, error = %err, "persistent write failed"),
        }
    }
}

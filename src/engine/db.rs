use std::cmp::Ordering;
use std::path::Path;

use parking_lot::Mutex;

use crate::core::config::StoreConfig;
use crate::core::error::StoreError;
use crate::core::record::BidRecord;
use crate::engine::coordinator::{BidCacheCoordinator, CacheStatsSnapshot};
use crate::ingest::{BulkIngestPipeline, ImportOptions, ImportReport};
use crate::storage::{PersistentStore, SqliteBidStore};

/// Thread-safe bid database: the cache coordinator behind a single lock.
///
/// Every call takes the lock, reads included, so operations are applied in
/// the order they acquire it. Share it between request handlers with `Arc`.
pub struct BidDatabase<P: PersistentStore> {
    inner: Mutex<BidCacheCoordinator<P>>,
    import_options: ImportOptions,
}

impl BidDatabase<SqliteBidStore> {
    /// Opens the SQLite file named by the config and loads the cache
    pub fn open_sqlite(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = SqliteBidStore::open(&config.database_path)?;
        Self::with_options(store, config.import_options())
    }
}

impl<P: PersistentStore> BidDatabase<P> {
    /// Creates a database over `persistent` with default import options
    pub fn open(persistent: P) -> Result<Self, StoreError> {
        Self::with_options(persistent, ImportOptions::default())
    }

    pub fn with_options(persistent: P, import_options: ImportOptions) -> Result<Self, StoreError> {
        Ok(Self {
            inner: Mutex::new(BidCacheCoordinator::open(persistent)?),
            import_options,
        })
    }

    pub fn add_bid(&self, record: BidRecord) -> Result<(), StoreError> {
        self.inner.lock().add(record)
    }

    pub fn get_bid(&self, key: &str) -> Result<BidRecord, StoreError> {
        self.inner.lock().get(key)
    }

    pub fn get_all_bids(&self) -> Vec<BidRecord> {
        self.inner.lock().get_all()
    }

    pub fn update_bid(&self, record: BidRecord) -> Result<(), StoreError> {
        self.inner.lock().update(record)
    }

    pub fn delete_bid(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().delete(key)
    }

    /// Imports delimited text. The lock is held for the whole import.
    pub fn import_from_source(&self, text: &str) -> Result<ImportReport, StoreError> {
        let pipeline = BulkIngestPipeline::new(self.import_options.clone());
        let mut coordinator = self.inner.lock();
        pipeline.run(&mut *coordinator, text)
    }

    /// Reads a delimited file and imports it. The file is read before the
    /// lock is taken.
    pub fn import_from_path(&self, path: impl AsRef<Path>) -> Result<ImportReport, StoreError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.import_from_source(&text)
    }

    pub fn sort_bids<F>(&self, compare: F)
    where
        F: FnMut(&BidRecord, &BidRecord) -> Ordering,
    {
        self.inner.lock().sort_by(compare)
    }

    pub fn sorted_bids<F>(&self, compare: F) -> Vec<BidRecord>
    where
        F: FnMut(&BidRecord, &BidRecord) -> Ordering,
    {
        self.inner.lock().sorted_bids(compare)
    }

    pub fn binary_search_bid(&self, key: &str) -> Result<BidRecord, StoreError> {
        self.inner.lock().binary_search(key)
    }

    /// Drops the cache and rebuilds it from the persistent store
    pub fn reload(&self) -> Result<usize, StoreError> {
        self.inner.lock().reload()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.inner.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::order;
    use crate::storage::MemoryBidStore;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_database() {
        let db = BidDatabase::open(MemoryBidStore::new()).unwrap();

        for id in ["A1", "A3", "A2"] {
            db.add_bid(BidRecord::new(id)).unwrap();
        }
        db.sort_bids(order::by_key);

        let ids: Vec<_> = db.get_all_bids().into_iter().map(|r| r.auction_id).collect();
        assert_eq!(ids, vec!["A1", "A2", "A3"]);
        assert_eq!(db.binary_search_bid("A2").unwrap().auction_id, "A2");
        assert!(matches!(
            db.binary_search_bid("A9"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let db = Arc::new(BidDatabase::open(MemoryBidStore::new()).unwrap());
        let writers = 4;
        let per_writer = 50;

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for i in 0..per_writer {
                        db.add_bid(BidRecord::new(format!("W{w}-{i:03}"))).unwrap();
                        // reads interleave with writes from other threads
                        db.get_bid(&format!("W{w}-{i:03}")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(db.len(), writers * per_writer);
        assert_eq!(db.reload().unwrap(), writers * per_writer);
    }
}

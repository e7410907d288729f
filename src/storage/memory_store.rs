use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::error::StoreError;
use crate::core::record::BidRecord;
use crate::storage::PersistentStore;

/// Volatile persistent store backed by a concurrent hash map.
///
/// Honors the same contract as the SQLite store, but `query_all` returns
/// bids in no particular order.
#[derive(Debug, Default)]
pub struct MemoryBidStore {
    bids: DashMap<String, BidRecord>,
}

impl MemoryBidStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}

impl PersistentStore for MemoryBidStore {
    fn insert(&self, record: &BidRecord) -> Result<(), StoreError> {
        match self.bids.entry(record.auction_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(record.auction_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn update(&self, record: &BidRecord) -> Result<(), StoreError> {
        match self.bids.get_mut(&record.auction_id) {
            Some(mut existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(record.auction_id.clone())),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.bids
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn query_by_key(&self, key: &str) -> Result<Option<BidRecord>, StoreError> {
        Ok(self.bids.get(key).map(|r| r.value().clone()))
    }

    fn query_all(&self) -> Result<Vec<BidRecord>, StoreError> {
        Ok(self.bids.iter().map(|r| r.value().clone()).collect())
    }
}

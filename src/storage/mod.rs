pub mod memory_store;
pub mod sqlite;

pub use memory_store::MemoryBidStore;
pub use sqlite::SqliteBidStore;

use crate::core::error::StoreError;
use crate::core::record::BidRecord;

/// Durable, key-addressed storage for bids.
///
/// Implementations report a duplicate key on insert as
/// [`StoreError::Conflict`], a missing key on update/delete as
/// [`StoreError::NotFound`], and anything else as [`StoreError::Storage`].
#[cfg_attr(test, mockall::automock)]
pub trait PersistentStore: Send {
    fn insert(&self, record: &BidRecord) -> Result<(), StoreError>;

    fn update(&self, record: &BidRecord) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;

    fn query_by_key(&self, key: &str) -> Result<Option<BidRecord>, StoreError>;

    /// Every stored bid, used to rebuild the cache
    fn query_all(&self) -> Result<Vec<BidRecord>, StoreError>;
}

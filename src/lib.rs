// Auction bid store: linked in-memory cache over a persistent store
// Core modules
pub mod core;
pub mod memory;
pub mod storage;
pub mod engine;
pub mod ingest;
pub mod utils;

// Re-exports of common types
pub use crate::core::error::StoreError;
pub use crate::core::record::{order, BidRecord};
pub use crate::core::config::StoreConfig;
pub use crate::memory::BidList;
pub use crate::engine::{BidCacheCoordinator, BidDatabase};
pub use crate::ingest::{BulkIngestPipeline, ImportOptions, ImportReport};
pub use crate::storage::{MemoryBidStore, PersistentStore, SqliteBidStore};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coordinator;
pub mod db;

pub use coordinator::{BidCacheCoordinator, CacheStats, CacheStatsSnapshot};
pub use db::BidDatabase;

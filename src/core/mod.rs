pub mod config;
pub mod error;
pub mod record;

pub use config::StoreConfig;
pub use error::StoreError;
pub use record::{BidRecord, BID_COLUMNS, BID_FIELD_COUNT};

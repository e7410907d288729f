pub mod bid_list;

pub use bid_list::BidList;

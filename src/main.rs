use anyhow::{Context, Result};
use tracing::info;

use auction_bid_db::{order, utils, BidDatabase, StoreConfig};

fn main() -> Result<()> {
    utils::init_tracing();

    let config = StoreConfig::from_env();
    let db = BidDatabase::open_sqlite(&config)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    info!(bids = db.len(), version = auction_bid_db::VERSION, "bid database ready");

    // Optional CSV file to import
    if let Some(source) = std::env::args().nth(1) {
        let report = db
            .import_from_path(&source)
            .with_context(|| format!("importing {source}"))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    for bid in db.sorted_bids(order::by_key) {
        println!("{}\t{}\t{:.2}", bid.auction_id, bid.auction_title, bid.winning_bid);
    }
    println!("Bids in store: {}", db.len());
    Ok(())
}

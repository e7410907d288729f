use serde::{Deserialize, Serialize};

use crate::core::error::StoreError;

/// Number of columns in the persistent schema and in bulk-import input
pub const BID_FIELD_COUNT: usize = 21;

/// Column names in their fixed positional order
pub const BID_COLUMNS: [&str; BID_FIELD_COUNT] = [
    "auction_title",
    "auction_id",
    "department",
    "close_date",
    "winning_bid",
    "cc_fee",
    "fee_percent",
    "auction_fee_subtotal",
    "auction_fee_total",
    "pay_status",
    "paid_date",
    "asset_number",
    "inventory_id",
    "decal_vehicle_id",
    "vtr_number",
    "receipt_number",
    "cap",
    "expenses",
    "net_sales",
    "fund",
    "business_unit",
];

/// A single auction bid, addressed by its auction identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    /// Auction title
    pub auction_title: String,
    /// Unique auction identifier (the key)
    pub auction_id: String,
    /// Owning department
    pub department: String,
    /// Auction close date, kept as text
    pub close_date: String,
    /// Winning bid amount
    #[serde(default)]
    pub winning_bid: f64,
    /// Card-processing fee
    #[serde(default)]
    pub cc_fee: f64,
    /// Fee percentage
    #[serde(default)]
    pub fee_percent: f64,
    #[serde(default)]
    pub auction_fee_subtotal: f64,
    #[serde(default)]
    pub auction_fee_total: f64,
    pub pay_status: String,
    pub paid_date: String,
    pub asset_number: String,
    pub inventory_id: String,
    pub decal_vehicle_id: String,
    pub vtr_number: String,
    pub receipt_number: String,
    #[serde(default)]
    pub cap: f64,
    #[serde(default)]
    pub expenses: f64,
    #[serde(default)]
    pub net_sales: f64,
    pub fund: String,
    pub business_unit: String,
}

impl BidRecord {
    /// Creates a record with the given key and every other field defaulted
    pub fn new(auction_id: impl Into<String>) -> Self {
        Self {
            auction_id: auction_id.into(),
            ..Self::default()
        }
    }

    /// Sets the auction title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.auction_title = title.into();
        self
    }

    /// Sets the winning bid amount
    pub fn with_winning_bid(mut self, amount: f64) -> Self {
        self.winning_bid = amount;
        self
    }

    /// The key used to address this record
    #[inline(always)]
    pub fn key(&self) -> &str {
        &self.auction_id
    }

    /// Amount fields paired with their column names
    fn amounts(&self) -> [(&'static str, f64); 8] {
        [
            ("winning_bid", self.winning_bid),
            ("cc_fee", self.cc_fee),
            ("fee_percent", self.fee_percent),
            ("auction_fee_subtotal", self.auction_fee_subtotal),
            ("auction_fee_total", self.auction_fee_total),
            ("cap", self.cap),
            ("expenses", self.expenses),
            ("net_sales", self.net_sales),
        ]
    }

    /// Checks the record can be stored: a non-blank key and finite amounts
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.auction_id.trim().is_empty() {
            return Err(StoreError::InvalidRecord(
                "auction_id must not be empty".to_string(),
            ));
        }
        if let Some((name, value)) = self.amounts().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(StoreError::InvalidRecord(format!(
                "{}: {name} must be finite, got {value}",
                self.auction_id
            )));
        }
        Ok(())
    }
}

/// Ready-made comparators for sorting bids
pub mod order {
    use std::cmp::Ordering;

    use super::BidRecord;

    pub fn by_key(a: &BidRecord, b: &BidRecord) -> Ordering {
        a.auction_id.cmp(&b.auction_id)
    }

    pub fn by_title(a: &BidRecord, b: &BidRecord) -> Ordering {
        a.auction_title.cmp(&b.auction_title)
    }

    pub fn by_close_date(a: &BidRecord, b: &BidRecord) -> Ordering {
        a.close_date.cmp(&b.close_date)
    }

    /// Amounts compare with `total_cmp` so NaN never breaks ordering
    pub fn by_winning_bid(a: &BidRecord, b: &BidRecord) -> Ordering {
        a.winning_bid.total_cmp(&b.winning_bid)
    }

    pub fn by_net_sales(a: &BidRecord, b: &BidRecord) -> Ordering {
        a.net_sales.total_cmp(&b.net_sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_record_defaults() {
        let record = BidRecord::new("A100");
        assert_eq!(record.key(), "A100");
        assert_eq!(record.winning_bid, 0.0);
        assert_eq!(record.net_sales, 0.0);
        assert!(record.fund.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        assert!(BidRecord::new("A1").validate().is_ok());
        assert!(matches!(
            BidRecord::new("   ").validate(),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_amounts() {
        let nan = BidRecord::new("A1").with_winning_bid(f64::NAN);
        assert!(matches!(nan.validate(), Err(StoreError::InvalidRecord(_))));

        let mut inf = BidRecord::new("A2");
        inf.net_sales = f64::INFINITY;
        let err = inf.validate().unwrap_err();
        assert!(err.to_string().contains("net_sales"));

        assert!(BidRecord::new("A3").with_winning_bid(-12.5).validate().is_ok());
    }

    #[test]
    fn test_comparators() {
        let low = BidRecord::new("B").with_winning_bid(10.0);
        let high = BidRecord::new("A").with_winning_bid(250.5);
        assert_eq!(order::by_key(&low, &high), Ordering::Greater);
        assert_eq!(order::by_winning_bid(&low, &high), Ordering::Less);
    }

    #[test]
    fn test_json_missing_amounts_default_to_zero() {
        let json = r#"{
            "auction_title": "Truck", "auction_id": "A7", "department": "Fleet",
            "close_date": "", "pay_status": "", "paid_date": "", "asset_number": "",
            "inventory_id": "", "decal_vehicle_id": "", "vtr_number": "",
            "receipt_number": "", "fund": "", "business_unit": ""
        }"#;
        let record: BidRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.auction_id, "A7");
        assert_eq!(record.cap, 0.0);
    }
}

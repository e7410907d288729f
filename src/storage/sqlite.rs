use std::path::Path;

use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};

use crate::core::error::StoreError;
use crate::core::record::BidRecord;
use crate::storage::PersistentStore;

const CREATE_BIDS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS bids (
      auction_title TEXT NOT NULL,
      auction_id TEXT PRIMARY KEY,
      department TEXT NOT NULL,
      close_date TEXT NOT NULL,
      winning_bid REAL NOT NULL,
      cc_fee REAL NOT NULL,
      fee_percent REAL NOT NULL,
      auction_fee_subtotal REAL NOT NULL,
      auction_fee_total REAL NOT NULL,
      pay_status TEXT NOT NULL,
      paid_date TEXT NOT NULL,
      asset_number TEXT NOT NULL,
      inventory_id TEXT NOT NULL,
      decal_vehicle_id TEXT NOT NULL,
      vtr_number TEXT NOT NULL,
      receipt_number TEXT NOT NULL,
      cap REAL NOT NULL,
      expenses REAL NOT NULL,
      net_sales REAL NOT NULL,
      fund TEXT NOT NULL,
      business_unit TEXT NOT NULL
    );
";

const SELECT_COLUMNS: &str = "SELECT auction_title, auction_id, department, close_date, \
     winning_bid, cc_fee, fee_percent, auction_fee_subtotal, auction_fee_total, \
     pay_status, paid_date, asset_number, inventory_id, decal_vehicle_id, vtr_number, \
     receipt_number, cap, expenses, net_sales, fund, business_unit FROM bids";

/// SQLite-backed persistent store, one row per bid keyed by `auction_id`
#[derive(Debug)]
pub struct SqliteBidStore {
    conn: Connection,
}

impl SqliteBidStore {
    /// Opens (or creates) the database file and ensures the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    /// Volatile database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_BIDS_TABLE)?;
        Ok(Self { conn })
    }

    /// Only a primary-key violation is a duplicate; other constraint
    /// failures mean the row itself cannot be stored.
    fn write_error(err: rusqlite::Error, key: &str) -> StoreError {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                StoreError::Conflict(key.to_string())
            }
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                StoreError::InvalidRecord(format!(
                    "{key}: {}",
                    msg.unwrap_or_else(|| e.to_string())
                ))
            }
            other => other.into(),
        }
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<BidRecord> {
        Ok(BidRecord {
            auction_title: row.get(0)?,
            auction_id: row.get(1)?,
            department: row.get(2)?,
            close_date: row.get(3)?,
            winning_bid: row.get(4)?,
            cc_fee: row.get(5)?,
            fee_percent: row.get(6)?,
            auction_fee_subtotal: row.get(7)?,
            auction_fee_total: row.get(8)?,
            pay_status: row.get(9)?,
            paid_date: row.get(10)?,
            asset_number: row.get(11)?,
            inventory_id: row.get(12)?,
            decal_vehicle_id: row.get(13)?,
            vtr_number: row.get(14)?,
            receipt_number: row.get(15)?,
            cap: row.get(16)?,
            expenses: row.get(17)?,
            net_sales: row.get(18)?,
            fund: row.get(19)?,
            business_unit: row.get(20)?,
        })
    }
}

impl PersistentStore for SqliteBidStore {
    fn insert(&self, r: &BidRecord) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "INSERT INTO bids (
              auction_title, auction_id, department, close_date, winning_bid, cc_fee,
              fee_percent, auction_fee_subtotal, auction_fee_total, pay_status, paid_date,
              asset_number, inventory_id, decal_vehicle_id, vtr_number, receipt_number,
              cap, expenses, net_sales, fund, business_unit
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                       ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                r.auction_title,
                r.auction_id,
                r.department,
                r.close_date,
                r.winning_bid,
                r.cc_fee,
                r.fee_percent,
                r.auction_fee_subtotal,
                r.auction_fee_total,
                r.pay_status,
                r.paid_date,
                r.asset_number,
                r.inventory_id,
                r.decal_vehicle_id,
                r.vtr_number,
                r.receipt_number,
                r.cap,
                r.expenses,
                r.net_sales,
                r.fund,
                r.business_unit,
            ],
        );

        result
            .map(|_| ())
            .map_err(|e| Self::write_error(e, &r.auction_id))
    }

    fn update(&self, r: &BidRecord) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "UPDATE bids SET
              auction_title = ?1, department = ?2, close_date = ?3, winning_bid = ?4,
              cc_fee = ?5, fee_percent = ?6, auction_fee_subtotal = ?7, auction_fee_total = ?8,
              pay_status = ?9, paid_date = ?10, asset_number = ?11, inventory_id = ?12,
              decal_vehicle_id = ?13, vtr_number = ?14, receipt_number = ?15, cap = ?16,
              expenses = ?17, net_sales = ?18, fund = ?19, business_unit = ?20
             WHERE auction_id = ?21",
            params![
                r.auction_title,
                r.department,
                r.close_date,
                r.winning_bid,
                r.cc_fee,
                r.fee_percent,
                r.auction_fee_subtotal,
                r.auction_fee_total,
                r.pay_status,
                r.paid_date,
                r.asset_number,
                r.inventory_id,
                r.decal_vehicle_id,
                r.vtr_number,
                r.receipt_number,
                r.cap,
                r.expenses,
                r.net_sales,
                r.fund,
                r.business_unit,
                r.auction_id,
            ],
        );
        let changed = result.map_err(|e| Self::write_error(e, &r.auction_id))?;

        if changed == 0 {
            return Err(StoreError::NotFound(r.auction_id.clone()));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM bids WHERE auction_id = ?1", params![key])?;
        if changed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    fn query_by_key(&self, key: &str) -> Result<Option<BidRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE auction_id = ?1");
        let record = self
            .conn
            .query_row(&sql, params![key], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn query_all(&self) -> Result<Vec<BidRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

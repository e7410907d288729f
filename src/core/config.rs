use std::path::PathBuf;

use crate::ingest::ImportOptions;

/// Configuration for the bid store and bulk import
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Location of the SQLite database file
    pub database_path: PathBuf,
    /// Field separator for bulk-import text
    pub separator: char,
    /// Drop the first data row of every import (legacy behaviour)
    pub skip_first_data_row: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("bids.db"),
            separator: ',',
            skip_first_data_row: false,
        }
    }
}

impl StoreConfig {
    /// Builds a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_path = std::env::var("BID_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);
        let separator = std::env::var("BID_IMPORT_SEPARATOR")
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(defaults.separator);
        let skip_first_data_row = std::env::var("BID_IMPORT_SKIP_FIRST_ROW")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.skip_first_data_row);

        Self {
            database_path,
            separator,
            skip_first_data_row,
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            separator: self.separator,
            skip_first_data_row: self.skip_first_data_row,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

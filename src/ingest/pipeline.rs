use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::error::StoreError;
use crate::core::record::BID_FIELD_COUNT;
use crate::engine::coordinator::BidCacheCoordinator;
use crate::ingest::convert::row_to_record;
use crate::ingest::parser::parse_delimited;
use crate::storage::PersistentStore;

/// Settings for one bulk import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field separator
    pub separator: char,
    /// Ignore the first data row as if it were a second header line
    pub skip_first_data_row: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            skip_first_data_row: false,
        }
    }
}

/// A data row that did not make it into the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    /// Source line number
    pub line: usize,
    /// Key of the row, empty when it could not be read
    pub key: String,
    pub reason: String,
}

/// Outcome of an import that got past parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub attempted: usize,
    pub imported: usize,
    pub skipped: usize,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    fn reject(&mut self, row: usize, line: usize, key: &str, err: &StoreError) {
        self.skipped += 1;
        self.rejected.push(RejectedRow {
            row,
            line,
            key: key.to_string(),
            reason: err.to_string(),
        });
    }
}

/// Turns delimited bid text into stored bids, skipping bad rows.
///
/// The whole text is parsed before anything is written, so a structural
/// error leaves the store untouched. After that, rows with unreadable cells
/// or rejected keys are skipped and the rest carry on. A storage failure
/// stops the import with [`StoreError::ImportAborted`], which carries the
/// report for the rows already stored.
#[derive(Debug, Clone, Default)]
pub struct BulkIngestPipeline {
    options: ImportOptions,
}

impl BulkIngestPipeline {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn run<P: PersistentStore>(
        &self,
        coordinator: &mut BidCacheCoordinator<P>,
        text: &str,
    ) -> Result<ImportReport, StoreError> {
        let table = parse_delimited(text, self.options.separator)?;
        if table.column_count() != BID_FIELD_COUNT {
            return Err(StoreError::CorruptStructure {
                line: 1,
                expected: BID_FIELD_COUNT,
                found: table.column_count(),
            });
        }

        let first = if self.options.skip_first_data_row && !table.rows.is_empty() {
            warn!(line = table.rows[0].line, "skipping first data row");
            1
        } else {
            0
        };

        let mut report = ImportReport::default();
        for (i, parsed) in table.rows.iter().enumerate().skip(first) {
            let row = i + 1;
            report.attempted += 1;

            let record = match row_to_record(row, parsed) {
                Ok(record) => record,
                Err(e) => {
                    warn!(row, line = parsed.line, error = %e, "skipping malformed row");
                    let key = parsed.fields.get(1).map(|k| k.trim()).unwrap_or_default();
                    report.reject(row, parsed.line, key, &e);
                    continue;
                }
            };

            let key = record.auction_id.clone();
            match coordinator.add(record) {
                Ok(()) => report.imported += 1,
                Err(e) if e.is_fatal() => {
                    error!(row, key = %key, error = %e, "bulk import aborted");
                    report.reject(row, parsed.line, &key, &e);
                    return Err(StoreError::ImportAborted {
                        report: Box::new(report),
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(row, key = %key, error = %e, "bid rejected during import");
                    report.reject(row, parsed.line, &key, &e);
                }
            }
        }

        info!(
            attempted = report.attempted,
            imported = report.imported,
            skipped = report.skipped,
            "bulk import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::BID_COLUMNS;
    use crate::storage::{MemoryBidStore, MockPersistentStore};

    fn header() -> String {
        BID_COLUMNS.join(",")
    }

    fn line(id: &str, winning_bid: &str, cap: &str) -> String {
        let mut cells = vec![String::new(); BID_FIELD_COUNT];
        cells[0] = format!("Lot {id}");
        cells[1] = id.to_string();
        cells[4] = winning_bid.to_string();
        cells[16] = cap.to_string();
        cells.join(",")
    }

    fn text(lines: &[String]) -> String {
        let mut out = header();
        for l in lines {
            out.push('\n');
            out.push_str(l);
        }
        out
    }

    fn coordinator() -> BidCacheCoordinator<MemoryBidStore> {
        BidCacheCoordinator::open(MemoryBidStore::new()).unwrap()
    }

    #[test]
    fn test_partial_success() {
        let mut coord = coordinator();
        let input = text(&[
            line("A1", "100", ""),
            line("A2", "$200", ""),
            line("A3", "300", "\"$1,200.50\""),
            line("A4", "abc", ""),
            line("A5", "500", ""),
        ]);

        let report = BulkIngestPipeline::default().run(&mut coord, &input).unwrap();
        assert_eq!(report.attempted, 5);
        assert_eq!(report.imported, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rejected[0].row, 4);
        assert_eq!(report.rejected[0].key, "A4");

        assert_eq!(coord.get("A3").unwrap().cap, 1200.50);
        assert!(matches!(coord.get("A4"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_key_does_not_abort() {
        let mut coord = coordinator();
        let input = text(&[line("A1", "1", ""), line("A1", "2", ""), line("A2", "3", "")]);

        let report = BulkIngestPipeline::default().run(&mut coord, &input).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.rejected[0].reason.contains("already exists"));
        assert_eq!(coord.get("A1").unwrap().winning_bid, 1.0);
    }

    #[test]
    fn test_wrong_field_count_imports_nothing() {
        let mut coord = coordinator();
        let input = text(&[line("A1", "1", ""), "A2,only,three".to_string()]);

        let err = BulkIngestPipeline::default().run(&mut coord, &input).unwrap_err();
        assert!(matches!(err, StoreError::CorruptStructure { line: 3, .. }));
        assert!(coord.is_empty());
    }

    #[test]
    fn test_short_header_is_fatal() {
        let mut coord = coordinator();
        let err = BulkIngestPipeline::default()
            .run(&mut coord, "a,b\n1,2\n")
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptStructure {
                line: 1,
                expected: 21,
                found: 2
            }
        ));
    }

    #[test]
    fn test_skip_first_data_row() {
        let mut coord = coordinator();
        let input = text(&[line("A1", "1", ""), line("A2", "2", "")]);
        let pipeline = BulkIngestPipeline::new(ImportOptions {
            skip_first_data_row: true,
            ..ImportOptions::default()
        });

        let report = pipeline.run(&mut coord, &input).unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.imported, 1);
        assert!(matches!(coord.get("A1"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_storage_failure_aborts_import() {
        let mut mock = MockPersistentStore::new();
        mock.expect_query_all().returning(|| Ok(Vec::new()));
        mock.expect_insert()
            .times(1)
            .returning(|_| Err(StoreError::Storage("database is locked".to_string())));
        let mut coord = BidCacheCoordinator::open(mock).unwrap();

        let input = text(&[line("A1", "1", ""), line("A2", "2", "")]);
        let err = BulkIngestPipeline::default().run(&mut coord, &input).unwrap_err();
        match err {
            StoreError::ImportAborted { report, source } => {
                assert_eq!(report.imported, 0);
                assert!(matches!(*source, StoreError::Storage(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(coord.is_empty());
    }

    #[test]
    fn test_storage_failure_mid_import_reports_stored_rows() {
        let mut mock = MockPersistentStore::new();
        mock.expect_query_all().returning(|| Ok(Vec::new()));
        let mut inserts = 0;
        mock.expect_insert().times(3).returning(move |_| {
            inserts += 1;
            if inserts <= 2 {
                Ok(())
            } else {
                Err(StoreError::Storage("disk full".to_string()))
            }
        });
        let mut coord = BidCacheCoordinator::open(mock).unwrap();

        let input = text(&[
            line("A1", "1", ""),
            line("A2", "2", ""),
            line("A3", "3", ""),
            line("A4", "4", ""),
        ]);
        let err = BulkIngestPipeline::default().run(&mut coord, &input).unwrap_err();
        assert!(err.is_fatal());

        let StoreError::ImportAborted { report, source } = err else {
            panic!("expected an aborted import");
        };
        assert!(matches!(*source, StoreError::Storage(_)));
        assert_eq!(report.attempted, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rejected[0].key, "A3");
        assert_eq!(report.rejected[0].row, 3);

        // rows stored before the failure stay cached
        assert_eq!(coord.len(), 2);
        assert!(coord.get("A2").is_ok());
    }
}

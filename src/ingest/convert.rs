use crate::core::error::StoreError;
use crate::core::record::{BidRecord, BID_COLUMNS, BID_FIELD_COUNT};
use crate::ingest::parser::ParsedRow;

/// Maps one parsed row onto a bid, by position.
///
/// `row` is the data-row number used in field errors; structural errors
/// report the source line of `parsed`.
pub fn row_to_record(row: usize, parsed: &ParsedRow) -> Result<BidRecord, StoreError> {
    let fields = &parsed.fields;
    if fields.len() != BID_FIELD_COUNT {
        return Err(StoreError::CorruptStructure {
            line: parsed.line,
            expected: BID_FIELD_COUNT,
            found: fields.len(),
        });
    }

    let text = |i: usize| clean_text(&fields[i]);
    let amount = |i: usize| {
        parse_amount(&fields[i]).map_err(|reason| StoreError::MalformedField {
            row,
            field: BID_COLUMNS[i],
            reason,
        })
    };

    let record = BidRecord {
        auction_title: text(0),
        auction_id: text(1),
        department: text(2),
        close_date: text(3),
        winning_bid: amount(4)?,
        cc_fee: amount(5)?,
        fee_percent: amount(6)?,
        auction_fee_subtotal: amount(7)?,
        auction_fee_total: amount(8)?,
        pay_status: text(9),
        paid_date: text(10),
        asset_number: text(11),
        inventory_id: text(12),
        decal_vehicle_id: text(13),
        vtr_number: text(14),
        receipt_number: text(15),
        cap: amount(16)?,
        expenses: amount(17)?,
        net_sales: amount(18)?,
        fund: text(19),
        business_unit: text(20),
    };

    if record.auction_id.is_empty() {
        return Err(StoreError::MalformedField {
            row,
            field: BID_COLUMNS[1],
            reason: "empty auction id".to_string(),
        });
    }
    Ok(record)
}

/// Trims a text cell and drops one pair of surrounding quotes
pub fn clean_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => trimmed.to_string(),
    }
}

/// Parses a money-like cell such as ` $1,200.50 `. Empty means 0.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let cleaned = clean_text(raw);
    let unprefixed = cleaned.trim().trim_start_matches('$').trim();
    let digits: String = unprefixed.chars().filter(|c| *c != ',').collect();

    if digits.is_empty() {
        return Ok(0.0);
    }
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("non-finite amount {raw:?}")),
        Err(e) => Err(format!("{raw:?}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(overrides: &[(usize, &str)]) -> ParsedRow {
        let mut row: Vec<String> = vec![String::new(); BID_FIELD_COUNT];
        row[1] = "A100".to_string();
        for (i, v) in overrides {
            row[*i] = v.to_string();
        }
        ParsedRow { line: 2, fields: row }
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("").unwrap(), 0.0);
        assert_eq!(parse_amount("   ").unwrap(), 0.0);
        assert_eq!(parse_amount("42").unwrap(), 42.0);
        assert_eq!(parse_amount(" $ 17.25 ").unwrap(), 17.25);
        assert_eq!(parse_amount("$1,200.50").unwrap(), 1200.50);
        assert_eq!(parse_amount("\"$1,200.50\"").unwrap(), 1200.50);
        assert_eq!(parse_amount("-3.5").unwrap(), -3.5);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12..3").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Truck  "), "Truck");
        assert_eq!(clean_text("\"Smith, John\""), "Smith, John");
        assert_eq!(clean_text("\"say \"\"hi\"\"\""), "say \"hi\"");
        assert_eq!(clean_text("\""), "\"");
    }

    #[test]
    fn test_row_to_record_positions() {
        let row = fields(&[
            (0, "Ford F-150"),
            (2, "Fleet"),
            (4, "$5,000"),
            (16, "\"$1,200.50\""),
            (20, "BU-7"),
        ]);
        let record = row_to_record(1, &row).unwrap();
        assert_eq!(record.auction_title, "Ford F-150");
        assert_eq!(record.auction_id, "A100");
        assert_eq!(record.department, "Fleet");
        assert_eq!(record.winning_bid, 5000.0);
        assert_eq!(record.cap, 1200.50);
        assert_eq!(record.expenses, 0.0);
        assert_eq!(record.business_unit, "BU-7");
    }

    #[test]
    fn test_row_to_record_reports_bad_field() {
        let err = row_to_record(4, &fields(&[(4, "abc")])).unwrap_err();
        match err {
            StoreError::MalformedField { row, field, .. } => {
                assert_eq!(row, 4);
                assert_eq!(field, "winning_bid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_reports_source_line() {
        let parsed = ParsedRow {
            line: 9,
            fields: vec!["A1".to_string(), "Lot".to_string()],
        };
        let err = row_to_record(3, &parsed).unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptStructure {
                line: 9,
                expected: 21,
                found: 2
            }
        ));
    }

    #[test]
    fn test_row_to_record_requires_key() {
        let err = row_to_record(2, &fields(&[(1, "  ")])).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MalformedField {
                field: "auction_id",
                ..
            }
        ));
    }
}

use crate::core::error::StoreError;

/// Header plus raw data rows split out of delimited text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub header: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number in the source text
    pub line: usize,
    pub fields: Vec<String>,
}

impl ParsedTable {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// Splits `text` into a header and rows of raw fields.
///
/// Blank lines are ignored. A `"` toggles quoting, and separators inside
/// quotes do not end a field. Quotes are kept in the raw field. Any data
/// line whose field count differs from the header fails the whole parse.
pub fn parse_delimited(text: &str, separator: char) -> Result<ParsedTable, StoreError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or(StoreError::EmptyInput)?;
    let header: Vec<String> = split_line(header_line, separator)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, raw) in lines {
        let fields = split_line(raw, separator);
        if fields.len() != header.len() {
            return Err(StoreError::CorruptStructure {
                line,
                expected: header.len(),
                found: fields.len(),
            });
        }
        rows.push(ParsedRow { line, fields });
    }

    Ok(ParsedTable { header, rows })
}

/// Splits one line on `separator`, honouring quote toggling
pub fn split_line(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            fields.push(line[start..i].to_string());
            start = i + c.len_utf8();
        }
    }
    fields.push(line[start..].to_string());
    fields
}

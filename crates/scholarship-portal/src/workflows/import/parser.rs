use std::collections::BTreeMap;
use std::io::Read;

use serde_json::Value;

pub(crate) const REGNO_COLUMN: &str = "student_regno";
pub(crate) const ID_COLUMN: &str = "id";
pub(crate) const STATUS_COLUMN: &str = "status";

/// One CSV row split into the identity columns and the form payload.
#[derive(Debug)]
pub(crate) struct ApplicationRow {
    pub(crate) line: usize,
    pub(crate) id: Option<String>,
    pub(crate) student_regno: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) data: BTreeMap<String, Value>,
}

/// Parsed export: whether the registration column exists, plus every row.
pub(crate) struct ParsedExport {
    pub(crate) has_regno_column: bool,
    pub(crate) rows: Vec<ApplicationRow>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<ParsedExport, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let has_regno_column = headers
        .iter()
        .any(|header| header.eq_ignore_ascii_case(REGNO_COLUMN));

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .and_then(|position| usize::try_from(position.line()).ok())
            .unwrap_or(index + 2);
        let mut row = ApplicationRow {
            line,
            id: None,
            student_regno: None,
            status: None,
            data: BTreeMap::new(),
        };

        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() || header.is_empty() {
                continue;
            }

            if header.eq_ignore_ascii_case(REGNO_COLUMN) {
                row.student_regno = Some(cell.to_string());
            } else if header.eq_ignore_ascii_case(ID_COLUMN) {
                row.id = Some(cell.to_string());
            } else if header.eq_ignore_ascii_case(STATUS_COLUMN) {
                row.status = Some(cell.to_string());
            } else {
                row.data
                    .insert(header.clone(), Value::String(cell.to_string()));
            }
        }

        rows.push(row);
    }

    Ok(ParsedExport {
        has_regno_column,
        rows,
    })
}

/// Header cleanup: drops byte-order and zero-width marks and surrounding
/// whitespace. Case is kept because criteria match field names exactly.
pub(crate) fn normalize_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

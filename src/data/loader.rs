use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("parsing spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported JSON layout: {0}")]
    JsonLayout(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("first sheet has no header row")]
    EmptySheet,

    #[error("load worker failed to start or panicked")]
    Worker,
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where a sheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Interpret user input: `http://` / `https://` → URL, anything else → path.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::Path(PathBuf::from(input))
        }
    }

    /// Lower-case file extension, ignoring any URL query or fragment.
    pub fn extension(&self) -> String {
        let name = match self {
            Source::Path(p) => p
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string(),
            Source::Url(u) => {
                let without_tail = u.split(['?', '#']).next().unwrap_or("");
                without_tail.rsplit('/').next().unwrap_or("").to_string()
            }
        };
        Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            Source::Path(path) => std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            }),
            Source::Url(url) => {
                let http = |source| LoadError::Http {
                    url: url.clone(),
                    source,
                };
                let response = reqwest::blocking::get(url.as_str())
                    .and_then(|r| r.error_for_status())
                    .map_err(http)?;
                let bytes = response.bytes().map_err(http)?;
                Ok(bytes.to_vec())
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => write!(f, "{u}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch and parse a source. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first sheet, first row is the header
/// * `.csv`  – header row, one record per line
/// * `.json` – `[{ "col": value, ... }, ...]`
///
/// Anything else is handed to the spreadsheet reader, which sniffs the bytes.
pub fn load(source: &Source) -> Result<Dataset> {
    let bytes = source.fetch()?;
    match source.extension().as_str() {
        "csv" => parse_csv(&bytes),
        "json" => parse_json(&bytes),
        _ => parse_spreadsheet(bytes),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

pub fn parse_spreadsheet(bytes: Vec<u8>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheets)??;
    dataset_from_range(&range)
}

fn dataset_from_range(range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::EmptySheet)?;
    let columns = header_names(header_row.iter().map(header_text));

    let mut out = Vec::new();
    for cells in rows {
        let values: Vec<CellValue> = cells.iter().map(cell_value).collect();
        if values.iter().all(CellValue::is_null) {
            continue;
        }
        let row: Row = columns.iter().cloned().zip(values).collect();
        out.push(row);
    }

    Ok(Dataset::new(columns, out))
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Make header names usable as keys: blanks become `__EMPTY`, `__EMPTY_1`, …
/// and repeated names get `_1`, `_2`, … suffixes.
fn header_names(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw {
        let base = if name.trim().is_empty() {
            "__EMPTY".to_string()
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while names.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        names.push(candidate);
    }
    names
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Short records are accepted; their missing trailing cells are null.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let columns = header_names(reader.headers()?.iter().map(str::to_string));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = columns
            .iter()
            .cloned()
            .zip(record.iter().map(CellValue::from_field))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "name": "a", "score": 1.5 },
///   { "name": "b", "score": null, "extra": "only here" }
/// ]
/// ```
pub fn parse_json(bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::JsonLayout("expected a top-level array".into()))?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::JsonLayout(format!("record {i} is not an object")))?;
        rows.push(
            obj.iter()
                .map(|(key, val)| (key.clone(), json_to_cell(val)))
                .collect(),
        );
    }

    Ok(Dataset::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Null => CellValue::Null,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => CellValue::Number(f),
            None => CellValue::Text(n.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn source_parse_distinguishes_urls() {
        assert_eq!(
            Source::parse("https://host/data.xlsx"),
            Source::Url("https://host/data.xlsx".into())
        );
        assert_eq!(
            Source::parse(" sheets/book.xlsx "),
            Source::Path(PathBuf::from("sheets/book.xlsx"))
        );
    }

    #[test]
    fn extension_ignores_query_and_fragment() {
        let src = Source::parse("https://host/files/Report.CSV?token=abc#top");
        assert_eq!(src.extension(), "csv");
        assert_eq!(Source::parse("https://host/").extension(), "");
        assert_eq!(Source::parse("book.xlsx").extension(), "xlsx");
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let names = header_names(
            ["A", "", "A", " ", "A"].into_iter().map(String::from),
        );
        assert_eq!(names, vec!["A", "__EMPTY", "A_1", "__EMPTY_1", "A_2"]);
    }

    #[test]
    fn csv_short_rows_and_blanks_become_null() {
        let ds = parse_csv(b"A,B,C\n,1,x\n2\n").unwrap();
        assert_eq!(ds.columns, vec!["A", "B", "C"]);
        assert_eq!(ds.len(), 2);
        let first = &ds.rows()[0];
        assert_eq!(first.get("A"), Some(&CellValue::Null));
        assert_eq!(first.get("B"), Some(&CellValue::Number(1.0)));
        assert_eq!(first.get("C"), Some(&CellValue::Text("x".into())));
        let second = &ds.rows()[1];
        assert_eq!(second.get("A"), Some(&CellValue::Number(2.0)));
        assert_eq!(second.get("C"), Some(&CellValue::Null));
    }

    #[test]
    fn json_heterogeneous_keys_are_unioned() {
        let ds = parse_json(br#"[{"A": null, "B": 1}, {"B": "t", "C": true}]"#).unwrap();
        assert_eq!(ds.columns, vec!["A", "B", "C"]);
        assert_eq!(ds.rows()[0].get("C"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[1].get("A"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[1].get("C"), Some(&CellValue::Text("true".into())));
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(matches!(
            parse_json(br#"{"A": 1}"#),
            Err(LoadError::JsonLayout(_))
        ));
    }

    #[test]
    fn spreadsheet_round_trip_through_xlsx_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "A").unwrap();
        sheet.write_string(0, 1, "B").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        sheet.write_string(2, 0, "x").unwrap();
        // row 3 is blank and must be skipped
        sheet.write_number(4, 0, 2.5).unwrap();
        workbook.save(&path).unwrap();

        let ds = load(&Source::Path(path)).unwrap();
        assert_eq!(ds.columns, vec!["A", "B"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows()[0].get("A"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[0].get("B"), Some(&CellValue::Number(1.0)));
        assert_eq!(ds.rows()[1].get("A"), Some(&CellValue::Text("x".into())));
        assert_eq!(ds.rows()[1].get("B"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[2].get("A"), Some(&CellValue::Number(2.5)));
    }

    #[test]
    fn load_dispatches_csv_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"name,score\nann,\n").unwrap();
        let ds = load(&Source::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(ds.rows()[0].get("score"), Some(&CellValue::Null));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(&Source::parse("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(parse_spreadsheet(b"not a workbook".to_vec()).is_err());
    }
}

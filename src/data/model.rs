use std::collections::BTreeMap;
use std::fmt;

use crate::config::NULL_MARKER;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded sheet
// ---------------------------------------------------------------------------

/// A sheet cell. Anything the reader cannot express as a number is kept as
/// text; blanks are an explicit `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used when the cell is written to a delimited file. Null is empty.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Parse a raw text field: empty → Null, numeric → Number, else Text.
    /// Only fields whose text is exactly the number's canonical form become
    /// `Number`, so `"02134"`, `"1e3"` or `" 5"` stay text.
    pub fn from_field(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v.to_string() == s => CellValue::Number(v),
            _ => CellValue::Text(s.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "{NULL_MARKER}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the sheet
// ---------------------------------------------------------------------------

/// One sheet row: column name → value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    /// Value at `column`, or `None` when the row has no such column.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Null check where an absent column counts as null.
    pub fn is_null_at(&self, column: &str) -> bool {
        self.get(column).map_or(true, CellValue::is_null)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded sheet
// ---------------------------------------------------------------------------

/// The parsed first sheet. Rows keep source order and never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// Displayed columns, in source order.
    pub columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, filling every missing column with `Null` so that all
    /// rows share the same column set.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                for col in &columns {
                    row.cells.entry(col.clone()).or_insert(CellValue::Null);
                }
                row
            })
            .collect();
        Dataset { columns, rows }
    }

    /// Build from rows alone; columns are the union of keys in first-seen order.
    pub fn from_rows(rows: Vec<Vec<(String, CellValue)>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for (key, _) in row {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = rows.into_iter().map(Row::from_iter).collect();
        Dataset::new(columns, rows)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_missing_columns_with_null() {
        let ds = Dataset::from_rows(vec![
            vec![("A".into(), CellValue::Number(1.0))],
            vec![("B".into(), CellValue::Text("x".into()))],
        ]);
        assert_eq!(ds.columns, vec!["A", "B"]);
        assert_eq!(ds.rows()[0].get("B"), Some(&CellValue::Null));
        assert_eq!(ds.rows()[1].get("A"), Some(&CellValue::Null));
    }

    #[test]
    fn absent_column_counts_as_null() {
        let row: Row = [("A", CellValue::Number(2.0))].into_iter().collect();
        assert!(row.is_null_at("missing"));
        assert!(!row.is_null_at("A"));
    }

    #[test]
    fn field_parsing() {
        assert_eq!(CellValue::from_field(""), CellValue::Null);
        assert_eq!(CellValue::from_field("2.5"), CellValue::Number(2.5));
        assert_eq!(CellValue::from_field("abc"), CellValue::Text("abc".into()));
        assert_eq!(CellValue::from_field("NaN"), CellValue::Text("NaN".into()));
        assert_eq!(CellValue::from_field("-3"), CellValue::Number(-3.0));
    }

    #[test]
    fn non_canonical_numbers_stay_text() {
        for raw in ["02134", "1e3", " 5", "5 ", "1.50", "+1", ".5"] {
            assert_eq!(CellValue::from_field(raw), CellValue::Text(raw.into()), "{raw:?}");
        }
    }

    #[test]
    fn display_uses_null_marker_and_short_numbers() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Number(1.0).to_string(), "1");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Null.to_field(), "");
    }
}

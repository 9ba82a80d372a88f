use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};

use crate::config::EXPORT_SHEET_NAME;
use crate::data::filter::FilteredView;
use crate::data::model::{CellValue, Dataset};

/// Write the view to a single-sheet workbook. Header cells are bold; null
/// cells are left empty.
pub fn save_xlsx(path: &Path, dataset: &Dataset, view: &FilteredView) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (c, name) in dataset.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(c)?, name, &header)?;
    }

    for (r, row) in view.rows(dataset).enumerate() {
        let row_idx = row_num(r + 1)?;
        for (c, name) in dataset.columns.iter().enumerate() {
            match row.get(name) {
                Some(CellValue::Text(s)) => {
                    worksheet.write_string(row_idx, col_num(c)?, s)?;
                }
                Some(CellValue::Number(n)) => {
                    worksheet.write_number(row_idx, col_num(c)?, *n)?;
                }
                Some(CellValue::Null) | None => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving workbook {}", path.display()))?;
    Ok(())
}

fn row_num(idx: usize) -> Result<RowNum> {
    RowNum::try_from(idx).with_context(|| format!("row {idx} exceeds the sheet limit"))
}

fn col_num(idx: usize) -> Result<ColNum> {
    ColNum::try_from(idx).with_context(|| format!("column {idx} exceeds the sheet limit"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_auto_from_rs, Reader};

    use super::*;
    use crate::data::filter::{Combinator, FilterSpec, NullMode};
    use crate::data::loader::parse_spreadsheet;

    #[test]
    fn exported_view_reads_back_with_sheet_name() {
        let ds = Dataset::from_rows(vec![
            vec![
                ("A".into(), CellValue::Null),
                ("B".into(), CellValue::Number(1.5)),
            ],
            vec![
                ("A".into(), CellValue::Text("x".into())),
                ("B".into(), CellValue::Null),
            ],
            vec![
                ("A".into(), CellValue::Null),
                ("B".into(), CellValue::Text("kept".into())),
            ],
        ]);
        let spec = FilterSpec::from_inputs("A", "B", Combinator::And, NullMode::RequireNonNull)
            .unwrap();
        let view = FilteredView::all(&ds).refine(&ds, &spec);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        save_xlsx(&path, &ds, &view).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(workbook.sheet_names(), vec![EXPORT_SHEET_NAME.to_string()]);

        let back = parse_spreadsheet(bytes).unwrap();
        assert_eq!(back.columns, vec!["A", "B"]);
        assert_eq!(back.len(), 2);
        assert_eq!(back.rows()[0].get("A"), Some(&CellValue::Null));
        assert_eq!(back.rows()[0].get("B"), Some(&CellValue::Number(1.5)));
        assert_eq!(back.rows()[1].get("B"), Some(&CellValue::Text("kept".into())));
    }
}

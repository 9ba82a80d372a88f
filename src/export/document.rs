use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::data::filter::FilteredView;
use crate::data::model::Dataset;

// A4 landscape, millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 5.5;
const FONT_SIZE: f32 = 8.0;
/// Average Helvetica advance at `FONT_SIZE`, in mm.
const CHAR_WIDTH: f32 = FONT_SIZE * 0.3528 * 0.55;
const CELL_PADDING: f32 = 1.0;

/// Data rows that fit below the header on one page.
fn rows_per_page() -> usize {
    ((PAGE_HEIGHT - 2.0 * MARGIN - ROW_HEIGHT) / ROW_HEIGHT).floor() as usize
}

/// Split `n_rows` into page-sized index ranges; an empty table still gets one page.
fn page_ranges(n_rows: usize) -> Vec<std::ops::Range<usize>> {
    let per_page = rows_per_page().max(1);
    if n_rows == 0 {
        return vec![0..0];
    }
    (0..n_rows)
        .step_by(per_page)
        .map(|start| start..(start + per_page).min(n_rows))
        .collect()
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
fn fit_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Render the view as a paginated table. The header row repeats on every page.
pub fn save_pdf(path: &Path, dataset: &Dataset, view: &FilteredView) -> Result<()> {
    let cells: Vec<Vec<String>> = view
        .rows(dataset)
        .map(|row| {
            dataset
                .columns
                .iter()
                .map(|col| row.get(col).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let n_cols = dataset.columns.len().max(1);
    let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / n_cols as f32;
    let max_chars = (((col_width - 2.0 * CELL_PADDING) / CHAR_WIDTH).floor() as usize).max(1);

    let (doc, first_page, first_layer) =
        PdfDocument::new("Table export", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("loading Helvetica")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("loading Helvetica-Bold")?;

    for (page_no, range) in page_ranges(cells.len()).into_iter().enumerate() {
        let layer = if page_no == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "table");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
        draw_row(&layer, &bold, &dataset.columns, y, col_width, max_chars);
        rule(&layer, y - 1.5);

        if cells.is_empty() {
            y -= ROW_HEIGHT;
            layer.use_text("No data available", FONT_SIZE, Mm(MARGIN), Mm(y), &regular);
        }
        for row in &cells[range] {
            y -= ROW_HEIGHT;
            draw_row(&layer, &regular, row, y, col_width, max_chars);
        }
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .with_context(|| format!("writing PDF {}", path.display()))?;
    Ok(())
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    texts: &[String],
    y: f32,
    col_width: f32,
    max_chars: usize,
) {
    for (i, text) in texts.iter().enumerate() {
        let x = MARGIN + i as f32 * col_width + CELL_PADDING;
        layer.use_text(fit_text(text, max_chars), FONT_SIZE, Mm(x), Mm(y), font);
    }
}

fn rule(layer: &PdfLayerReference, y: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
        ],
        is_closed: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn pages_split_rows_evenly() {
        let per_page = rows_per_page();
        assert!(per_page > 10);
        assert_eq!(page_ranges(0), vec![0..0]);
        assert_eq!(page_ranges(per_page).len(), 1);
        let ranges = page_ranges(per_page * 2 + 1);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], per_page * 2..per_page * 2 + 1);
    }

    #[test]
    fn fit_text_truncates_with_marker() {
        assert_eq!(fit_text("short", 10), "short");
        assert_eq!(fit_text("abcdefghij", 6), "abc...");
        assert_eq!(fit_text("abcdef", 2), "ab");
    }

    #[test]
    fn writes_a_pdf_file() {
        let rows = (0..100)
            .map(|i| {
                vec![
                    ("n".to_string(), CellValue::Number(i as f64)),
                    ("gap".to_string(), CellValue::Null),
                ]
            })
            .collect();
        let ds = Dataset::from_rows(rows);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.pdf");
        save_pdf(&path, &ds, &FilteredView::all(&ds)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_view_still_produces_a_document() {
        let ds = Dataset::from_rows(vec![vec![("A".into(), CellValue::Null)]]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        save_pdf(&path, &ds, &FilteredView::default()).unwrap();
        assert!(path.exists());
    }
}

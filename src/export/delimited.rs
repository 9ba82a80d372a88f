use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::filter::FilteredView;
use crate::data::model::{CellValue, Dataset};

/// Write the view as comma-separated text: a header row, then one record per
/// row. Null cells are empty fields.
pub fn write_csv<W: Write>(writer: W, dataset: &Dataset, view: &FilteredView) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&dataset.columns)
        .context("writing CSV header")?;
    for (i, row) in view.rows(dataset).enumerate() {
        let fields = dataset
            .columns
            .iter()
            .map(|col| row.get(col).map(CellValue::to_field).unwrap_or_default());
        wtr.write_record(fields)
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn save_csv(path: &Path, dataset: &Dataset, view: &FilteredView) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, dataset, view)
}

/// Export sinks for the current view.
///
/// Every format is written straight from the dataset and the view, so an
/// export always carries all visible rows regardless of scrolling.
pub mod delimited;
pub mod document;
pub mod raster;
pub mod sheet;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::DEFAULT_EXPORT_NAME;
use crate::data::filter::FilteredView;
use crate::data::model::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Jpg,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Xlsx,
        ExportFormat::Csv,
        ExportFormat::Jpg,
        ExportFormat::Jpeg,
        ExportFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Xlsx => write!(f, "Excel (.xlsx)"),
            ExportFormat::Csv => write!(f, "CSV (.csv)"),
            ExportFormat::Jpg => write!(f, "Image (.jpg)"),
            ExportFormat::Jpeg => write!(f, "Image (.jpeg)"),
            ExportFormat::Pdf => write!(f, "PDF (.pdf)"),
        }
    }
}

/// One confirmed export: a base filename and a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub filename: String,
    pub format: ExportFormat,
}

impl ExportRequest {
    /// `<dir>/<filename>.<ext>`, with a blank filename replaced by the default.
    pub fn target_path(&self, dir: &Path) -> PathBuf {
        let name = match self.filename.trim() {
            "" => DEFAULT_EXPORT_NAME,
            name => name,
        };
        dir.join(format!("{name}.{}", self.format.extension()))
    }
}

/// Write the view in the requested format. Returns the written path.
pub fn export_table(
    request: &ExportRequest,
    dir: &Path,
    dataset: &Dataset,
    view: &FilteredView,
) -> Result<PathBuf> {
    let path = request.target_path(dir);
    match request.format {
        ExportFormat::Xlsx => sheet::save_xlsx(&path, dataset, view)?,
        ExportFormat::Csv => delimited::save_csv(&path, dataset, view)?,
        ExportFormat::Pdf => document::save_pdf(&path, dataset, view)?,
        ExportFormat::Jpg | ExportFormat::Jpeg => raster::save_jpeg(&path, dataset, view)?,
    }
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn blank_filename_falls_back_to_default() {
        let req = ExportRequest {
            filename: "   ".into(),
            format: ExportFormat::Csv,
        };
        assert_eq!(req.target_path(Path::new("out")), PathBuf::from("out/download.csv"));

        let req = ExportRequest {
            filename: " report ".into(),
            format: ExportFormat::Jpeg,
        };
        assert_eq!(req.target_path(Path::new("out")), PathBuf::from("out/report.jpeg"));
    }

    #[test]
    fn table_export_writes_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::from_rows(vec![vec![
            ("A".into(), CellValue::Null),
            ("B".into(), CellValue::Number(3.0)),
        ]]);
        let view = FilteredView::all(&ds);
        for format in ExportFormat::ALL {
            let req = ExportRequest {
                filename: String::new(),
                format,
            };
            let path = export_table(&req, dir.path(), &ds, &view).unwrap();
            assert!(path.exists(), "{format} export missing");
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}

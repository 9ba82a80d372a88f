use std::path::PathBuf;

use crate::config::{AppConfig, DEFAULT_EXPORT_NAME};
use crate::data::filter::{filter, Combinator, FilterError, FilterSpec, FilteredView, NullMode};
use crate::data::loader::Source;
use crate::data::model::Dataset;
use crate::data::worker::{LoadOutcome, LoadWorker};
use crate::export::{self, ExportFormat, ExportRequest};

// ---------------------------------------------------------------------------
// Sub-states
// ---------------------------------------------------------------------------

/// Raw values of the filter controls, validated on apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInputs {
    pub primary_column: String,
    /// Comma-separated.
    pub check_columns: String,
    pub combinator: Combinator,
    pub null_mode: NullMode,
    /// Filter the rows already shown instead of the whole dataset.
    pub narrow: bool,
}

/// The export dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDialog {
    pub open: bool,
    pub filename: String,
    pub format: ExportFormat,
}

impl Default for ExportDialog {
    fn default() -> Self {
        Self {
            open: false,
            filename: DEFAULT_EXPORT_NAME.to_string(),
            format: ExportFormat::default(),
        }
    }
}

/// The "Open URL…" prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlPrompt {
    pub open: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Owns the loaded dataset and
/// the current view; rendering and export borrow them from here.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Rows currently shown.
    pub view: FilteredView,

    /// Predicate that produced `view`, if any.
    pub active_filter: Option<FilterSpec>,

    pub inputs: FilterInputs,
    pub export: ExportDialog,
    pub url_prompt: UrlPrompt,

    /// Blocking notice; the UI shows it in a modal window until dismissed.
    pub notice: Option<String>,

    /// Status line message.
    pub status: Option<Status>,

    /// Background loads.
    pub loader: LoadWorker,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            dataset: None,
            view: FilteredView::default(),
            active_filter: None,
            inputs: FilterInputs::default(),
            export: ExportDialog::default(),
            url_prompt: UrlPrompt::default(),
            notice: None,
            status: None,
            loader: LoadWorker::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    // -- loading --

    /// Start a background load. `notify` wakes the UI when it finishes.
    pub fn request_load<F>(&mut self, source: Source, notify: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.status = Some(Status::Info(format!("Loading {source}…")));
        self.loader.request(source, notify);
    }

    /// Apply a finished load, if one is ready. Returns true when state changed.
    pub fn poll_loader(&mut self) -> bool {
        match self.loader.poll() {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome.result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    dataset.len(),
                    dataset.columns,
                    outcome.source
                );
                self.status = Some(Status::Info(format!(
                    "Loaded {} rows from {}",
                    dataset.len(),
                    outcome.source
                )));
                self.set_dataset(dataset);
            }
            Err(e) => {
                // Keep whatever was displayed before.
                log::error!("Error loading {}: {e}", outcome.source);
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    /// Ingest a newly loaded dataset and show all of it.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.view = FilteredView::all(&dataset);
        self.active_filter = None;
        self.dataset = Some(dataset);
    }

    // -- filtering --

    /// Validate the filter controls and recompute the view. On invalid input
    /// a notice is raised and the current view is kept.
    pub fn apply_filter(&mut self) -> Result<(), FilterError> {
        let spec = match FilterSpec::from_inputs(
            &self.inputs.primary_column,
            &self.inputs.check_columns,
            self.inputs.combinator,
            self.inputs.null_mode,
        ) {
            Ok(spec) => spec,
            Err(e) => {
                self.notice = Some(e.to_string());
                return Err(e);
            }
        };

        let Some(dataset) = &self.dataset else {
            self.notice = Some("Load a spreadsheet first.".to_string());
            return Ok(());
        };

        self.view = if self.inputs.narrow {
            self.view.refine(dataset, &spec)
        } else {
            filter(dataset, &spec)
        };
        log::info!(
            "Filter primary={:?} checks={:?} {} {}: {} of {} rows",
            spec.primary_column,
            spec.check_columns,
            spec.combinator,
            spec.null_mode,
            self.view.len(),
            dataset.len()
        );
        self.active_filter = Some(spec);
        Ok(())
    }

    /// Show every row again.
    pub fn reset_filter(&mut self) {
        if let Some(dataset) = &self.dataset {
            self.view = FilteredView::all(dataset);
        }
        self.active_filter = None;
    }

    // -- export --

    pub fn open_export_dialog(&mut self) {
        self.export.open = true;
    }

    pub fn close_export_dialog(&mut self) {
        self.export.open = false;
    }

    /// Handle the dialog's confirm action: write the current view in the
    /// chosen format and report the outcome on the status line.
    pub fn confirm_export(&mut self) {
        self.export.open = false;
        let request = ExportRequest {
            filename: self.export.filename.clone(),
            format: self.export.format,
        };

        let Some(dataset) = &self.dataset else {
            self.status = Some(Status::Error("Nothing to export".to_string()));
            return;
        };
        let result = export::export_table(&request, &self.config.export_dir, dataset, &self.view);
        self.report_export(result);
    }

    fn report_export(&mut self, result: anyhow::Result<PathBuf>) {
        self.status = Some(match result {
            Ok(path) => Status::Info(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                Status::Error(format!("Export failed: {e:#}"))
            }
        });
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::data::loader::Source;

/// Filename used when the export dialog's name field is left blank.
pub const DEFAULT_EXPORT_NAME: &str = "download";

/// Sheet name of spreadsheet exports.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

/// Shown in place of null cells.
pub const NULL_MARKER: &str = "NULL";

#[derive(Debug, Parser)]
#[command(name = "sheet-sieve", version, about = "Filter spreadsheet rows by null checks and export the result")]
pub struct Cli {
    /// Spreadsheet to open on start-up (path or http/https URL).
    pub source: Option<String>,

    /// Directory that exports are written to.
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Log filter (e.g. `debug`, `sheet_sieve=trace`). Overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Runtime settings shared with the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub initial_source: Option<Source>,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_source: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl From<&Cli> for AppConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            initial_source: cli.source.as_deref().map(Source::parse),
            export_dir: cli.export_dir.clone(),
        }
    }
}

/// Initialise `env_logger`, defaulting to `info`.
pub fn init_logging(cli: &Cli) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = &cli.log_level {
        builder.parse_filters(level);
    }
    builder.init();
}

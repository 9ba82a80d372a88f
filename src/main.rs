mod app;
mod config;
mod data;
mod export;
mod state;
mod ui;

use app::SheetSieveApp;
use clap::Parser;
use config::{AppConfig, Cli};
use eframe::egui;

fn main() -> eframe::Result {
    let cli = Cli::parse();
    config::init_logging(&cli);
    let config = AppConfig::from(&cli);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sheet Sieve",
        options,
        Box::new(move |cc| Ok(Box::new(SheetSieveApp::new(cc, config)))),
    )
}

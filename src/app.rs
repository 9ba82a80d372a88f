use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SheetSieveApp {
    pub state: AppState,
}

impl SheetSieveApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut state = AppState::new(config);
        if let Some(source) = state.config.initial_source.clone() {
            let repaint = cc.egui_ctx.clone();
            state.request_load(source, move || repaint.request_repaint());
        }
        Self { state }
    }
}

impl eframe::App for SheetSieveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loader();

        let idle = self.state.notice.is_none();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_enabled_ui(idle, |ui| panels::top_bar(ui, &mut self.state));
        });

        // ---- Left side panel: filter controls ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_enabled_ui(idle, |ui| panels::side_panel(ui, &mut self.state));
            });

        // ---- Central panel: table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::sheet_table(ui, &self.state);
        });

        panels::dialogs(ctx, &mut self.state);
    }
}

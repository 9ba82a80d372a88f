use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{Combinator, NullMode};
use crate::data::loader::Source;
use crate::export::ExportFormat;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter");
    ui.separator();

    ui.label("Primary column (must be null)");
    ui.text_edit_singleline(&mut state.inputs.primary_column);
    ui.add_space(4.0);

    ui.label("Columns to check (comma-separated)");
    ui.text_edit_singleline(&mut state.inputs.check_columns);
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        egui::ComboBox::from_id_salt("combinator")
            .selected_text(state.inputs.combinator.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for c in [Combinator::And, Combinator::Or] {
                    ui.selectable_value(&mut state.inputs.combinator, c, c.to_string());
                }
            });
        egui::ComboBox::from_id_salt("null_mode")
            .selected_text(state.inputs.null_mode.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for m in [NullMode::RequireNull, NullMode::RequireNonNull] {
                    ui.selectable_value(&mut state.inputs.null_mode, m, m.to_string());
                }
            });
    });
    ui.checkbox(&mut state.inputs.narrow, "Narrow current view");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply").clicked() {
            // Errors surface through `state.notice`.
            let _ = state.apply_filter();
        }
        if ui.button("Reset").clicked() {
            state.reset_filter();
        }
    });

    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let columns = dataset.columns.clone();

    ui.strong("Columns");
    ui.small("Click to add to the check list");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(false, col).clicked() {
                    append_check_column(&mut state.inputs.check_columns, col);
                }
            }
        });
}

fn append_check_column(list: &mut String, column: &str) {
    if list.split(',').any(|c| c.trim() == column) {
        return;
    }
    if !list.trim().is_empty() {
        list.push_str(", ");
    }
    list.push_str(column);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
            if ui.button("Open URL…").clicked() {
                state.url_prompt.open = true;
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export…"))
                .clicked()
            {
                state.open_export_dialog();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{} rows loaded, {} visible", ds.len(), state.view.len()));
            ui.separator();
        }

        if let Some(spec) = &state.active_filter {
            ui.label(format!(
                "{} is null, {} {} {}",
                spec.primary_column,
                spec.check_columns.join(", "),
                spec.combinator,
                spec.null_mode
            ));
            ui.separator();
        }

        if state.is_loading() {
            ui.add(egui::Spinner::new());
        }

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

/// Render whichever dialogs are open.
pub fn dialogs(ctx: &egui::Context, state: &mut AppState) {
    notice_window(ctx, state);
    url_window(ctx, state);
    export_window(ctx, state)
}

fn notice_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.notice.clone() else {
        return;
    };
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.notice = None;
            }
        });
}

fn url_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.url_prompt.open {
        return;
    }
    let mut submit = false;
    egui::Window::new("Open URL")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            let edit = ui.text_edit_singleline(&mut state.url_prompt.text);
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Open").clicked() {
                    submit = true;
                }
                if ui.button("Cancel").clicked() {
                    state.url_prompt.open = false;
                }
            });
        });

    let text = state.url_prompt.text.trim().to_string();
    if submit && !text.is_empty() {
        state.url_prompt.open = false;
        let repaint = ctx.clone();
        state.request_load(Source::parse(&text), move || repaint.request_repaint());
    }
}

fn export_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.export.open {
        return;
    }
    let mut confirmed = false;
    egui::Window::new("Download")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("export_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("File name");
                ui.text_edit_singleline(&mut state.export.filename);
                ui.end_row();

                ui.label("Format");
                egui::ComboBox::from_id_salt("export_format")
                    .selected_text(state.export.format.to_string())
                    .show_ui(ui, |ui: &mut Ui| {
                        for f in ExportFormat::ALL {
                            ui.selectable_value(&mut state.export.format, f, f.to_string());
                        }
                    });
                ui.end_row();
            });
            ui.small(format!("Saved to {}", state.config.export_dir.display()));
            ui.add_space(8.0);
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Download").clicked() {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    state.close_export_dialog();
                }
            });
        });

    if confirmed {
        state.confirm_export();
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spreadsheet")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json"])
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        let repaint = ctx.clone();
        state.request_load(Source::Path(path), move || repaint.request_repaint());
    }
}

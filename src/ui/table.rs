use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::config::NULL_MARKER;
use crate::data::model::CellValue;
use crate::state::AppState;

const HEADER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Sheet table (central panel)
// ---------------------------------------------------------------------------

/// Render the current view.
pub fn sheet_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spreadsheet to get started  (File → Open…)");
        });
        return;
    };
    let view = &state.view;

    if dataset.is_empty() || view.is_empty() {
        ui.label("No data available");
        return;
    }

    let columns = &dataset.columns;
    ScrollArea::horizontal()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(60.0).clip(true), columns.len())
                .header(HEADER_HEIGHT, |mut header| {
                    for name in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, view.len(), |mut row| {
                        let Some(record) = view
                            .indices()
                            .get(row.index())
                            .and_then(|&i| dataset.row(i))
                        else {
                            return;
                        };
                        for name in columns {
                            row.col(|ui: &mut Ui| {
                                cell(ui, record.get(name));
                            });
                        }
                    });
                });
        });
}

fn cell(ui: &mut Ui, value: Option<&CellValue>) {
    match value {
        Some(CellValue::Text(s)) => {
            ui.label(s);
        }
        Some(CellValue::Number(n)) => {
            ui.label(n.to_string());
        }
        Some(CellValue::Null) | None => {
            ui.label(RichText::new(NULL_MARKER).weak());
        }
    }
}

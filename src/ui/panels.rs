use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::views::View;

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the navigation panel: one entry per chart page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for view in View::ALL {
                if ui
                    .selectable_label(state.selected_view == view, view.label())
                    .clicked()
                {
                    state.selected_view = view;
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open Data Folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.cache.invalidate();
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dataset) = state.cache.cached() {
            let years = match (dataset.years.first(), dataset.years.last()) {
                (Some(first), Some(last)) => format!("{first}–{last}"),
                _ => String::new(),
            };
            ui.label(format!(
                "{} observations · {} locations · {years}",
                dataset.len(),
                dataset.locations.len(),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

/// Point the session at a new data folder; the loader expects one
/// `hyd_air_quality_<year>` table per configured year inside it.
pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Choose the AQI data folder")
        .pick_folder();

    if let Some(dir) = folder {
        log::info!("loading AQI data from {}", dir.display());
        state.set_data_dir(dir);
    }
}

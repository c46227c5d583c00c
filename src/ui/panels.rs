use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the facet values so we can mutate state inside the loops.
    let (genres, years) = match &state.table {
        Some(table) => (
            table.genres.iter().cloned().collect::<Vec<_>>(),
            table.years.iter().copied().collect::<Vec<_>>(),
        ),
        None => {
            ui.label("No catalog loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Genre facet ----
            let header = format!("Genre  ({}/{})", state.filters.genres.len(), genres.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("genre_facet")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_genres();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_genres();
                        }
                    });
                    for genre in &genres {
                        let mut checked = state.filters.genres.contains(genre);
                        let mut text = RichText::new(genre);
                        if let Some(colors) = &state.genre_colors {
                            text = text.color(colors.color_for(genre));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });

            // ---- Year facet ----
            let header = format!("Year  ({}/{})", state.filters.years.len(), years.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("year_facet")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });
                    for &year in &years {
                        let mut checked = state.filters.years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.toggle_year(year);
                        }
                    }
                });

            ui.separator();

            // ---- Thresholds ----
            ui.strong("Popularity floor");
            ui.add(egui::Slider::new(
                &mut state.popularity_threshold,
                0.0..=100.0,
            ));
            ui.add_space(4.0);

            ui.strong("Find your song");
            ui.label("Minimum acousticness");
            ui.add(egui::Slider::new(&mut state.min_acousticness, 0.0..=1.0));
            ui.label("Minimum danceability");
            ui.add(egui::Slider::new(&mut state.min_danceability, 0.0..=1.0));
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} tracks loaded, {} selected",
                table.len(),
                state.selection.len()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track catalog")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_catalog(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} tracks across {} genres",
                    table.len(),
                    table.genres.len()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load catalog: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}

use eframe::egui::{Color32, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, Points};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{LabelColumn, MetricColumn, TrackTable};
use crate::data::query;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – KPI strip, ranked tables, charts
// ---------------------------------------------------------------------------

/// Render the dashboard over the current selection. Pure consumer: every
/// section is a fresh query against the cached selection.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a catalog to explore tracks  (File → Open…)");
        });
        return;
    }

    let selection = &state.selection;
    let popular = query::popular_subset(selection, state.popularity_threshold);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_strip(ui, &popular);
            ui.add_space(16.0);

            ui.heading("Top 10 Songs");
            ranked_track_table(
                ui,
                "top_songs",
                &query::top_by_metric(&popular, MetricColumn::Popularity, 10),
            );
            ui.add_space(16.0);

            ui.heading("Top 10 Artists");
            frequency_bar_chart(
                ui,
                "top_artists",
                &query::top_by_frequency(&popular, LabelColumn::Artist, 10),
                false,
            );
            ui.add_space(16.0);

            ui.heading("Find Your Song");
            ranked_track_table(
                ui,
                "recommendations",
                &query::recommend(
                    selection,
                    state.min_acousticness,
                    state.min_danceability,
                    query::DEFAULT_RECOMMENDATION_SIZE,
                ),
            );
            ui.add_space(16.0);

            ui.heading("Genres by Danceability and Acousticness");
            feature_scatter(ui, state, selection);
            ui.add_space(16.0);

            ui.heading("Top 10 Genres");
            frequency_bar_chart(
                ui,
                "top_genres",
                &query::top_by_frequency(&popular, LabelColumn::Genre, 10),
                false,
            );
            ui.add_space(16.0);

            ui.heading("Top 10 Albums");
            frequency_bar_chart(
                ui,
                "top_albums",
                &query::top_by_frequency(&popular, LabelColumn::Album, 10),
                true,
            );
        });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Headline figures over the popular subset. Every aggregate can come back
/// empty (nothing selected, or nothing popular enough); those render "N/A".
fn kpi_strip(ui: &mut Ui, popular: &TrackTable) {
    let top_artist = query::top_one(popular, LabelColumn::Artist)
        .map(|(name, _)| name)
        .unwrap_or_else(|_| "N/A".to_string());
    let top_song = query::top_by_metric(popular, MetricColumn::Popularity, 1)
        .tracks
        .first()
        .map(|t| t.title.clone())
        .unwrap_or_else(|| "N/A".to_string());
    let top_genre = query::top_one(popular, LabelColumn::Genre)
        .map(|(name, _)| name)
        .unwrap_or_else(|_| "N/A".to_string());
    let top_album = query::top_one(popular, LabelColumn::Album)
        .map(|(name, _)| name)
        .unwrap_or_else(|_| "N/A".to_string());
    let mean_valence = query::mean_of(popular, MetricColumn::Valence)
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|_| "N/A".to_string());

    ui.columns(5, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Top Artist", &top_artist);
        metric(&mut cols[1], "Top Song", &top_song);
        metric(&mut cols[2], "Top Genre", &top_genre);
        metric(&mut cols[3], "Top Album", &top_album);
        metric(&mut cols[4], "Mean Valence", &mean_valence);
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.strong(value);
    });
}

// ---------------------------------------------------------------------------
// Ranked track table
// ---------------------------------------------------------------------------

fn ranked_track_table(ui: &mut Ui, id: &str, table: &TrackTable) {
    if table.is_empty() {
        ui.label("No tracks match.");
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::remainder())
            .column(Column::auto())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("No");
                });
                header.col(|ui| {
                    ui.strong("Title");
                });
                header.col(|ui| {
                    ui.strong("Artist");
                });
                header.col(|ui| {
                    ui.strong("Popularity");
                });
            })
            .body(|mut body| {
                for (i, track) in table.tracks.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label((i + 1).to_string());
                        });
                        row.col(|ui| {
                            ui.label(&track.title);
                        });
                        row.col(|ui| {
                            ui.label(&track.artist);
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.0}", track.popularity));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Counts per value as a bar chart; hovering a bar shows its label.
fn frequency_bar_chart(ui: &mut Ui, id: &str, ranked: &[(String, usize)], horizontal: bool) {
    if ranked.is_empty() {
        ui.label("No tracks match.");
        return;
    }
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, (value, count))| Bar::new(i as f64, *count as f64).name(value))
        .collect();
    let mut chart = BarChart::new(bars).width(0.7);
    if horizontal {
        chart = chart.horizontal();
    }
    Plot::new(id.to_string())
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

/// One point per track with both features present, one series per genre so
/// the legend doubles as the colour key.
fn feature_scatter(ui: &mut Ui, state: &AppState, selection: &TrackTable) {
    Plot::new("feature_scatter")
        .height(320.0)
        .x_axis_label("Acousticness")
        .y_axis_label("Danceability")
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for genre in &selection.genres {
                let coords: Vec<[f64; 2]> = selection
                    .tracks
                    .iter()
                    .filter(|t| &t.genre == genre)
                    .filter_map(|t| Some([t.acousticness?, t.danceability?]))
                    .collect();
                if coords.is_empty() {
                    continue;
                }
                let color = state
                    .genre_colors
                    .as_ref()
                    .map(|c| c.color_for(genre))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(Points::new(coords).name(genre).color(color).radius(2.0));
            }
        });
}

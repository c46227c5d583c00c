use crate::color::GenreColors;
use crate::data::filter::{all_selected, apply_filters, FilterState};
use crate::data::model::TrackTable;
use crate::data::query::DEFAULT_POPULARITY_THRESHOLD;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded catalog (None until the user opens a file). Loaded once and
    /// never mutated; every view below derives from it.
    pub table: Option<TrackTable>,

    /// Sidebar facet selections.
    pub filters: FilterState,

    /// The filtered view the dashboard renders (cached, recomputed on every
    /// filter change).
    pub selection: TrackTable,

    /// Popularity floor for the KPI strip and ranked views.
    pub popularity_threshold: f64,

    /// Recommendation slider: minimum acousticness, in [0.0, 1.0].
    pub min_acousticness: f64,

    /// Recommendation slider: minimum danceability, in [0.0, 1.0].
    pub min_danceability: f64,

    /// Colour per genre for the scatter chart.
    pub genre_colors: Option<GenreColors>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            filters: FilterState::default(),
            selection: TrackTable::default(),
            popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
            min_acousticness: 0.5,
            min_danceability: 0.5,
            genre_colors: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded catalog: select every facet value, show the
    /// whole table, and rebuild the genre colours.
    pub fn set_table(&mut self, table: TrackTable) {
        self.filters = all_selected(&table);
        self.selection = table.clone();
        self.genre_colors = Some(GenreColors::new(&table.genres));
        self.table = Some(table);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute the cached selection after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.selection = apply_filters(table, &self.filters);
        }
    }

    /// Toggle a single genre in the facet selection.
    pub fn toggle_genre(&mut self, genre: &str) {
        if !self.filters.genres.remove(genre) {
            self.filters.genres.insert(genre.to_string());
        }
        self.refilter();
    }

    /// Toggle a single release year in the facet selection.
    pub fn toggle_year(&mut self, year: i32) {
        if !self.filters.years.remove(&year) {
            self.filters.years.insert(year);
        }
        self.refilter();
    }

    /// Select all genres.
    pub fn select_all_genres(&mut self) {
        if let Some(table) = &self.table {
            self.filters.genres = table.genres.clone();
            self.refilter();
        }
    }

    /// Deselect all genres.
    pub fn select_no_genres(&mut self) {
        self.filters.genres.clear();
        self.refilter();
    }

    /// Select all years.
    pub fn select_all_years(&mut self) {
        if let Some(table) = &self.table {
            self.filters.years = table.years.clone();
            self.refilter();
        }
    }

    /// Deselect all years.
    pub fn select_no_years(&mut self) {
        self.filters.years.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Track;

    fn track(id: &str, genre: &str, year: i32) -> Track {
        Track {
            track_id: id.to_string(),
            title: "t".into(),
            artist: "a".into(),
            album: "al".into(),
            genre: genre.into(),
            popularity: 60.0,
            danceability: None,
            valence: None,
            acousticness: None,
            instrumentalness: None,
            release_date: format!("{year}-01-01"),
            release_year: year,
        }
    }

    #[test]
    fn set_table_selects_everything() {
        let mut state = AppState::default();
        state.set_table(TrackTable::from_tracks(vec![
            track("a", "pop", 2019),
            track("b", "rock", 2020),
        ]));
        assert_eq!(state.selection.len(), 2);
        assert_eq!(state.filters.genres.len(), 2);
        assert_eq!(state.filters.years.len(), 2);
    }

    #[test]
    fn toggling_facets_refilters_the_selection() {
        let mut state = AppState::default();
        state.set_table(TrackTable::from_tracks(vec![
            track("a", "pop", 2019),
            track("b", "rock", 2020),
        ]));

        state.toggle_genre("rock");
        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.selection.tracks[0].genre, "pop");

        state.toggle_genre("rock");
        assert_eq!(state.selection.len(), 2);

        state.select_no_years();
        assert!(state.selection.is_empty());
        state.select_all_years();
        assert_eq!(state.selection.len(), 2);
    }
}

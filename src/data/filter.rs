use std::collections::BTreeSet;

use super::model::TrackTable;
use super::query::select_by_genre_and_year;

// ---------------------------------------------------------------------------
// Facet selection: which genres and years are checked in the sidebar
// ---------------------------------------------------------------------------

/// Per-facet selection state. An empty set means "nothing selected", which
/// filters everything out; there is no implicit fallback to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub genres: BTreeSet<String>,
    pub years: BTreeSet<i32>,
}

/// Initialise a [`FilterState`] with every facet value selected, i.e. the
/// whole table visible.
pub fn all_selected(table: &TrackTable) -> FilterState {
    FilterState {
        genres: table.genres.clone(),
        years: table.years.clone(),
    }
}

/// The subset of `table` passing the current facet selection.
pub fn apply_filters(table: &TrackTable, filters: &FilterState) -> TrackTable {
    select_by_genre_and_year(table, &filters.genres, &filters.years)
}

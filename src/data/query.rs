use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use super::model::{LabelColumn, MetricColumn, Track, TrackTable};

/// Popularity floor used for the "popular subset" views.
pub const DEFAULT_POPULARITY_THRESHOLD: f64 = 50.0;

/// How many tracks a recommendation returns by default.
pub const DEFAULT_RECOMMENDATION_SIZE: usize = 10;

/// A scalar aggregate was requested over zero usable rows. Callers decide
/// the degenerate display value; the query layer never hands out NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("aggregation over an empty selection")]
pub struct EmptyAggregationError;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Keep rows whose genre and release year are both selected.
///
/// An empty set on either facet yields an empty table: once the user has
/// deselected everything there is no implicit "all" fallback.
pub fn select_by_genre_and_year(
    table: &TrackTable,
    genres: &BTreeSet<String>,
    years: &BTreeSet<i32>,
) -> TrackTable {
    let rows = table
        .tracks
        .iter()
        .filter(|t| genres.contains(&t.genre) && years.contains(&t.release_year))
        .cloned()
        .collect();
    TrackTable::from_tracks(rows)
}

/// Keep rows at or above the popularity threshold.
pub fn popular_subset(table: &TrackTable, threshold: f64) -> TrackTable {
    let rows = table
        .tracks
        .iter()
        .filter(|t| t.popularity >= threshold)
        .cloned()
        .collect();
    TrackTable::from_tracks(rows)
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Count rows per distinct value of the column and rank by count,
/// descending. Values with equal counts keep the order in which they first
/// appear in the table. At most `n` entries.
pub fn top_by_frequency(table: &TrackTable, column: LabelColumn, n: usize) -> Vec<(String, usize)> {
    // value -> (first appearance, count); the index doubles as the tie-break
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, track) in table.tracks.iter().enumerate() {
        counts.entry(column.get(track)).or_insert((i, 0)).1 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ia, ca)), (_, (ib, cb))| cb.cmp(ca).then(ia.cmp(ib)));
    ranked
        .into_iter()
        .take(n)
        .map(|(value, (_, count))| (value.to_string(), count))
        .collect()
}

/// The single most frequent value of the column, with its count.
pub fn top_one(
    table: &TrackTable,
    column: LabelColumn,
) -> Result<(String, usize), EmptyAggregationError> {
    top_by_frequency(table, column, 1)
        .into_iter()
        .next()
        .ok_or(EmptyAggregationError)
}

/// The first `n` rows after a stable descending sort on the metric. Rows
/// without a usable value sort last; ties keep input order.
pub fn top_by_metric(table: &TrackTable, metric: MetricColumn, n: usize) -> TrackTable {
    let mut rows: Vec<Track> = table.tracks.clone();
    rows.sort_by(|a, b| descending(metric.get(a), metric.get(b)));
    rows.truncate(n);
    TrackTable::from_tracks(rows)
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Arithmetic mean of the metric over rows carrying a usable value.
pub fn mean_of(table: &TrackTable, metric: MetricColumn) -> Result<f64, EmptyAggregationError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for track in &table.tracks {
        if let Some(value) = metric.get(track) {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        return Err(EmptyAggregationError);
    }
    Ok(sum / count as f64)
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Tracks at or above both feature thresholds, ranked by popularity. A row
/// missing either feature never matches.
pub fn recommend(
    table: &TrackTable,
    min_acousticness: f64,
    min_danceability: f64,
    n: usize,
) -> TrackTable {
    let rows: Vec<Track> = table
        .tracks
        .iter()
        .filter(|t| {
            t.acousticness.is_some_and(|a| a >= min_acousticness)
                && t.danceability.is_some_and(|d| d >= min_danceability)
        })
        .cloned()
        .collect();
    top_by_metric(
        &TrackTable::from_tracks(rows),
        MetricColumn::Popularity,
        n,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, genre: &str, year: i32, popularity: f64) -> Track {
        Track {
            track_id: id.to_string(),
            title: format!("title-{id}"),
            artist: format!("artist-{id}"),
            album: format!("album-{id}"),
            genre: genre.to_string(),
            popularity,
            danceability: None,
            valence: None,
            acousticness: None,
            instrumentalness: None,
            release_date: format!("{year}-01-01"),
            release_year: year,
        }
    }

    fn table(tracks: Vec<Track>) -> TrackTable {
        TrackTable::from_tracks(tracks)
    }

    fn genres(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn years(values: &[i32]) -> BTreeSet<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn selection_matches_both_facets() {
        let t = table(vec![
            track("a", "pop", 2019, 10.0),
            track("b", "pop", 2020, 10.0),
            track("c", "rock", 2019, 10.0),
        ]);
        let out = select_by_genre_and_year(&t, &genres(&["pop"]), &years(&[2019]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.tracks[0].track_id, "a");
        for row in &out.tracks {
            assert!(t.tracks.contains(row));
        }
    }

    #[test]
    fn empty_facet_selection_yields_empty_table() {
        let t = table(vec![track("a", "pop", 2019, 10.0)]);
        assert!(select_by_genre_and_year(&t, &genres(&[]), &years(&[2019])).is_empty());
        assert!(select_by_genre_and_year(&t, &genres(&["pop"]), &years(&[])).is_empty());
    }

    #[test]
    fn popular_subset_keeps_threshold_and_above() {
        let t = table(vec![
            track("a", "pop", 2019, 10.0),
            track("b", "pop", 2019, 55.0),
            track("c", "pop", 2019, 50.0),
            track("d", "pop", 2019, 99.0),
        ]);
        let out = popular_subset(&t, DEFAULT_POPULARITY_THRESHOLD);
        let kept: Vec<f64> = out.tracks.iter().map(|t| t.popularity).collect();
        assert_eq!(kept, vec![55.0, 50.0, 99.0]);
    }

    #[test]
    fn frequency_ranking_orders_by_count() {
        let rows = ["pop", "pop", "rock", "rock", "rock", "jazz"]
            .iter()
            .enumerate()
            .map(|(i, g)| track(&format!("t{i}"), g, 2019, 10.0))
            .collect();
        let ranked = top_by_frequency(&table(rows), LabelColumn::Genre, 3);
        assert_eq!(
            ranked,
            vec![
                ("rock".to_string(), 3),
                ("pop".to_string(), 2),
                ("jazz".to_string(), 1)
            ]
        );
    }

    #[test]
    fn frequency_ties_break_by_first_appearance() {
        let rows = ["blues", "house", "blues", "house"]
            .iter()
            .enumerate()
            .map(|(i, g)| track(&format!("t{i}"), g, 2019, 10.0))
            .collect();
        let ranked = top_by_frequency(&table(rows), LabelColumn::Genre, 10);
        assert_eq!(
            ranked,
            vec![("blues".to_string(), 2), ("house".to_string(), 2)]
        );
    }

    #[test]
    fn frequency_over_empty_table_is_empty() {
        assert!(top_by_frequency(&table(vec![]), LabelColumn::Artist, 5).is_empty());
        assert_eq!(
            top_one(&table(vec![]), LabelColumn::Artist),
            Err(EmptyAggregationError)
        );
    }

    #[test]
    fn top_by_metric_sorts_descending_and_bounds_n() {
        let t = table(vec![
            track("a", "pop", 2019, 40.0),
            track("b", "pop", 2019, 90.0),
            track("c", "pop", 2019, 70.0),
        ]);
        let out = top_by_metric(&t, MetricColumn::Popularity, 2);
        let ids: Vec<&str> = out.tracks.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let all = top_by_metric(&t, MetricColumn::Popularity, 10);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn top_by_metric_ties_keep_input_order() {
        let t = table(vec![
            track("a", "pop", 2019, 50.0),
            track("b", "pop", 2019, 50.0),
            track("c", "pop", 2019, 80.0),
        ]);
        let out = top_by_metric(&t, MetricColumn::Popularity, 3);
        let ids: Vec<&str> = out.tracks.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn top_by_metric_puts_missing_values_last() {
        let mut with_value = track("a", "pop", 2019, 10.0);
        with_value.valence = Some(0.2);
        let without_value = track("b", "pop", 2019, 10.0);
        let out = top_by_metric(
            &table(vec![without_value, with_value]),
            MetricColumn::Valence,
            2,
        );
        assert_eq!(out.tracks[0].track_id, "a");
        assert_eq!(out.tracks[1].track_id, "b");
    }

    #[test]
    fn mean_over_empty_table_is_an_error() {
        assert_eq!(
            mean_of(&table(vec![]), MetricColumn::Popularity),
            Err(EmptyAggregationError)
        );
    }

    #[test]
    fn mean_skips_missing_values() {
        let mut a = track("a", "pop", 2019, 10.0);
        a.valence = Some(0.2);
        let mut b = track("b", "pop", 2019, 20.0);
        b.valence = Some(0.4);
        let c = track("c", "pop", 2019, 30.0);

        let t = table(vec![a, b, c.clone()]);
        let mean = mean_of(&t, MetricColumn::Valence).unwrap();
        assert!((mean - 0.3).abs() < 1e-12);

        // a column with no usable values at all is also an error
        assert_eq!(
            mean_of(&table(vec![c]), MetricColumn::Valence),
            Err(EmptyAggregationError)
        );
    }

    #[test]
    fn recommendations_respect_both_thresholds() {
        let mut a = track("a", "pop", 2019, 90.0);
        a.acousticness = Some(0.8);
        a.danceability = Some(0.9);
        let mut b = track("b", "pop", 2019, 95.0);
        b.acousticness = Some(0.8);
        b.danceability = Some(0.1);
        let mut c = track("c", "pop", 2019, 20.0);
        c.acousticness = Some(0.5);
        c.danceability = Some(0.5);
        // no features at all: never recommended
        let d = track("d", "pop", 2019, 99.0);

        let out = recommend(&table(vec![a, b, c, d]), 0.5, 0.5, DEFAULT_RECOMMENDATION_SIZE);
        let ids: Vec<&str> = out.tracks.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        for row in &out.tracks {
            assert!(row.acousticness.unwrap() >= 0.5);
            assert!(row.danceability.unwrap() >= 0.5);
        }
    }
}

use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Track – one row of the catalog
// ---------------------------------------------------------------------------

/// A single catalog entry (one row of the source table).
///
/// Normalization guarantees `title`, `artist` and `genre` are non-empty and
/// that `release_year` was derived from a parseable `release_date`. The four
/// audio features are `None` when the source cell was blank or unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable identifier, unique within a loaded table.
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// Popularity score in [0, 100].
    pub popularity: f64,
    /// In [0.0, 1.0].
    pub danceability: Option<f64>,
    /// In [0.0, 1.0].
    pub valence: Option<f64>,
    /// In [0.0, 1.0].
    pub acousticness: Option<f64>,
    /// In [0.0, 1.0].
    pub instrumentalness: Option<f64>,
    /// Raw release date text as found in the source.
    pub release_date: String,
    /// Year derived from `release_date` at load time.
    pub release_year: i32,
}

// ---------------------------------------------------------------------------
// Column selectors
// ---------------------------------------------------------------------------

/// Groupable text columns of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColumn {
    Title,
    Artist,
    Album,
    Genre,
}

impl LabelColumn {
    pub fn get<'a>(&self, track: &'a Track) -> &'a str {
        match self {
            LabelColumn::Title => &track.title,
            LabelColumn::Artist => &track.artist,
            LabelColumn::Album => &track.album,
            LabelColumn::Genre => &track.genre,
        }
    }
}

impl fmt::Display for LabelColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelColumn::Title => "Title",
            LabelColumn::Artist => "Artist",
            LabelColumn::Album => "Album",
            LabelColumn::Genre => "Genre",
        };
        write!(f, "{name}")
    }
}

/// Numeric columns of the catalog. Popularity is always present after
/// normalization; the audio features are per-row optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricColumn {
    Popularity,
    Danceability,
    Valence,
    Acousticness,
    Instrumentalness,
}

impl MetricColumn {
    pub fn get(&self, track: &Track) -> Option<f64> {
        match self {
            MetricColumn::Popularity => Some(track.popularity),
            MetricColumn::Danceability => track.danceability,
            MetricColumn::Valence => track.valence,
            MetricColumn::Acousticness => track.acousticness,
            MetricColumn::Instrumentalness => track.instrumentalness,
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricColumn::Popularity => "Popularity",
            MetricColumn::Danceability => "Danceability",
            MetricColumn::Valence => "Valence",
            MetricColumn::Acousticness => "Acousticness",
            MetricColumn::Instrumentalness => "Instrumentalness",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// TrackTable – the complete loaded catalog
// ---------------------------------------------------------------------------

/// An ordered collection of tracks plus pre-computed facet indices.
///
/// Built once per load and treated as immutable afterwards; every query
/// produces a new derived table instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct TrackTable {
    /// All tracks, in input order.
    pub tracks: Vec<Track>,
    /// Distinct genres, sorted.
    pub genres: BTreeSet<String>,
    /// Distinct release years, sorted.
    pub years: BTreeSet<i32>,
}

impl TrackTable {
    /// Build the facet indices from the given rows.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut genres = BTreeSet::new();
        let mut years = BTreeSet::new();
        for track in &tracks {
            genres.insert(track.genre.clone());
            years.insert(track.release_year);
        }
        TrackTable {
            tracks,
            genres,
            years,
        }
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(genre: &str, year: i32) -> Track {
        Track {
            track_id: format!("{genre}-{year}"),
            title: "t".into(),
            artist: "a".into(),
            album: "al".into(),
            genre: genre.into(),
            popularity: 10.0,
            danceability: None,
            valence: None,
            acousticness: None,
            instrumentalness: None,
            release_date: format!("{year}-01-01"),
            release_year: year,
        }
    }

    #[test]
    fn facets_are_distinct_and_sorted() {
        let table = TrackTable::from_tracks(vec![
            track("rock", 2019),
            track("pop", 2001),
            track("rock", 2001),
        ]);
        assert_eq!(table.genres.iter().collect::<Vec<_>>(), vec!["pop", "rock"]);
        assert_eq!(table.years.iter().collect::<Vec<_>>(), vec![&2001, &2019]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn metric_column_reads_optional_features() {
        let mut t = track("pop", 2020);
        t.acousticness = Some(0.7);
        assert_eq!(MetricColumn::Popularity.get(&t), Some(10.0));
        assert_eq!(MetricColumn::Acousticness.get(&t), Some(0.7));
        assert_eq!(MetricColumn::Danceability.get(&t), None);
        assert_eq!(LabelColumn::Genre.get(&t), "pop");
    }
}

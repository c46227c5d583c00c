use std::collections::HashSet;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Track, TrackTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A catalog file could not be loaded. Loading is all-or-nothing: none of
/// these leave a partially built table behind.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("reading catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level JSON array of records")]
    JsonShape,
    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Raw source columns
// ---------------------------------------------------------------------------

const COL_TRACK_ID: &str = "track_id";
const COL_TITLE: &str = "track_name";
const COL_ARTIST: &str = "track_artist";
const COL_POPULARITY: &str = "track_popularity";
const COL_ALBUM: &str = "track_album_name";
const COL_RELEASE_DATE: &str = "track_album_release_date";
const COL_GENRE: &str = "playlist_genre";
const COL_DANCEABILITY: &str = "danceability";
const COL_VALENCE: &str = "valence";
const COL_ACOUSTICNESS: &str = "acousticness";
const COL_INSTRUMENTALNESS: &str = "instrumentalness";

/// One source row under the canonical field names, before cleaning. Every
/// cell is optional at this stage; `normalize` decides what survives.
#[derive(Debug, Default)]
struct RawRow {
    track_id: Option<String>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    popularity: Option<f64>,
    danceability: Option<f64>,
    valence: Option<f64>,
    acousticness: Option<f64>,
    instrumentalness: Option<f64>,
    release_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a track catalog from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the raw column names (primary format)
/// * `.json`    – `[{ "track_name": ..., "track_artist": ..., ... }, ...]`
/// * `.parquet` – scalar columns under the same raw names
///
/// All formats go through the same normalization pipeline: rename to the
/// canonical schema, derive the release year, drop incomplete rows, then
/// drop duplicate track ids (first occurrence wins).
pub fn load_catalog(path: &Path) -> Result<TrackTable, CatalogError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(CatalogError::UnsupportedExtension(other.to_string())),
    };

    Ok(normalize(raw))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn raw rows into the clean table. Rows missing any of title, artist,
/// genre, popularity or a parseable release date are dropped; so are rows
/// without a track id, since they cannot take part in deduplication.
fn normalize(raw: Vec<RawRow>) -> TrackTable {
    let raw_count = raw.len();
    let mut incomplete = 0usize;
    let mut duplicates = 0usize;
    let mut seen: HashSet<String> = HashSet::new();
    let mut tracks = Vec::with_capacity(raw_count);

    for row in raw {
        let release_year = row.release_date.as_deref().and_then(parse_release_year);
        let (
            Some(track_id),
            Some(title),
            Some(artist),
            Some(genre),
            Some(popularity),
            Some(release_year),
        ) = (
            row.track_id,
            row.title,
            row.artist,
            row.genre,
            row.popularity,
            release_year,
        )
        else {
            incomplete += 1;
            continue;
        };

        if !seen.insert(track_id.clone()) {
            duplicates += 1;
            continue;
        }

        tracks.push(Track {
            track_id,
            title,
            artist,
            album: row.album.unwrap_or_default(),
            genre,
            popularity,
            danceability: row.danceability,
            valence: row.valence,
            acousticness: row.acousticness,
            instrumentalness: row.instrumentalness,
            release_date: row.release_date.unwrap_or_default(),
            release_year,
        });
    }

    log::info!(
        "normalized {} of {raw_count} raw rows ({incomplete} incomplete, {duplicates} duplicate ids)",
        tracks.len()
    );

    TrackTable::from_tracks(tracks)
}

/// Best-effort year extraction from an album release date. Source data mixes
/// full dates with year-month and bare-year precision.
fn parse_release_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.year());
    }
    match s.split_once('-') {
        Some((year, month)) => {
            let year = parse_year(year)?;
            let month: u32 = month.parse().ok()?;
            (1..=12).contains(&month).then_some(year)
        }
        None => parse_year(s),
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 {
        return None;
    }
    s.parse().ok()
}

/// Trimmed, non-empty cell text.
fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Lenient numeric cell parse. Anything that is not a finite number counts
/// as missing.
fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(CatalogError::MissingColumn(name))
    };

    let track_id = find(COL_TRACK_ID)?;
    let title = find(COL_TITLE)?;
    let artist = find(COL_ARTIST)?;
    let popularity = find(COL_POPULARITY)?;
    let album = find(COL_ALBUM)?;
    let release_date = find(COL_RELEASE_DATE)?;
    let genre = find(COL_GENRE)?;
    let danceability = find(COL_DANCEABILITY)?;
    let valence = find(COL_VALENCE)?;
    let acousticness = find(COL_ACOUSTICNESS)?;
    let instrumentalness = find(COL_INSTRUMENTALNESS)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        rows.push(RawRow {
            track_id: non_empty(cell(track_id)),
            title: non_empty(cell(title)),
            artist: non_empty(cell(artist)),
            album: non_empty(cell(album)),
            genre: non_empty(cell(genre)),
            popularity: parse_f64(cell(popularity)),
            danceability: parse_f64(cell(danceability)),
            valence: parse_f64(cell(valence)),
            acousticness: parse_f64(cell(acousticness)),
            instrumentalness: parse_f64(cell(instrumentalness)),
            release_date: non_empty(cell(release_date)),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
/// an array of objects keyed by the raw column names. Keys a record lacks
/// are treated as missing cells; the row is then judged by `normalize`.
fn load_json(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = root.as_array().ok_or(CatalogError::JsonShape)?;

    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let obj = match rec.as_object() {
            Some(obj) => obj,
            None => {
                rows.push(RawRow::default());
                continue;
            }
        };
        rows.push(RawRow {
            track_id: json_string(obj.get(COL_TRACK_ID)),
            title: json_string(obj.get(COL_TITLE)),
            artist: json_string(obj.get(COL_ARTIST)),
            album: json_string(obj.get(COL_ALBUM)),
            genre: json_string(obj.get(COL_GENRE)),
            popularity: json_f64(obj.get(COL_POPULARITY)),
            danceability: json_f64(obj.get(COL_DANCEABILITY)),
            valence: json_f64(obj.get(COL_VALENCE)),
            acousticness: json_f64(obj.get(COL_ACOUSTICNESS)),
            instrumentalness: json_f64(obj.get(COL_INSTRUMENTALNESS)),
            release_date: json_string(obj.get(COL_RELEASE_DATE)),
        });
    }
    Ok(rows)
}

fn json_string(val: Option<&JsonValue>) -> Option<String> {
    match val? {
        JsonValue::String(s) => non_empty(s),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_f64(val: Option<&JsonValue>) -> Option<f64> {
    match val? {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => parse_f64(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parquet with one scalar column per raw field. Works with files written by
/// both Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<RawRow>, CatalogError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;

        let track_id = column(&batch, COL_TRACK_ID)?;
        let title = column(&batch, COL_TITLE)?;
        let artist = column(&batch, COL_ARTIST)?;
        let popularity = column(&batch, COL_POPULARITY)?;
        let album = column(&batch, COL_ALBUM)?;
        let release_date = column(&batch, COL_RELEASE_DATE)?;
        let genre = column(&batch, COL_GENRE)?;
        let danceability = column(&batch, COL_DANCEABILITY)?;
        let valence = column(&batch, COL_VALENCE)?;
        let acousticness = column(&batch, COL_ACOUSTICNESS)?;
        let instrumentalness = column(&batch, COL_INSTRUMENTALNESS)?;

        for row in 0..batch.num_rows() {
            rows.push(RawRow {
                track_id: string_cell(track_id, row),
                title: string_cell(title, row),
                artist: string_cell(artist, row),
                album: string_cell(album, row),
                genre: string_cell(genre, row),
                popularity: f64_cell(popularity, row),
                danceability: f64_cell(danceability, row),
                valence: f64_cell(valence, row),
                acousticness: f64_cell(acousticness, row),
                instrumentalness: f64_cell(instrumentalness, row),
                release_date: string_cell(release_date, row),
            });
        }
    }
    Ok(rows)
}

fn column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef, CatalogError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| CatalogError::MissingColumn(name))?;
    Ok(batch.column(idx))
}

/// Extract a text cell from an Arrow column at the given row.
fn string_cell(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| a.value(row).to_string()),
        _ => None,
    };
    text.as_deref().and_then(non_empty)
}

/// Extract a numeric cell, accepting the integer and float widths Pandas and
/// Polars emit, plus numeric text.
fn f64_cell(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .and_then(|a| parse_f64(a.value(row))),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "track_id,track_name,track_artist,track_popularity,track_album_name,track_album_release_date,playlist_genre,danceability,valence,acousticness,instrumentalness";

    fn write_catalog(ext: &str, contents: &str) -> tempfile::TempPath {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.into_temp_path()
    }

    fn csv_catalog(rows: &[&str]) -> tempfile::TempPath {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        write_catalog("csv", &text)
    }

    #[test]
    fn loads_complete_rows() {
        let path = csv_catalog(&[
            "a1,Song A,Artist A,71,Album A,2019-07-05,pop,0.8,0.6,0.1,0.0",
            "b2,Song B,Artist B,40,Album B,2013,rock,0.5,0.3,0.7,0.2",
        ]);
        let table = load_catalog(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.tracks[0].title, "Song A");
        assert_eq!(table.tracks[0].release_year, 2019);
        assert_eq!(table.tracks[1].release_year, 2013);
        assert_eq!(table.tracks[1].acousticness, Some(0.7));
    }

    #[test]
    fn drops_incomplete_rows() {
        let path = csv_catalog(&[
            // no artist
            "a1,Song A,,71,Album A,2019-07-05,pop,0.8,0.6,0.1,0.0",
            // unparseable date
            "b2,Song B,Artist B,40,Album B,someday,rock,0.5,0.3,0.7,0.2",
            // unparseable popularity
            "c3,Song C,Artist C,high,Album C,2001-02-03,rap,0.5,0.3,0.7,0.2",
            // survives
            "d4,Song D,Artist D,55,Album D,2001-02-03,rap,0.5,0.3,0.7,0.2",
        ]);
        let table = load_catalog(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.tracks[0].track_id, "d4");
    }

    #[test]
    fn malformed_audio_feature_keeps_the_row() {
        let path = csv_catalog(&[
            "a1,Song A,Artist A,71,Album A,2019-07-05,pop,not-a-number,0.6,,0.0",
        ]);
        let table = load_catalog(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.tracks[0].danceability, None);
        assert_eq!(table.tracks[0].acousticness, None);
        assert_eq!(table.tracks[0].valence, Some(0.6));
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let path = csv_catalog(&[
            "X1,First,Artist A,71,Album A,2019-07-05,pop,0.8,0.6,0.1,0.0",
            "X1,Second,Artist B,90,Album B,2020-01-01,rock,0.5,0.3,0.7,0.2",
        ]);
        let table = load_catalog(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.tracks[0].title, "First");
    }

    #[test]
    fn empty_source_yields_empty_table() {
        let path = csv_catalog(&[]);
        let table = load_catalog(&path).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let path = write_catalog("csv", "track_id,track_name\n1,Song");
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(_)));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let path = write_catalog("xlsx", "");
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedExtension(_)));
    }

    #[test]
    fn loading_twice_is_deterministic() {
        let path = csv_catalog(&[
            "a1,Song A,Artist A,71,Album A,2019-07-05,pop,0.8,0.6,0.1,0.0",
            "b2,Song B,Artist B,40,Album B,2013-04,rock,0.5,0.3,0.7,0.2",
        ]);
        let first = load_catalog(&path).unwrap();
        let second = load_catalog(&path).unwrap();
        assert_eq!(first.tracks, second.tracks);
        assert_eq!(first.genres, second.genres);
        assert_eq!(first.years, second.years);
    }

    #[test]
    fn loads_record_oriented_json() {
        let path = write_catalog(
            "json",
            r#"[
                {"track_id": "a1", "track_name": "Song A", "track_artist": "Artist A",
                 "track_popularity": 71, "track_album_name": "Album A",
                 "track_album_release_date": "2019-07-05", "playlist_genre": "pop",
                 "danceability": 0.8, "valence": 0.6, "acousticness": 0.1,
                 "instrumentalness": 0.0},
                {"track_id": "b2", "track_name": "Song B", "track_artist": "Artist B",
                 "track_popularity": null, "track_album_name": "Album B",
                 "track_album_release_date": "2013", "playlist_genre": "rock"}
            ]"#,
        );
        let table = load_catalog(&path).unwrap();
        // the second record has no popularity and is dropped
        assert_eq!(table.len(), 1);
        assert_eq!(table.tracks[0].track_id, "a1");
        assert_eq!(table.tracks[0].popularity, 71.0);
    }

    #[test]
    fn year_parsing_precision() {
        assert_eq!(parse_release_year("2019-07-05"), Some(2019));
        assert_eq!(parse_release_year("2013-04"), Some(2013));
        assert_eq!(parse_release_year("2013"), Some(2013));
        assert_eq!(parse_release_year(" 1999 "), Some(1999));
        assert_eq!(parse_release_year("2013-13"), None);
        assert_eq!(parse_release_year("someday"), None);
        assert_eq!(parse_release_year(""), None);
    }
}

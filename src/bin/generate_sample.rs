use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One output row under the raw export column names.
#[derive(Debug, Clone, Serialize)]
struct SampleRow {
    track_id: String,
    #[serde(rename = "track_name")]
    title: String,
    #[serde(rename = "track_artist")]
    artist: String,
    #[serde(rename = "track_popularity")]
    popularity: Option<f64>,
    #[serde(rename = "track_album_name")]
    album: String,
    #[serde(rename = "track_album_release_date")]
    release_date: String,
    #[serde(rename = "playlist_genre")]
    genre: String,
    danceability: Option<f64>,
    valence: Option<f64>,
    acousticness: Option<f64>,
    instrumentalness: Option<f64>,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// (genre, typical popularity, artist pool)
const GENRES: &[(&str, f64, &[&str])] = &[
    ("pop", 62.0, &["Nova Lane", "The Paper Suns", "Mira Vale", "Gold Coast Choir"]),
    ("rock", 52.0, &["Iron Harvest", "Static Bloom", "The Gray Mornings"]),
    ("rap", 58.0, &["Cold Letter", "MC Ostinato", "Nine Blocks"]),
    ("latin", 55.0, &["Rio Caliente", "Las Palmas", "Sol y Sombra"]),
    ("r&b", 50.0, &["Velvet Hour", "Smoke & Honey", "June Line"]),
    ("edm", 48.0, &["Circuit Haze", "Neon Atlas", "Pulsewidth"]),
];

const TITLE_WORDS: &[&str] = &[
    "Midnight", "Golden", "Electric", "Silent", "Neon", "Wild", "Broken", "Summer", "Paper",
    "Crimson", "Hollow", "Glass",
];
const TITLE_NOUNS: &[&str] = &[
    "Drive", "Season", "Mirror", "Garden", "Signal", "Harbor", "Parade", "Letters", "Tide",
    "Echo", "Fever", "Youth",
];

fn release_date(rng: &mut SimpleRng) -> String {
    let year = 1990 + (rng.next_f64() * 34.0) as i32;
    // album exports mix full-date, year-month and bare-year precision
    let r = rng.next_f64();
    if r < 0.7 {
        let month = 1 + (rng.next_f64() * 12.0) as u32;
        let day = 1 + (rng.next_f64() * 28.0) as u32;
        format!("{year}-{month:02}-{day:02}")
    } else if r < 0.85 {
        let month = 1 + (rng.next_f64() * 12.0) as u32;
        format!("{year}-{month:02}")
    } else {
        format!("{year}")
    }
}

fn unit_clamp(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn build_catalog(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    let mut id = 0u32;

    for &(genre, typical_popularity, artists) in GENRES {
        for &artist in artists {
            for _ in 0..2 {
                let album = format!("{} {}", rng.pick(TITLE_WORDS), rng.pick(TITLE_NOUNS));
                let date = release_date(rng);
                let track_count = 4 + (rng.next_f64() * 5.0) as usize;
                for _ in 0..track_count {
                    id += 1;
                    rows.push(SampleRow {
                        track_id: format!("tk{id:05}"),
                        title: format!("{} {}", rng.pick(TITLE_WORDS), rng.pick(TITLE_NOUNS)),
                        artist: artist.to_string(),
                        popularity: Some(rng.gauss(typical_popularity, 18.0).clamp(0.0, 100.0).round()),
                        album: album.clone(),
                        release_date: date.clone(),
                        genre: genre.to_string(),
                        danceability: Some(unit_clamp(rng.gauss(0.6, 0.18))),
                        valence: Some(unit_clamp(rng.gauss(0.5, 0.22))),
                        acousticness: Some(unit_clamp(rng.next_f64().powi(2))),
                        instrumentalness: Some(unit_clamp(rng.next_f64().powi(4))),
                    });
                }
            }
        }
    }

    // A few dirty rows so the cleaning pipeline has work to do on sample data:
    // a duplicate id, a blank artist, an unparseable date, a missing popularity.
    let mut duplicate = rows[0].clone();
    duplicate.title = format!("{} (Remaster)", duplicate.title);
    rows.push(duplicate);

    let mut blank_artist = rows[1].clone();
    blank_artist.track_id = "tk90001".to_string();
    blank_artist.artist = String::new();
    rows.push(blank_artist);

    let mut bad_date = rows[2].clone();
    bad_date.track_id = "tk90002".to_string();
    bad_date.release_date = "unknown".to_string();
    rows.push(bad_date);

    let mut no_popularity = rows[3].clone();
    no_popularity.track_id = "tk90003".to_string();
    no_popularity.popularity = None;
    rows.push(no_popularity);

    rows
}

fn write_csv(rows: &[SampleRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &str) -> Result<()> {
    let strings = |f: fn(&SampleRow) -> &str| {
        StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
    };
    let floats = |f: fn(&SampleRow) -> Option<f64>| {
        Float64Array::from(rows.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("track_id", DataType::Utf8, false),
        Field::new("track_name", DataType::Utf8, false),
        Field::new("track_artist", DataType::Utf8, false),
        Field::new("track_popularity", DataType::Float64, true),
        Field::new("track_album_name", DataType::Utf8, false),
        Field::new("track_album_release_date", DataType::Utf8, false),
        Field::new("playlist_genre", DataType::Utf8, false),
        Field::new("danceability", DataType::Float64, true),
        Field::new("valence", DataType::Float64, true),
        Field::new("acousticness", DataType::Float64, true),
        Field::new("instrumentalness", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|r| &r.track_id)),
            Arc::new(strings(|r| &r.title)),
            Arc::new(strings(|r| &r.artist)),
            Arc::new(floats(|r| r.popularity)),
            Arc::new(strings(|r| &r.album)),
            Arc::new(strings(|r| &r.release_date)),
            Arc::new(strings(|r| &r.genre)),
            Arc::new(floats(|r| r.danceability)),
            Arc::new(floats(|r| r.valence)),
            Arc::new(floats(|r| r.acousticness)),
            Arc::new(floats(|r| r.instrumentalness)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = build_catalog(&mut rng);

    write_csv(&rows, "sample_catalog.csv")?;
    write_parquet(&rows, "sample_catalog.parquet")?;

    println!(
        "Wrote {} rows to sample_catalog.csv and sample_catalog.parquet",
        rows.len()
    );
    Ok(())
}

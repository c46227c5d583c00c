use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Genre colors
// ---------------------------------------------------------------------------

/// Maps each genre of the loaded catalog to a distinct colour, used by the
/// scatter chart and the sidebar genre list.
#[derive(Debug, Clone)]
pub struct GenreColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl GenreColors {
    /// Build a colour per genre. Genres come in sorted, so colours are
    /// stable across reloads of the same catalog.
    pub fn new(genres: &BTreeSet<String>) -> Self {
        let palette = generate_palette(genres.len());
        let mapping = genres
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();
        GenreColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a genre.
    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping
            .get(genre)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_genre_gets_a_distinct_color() {
        let genres: BTreeSet<String> = ["pop", "rock", "jazz", "rap"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let colors = GenreColors::new(&genres);
        let assigned: BTreeSet<_> = genres
            .iter()
            .map(|g| colors.color_for(g).to_array())
            .collect();
        assert_eq!(assigned.len(), genres.len());
    }

    #[test]
    fn unknown_genre_falls_back_to_gray() {
        let colors = GenreColors::new(&BTreeSet::new());
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }
}

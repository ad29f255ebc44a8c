use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

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
            srgb_to_color32(hsl.into_color())
        })
        .collect()
}

fn srgb_to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential and diverging ramps for heatmap cells
// ---------------------------------------------------------------------------

/// Sequential ramp for `t` in `[0, 1]`: pale yellow at 0 to deep red at 1.
/// Used for magnitude heatmaps (higher AQI means worse air).
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let low = Hsl::new(55.0, 0.9, 0.8);
    let high = Hsl::new(0.0, 0.85, 0.4);
    srgb_to_color32(low.mix(high, t).into_color())
}

/// Diverging ramp for `t` in `[-1, 1]`: green below zero, white at zero,
/// red above. Used for the correlation heatmap.
pub fn diverging_color(t: f64) -> Color32 {
    let t = t.clamp(-1.0, 1.0) as f32;
    let neutral = Hsl::new(0.0, 0.0, 0.95);
    let end = if t < 0.0 {
        Hsl::new(135.0, 0.7, 0.4)
    } else {
        Hsl::new(0.0, 0.8, 0.45)
    };
    srgb_to_color32(neutral.mix(end, t.abs()).into_color())
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps a fixed set of series labels (locations, years) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Assign palette colours to the labels in the given order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let palette = generate_palette(labels.len());
        let mapping = labels.into_iter().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a series label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

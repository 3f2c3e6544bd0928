//! Gauge dimensions and palette.

use crate::scene::Color;
use serde::{Deserialize, Serialize};

/// Square viewport edge, in user units.
pub const VIEWPORT: f64 = 100.0;

/// Visual parameters shared by both gauge variants.
///
/// Defaults are the reference values; a config file may override colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeStyle {
    pub ring_radius: f64,
    pub ring_width: f64,
    pub ring_track: Color,
    pub ring_accent: Color,
    pub ring_text: Color,
    pub ring_font_size: f64,

    pub outer_radius: f64,
    pub inner_radius: f64,
    /// Degrees trimmed from each end of every segment.
    pub segment_gap: f64,
    pub needle_length: f64,
    pub needle_width: f64,
    pub hub_radius: f64,
    /// Fill for tiers 1, 2, 3.
    pub tier_colors: [Color; 3],
    /// Fill for segments not selected by the current tier.
    pub muted: Color,
    pub needle: Color,
}

impl Default for GaugeStyle {
    fn default() -> Self {
        Self {
            ring_radius: 40.0,
            ring_width: 8.0,
            ring_track: Color::from("#ddd"),
            ring_accent: Color::from("#c3aed6"),
            ring_text: Color::from("#7957a8"),
            ring_font_size: 16.0,

            outer_radius: 40.0,
            inner_radius: 25.0,
            segment_gap: 2.0,
            needle_length: 35.0,
            needle_width: 2.0,
            hub_radius: 3.0,
            tier_colors: [
                Color::from("#7ed6a5"),
                Color::from("#f5c26b"),
                Color::from("#e8757a"),
            ],
            muted: Color::from("#ece6f3"),
            needle: Color::from("#4a3a6b"),
        }
    }
}

impl GaugeStyle {
    pub fn center(&self) -> crate::scene::Point {
        crate::scene::Point::new(VIEWPORT / 2.0, VIEWPORT / 2.0)
    }
}

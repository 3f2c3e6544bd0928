//! skinage-gauge — Gauge geometry for skin and lifestyle scores.
//!
//! Maps a score (five-level label or 1–3 tier) to a typed scene of shapes
//! on a 100×100 viewport, and serializes scenes to escaped SVG markup.
//! Every input, recognized or not, yields a defined rendering.

pub mod bars;
pub mod input;
pub mod level;
pub mod ring;
pub mod scene;
pub mod segmented;
pub mod style;
pub mod svg;

pub use input::GaugeInput;
pub use level::ScoreLevel;
pub use scene::{Color, PathCommand, Point, Scene, Shape, Stroke};
pub use style::GaugeStyle;
pub use svg::to_svg;

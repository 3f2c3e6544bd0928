//! Percentage-ring gauge.
//!
//! A neutral track circle under an accent circle whose dash offset exposes
//! `percentage` of the circumference, starting at 12 o'clock and running
//! clockwise, with the percentage printed in the middle.

use crate::level::ScoreLevel;
use crate::scene::{LineCap, Scene, Shape, Stroke, TextAnchor};
use crate::style::{GaugeStyle, VIEWPORT};
use std::f64::consts::PI;

/// Fill used for missing or unrecognized labels.
pub const DEFAULT_PERCENTAGE: u8 = 50;

/// Rotation applied to the ring so the dash starts at the top.
const START_ROTATION: f64 = -90.0;

/// Numeric parameters of one ring rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub radius: f64,
    pub circumference: f64,
    pub percentage: u8,
    pub dash_offset: f64,
}

/// Percentage for a level, or [`DEFAULT_PERCENTAGE`] when there is none.
pub fn percentage(level: Option<ScoreLevel>) -> u8 {
    level.map_or(DEFAULT_PERCENTAGE, ScoreLevel::percentage)
}

/// Percentage for a raw label; unknown labels fall back to the default.
pub fn label_percentage(label: &str) -> u8 {
    percentage(ScoreLevel::parse(label))
}

pub fn circumference(radius: f64) -> f64 {
    2.0 * PI * radius
}

/// Dash offset that leaves `percentage` of the ring visible.
///
/// `percentage` is clamped to [0, 100].
pub fn dash_offset(circumference: f64, percentage: f64) -> f64 {
    let pct = percentage.clamp(0.0, 100.0);
    circumference - (pct / 100.0) * circumference
}

pub fn geometry(level: Option<ScoreLevel>, style: &GaugeStyle) -> RingGeometry {
    let pct = percentage(level);
    let c = circumference(style.ring_radius);
    RingGeometry {
        radius: style.ring_radius,
        circumference: c,
        percentage: pct,
        dash_offset: dash_offset(c, pct as f64),
    }
}

/// Render a ring gauge with the reference style.
pub fn render(level: Option<ScoreLevel>) -> Scene {
    render_with(level, &GaugeStyle::default())
}

/// Render a ring gauge for a raw label. Never fails.
pub fn render_label(label: &str) -> Scene {
    render(ScoreLevel::parse(label))
}

pub fn render_with(level: Option<ScoreLevel>, style: &GaugeStyle) -> Scene {
    let geo = geometry(level, style);
    let center = style.center();
    let mut scene = Scene::new(VIEWPORT, VIEWPORT);

    scene.push(Shape::Circle {
        center,
        radius: geo.radius,
        fill: None,
        stroke: Some(Stroke::solid(style.ring_track.clone(), style.ring_width)),
        rotation: None,
    });

    scene.push(Shape::Circle {
        center,
        radius: geo.radius,
        fill: None,
        stroke: Some(Stroke {
            color: style.ring_accent.clone(),
            width: style.ring_width,
            dash_array: Some(geo.circumference),
            dash_offset: Some(geo.dash_offset),
            line_cap: Some(LineCap::Round),
        }),
        rotation: Some(START_ROTATION),
    });

    scene.push(Shape::Text {
        at: center,
        content: format!("{}%", geo.percentage),
        font_size: style.ring_font_size,
        fill: style.ring_text.clone(),
        anchor: TextAnchor::Middle,
        bold: false,
    });

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn accent_offset(scene: &Scene) -> f64 {
        scene
            .shapes
            .iter()
            .find_map(|s| match s {
                Shape::Circle {
                    stroke: Some(Stroke { dash_offset: Some(o), .. }),
                    ..
                } => Some(*o),
                _ => None,
            })
            .expect("accent circle")
    }

    #[test]
    fn test_lookup_table() {
        assert_eq!(label_percentage("very_low"), 10);
        assert_eq!(label_percentage("low"), 30);
        assert_eq!(label_percentage("moderate"), 50);
        assert_eq!(label_percentage("high"), 75);
        assert_eq!(label_percentage("very_high"), 90);
    }

    #[test]
    fn test_unknown_and_missing_default_to_fifty() {
        assert_eq!(label_percentage("banana"), DEFAULT_PERCENTAGE);
        assert_eq!(label_percentage("High"), DEFAULT_PERCENTAGE);
        assert_eq!(label_percentage(" low "), DEFAULT_PERCENTAGE);
        assert_eq!(label_percentage(""), DEFAULT_PERCENTAGE);
        assert_eq!(percentage(None), 50);
    }

    #[test]
    fn test_offset_endpoints() {
        let c = circumference(40.0);
        assert!((dash_offset(c, 0.0) - c).abs() < EPS);
        assert!(dash_offset(c, 100.0).abs() < EPS);
    }

    #[test]
    fn test_offset_clamps_out_of_range() {
        let c = circumference(40.0);
        assert!((dash_offset(c, -20.0) - c).abs() < EPS);
        assert!(dash_offset(c, 140.0).abs() < EPS);
    }

    #[test]
    fn test_geometry_reference_values() {
        let geo = geometry(Some(ScoreLevel::High), &GaugeStyle::default());
        assert_eq!(geo.radius, 40.0);
        assert!((geo.circumference - 80.0 * PI).abs() < EPS);
        assert!((geo.dash_offset - 0.25 * 80.0 * PI).abs() < EPS);
    }

    #[test]
    fn test_render_layers() {
        let scene = render(Some(ScoreLevel::Low));
        assert_eq!(scene.width, 100.0);
        assert_eq!(scene.height, 100.0);
        assert_eq!(scene.shapes.len(), 3);

        match &scene.shapes[0] {
            Shape::Circle { stroke: Some(s), rotation, .. } => {
                assert_eq!(s.color.as_str(), "#ddd");
                assert!(s.dash_offset.is_none());
                assert!(rotation.is_none());
            }
            other => panic!("expected track circle, got {other:?}"),
        }
        match &scene.shapes[1] {
            Shape::Circle { stroke: Some(s), rotation, .. } => {
                assert_eq!(s.line_cap, Some(LineCap::Round));
                assert_eq!(*rotation, Some(-90.0));
            }
            other => panic!("expected accent circle, got {other:?}"),
        }
        match &scene.shapes[2] {
            Shape::Text { content, .. } => assert_eq!(content, "30%"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_render_label_unknown_matches_moderate() {
        assert_eq!(render_label("???"), render(Some(ScoreLevel::Moderate)));
    }

    #[test]
    fn test_offsets_decrease_along_scale() {
        let offsets: Vec<f64> = ScoreLevel::ALL
            .iter()
            .map(|l| accent_offset(&render(Some(*l))))
            .collect();
        for pair in offsets.windows(2) {
            assert!(pair[1] < pair[0], "offsets not decreasing: {offsets:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_offset_matches_closed_form(pct in 0.0f64..=100.0, r in 1.0f64..200.0) {
            let c = circumference(r);
            let expected = c * (1.0 - pct / 100.0);
            prop_assert!((dash_offset(c, pct) - expected).abs() < 1e-9 * c.max(1.0));
        }

        #[test]
        fn prop_offset_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let c = circumference(40.0);
            if a < b {
                prop_assert!(dash_offset(c, a) >= dash_offset(c, b));
            }
        }

        #[test]
        fn prop_any_label_renders(label in ".*") {
            let scene = render_label(&label);
            prop_assert_eq!(scene.shapes.len(), 3);
        }
    }
}

//! Segmented three-tier gauge with a needle.
//!
//! The circle is split into three 120° donut segments separated by a small
//! gap. Angles are in degrees, 0° at 12 o'clock, increasing clockwise.

use crate::scene::{Color, LineCap, PathCommand, Point, Scene, Shape, Stroke};
use crate::style::{GaugeStyle, VIEWPORT};
use std::f64::consts::PI;

pub const SEGMENT_COUNT: usize = 3;
pub const SEGMENT_SWEEP: f64 = 360.0 / SEGMENT_COUNT as f64;

/// Needle angle for tiers 1, 2, 3.
const NEEDLE_ANGLES: [f64; SEGMENT_COUNT] = [30.0, 150.0, 270.0];

/// Needle angle for missing or out-of-range tiers.
pub const DEFAULT_NEEDLE_ANGLE: f64 = 0.0;

/// Boundary geometry of one donut segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_angle: f64,
    pub end_angle: f64,
    pub outer_start: Point,
    pub outer_end: Point,
    pub inner_start: Point,
    pub inner_end: Point,
    pub fill: Color,
}

impl Segment {
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Closed path: outer arc clockwise, inner arc back counter-clockwise.
    pub fn path(&self, outer_radius: f64, inner_radius: f64) -> Vec<PathCommand> {
        let large_arc = self.sweep() > 180.0;
        vec![
            PathCommand::MoveTo(self.outer_start),
            PathCommand::ArcTo {
                radius: outer_radius,
                large_arc,
                sweep: true,
                to: self.outer_end,
            },
            PathCommand::LineTo(self.inner_end),
            PathCommand::ArcTo {
                radius: inner_radius,
                large_arc,
                sweep: false,
                to: self.inner_start,
            },
            PathCommand::Close,
        ]
    }
}

/// Zero-based index of a valid tier (1..=3).
pub fn tier_index(tier: Option<i64>) -> Option<usize> {
    match tier {
        Some(t @ 1..=3) => Some((t - 1) as usize),
        _ => None,
    }
}

pub fn needle_angle(tier: Option<i64>) -> f64 {
    tier_index(tier).map_or(DEFAULT_NEEDLE_ANGLE, |i| NEEDLE_ANGLES[i])
}

/// Accent color for a tier, `None` for unrecognized tiers.
pub fn tier_color(tier: Option<i64>, style: &GaugeStyle) -> Option<&Color> {
    tier_index(tier).map(|i| &style.tier_colors[i])
}

/// Point at `radius` from `center` along `angle` degrees (0° = top, clockwise).
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    let rad = (angle - 90.0) * PI / 180.0;
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Start/end angles for segment `index`, with the gap trimmed from both ends.
pub fn segment_angles(index: usize, gap: f64) -> (f64, f64) {
    let start = index as f64 * SEGMENT_SWEEP;
    (start + gap, start + SEGMENT_SWEEP - gap)
}

/// All three segments; the one matching `tier` carries its accent color.
pub fn segments(tier: Option<i64>, style: &GaugeStyle) -> Vec<Segment> {
    let center = style.center();
    let active = tier_index(tier);
    (0..SEGMENT_COUNT)
        .map(|i| {
            let (start, end) = segment_angles(i, style.segment_gap);
            let fill = if active == Some(i) {
                style.tier_colors[i].clone()
            } else {
                style.muted.clone()
            };
            Segment {
                start_angle: start,
                end_angle: end,
                outer_start: polar(center, style.outer_radius, start),
                outer_end: polar(center, style.outer_radius, end),
                inner_start: polar(center, style.inner_radius, start),
                inner_end: polar(center, style.inner_radius, end),
                fill,
            }
        })
        .collect()
}

/// Render a tier gauge with the reference style.
pub fn render(tier: Option<i64>) -> Scene {
    render_with(tier, &GaugeStyle::default())
}

/// Render a tier gauge for a raw integer. Never fails.
pub fn render_tier(tier: i64) -> Scene {
    render(Some(tier))
}

pub fn render_with(tier: Option<i64>, style: &GaugeStyle) -> Scene {
    let center = style.center();
    let mut scene = Scene::new(VIEWPORT, VIEWPORT);

    for seg in segments(tier, style) {
        scene.push(Shape::Path {
            commands: seg.path(style.outer_radius, style.inner_radius),
            fill: seg.fill,
        });
    }

    let tip = polar(center, style.needle_length, needle_angle(tier));
    scene.push(Shape::Line {
        from: center,
        to: tip,
        stroke: Stroke {
            line_cap: Some(LineCap::Round),
            ..Stroke::solid(style.needle.clone(), style.needle_width)
        },
    });
    scene.push(Shape::Circle {
        center,
        radius: style.hub_radius,
        fill: Some(style.needle.clone()),
        stroke: None,
        rotation: None,
    });

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn needle_tip(scene: &Scene) -> Point {
        scene
            .shapes
            .iter()
            .find_map(|s| match s {
                Shape::Line { to, .. } => Some(*to),
                _ => None,
            })
            .expect("needle")
    }

    #[test]
    fn test_needle_angles() {
        assert_eq!(needle_angle(Some(1)), 30.0);
        assert_eq!(needle_angle(Some(2)), 150.0);
        assert_eq!(needle_angle(Some(3)), 270.0);
        assert_eq!(needle_angle(Some(0)), 0.0);
        assert_eq!(needle_angle(Some(4)), 0.0);
        assert_eq!(needle_angle(Some(-1)), 0.0);
        assert_eq!(needle_angle(None), 0.0);
    }

    #[test]
    fn test_tier_colors_distinct() {
        let style = GaugeStyle::default();
        let c1 = tier_color(Some(1), &style).unwrap();
        let c2 = tier_color(Some(2), &style).unwrap();
        let c3 = tier_color(Some(3), &style).unwrap();
        assert_ne!(c1, c2);
        assert_ne!(c2, c3);
        assert_ne!(c1, c3);
        assert!(tier_color(Some(9), &style).is_none());
        for c in [c1, c2, c3] {
            assert_ne!(*c, style.needle);
        }
    }

    #[test]
    fn test_polar_orientation() {
        let c = Point::new(50.0, 50.0);
        let top = polar(c, 40.0, 0.0);
        assert!((top.x - 50.0).abs() < EPS && (top.y - 10.0).abs() < EPS);
        let right = polar(c, 40.0, 90.0);
        assert!((right.x - 90.0).abs() < EPS && (right.y - 50.0).abs() < EPS);
        let bottom = polar(c, 40.0, 180.0);
        assert!((bottom.x - 50.0).abs() < EPS && (bottom.y - 90.0).abs() < EPS);
    }

    #[test]
    fn test_segment_angles_with_gap() {
        assert_eq!(segment_angles(0, 2.0), (2.0, 118.0));
        assert_eq!(segment_angles(1, 2.0), (122.0, 238.0));
        assert_eq!(segment_angles(2, 2.0), (242.0, 358.0));
    }

    #[test]
    fn test_adjacent_boundaries_never_coincide() {
        let segs = segments(Some(2), &GaugeStyle::default());
        for i in 0..SEGMENT_COUNT {
            let a = &segs[i];
            let b = &segs[(i + 1) % SEGMENT_COUNT];
            assert_ne!(a.end_angle, b.start_angle);
            assert!(a.outer_end.distance(&b.outer_start) > 1.0);
            assert!(a.inner_end.distance(&b.inner_start) > 0.5);
        }
    }

    #[test]
    fn test_segment_path_shape() {
        let segs = segments(None, &GaugeStyle::default());
        let path = segs[0].path(40.0, 25.0);
        assert_eq!(path.len(), 5);
        assert!(matches!(path[0], PathCommand::MoveTo(p) if p == segs[0].outer_start));
        assert!(matches!(
            path[1],
            PathCommand::ArcTo { radius, large_arc: false, sweep: true, to } if radius == 40.0 && to == segs[0].outer_end
        ));
        assert!(matches!(path[2], PathCommand::LineTo(p) if p == segs[0].inner_end));
        assert!(matches!(
            path[3],
            PathCommand::ArcTo { radius, large_arc: false, sweep: false, to } if radius == 25.0 && to == segs[0].inner_start
        ));
        assert_eq!(path[4], PathCommand::Close);
    }

    #[test]
    fn test_large_arc_flag_for_wide_segment() {
        let seg = Segment {
            start_angle: 0.0,
            end_angle: 200.0,
            outer_start: Point::new(0.0, 0.0),
            outer_end: Point::new(0.0, 0.0),
            inner_start: Point::new(0.0, 0.0),
            inner_end: Point::new(0.0, 0.0),
            fill: Color::from("#000"),
        };
        assert!(matches!(seg.path(40.0, 25.0)[1], PathCommand::ArcTo { large_arc: true, .. }));
    }

    #[test]
    fn test_active_segment_highlighted() {
        let style = GaugeStyle::default();
        let segs = segments(Some(3), &style);
        assert_eq!(segs[0].fill, style.muted);
        assert_eq!(segs[1].fill, style.muted);
        assert_eq!(segs[2].fill, style.tier_colors[2]);

        let none = segments(Some(42), &style);
        assert!(none.iter().all(|s| s.fill == style.muted));
    }

    #[test]
    fn test_render_needle_points_up_for_unknown() {
        let tip = needle_tip(&render(None));
        assert!((tip.x - 50.0).abs() < EPS);
        assert!((tip.y - 15.0).abs() < EPS);
    }

    #[test]
    fn test_render_shape_count() {
        let scene = render_tier(1);
        // three segments, needle, hub
        assert_eq!(scene.shapes.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_any_tier_renders(t in any::<i64>()) {
            let scene = render_tier(t);
            prop_assert_eq!(scene.shapes.len(), 5);
            let tip = needle_tip(&scene);
            prop_assert!((tip.distance(&Point::new(50.0, 50.0)) - 35.0).abs() < 1e-9);
        }
    }
}

//! Grouped bar chart, used to compare a user's metrics with peer averages.

use crate::scene::{Color, Point, Scene, Shape, Stroke, TextAnchor};

const WIDTH: f64 = 360.0;
const HEIGHT: f64 = 220.0;
const MARGIN_LEFT: f64 = 36.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 28.0;
const MARGIN_BOTTOM: f64 = 36.0;
const BAR_GAP: f64 = 4.0;
const AXIS: &str = "#999";
const LABEL: &str = "#444";

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color,
    /// One value per category; missing values draw nothing.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarChart {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl BarChart {
    /// Largest finite, positive value across all series (1.0 if none).
    pub fn max_value(&self) -> f64 {
        let max = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .copied()
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(0.0f64, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            || self
                .series
                .iter()
                .all(|s| s.values.iter().all(|v| v.map_or(true, |x| !x.is_finite() || x <= 0.0)))
    }

    pub fn render(&self) -> Scene {
        let mut scene = Scene::new(WIDTH, HEIGHT);
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_h;

        scene.push(Shape::Line {
            from: Point::new(MARGIN_LEFT, baseline),
            to: Point::new(WIDTH - MARGIN_RIGHT, baseline),
            stroke: Stroke::solid(Color::from(AXIS), 1.0),
        });
        scene.push(Shape::Line {
            from: Point::new(MARGIN_LEFT, MARGIN_TOP),
            to: Point::new(MARGIN_LEFT, baseline),
            stroke: Stroke::solid(Color::from(AXIS), 1.0),
        });

        // legend
        for (i, s) in self.series.iter().enumerate() {
            let x = MARGIN_LEFT + i as f64 * 110.0;
            scene.push(Shape::Rect {
                origin: Point::new(x, 8.0),
                width: 10.0,
                height: 10.0,
                fill: s.color.clone(),
                corner_radius: 2.0,
            });
            scene.push(Shape::Text {
                at: Point::new(x + 14.0, 13.0),
                content: s.name.clone(),
                font_size: 10.0,
                fill: Color::from(LABEL),
                anchor: TextAnchor::Start,
                bold: false,
            });
        }

        if self.categories.is_empty() {
            return scene;
        }

        let max = self.max_value();
        scene.push(Shape::Text {
            at: Point::new(MARGIN_LEFT - 4.0, MARGIN_TOP),
            content: crate::svg::num((max * 10.0).round() / 10.0),
            font_size: 9.0,
            fill: Color::from(LABEL),
            anchor: TextAnchor::End,
            bold: false,
        });

        let group_w = plot_w / self.categories.len() as f64;
        let series_n = self.series.len().max(1) as f64;
        let bar_w = ((group_w - 2.0 * BAR_GAP) / series_n).max(1.0);

        for (ci, category) in self.categories.iter().enumerate() {
            let group_x = MARGIN_LEFT + ci as f64 * group_w;
            for (si, s) in self.series.iter().enumerate() {
                let Some(value) = s.values.get(ci).copied().flatten() else {
                    continue;
                };
                if !value.is_finite() {
                    continue;
                }
                let h = (value.max(0.0) / max).min(1.0) * plot_h;
                scene.push(Shape::Rect {
                    origin: Point::new(group_x + BAR_GAP + si as f64 * bar_w, baseline - h),
                    width: bar_w - 1.0,
                    height: h,
                    fill: s.color.clone(),
                    corner_radius: 2.0,
                });
            }
            scene.push(Shape::Text {
                at: Point::new(group_x + group_w / 2.0, baseline + 14.0),
                content: category.replace('_', " "),
                font_size: 10.0,
                fill: Color::from(LABEL),
                anchor: TextAnchor::Middle,
                bold: false,
            });
        }

        scene
    }
}

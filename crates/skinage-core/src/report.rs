//! Results document: ages, skin score, one gauge per insight, lifestyle
//! rings, and a comparison chart against peer averages.

use crate::lifestyle::{Factor, FactorReading, SkinFactors};
use crate::prediction::PredictionResponse;
use crate::quality::Attribute;
use chrono::{DateTime, Utc};
use skinage_gauge::bars::{BarChart, Series};
use skinage_gauge::scene::TextAnchor;
use skinage_gauge::{ring, Color, GaugeInput, GaugeStyle, Point, Scene, Shape};
use std::collections::BTreeSet;

const WIDTH: f64 = 540.0;
const COLUMNS: usize = 4;
const CARD_WIDTH: f64 = WIDTH / COLUMNS as f64;
const CARD_HEIGHT: f64 = 160.0;
const GAUGE: f64 = 100.0;
const SECTION_GAP: f64 = 36.0;
const TITLE: &str = "Skin Age & Real Age Prediction";
const HEADING: &str = "#6e4cfe";
const BODY: &str = "#333";

pub struct Report {
    response: PredictionResponse,
    factors: Option<SkinFactors>,
    style: GaugeStyle,
    generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(response: PredictionResponse) -> Self {
        Self {
            response,
            factors: None,
            style: GaugeStyle::default(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_factors(mut self, factors: SkinFactors) -> Self {
        self.factors = Some(factors);
        self
    }

    pub fn with_style(mut self, style: GaugeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    /// Attribute keys shown as insight cards, in display order.
    pub fn insight_keys(&self) -> Vec<String> {
        let keys: BTreeSet<&String> = self
            .response
            .insights
            .keys()
            .chain(self.response.numeric_insights.keys())
            .collect();
        keys.into_iter().cloned().collect()
    }

    /// Comparison chart, or `None` when neither side has a plottable value.
    pub fn comparison_chart(&self) -> Option<BarChart> {
        let r = &self.response;
        if r.real_data.is_empty() && r.average_data.is_empty() {
            return None;
        }

        let mut categories: Vec<String> = Attribute::ALL
            .iter()
            .map(|a| a.key().to_string())
            .filter(|k| r.real_data.contains_key(k) || r.average_data.contains_key(k))
            .collect();
        let extra: BTreeSet<&String> = r
            .real_data
            .keys()
            .chain(r.average_data.keys())
            .filter(|k| !categories.contains(*k))
            .collect();
        categories.extend(extra.into_iter().cloned());

        let pick = |map: &std::collections::BTreeMap<String, Option<f64>>| -> Vec<Option<f64>> {
            categories
                .iter()
                .map(|c| map.get(c).copied().flatten())
                .collect()
        };
        let series = vec![
            Series {
                name: "You".into(),
                color: self.style.ring_text.clone(),
                values: pick(&r.real_data),
            },
            Series {
                name: "Average".into(),
                color: self.style.ring_accent.clone(),
                values: pick(&r.average_data),
            },
        ];
        let chart = BarChart { categories, series };
        (!chart.is_empty()).then_some(chart)
    }

    pub fn render(&self) -> Scene {
        let mut shapes = Vec::new();
        let mut y = 32.0;

        shapes.push(text(WIDTH / 2.0, y, TITLE, 20.0, HEADING, TextAnchor::Middle, true));
        y += 32.0;

        let age = |a: &Option<crate::AgeEstimate>| {
            a.as_ref().map_or_else(|| "n/a".to_string(), |a| a.to_string())
        };
        shapes.push(text(
            WIDTH / 2.0,
            y,
            &format!(
                "Real Age: {}, Skin Age: {}",
                age(&self.response.real_age),
                age(&self.response.skin_age)
            ),
            14.0,
            BODY,
            TextAnchor::Middle,
            false,
        ));
        y += 22.0;

        if let Some(score) = self.response.skin_quality_score {
            shapes.push(text(
                WIDTH / 2.0,
                y,
                &format!("Skin Score: {score}"),
                14.0,
                BODY,
                TextAnchor::Middle,
                true,
            ));
            y += 22.0;
        }

        let keys = self.insight_keys();
        if !keys.is_empty() {
            y += SECTION_GAP / 2.0;
            shapes.push(text(16.0, y, "Skin Insights", 16.0, HEADING, TextAnchor::Start, true));
            y += 16.0;
            let cards: Vec<Card> = keys
                .iter()
                .map(|k| Card {
                    label: k.replace('_', " "),
                    gauge: GaugeInput::from_optional_json(self.response.numeric_insights.get(k))
                        .render_with(&self.style),
                    caption: self.response.insights.get(k).cloned().unwrap_or_default(),
                })
                .collect();
            y = layout_cards(&mut shapes, cards, y);
        }

        if let Some(factors) = &self.factors {
            y += SECTION_GAP / 2.0;
            shapes.push(text(16.0, y, "Lifestyle Factors", 16.0, HEADING, TextAnchor::Start, true));
            y += 16.0;
            let cards: Vec<Card> = Factor::ALL
                .iter()
                .map(|f| {
                    let reading = factors.reading(*f);
                    let caption = match &reading {
                        FactorReading::Level(level) => f.captions()[level.index()].to_string(),
                        FactorReading::Missing => "Not given".to_string(),
                        FactorReading::Unrecognized(raw) => raw.clone(),
                    };
                    Card {
                        label: f.key().replace('_', " "),
                        gauge: ring::render_with(reading.level(), &self.style),
                        caption,
                    }
                })
                .collect();
            y = layout_cards(&mut shapes, cards, y);
        }

        if let Some(chart) = self.comparison_chart() {
            y += SECTION_GAP / 2.0;
            shapes.push(text(
                16.0,
                y,
                "Compared with Average",
                16.0,
                HEADING,
                TextAnchor::Start,
                true,
            ));
            y += 12.0;
            let chart = chart.render();
            let h = chart.height;
            shapes.push(Shape::Embed {
                offset: Point::new((WIDTH - chart.width) / 2.0, y),
                scene: Box::new(chart),
            });
            y += h;
        }

        y += 20.0;
        shapes.push(text(
            WIDTH - 12.0,
            y,
            &format!("Generated {}", self.generated_at.format("%Y-%m-%d %H:%M UTC")),
            9.0,
            "#999",
            TextAnchor::End,
            false,
        ));
        y += 14.0;

        Scene {
            width: WIDTH,
            height: y,
            shapes,
        }
    }

    pub fn to_svg(&self) -> String {
        skinage_gauge::to_svg(&self.render())
    }
}

struct Card {
    label: String,
    gauge: Scene,
    caption: String,
}

/// Lay cards out in rows of [`COLUMNS`]; returns the y below the last row.
fn layout_cards(shapes: &mut Vec<Shape>, cards: Vec<Card>, top: f64) -> f64 {
    let rows = cards.len().div_ceil(COLUMNS);
    for (i, card) in cards.into_iter().enumerate() {
        let x = (i % COLUMNS) as f64 * CARD_WIDTH;
        let y = top + (i / COLUMNS) as f64 * CARD_HEIGHT;
        shapes.push(Shape::Group {
            offset: Point::new(x, y),
            children: vec![
                text(CARD_WIDTH / 2.0, 12.0, &card.label, 12.0, BODY, TextAnchor::Middle, true),
                Shape::Embed {
                    offset: Point::new((CARD_WIDTH - GAUGE) / 2.0, 24.0),
                    scene: Box::new(card.gauge),
                },
                text(CARD_WIDTH / 2.0, 138.0, &card.caption, 10.0, BODY, TextAnchor::Middle, false),
            ],
        });
    }
    top + rows as f64 * CARD_HEIGHT
}

fn text(x: f64, y: f64, content: &str, size: f64, fill: &str, anchor: TextAnchor, bold: bool) -> Shape {
    Shape::Text {
        at: Point::new(x, y),
        content: content.to_string(),
        font_size: size,
        fill: Color::from(fill),
        anchor,
        bold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::parse_reply;
    use chrono::TimeZone;
    use serde_json::json;

    fn response() -> PredictionResponse {
        parse_reply(
            &json!({
                "real_age": 31,
                "skin_age": 35,
                "skin_quality_score": 74.05,
                "insights": {
                    "wrinkles": "Few fine lines",
                    "dark_circles": "<img src=x onerror=alert(1)>"
                },
                "numeric_insights": {"wrinkles": "moderate", "dark_circles": 3, "pores": "???"},
                "average_data": {"Wrinkles": 12.5, "Dark_circles": 18, "Freckles": 4},
                "real_data": {"wrinkles": 20, "dark_circles": 22}
            })
            .to_string(),
        )
        .unwrap()
    }

    fn fixed(report: Report) -> Report {
        report.generated_at(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 0).unwrap())
    }

    #[test]
    fn test_insight_keys_union_sorted() {
        let report = Report::new(response());
        assert_eq!(report.insight_keys(), vec!["dark_circles", "pores", "wrinkles"]);
    }

    #[test]
    fn test_comparison_categories_known_first() {
        let chart = Report::new(response()).comparison_chart().unwrap();
        assert_eq!(chart.categories, vec!["dark_circles", "wrinkles", "freckles"]);
        assert_eq!(chart.series[0].values, vec![Some(22.0), Some(20.0), None]);
        assert_eq!(chart.series[1].values, vec![Some(18.0), Some(12.5), Some(4.0)]);
    }

    #[test]
    fn test_no_chart_without_data() {
        assert!(Report::new(PredictionResponse::default()).comparison_chart().is_none());
    }

    #[test]
    fn test_no_chart_when_all_values_missing() {
        let r = parse_reply(r#"{"average_data": {"wrinkles": null}, "real_data": {"wrinkles": null}}"#)
            .unwrap();
        let report = Report::new(r);
        assert!(report.comparison_chart().is_none());
        assert!(!report.to_svg().contains("Compared with Average"));
    }

    #[test]
    fn test_svg_contents() {
        let svg = fixed(Report::new(response())).to_svg();
        assert!(svg.contains("Skin Age &amp; Real Age Prediction"));
        assert!(svg.contains("Real Age: 31, Skin Age: 35"));
        assert!(svg.contains("Skin Score: 74.05"));
        assert!(svg.contains(">dark circles</text>"));
        // unknown label renders the default ring
        assert!(svg.contains(">50%</text>"));
        // tier input renders the needle gauge
        assert!(svg.contains("<line "));
        assert!(!svg.contains("<img"));
        assert!(svg.contains("Generated 2025-01-02 03:04 UTC"));
    }

    #[test]
    fn test_factors_section() {
        let mut f = SkinFactors::default();
        f.set_raw("sleep_cycle", "sometimes");
        let svg = fixed(Report::new(PredictionResponse::default()).with_factors(f)).to_svg();
        assert!(svg.contains("Lifestyle Factors"));
        assert!(svg.contains(">sometimes</text>"));
        assert!(svg.contains(">Moderate</text>"));
        assert!(!svg.contains(">Irregular</text>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = fixed(Report::new(response())).to_svg();
        let b = fixed(Report::new(response())).to_svg();
        assert_eq!(a, b);
    }

    #[test]
    fn test_height_grows_with_cards() {
        let small = Report::new(PredictionResponse::default()).render().height;
        let big = Report::new(response()).render().height;
        assert!(big > small + CARD_HEIGHT);
    }
}

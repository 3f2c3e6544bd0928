//! Skin quality score, skin age, and insight bands.

use crate::lifestyle::SkinFactors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Years subtracted from a detected age to offset model overestimation.
const AGE_OVERESTIMATE: i64 = 8;

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("real age not available; cannot derive skin age")]
    NoRealAge,
}

/// Raw skin measurements, each on its own scale (see [`Attribute`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinMetrics {
    pub dark_circles: f64,
    pub wrinkles: f64,
    pub evenness: f64,
    pub pigmentation: f64,
}

impl SkinMetrics {
    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::DarkCircles => self.dark_circles,
            Attribute::Wrinkles => self.wrinkles,
            Attribute::Evenness => self.evenness,
            Attribute::Pigmentation => self.pigmentation,
        }
    }
}

/// Skin attribute reported by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    DarkCircles,
    Wrinkles,
    Evenness,
    Pigmentation,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::DarkCircles,
        Attribute::Wrinkles,
        Attribute::Evenness,
        Attribute::Pigmentation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::DarkCircles => "dark_circles",
            Self::Wrinkles => "wrinkles",
            Self::Evenness => "evenness",
            Self::Pigmentation => "pigmentation",
        }
    }

    /// Upper bounds of the mild and noticeable bands.
    fn bands(self) -> (f64, f64) {
        match self {
            Self::DarkCircles => (20.0, 30.0),
            Self::Wrinkles => (15.0, 25.0),
            Self::Evenness => (80.0, 100.0),
            Self::Pigmentation => (20.0, 40.0),
        }
    }

    fn texts(self) -> [&'static str; 3] {
        match self {
            Self::DarkCircles => [
                "Mild dark circles",
                "Noticeable dark circles",
                "Prominent dark circles",
            ],
            Self::Wrinkles => ["Smooth skin", "Few fine lines", "Visible wrinkles"],
            Self::Evenness => [
                "Even skin tone",
                "Slight unevenness",
                "Noticeable uneven skin tone",
            ],
            Self::Pigmentation => [
                "Minimal pigmentation",
                "Moderate pigmentation",
                "High pigmentation",
            ],
        }
    }

    /// Weight in the quality score.
    fn weight(self) -> f64 {
        match self {
            Self::DarkCircles | Self::Wrinkles => 0.25,
            Self::Evenness | Self::Pigmentation => 0.20,
        }
    }

    pub fn classify(self, value: f64) -> Severity {
        let (mild, noticeable) = self.bands();
        if value < mild {
            Severity::Mild
        } else if value < noticeable {
            Severity::Noticeable
        } else {
            Severity::Prominent
        }
    }
}

/// Three-band severity; the tier drives the segmented gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Noticeable,
    Prominent,
}

impl Severity {
    pub fn tier(self) -> i64 {
        match self {
            Self::Mild => 1,
            Self::Noticeable => 2,
            Self::Prominent => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub attribute: Attribute,
    pub severity: Severity,
    pub text: String,
}

pub fn insights(metrics: &SkinMetrics) -> Vec<Insight> {
    Attribute::ALL
        .iter()
        .map(|&attribute| {
            let severity = attribute.classify(metrics.get(attribute));
            let idx = severity.tier() as usize - 1;
            Insight {
                attribute,
                severity,
                text: attribute.texts()[idx].to_string(),
            }
        })
        .collect()
}

/// Overall quality in [0, 100], rounded to two decimals. Higher is better.
pub fn skin_quality_score(metrics: &SkinMetrics, real_age: u32) -> f64 {
    let age_factor = (real_age as f64).powi(2) / 200.0;
    let penalty: f64 = Attribute::ALL
        .iter()
        .map(|a| a.weight() * metrics.get(*a))
        .sum::<f64>()
        + 0.10 * age_factor;
    round2((100.0 - penalty).max(0.0))
}

/// Skin age: real age plus lifestyle adjustments plus one year per ten
/// points of lost quality, never below 1.
pub fn skin_age(
    real_age: Option<u32>,
    quality_score: f64,
    factors: &SkinFactors,
) -> Result<u32, AnalysisError> {
    let real_age = real_age.ok_or(AnalysisError::NoRealAge)?;
    let quality_adjustment = ((100.0 - quality_score) / 10.0).floor() as i64;
    let age = real_age as i64 + factors.total_adjustment() as i64 + quality_adjustment;
    tracing::debug!(
        real_age,
        lifestyle = factors.total_adjustment(),
        quality_adjustment,
        "skin age computed"
    );
    Ok(age.clamp(1, u32::MAX as i64) as u32)
}

/// Correct a detected age for model overestimation, floored at 1.
pub fn corrected_age(detected: i64) -> u32 {
    detected
        .saturating_sub(AGE_OVERESTIMATE)
        .clamp(1, u32::MAX as i64) as u32
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

//! Lifestyle factors and their skin-age adjustments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skinage_gauge::ScoreLevel;
use std::collections::BTreeMap;

/// A self-reported lifestyle input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    SunExposure,
    SleepCycle,
    DietLevel,
    StressLevel,
    WaterIntake,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::SunExposure,
        Factor::SleepCycle,
        Factor::DietLevel,
        Factor::StressLevel,
        Factor::WaterIntake,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::SunExposure => "sun_exposure",
            Self::SleepCycle => "sleep_cycle",
            Self::DietLevel => "diet_level",
            Self::StressLevel => "stress_level",
            Self::WaterIntake => "water_intake",
        }
    }

    /// Accepts `sun_exposure` as well as the display form `Sun_Exposure`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Years added to skin age, indexed by level (very_low … very_high).
    pub fn adjustments(self) -> [i32; 5] {
        match self {
            Self::SunExposure => [-1, 0, 1, 2, 3],
            Self::SleepCycle => [2, 1, 0, -1, -2],
            Self::DietLevel => [3, 2, 1, 0, -1],
            Self::StressLevel => [-2, -1, 0, 1, 2],
            Self::WaterIntake => [3, 2, 1, 0, -1],
        }
    }

    /// Adjustment for a reading. Missing factors count as `moderate`;
    /// unrecognized values contribute nothing.
    pub fn adjustment(self, reading: &FactorReading) -> i32 {
        match reading {
            FactorReading::Missing => self.adjustments()[ScoreLevel::Moderate.index()],
            FactorReading::Level(level) => self.adjustments()[level.index()],
            FactorReading::Unrecognized(_) => 0,
        }
    }

    /// Slider captions for each level, lowest first.
    pub fn captions(self) -> [&'static str; 5] {
        match self {
            Self::SunExposure => ["Very Low", "Low", "Moderate", "High", "Very High"],
            Self::SleepCycle => ["Very Poor", "Inadequate", "Irregular", "Good", "Excellent"],
            Self::DietLevel => ["Unhealthy", "Not Balanced", "Moderate", "Healthy", "Excellent"],
            Self::StressLevel => ["Very Low", "Low", "Moderate", "High", "Very High"],
            Self::WaterIntake => ["Insufficient", "Low", "Moderate", "Adequate", "Well Hydrated"],
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parse a factor value: an ordinal label, a diet-scale label, or a
/// slider index `0`–`4`.
pub fn parse_level(raw: &str) -> Option<ScoreLevel> {
    let value = raw.trim().to_ascii_lowercase();
    if let Some(level) = ScoreLevel::parse(&value) {
        return Some(level);
    }
    match value.as_str() {
        "very_poor" => Some(ScoreLevel::VeryLow),
        "poor" => Some(ScoreLevel::Low),
        "healthy" => Some(ScoreLevel::High),
        "very_healthy" => Some(ScoreLevel::VeryHigh),
        other => other.parse::<usize>().ok().and_then(ScoreLevel::from_index),
    }
}

/// What was supplied for one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorReading {
    Missing,
    Level(ScoreLevel),
    Unrecognized(String),
}

impl FactorReading {
    pub fn level(&self) -> Option<ScoreLevel> {
        match self {
            Self::Level(level) => Some(*level),
            _ => None,
        }
    }
}

/// Factor values keyed by factor name, as sent to the prediction service.
///
/// Values are kept verbatim so unknown spellings survive the round trip;
/// interpretation happens in [`SkinFactors::reading`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinFactors(BTreeMap<String, String>);

impl Default for SkinFactors {
    /// Every factor at `moderate`.
    fn default() -> Self {
        let mut factors = Self::empty();
        for f in Factor::ALL {
            factors.set(f, ScoreLevel::Moderate);
        }
        factors
    }
}

impl SkinFactors {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, factor: Factor, level: ScoreLevel) {
        self.0.insert(factor.key().to_string(), level.as_str().to_string());
    }

    /// Store a raw value under a factor key, normalizing the key's case.
    pub fn set_raw(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.trim().to_ascii_lowercase(), value.into());
    }

    pub fn reading(&self, factor: Factor) -> FactorReading {
        match self.0.get(factor.key()) {
            None => FactorReading::Missing,
            Some(raw) => match parse_level(raw) {
                Some(level) => FactorReading::Level(level),
                None => FactorReading::Unrecognized(raw.clone()),
            },
        }
    }

    /// Sum of all factor adjustments, in years.
    pub fn total_adjustment(&self) -> i32 {
        Factor::ALL
            .iter()
            .map(|f| f.adjustment(&self.reading(*f)))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Daily habit points (1 poor, 3 fair, 5 good) with the time they were logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleLog {
    pub water_points: u8,
    pub sleep_points: u8,
    pub stress_points: u8,
    pub sun_points: u8,
    pub timestamp: DateTime<Utc>,
}

impl LifestyleLog {
    pub fn new(water_liters: f64, sleep_hours: u32, stress_level: &str, sun_exposure: &str) -> Self {
        Self::at(water_liters, sleep_hours, stress_level, sun_exposure, Utc::now())
    }

    pub fn at(
        water_liters: f64,
        sleep_hours: u32,
        stress_level: &str,
        sun_exposure: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            water_points: water_points(water_liters),
            sleep_points: sleep_points(sleep_hours),
            stress_points: exposure_points(stress_level),
            sun_points: exposure_points(sun_exposure),
            timestamp,
        }
    }

    pub fn total(&self) -> u8 {
        self.water_points + self.sleep_points + self.stress_points + self.sun_points
    }
}

pub fn water_points(liters: f64) -> u8 {
    if liters <= 1.0 {
        1
    } else if liters <= 2.0 {
        3
    } else {
        5
    }
}

pub fn sleep_points(hours: u32) -> u8 {
    match hours {
        0..=4 => 1,
        5..=7 => 3,
        _ => 5,
    }
}

/// Points for stress or sun exposure: `high` 1, `moderate` 3, anything else 5.
pub fn exposure_points(level: &str) -> u8 {
    match level.trim().to_ascii_lowercase().as_str() {
        "high" => 1,
        "moderate" => 3,
        _ => 5,
    }
}

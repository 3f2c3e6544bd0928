use serde::{Deserialize, Serialize};

/// Five-level ordinal scale, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ScoreLevel {
    pub const ALL: [ScoreLevel; 5] = [
        ScoreLevel::VeryLow,
        ScoreLevel::Low,
        ScoreLevel::Moderate,
        ScoreLevel::High,
        ScoreLevel::VeryHigh,
    ];

    /// Parse a canonical label (`very_low` … `very_high`). Matching is
    /// exact; any other spelling is `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "very_low" => Some(Self::VeryLow),
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "high" => Some(Self::High),
            "very_high" => Some(Self::VeryHigh),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }

    /// Position on the scale, 0 (very_low) through 4 (very_high).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Ring fill percentage for this level.
    pub fn percentage(self) -> u8 {
        match self {
            Self::VeryLow => 10,
            Self::Low => 30,
            Self::Moderate => 50,
            Self::High => 75,
            Self::VeryHigh => 90,
        }
    }
}

impl std::fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

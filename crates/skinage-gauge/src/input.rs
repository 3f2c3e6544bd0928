//! Dispatch of unvalidated score values to a gauge variant.

use crate::level::ScoreLevel;
use crate::scene::Scene;
use crate::style::GaugeStyle;
use crate::{ring, segmented};
use serde_json::Value;

/// A score as received from outside, already resolved to a gauge variant.
///
/// Strings select the ring gauge, integers the tier gauge. Values that fit
/// neither convention keep their variant but carry `None`, which renders
/// the documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeInput {
    Label(Option<ScoreLevel>),
    Tier(Option<i64>),
}

impl GaugeInput {
    /// Interpret a JSON value. Total: every value maps to some input.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_label(s),
            Value::Number(n) => match n.as_i64() {
                Some(t) => Self::Tier(Some(t)),
                None => Self::Tier(None),
            },
            _ => Self::Label(None),
        }
    }

    /// Interpret an optional JSON value; absence renders the ring default.
    pub fn from_optional_json(value: Option<&Value>) -> Self {
        value.map_or(Self::Label(None), Self::from_json)
    }

    pub fn from_label(label: &str) -> Self {
        Self::Label(ScoreLevel::parse(label))
    }

    pub fn render(&self) -> Scene {
        self.render_with(&GaugeStyle::default())
    }

    pub fn render_with(&self, style: &GaugeStyle) -> Scene {
        match *self {
            Self::Label(level) => ring::render_with(level, style),
            Self::Tier(tier) => segmented::render_with(tier, style),
        }
    }

    pub fn is_recognized(&self) -> bool {
        match *self {
            Self::Label(level) => level.is_some(),
            Self::Tier(tier) => segmented::tier_index(tier).is_some(),
        }
    }
}

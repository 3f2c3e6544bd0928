//! Wire contract of the remote prediction service.
//!
//! The service is opaque: we send a captured frame and the lifestyle
//! factors, and receive ages, a quality score and per-attribute insights.
//! Fields are parsed leniently since the service has shipped several
//! response shapes.

use crate::lifestyle::SkinFactors;
use crate::quality::{self, AnalysisError, SkinMetrics};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("prediction service reported: {0}")]
    Service(String),
    #[error("malformed prediction response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// `data:image/jpeg;base64,...` URL of the captured frame.
    pub image: String,
    pub skin_factors: SkinFactors,
}

/// An age as reported by the service: a number of years, or a note such
/// as "Not detected" when estimation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeEstimate {
    Years(f64),
    Note(String),
}

impl AgeEstimate {
    pub fn years(&self) -> Option<f64> {
        match self {
            Self::Years(y) => Some(*y),
            Self::Note(_) => None,
        }
    }
}

impl std::fmt::Display for AgeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Years(y) if y.fract() == 0.0 => write!(f, "{y:.0}"),
            Self::Years(y) => write!(f, "{y:.1}"),
            Self::Note(note) => f.write_str(note),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub real_age: Option<AgeEstimate>,
    #[serde(default)]
    pub skin_age: Option<AgeEstimate>,
    #[serde(default)]
    pub skin_quality_score: Option<f64>,
    /// Attribute key → human-readable insight.
    #[serde(default)]
    pub insights: BTreeMap<String, String>,
    /// Attribute key → gauge score (five-level label or 1–3 tier).
    #[serde(default)]
    pub numeric_insights: BTreeMap<String, Value>,
    /// Peer averages per attribute. Keys are lowercased on read.
    #[serde(default, deserialize_with = "lowercase_metric_map")]
    pub average_data: BTreeMap<String, Option<f64>>,
    /// The user's own measurements per attribute.
    #[serde(default, deserialize_with = "lowercase_metric_map")]
    pub real_data: BTreeMap<String, Option<f64>>,
}

impl PredictionResponse {
    /// Build a response from locally computed metrics.
    ///
    /// Insight gauges carry severity tiers.
    pub fn from_analysis(
        metrics: &SkinMetrics,
        real_age: Option<u32>,
        factors: &SkinFactors,
    ) -> Result<Self, AnalysisError> {
        let real = real_age.ok_or(AnalysisError::NoRealAge)?;
        let score = quality::skin_quality_score(metrics, real);
        let skin_age = quality::skin_age(Some(real), score, factors)?;

        let mut insights = BTreeMap::new();
        let mut numeric_insights = BTreeMap::new();
        let mut real_data = BTreeMap::new();
        for insight in quality::insights(metrics) {
            let key = insight.attribute.key().to_string();
            numeric_insights.insert(key.clone(), Value::from(insight.severity.tier()));
            real_data.insert(key.clone(), Some(metrics.get(insight.attribute)));
            insights.insert(key, insight.text);
        }

        tracing::info!(real_age = real, skin_age, score, "analysis complete");

        Ok(Self {
            real_age: Some(AgeEstimate::Years(real as f64)),
            skin_age: Some(AgeEstimate::Years(skin_age as f64)),
            skin_quality_score: Some(score),
            insights,
            numeric_insights,
            average_data: BTreeMap::new(),
            real_data,
        })
    }
}

/// Parse a service reply body. A top-level `"error"` string is surfaced as
/// [`ReplyError::Service`] regardless of the HTTP status.
pub fn parse_reply(body: &str) -> Result<PredictionResponse, ReplyError> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(message) = service_error(&value) {
        return Err(ReplyError::Service(message));
    }
    Ok(serde_json::from_value(value)?)
}

/// Extract the `"error"` message from a reply, if present.
pub fn service_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lowercase_metric_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.as_f64()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_reply() {
        let body = json!({
            "real_age": 31,
            "skin_age": 35,
            "skin_quality_score": 74.05,
            "insights": {"wrinkles": "Few fine lines"},
            "numeric_insights": {"wrinkles": "moderate", "evenness": 2},
            "average_data": {"Wrinkles": 12.5, "Dark_circles": 18},
            "real_data": {"wrinkles": 20, "dark_circles": null},
            "image_path": "/tmp/captured_image.jpg"
        })
        .to_string();

        let r = parse_reply(&body).unwrap();
        assert_eq!(r.real_age, Some(AgeEstimate::Years(31.0)));
        assert_eq!(r.skin_quality_score, Some(74.05));
        assert_eq!(r.numeric_insights["evenness"], json!(2));
        assert_eq!(r.average_data["wrinkles"], Some(12.5));
        assert_eq!(r.average_data["dark_circles"], Some(18.0));
        assert_eq!(r.real_data["dark_circles"], None);
    }

    #[test]
    fn test_parse_error_reply() {
        let body = r#"{"error": "No face detected. Please ensure your face is visible in the frame."}"#;
        match parse_reply(body) {
            Err(ReplyError::Service(msg)) => assert!(msg.starts_with("No face detected")),
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_minimal_reply() {
        let r = parse_reply(r#"{"real_age": "Not detected", "skin_age": "Error in predicting real age"}"#)
            .unwrap();
        assert_eq!(r.real_age.as_ref().and_then(AgeEstimate::years), None);
        assert_eq!(r.skin_age.unwrap().to_string(), "Error in predicting real age");
        assert!(r.insights.is_empty());
        assert!(r.average_data.is_empty());
    }

    #[test]
    fn test_parse_null_maps() {
        let r = parse_reply(r#"{"average_data": null, "real_data": null}"#).unwrap();
        assert!(r.average_data.is_empty());
        assert!(r.real_data.is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_reply("<html>"), Err(ReplyError::Malformed(_))));
    }

    #[test]
    fn test_age_display() {
        assert_eq!(AgeEstimate::Years(42.0).to_string(), "42");
        assert_eq!(AgeEstimate::Years(42.3).to_string(), "42.3");
    }

    #[test]
    fn test_request_shape() {
        let req = PredictionRequest {
            image: "data:image/jpeg;base64,AAAA".into(),
            skin_factors: SkinFactors::default(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["skin_factors"]["sun_exposure"], "moderate");
        assert_eq!(v["image"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_from_analysis() {
        let m = SkinMetrics {
            dark_circles: 25.0,
            wrinkles: 5.0,
            evenness: 120.0,
            pigmentation: 10.0,
        };
        let r = PredictionResponse::from_analysis(&m, Some(30), &SkinFactors::default()).unwrap();
        assert_eq!(r.insights["dark_circles"], "Noticeable dark circles");
        assert_eq!(r.numeric_insights["dark_circles"], json!(2));
        assert_eq!(r.numeric_insights["evenness"], json!(3));
        assert_eq!(r.real_data["wrinkles"], Some(5.0));
        assert!(r.skin_age.unwrap().years().unwrap() >= 1.0);

        assert!(PredictionResponse::from_analysis(&m, None, &SkinFactors::default()).is_err());
    }
}

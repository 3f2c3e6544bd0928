//! skinage-core — Skin-age domain logic.
//!
//! Lifestyle factor adjustments, skin quality scoring and insight bands,
//! the prediction service contract, and report composition on top of
//! `skinage-gauge` scenes.

pub mod lifestyle;
pub mod prediction;
pub mod quality;
pub mod report;

pub use lifestyle::{Factor, FactorReading, LifestyleLog, SkinFactors};
pub use prediction::{AgeEstimate, PredictionRequest, PredictionResponse, ReplyError};
pub use quality::{AnalysisError, Attribute, Insight, Severity, SkinMetrics};
pub use report::Report;

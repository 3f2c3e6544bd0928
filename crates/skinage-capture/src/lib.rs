//! skinage-capture — Still-frame handling for skin analysis.
//!
//! Decodes captured frames (files or `data:` URLs), checks framing and
//! lighting against the limits the prediction service enforces, and
//! measures the raw skin metrics used for local scoring.

pub mod frame;
pub mod metrics;
pub mod validation;

pub use frame::{Frame, FrameError};
pub use validation::{CaptureError, CaptureLimits, FaceBox};

//! Capture checks: one face, sensibly framed, in usable light.
//!
//! Face boxes come from an external detector; this module only judges them.

use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Bounding box of a detected face, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    pub fn area(&self) -> f64 {
        (self.width.max(0.0) as f64) * (self.height.max(0.0) as f64)
    }
}

impl FromStr for FaceBox {
    type Err = String;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f32> = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid face box {s:?}: {e}"))?;
        match parts[..] {
            [x, y, width, height] if width > 0.0 && height > 0.0 => Ok(Self {
                x,
                y,
                width,
                height,
            }),
            [_, _, _, _] => Err(format!("face box {s:?} must have positive width and height")),
            _ => Err(format!("face box {s:?} must be x,y,width,height")),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CaptureError {
    #[error("No face detected. Please ensure your face is visible in the frame.")]
    NoFace,
    #[error("Multiple faces detected ({0}). Please capture an image with only one person.")]
    MultipleFaces(usize),
    #[error("Face too far from the camera. Move closer.")]
    TooFar { ratio: f64 },
    #[error("Face too close to the camera. Step back.")]
    TooClose { ratio: f64 },
    #[error("Low lighting detected. Please improve lighting conditions.")]
    LowLight { brightness: f32 },
    #[error("Overexposed image detected. Reduce lighting or avoid direct sunlight.")]
    Overexposed { brightness: f32 },
}

/// Acceptance limits for a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureLimits {
    /// Minimum face area as a fraction of the frame.
    pub min_face_ratio: f64,
    pub max_face_ratio: f64,
    /// Mean grayscale brightness bounds.
    pub min_brightness: f32,
    pub max_brightness: f32,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            min_face_ratio: 0.20,
            max_face_ratio: 0.75,
            min_brightness: 90.0,
            max_brightness: 250.0,
        }
    }
}

/// Require exactly one face whose area ratio is within limits.
pub fn check_framing<'a>(
    faces: &'a [FaceBox],
    frame_area: u64,
    limits: &CaptureLimits,
) -> Result<&'a FaceBox, CaptureError> {
    let face = match faces {
        [] => return Err(CaptureError::NoFace),
        [face] => face,
        many => return Err(CaptureError::MultipleFaces(many.len())),
    };
    let ratio = if frame_area == 0 {
        0.0
    } else {
        face.area() / frame_area as f64
    };
    if ratio < limits.min_face_ratio {
        return Err(CaptureError::TooFar { ratio });
    }
    if ratio > limits.max_face_ratio {
        return Err(CaptureError::TooClose { ratio });
    }
    Ok(face)
}

pub fn check_lighting(brightness: f32, limits: &CaptureLimits) -> Result<(), CaptureError> {
    if brightness < limits.min_brightness {
        Err(CaptureError::LowLight { brightness })
    } else if brightness > limits.max_brightness {
        Err(CaptureError::Overexposed { brightness })
    } else {
        Ok(())
    }
}

/// Run framing then lighting checks, as the prediction service does.
pub fn validate(frame: &Frame, faces: &[FaceBox], limits: &CaptureLimits) -> Result<(), CaptureError> {
    let face = check_framing(faces, frame.area(), limits)?;
    let brightness = frame.avg_brightness();
    check_lighting(brightness, limits)?;
    tracing::debug!(
        face_area = face.area(),
        frame_area = frame.area(),
        brightness,
        "capture accepted"
    );
    Ok(())
}

//! Frame type and image processing: decoding, grayscale, contrast, resize.

use base64::{engine::general_purpose, Engine as _};
use image::{imageops::FilterType, DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Edge of the square frame the analysis runs on.
pub const ANALYSIS_SIZE: u32 = 224;

/// Contrast gain applied before analysis.
pub const CONTRAST_FACTOR: f32 = 1.5;

/// A captured still frame.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    /// Packed RGB pixel data (width * height * 3 bytes).
    pub rgb: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub is_dark: bool,
}

impl Frame {
    pub fn from_rgb(rgb: RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let data = rgb_to_grayscale(rgb.as_raw());
        let is_dark = is_dark_frame(&data, 0.95);
        Self {
            data,
            rgb: rgb.into_raw(),
            width,
            height,
            is_dark,
        }
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_rgb(image.to_rgb8())
    }

    /// Decode encoded image bytes (JPEG, PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&image))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FrameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Decode a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, FrameError> {
        Self::decode(&parse_data_url(url)?)
    }

    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Grayscale, contrast-enhanced copy resized to
    /// [`ANALYSIS_SIZE`]×[`ANALYSIS_SIZE`].
    pub fn preprocess(&self) -> Result<Frame, FrameError> {
        let mut gray = self.data.clone();
        enhance_contrast(&mut gray, CONTRAST_FACTOR);
        let img = GrayImage::from_raw(self.width, self.height, gray).ok_or(
            FrameError::InvalidLength {
                expected: (self.width * self.height) as usize,
                actual: self.data.len(),
            },
        )?;
        let resized =
            image::imageops::resize(&img, ANALYSIS_SIZE, ANALYSIS_SIZE, FilterType::CatmullRom);
        tracing::debug!(
            from_width = self.width,
            from_height = self.height,
            size = ANALYSIS_SIZE,
            "frame preprocessed"
        );
        Ok(Self::from_rgb(DynamicImage::ImageLuma8(resized).to_rgb8()))
    }

    /// Re-encode as a JPEG `data:` URL, the form the prediction service expects.
    pub fn to_jpeg_data_url(&self) -> Result<String, FrameError> {
        let rgb = RgbImage::from_raw(self.width, self.height, self.rgb.clone()).ok_or(
            FrameError::InvalidLength {
                expected: (self.width * self.height * 3) as usize,
                actual: self.rgb.len(),
            },
        )?;
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)?;
        Ok(encode_data_url("image/jpeg", &buf))
    }
}

/// Convert packed RGB to grayscale with ITU-R 601 luma weights.
pub fn rgb_to_grayscale(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .map(|p| {
            let l = (p[0] as u32 * 299 + p[1] as u32 * 587 + p[2] as u32 * 114 + 500) / 1000;
            l.min(255) as u8
        })
        .collect()
}

/// Check if a frame is dark: true if more than `threshold_pct` of pixels
/// fall in the darkest bucket (0–31).
pub fn is_dark_frame(gray: &[u8], threshold_pct: f32) -> bool {
    if gray.is_empty() {
        return true;
    }
    let dark_count = gray.iter().filter(|&&p| p < 32).count();
    (dark_count as f32 / gray.len() as f32) > threshold_pct
}

/// Scale each pixel's distance from the mean by `factor`, in place.
pub fn enhance_contrast(gray: &mut [u8], factor: f32) {
    if gray.is_empty() {
        return;
    }
    let mean = (gray.iter().map(|&b| b as f32).sum::<f32>() / gray.len() as f32).round();
    for p in gray.iter_mut() {
        let v = mean + factor * (*p as f32 - mean);
        *p = v.round().clamp(0.0, 255.0) as u8;
    }
}

/// Split a `data:` URL and decode its base64 payload.
pub fn parse_data_url(url: &str) -> Result<Vec<u8>, FrameError> {
    let (header, payload) = url.split_once(',').ok_or(FrameError::InvalidDataUrl)?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(FrameError::InvalidDataUrl);
    }
    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("not a base64 data URL")]
    InvalidDataUrl,
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 3]) -> Frame {
        Frame::from_rgb(RgbImage::from_pixel(w, h, image::Rgb(px)))
    }

    #[test]
    fn test_grayscale_weights() {
        assert_eq!(rgb_to_grayscale(&[255, 255, 255]), vec![255]);
        assert_eq!(rgb_to_grayscale(&[0, 0, 0]), vec![0]);
        // 0.299 * 255 = 76.2
        assert_eq!(rgb_to_grayscale(&[255, 0, 0]), vec![76]);
        assert_eq!(rgb_to_grayscale(&[0, 255, 0]), vec![150]);
        assert_eq!(rgb_to_grayscale(&[0, 0, 255]), vec![29]);
    }

    #[test]
    fn test_avg_brightness() {
        let f = solid(4, 4, [100, 100, 100]);
        assert!((f.avg_brightness() - 100.0).abs() < 1e-3);
        assert_eq!(f.area(), 16);
        assert!(!f.is_dark);
    }

    #[test]
    fn test_dark_frame_detection() {
        assert!(solid(4, 4, [5, 5, 5]).is_dark);
        assert!(is_dark_frame(&[], 0.95));
        let mut gray = vec![10u8; 940];
        gray.extend(vec![128u8; 60]);
        assert!(!is_dark_frame(&gray, 0.95));
    }

    #[test]
    fn test_contrast_stretches_about_mean() {
        let mut gray = vec![90u8, 110];
        enhance_contrast(&mut gray, 1.5);
        assert_eq!(gray, vec![85, 115]);

        let mut clipped = vec![0u8, 255];
        enhance_contrast(&mut clipped, 1.5);
        assert_eq!(clipped, vec![0, 255]);
    }

    #[test]
    fn test_preprocess_size() {
        let f = solid(40, 30, [120, 80, 60]).preprocess().unwrap();
        assert_eq!((f.width, f.height), (ANALYSIS_SIZE, ANALYSIS_SIZE));
        assert_eq!(f.data.len(), (ANALYSIS_SIZE * ANALYSIS_SIZE) as usize);
    }

    #[test]
    fn test_data_url_roundtrip_through_jpeg() {
        let f = solid(8, 8, [200, 180, 160]);
        let url = f.to_jpeg_data_url().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let back = Frame::from_data_url(&url).unwrap();
        assert_eq!((back.width, back.height), (8, 8));
        assert!((back.avg_brightness() - f.avg_brightness()).abs() < 4.0);
    }

    #[test]
    fn test_bad_data_urls() {
        assert!(matches!(parse_data_url("no comma"), Err(FrameError::InvalidDataUrl)));
        assert!(matches!(
            parse_data_url("image/jpeg;base64,AAAA"),
            Err(FrameError::InvalidDataUrl)
        ));
        assert!(matches!(
            parse_data_url("data:image/jpeg;base64,@@@"),
            Err(FrameError::Base64(_))
        ));
        assert!(matches!(
            Frame::from_data_url("data:image/jpeg;base64,AAAA"),
            Err(FrameError::Image(_))
        ));
    }
}

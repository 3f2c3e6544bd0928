//! Raw skin measurements from a still frame.
//!
//! Grayscale measurements run on the preprocessed frame; pigmentation needs
//! color and runs on the original.

use crate::frame::{Frame, FrameError};
use skinage_core::SkinMetrics;

/// Gray level below which a pixel counts as a dark area.
const DARK_LEVEL: u8 = 50;

/// L1 Sobel magnitude at which a pixel counts as an edge.
const EDGE_MAGNITUDE: i32 = 150;

/// Measure all four metrics.
pub fn measure(frame: &Frame) -> Result<SkinMetrics, FrameError> {
    let prepared = frame.preprocess()?;
    let metrics = SkinMetrics {
        dark_circles: dark_area_pct(&prepared.data),
        wrinkles: edge_pct(&prepared.data, prepared.width as usize, prepared.height as usize),
        evenness: std_dev(prepared.data.iter().map(|&b| b as f64)),
        pigmentation: pigmentation(&frame.rgb),
    };
    tracing::info!(
        dark_circles = metrics.dark_circles,
        wrinkles = metrics.wrinkles,
        evenness = metrics.evenness,
        pigmentation = metrics.pigmentation,
        "skin metrics measured"
    );
    Ok(metrics)
}

/// Percentage of pixels darker than [`DARK_LEVEL`].
pub fn dark_area_pct(gray: &[u8]) -> f64 {
    if gray.is_empty() {
        return 0.0;
    }
    let dark = gray.iter().filter(|&&p| p < DARK_LEVEL).count();
    dark as f64 / gray.len() as f64 * 100.0
}

/// Percentage of interior pixels on an edge, after 3×3 Gaussian smoothing.
pub fn edge_pct(gray: &[u8], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 || gray.len() < width * height {
        return 0.0;
    }
    let blurred = gaussian3(gray, width, height);
    let px = |x: usize, y: usize| blurred[y * width + x] as i32;

    let mut edges = 0usize;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            if gx.abs() + gy.abs() >= EDGE_MAGNITUDE {
                edges += 1;
            }
        }
    }
    edges as f64 / ((width - 2) * (height - 2)) as f64 * 100.0
}

/// 3×3 binomial blur; border pixels are copied through.
fn gaussian3(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    const K: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];
    let mut out = gray[..width * height].to_vec();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = 0u32;
            for (ky, row) in K.iter().enumerate() {
                for (kx, w) in row.iter().enumerate() {
                    acc += w * gray[(y + ky - 1) * width + (x + kx - 1)] as u32;
                }
            }
            out[y * width + x] = ((acc + 8) / 16) as u8;
        }
    }
    out
}

/// Population standard deviation.
pub fn std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let (n, sum) = values.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    var.sqrt()
}

/// Color variation: std-dev of a* plus std-dev of b* over all pixels.
pub fn pigmentation(rgb: &[u8]) -> f64 {
    let lab: Vec<(f64, f64, f64)> = rgb
        .chunks_exact(3)
        .map(|p| srgb_to_lab(p[0], p[1], p[2]))
        .collect();
    std_dev(lab.iter().map(|c| c.1)) + std_dev(lab.iter().map(|c| c.2))
}

/// sRGB (D65) to CIELAB.
pub fn srgb_to_lab(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    fn linear(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    fn f(t: f64) -> f64 {
        const DELTA: f64 = 6.0 / 29.0;
        if t > DELTA.powi(3) {
            t.cbrt()
        } else {
            t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
        }
    }

    let (r, g, b) = (linear(r), linear(g), linear(b));
    let x = (0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / 0.950_47;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = (0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b) / 1.088_83;

    let (fx, fy, fz) = (f(x), f(y), f(z));
    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_dark_area_pct() {
        assert_eq!(dark_area_pct(&[]), 0.0);
        assert_eq!(dark_area_pct(&[10, 49, 50, 200]), 50.0);
    }

    #[test]
    fn test_edges_flat_image() {
        let gray = vec![128u8; 16 * 16];
        assert_eq!(edge_pct(&gray, 16, 16), 0.0);
    }

    #[test]
    fn test_edges_step_image() {
        // left half black, right half white: a vertical edge down the middle
        let (w, h) = (16usize, 16usize);
        let gray: Vec<u8> = (0..w * h).map(|i| if i % w < w / 2 { 0 } else { 255 }).collect();
        let pct = edge_pct(&gray, w, h);
        assert!(pct > 0.0 && pct < 50.0, "pct = {pct}");
    }

    #[test]
    fn test_edges_tiny_image() {
        assert_eq!(edge_pct(&[0, 255, 0, 255], 2, 2), 0.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(std::iter::empty()), 0.0);
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(v.iter().copied()) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lab_reference_points() {
        let (l, a, b) = srgb_to_lab(255, 255, 255);
        assert!((l - 100.0).abs() < 0.01 && a.abs() < 0.01 && b.abs() < 0.01);
        let (l, a, b) = srgb_to_lab(0, 0, 0);
        assert!(l.abs() < 0.01 && a.abs() < 0.01 && b.abs() < 0.01);
        // sRGB red ≈ (53.24, 80.09, 67.20)
        let (l, a, b) = srgb_to_lab(255, 0, 0);
        assert!((l - 53.24).abs() < 0.1, "L = {l}");
        assert!((a - 80.09).abs() < 0.2, "a = {a}");
        assert!((b - 67.20).abs() < 0.2, "b = {b}");
    }

    #[test]
    fn test_pigmentation_uniform_vs_mixed() {
        let uniform = vec![180u8, 140, 120].repeat(64);
        assert!(pigmentation(&uniform) < 1e-9);

        let mut mixed = vec![180u8, 140, 120].repeat(32);
        mixed.extend([120u8, 60, 60].repeat(32));
        assert!(pigmentation(&mixed) > 1.0);
    }

    #[test]
    fn test_measure_uniform_frame() {
        let frame = Frame::from_rgb(RgbImage::from_pixel(32, 32, image::Rgb([150, 150, 150])));
        let m = measure(&frame).unwrap();
        assert_eq!(m.dark_circles, 0.0);
        assert_eq!(m.wrinkles, 0.0);
        assert!(m.evenness < 1.0);
        assert!(m.pigmentation < 1e-6);
    }
}

//! Warm-color mask construction and artifact suppression.
//!
//! The mask marks pixels whose hue/saturation/value fall in the ranges the
//! thermal palette uses for elevated temperature. Two overlay artifacts are
//! suppressed before region extraction: the fixed legend strip on the right
//! edge, and a variable-width colorbar detected by its uniform per-column
//! hue.

use image::RgbImage;
use ndarray::Array2;

use hotspot_core::params::{AdaptiveParameters, Sensitivity};

use crate::hsv::{rgb_to_hsv, Hsv};

/// Fraction of image width occupied by the fixed legend strip.
const LEGEND_FRACTION: f64 = 0.10;
/// Candidate colorbar widths, as fractions of image width.
const BAR_MIN_FRACTION: f64 = 0.005;
const BAR_MAX_FRACTION: f64 = 0.06;
/// Colorbar signature: saturated, bright, and hue-uniform down each column.
const BAR_SAT_MEAN_MIN: f64 = 40.0;
const BAR_VAL_MEAN_MIN: f64 = 120.0;
const BAR_HUE_STDDEV_MAX: f64 = 8.0;

/// Binary pixel mask in row-major order.
#[derive(Debug, Clone)]
pub struct WarmMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl WarmMask {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32, value: bool) {
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Number of warm pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&m| m).count()
    }

    fn zero_columns(&mut self, from: u32) {
        for y in 0..self.height {
            for x in from..self.width {
                self.set(x, y, false);
            }
        }
    }
}

/// The adaptive heatmap threshold `mean + k·std`, where k is derived from
/// `percent_threshold`. Reported to callers as the sensitivity metric of a
/// classification run; region extraction itself is driven by the warm-color
/// mask (see `build_warm_mask`).
pub fn sensitivity_threshold(heatmap: &Array2<f32>, sensitivity: &Sensitivity) -> f64 {
    let n = heatmap.len();
    if n == 0 {
        return 0.0;
    }
    let mean = heatmap.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let variance = heatmap
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    mean + sensitivity.adaptive_k() * variance.sqrt()
}

/// Build the warm-color mask for an image and suppress overlay artifacts.
pub fn build_warm_mask(image: &RgbImage, params: &AdaptiveParameters) -> WarmMask {
    let (width, height) = image.dimensions();
    let hsv = hsv_plane(image);
    let warm = &params.hsv_warm;

    let mut mask = WarmMask {
        width,
        height,
        data: vec![false; (width * height) as usize],
    };

    for y in 0..height {
        for x in 0..width {
            let (h, s, v) = hsv[(y * width + x) as usize].normalized();
            let warm_hue = h <= warm.hue_low || h >= warm.hue_high;
            if warm_hue && s >= warm.saturation_min && v >= warm.value_min {
                mask.set(x, y, true);
            }
        }
    }

    // Fixed legend strip on the right edge.
    let legend_width = (width as f64 * LEGEND_FRACTION) as u32;
    if legend_width > 0 {
        mask.zero_columns(width - legend_width);
    }

    // Variable-width colorbar, narrowest candidate first.
    if let Some(bar_width) = detect_colorbar_width(&hsv, width, height) {
        mask.zero_columns(width - bar_width);
    }

    mask
}

fn hsv_plane(image: &RgbImage) -> Vec<Hsv> {
    let (width, height) = image.dimensions();
    let mut plane = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = image.get_pixel(x, y).0;
            plane.push(rgb_to_hsv(r, g, b));
        }
    }
    plane
}

/// Scan right-aligned column bands from narrow to wide and return the width
/// of the first band matching the colorbar signature.
fn detect_colorbar_width(hsv: &[Hsv], width: u32, height: u32) -> Option<u32> {
    if width == 0 || height == 0 {
        return None;
    }
    let min_width = ((width as f64 * BAR_MIN_FRACTION) as u32).max(1);
    let max_width = ((width as f64 * BAR_MAX_FRACTION) as u32).max(1);

    for cand_width in min_width..=max_width.min(width) {
        let x0 = width - cand_width;

        let mut sat_sum = 0.0;
        let mut val_sum = 0.0;
        let mut hue_stddev_sum = 0.0;
        for x in x0..width {
            let mut hue_sum = 0.0;
            for y in 0..height {
                let px = hsv[(y * width + x) as usize];
                hue_sum += px.h as f64;
                sat_sum += px.s as f64;
                val_sum += px.v as f64;
            }
            let hue_mean = hue_sum / height as f64;
            let hue_var = (0..height)
                .map(|y| {
                    let h = hsv[(y * width + x) as usize].h as f64;
                    (h - hue_mean).powi(2)
                })
                .sum::<f64>()
                / height as f64;
            hue_stddev_sum += hue_var.sqrt();
        }

        let band_pixels = (cand_width * height) as f64;
        let sat_mean = sat_sum / band_pixels;
        let val_mean = val_sum / band_pixels;
        let hue_stddev_mean = hue_stddev_sum / cand_width as f64;

        if sat_mean > BAR_SAT_MEAN_MIN
            && val_mean > BAR_VAL_MEAN_MIN
            && hue_stddev_mean < BAR_HUE_STDDEV_MAX
        {
            return Some(cand_width);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn black_image(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    fn fill(image: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: [u8; 3]) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, Rgb(color));
            }
        }
    }

    #[test]
    fn test_black_image_has_empty_mask() {
        let image = black_image(100, 100);
        let mask = build_warm_mask(&image, &AdaptiveParameters::default());
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_red_block_is_warm() {
        let mut image = black_image(100, 100);
        fill(&mut image, 10, 10, 20, 20, [255, 0, 0]);
        let mask = build_warm_mask(&image, &AdaptiveParameters::default());
        assert_eq!(mask.count(), 400);
        assert!(mask.get(10, 10));
        assert!(!mask.get(50, 50));
    }

    #[test]
    fn test_cool_blue_is_not_warm() {
        let mut image = black_image(100, 100);
        fill(&mut image, 10, 10, 20, 20, [0, 60, 255]);
        let mask = build_warm_mask(&image, &AdaptiveParameters::default());
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_legend_strip_is_zeroed() {
        let mut image = black_image(100, 100);
        // Warm pixels inside the rightmost 10% of columns.
        fill(&mut image, 92, 10, 8, 20, [255, 30, 0]);
        let mask = build_warm_mask(&image, &AdaptiveParameters::default());
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_colorbar_band_detected() {
        let mut image = black_image(200, 100);
        // Right-aligned 4-column band, uniform orange: saturated, bright,
        // zero hue variance down each column. The scan runs narrowest-first,
        // so the 1-column candidate already matches.
        fill(&mut image, 196, 0, 4, 100, [255, 120, 0]);
        let hsv = hsv_plane(&image);
        assert_eq!(detect_colorbar_width(&hsv, 200, 100), Some(1));
    }

    #[test]
    fn test_noisy_band_not_detected() {
        let mut image = black_image(200, 100);
        // Alternate hues down the column so the per-column stddev is large.
        for y in 0..100 {
            let color = if y % 2 == 0 { [255, 0, 0] } else { [0, 255, 0] };
            for x in 196..200 {
                image.put_pixel(x, y, Rgb(color));
            }
        }
        let hsv = hsv_plane(&image);
        assert_eq!(detect_colorbar_width(&hsv, 200, 100), None);
    }

    #[test]
    fn test_sensitivity_threshold_tracks_percent() {
        let heatmap = Array2::from_shape_fn((10, 10), |(y, x)| (y * 10 + x) as f32 / 100.0);
        let mut low = Sensitivity::default();
        low.percent_threshold = 0;
        let mut high = Sensitivity::default();
        high.percent_threshold = 100;
        assert!(
            sensitivity_threshold(&heatmap, &low) < sensitivity_threshold(&heatmap, &high)
        );
    }

    #[test]
    fn test_sensitivity_threshold_empty_heatmap() {
        let heatmap = Array2::<f32>::zeros((0, 0));
        assert_eq!(
            sensitivity_threshold(&heatmap, &Sensitivity::default()),
            0.0
        );
    }
}

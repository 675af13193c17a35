// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan preprocessing: turns a page photograph or scan into a clean
// black-on-white image before it goes to the OCR engine.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::contrast::otsu_level;
use pagewright_core::error::{PagewrightError, Result};
use tracing::{debug, info, instrument};

/// Contrast boost applied by [`ScanPreprocessor::prepare_for_ocr`].
const OCR_CONTRAST: f32 = 1.4;
/// Neighbourhood radius for the adaptive threshold.
const OCR_BLOCK_RADIUS: u32 = 15;
/// Offset below the local mean a pixel must fall to count as ink.
const OCR_THRESHOLD_OFFSET: i32 = 10;

/// Builder-style image pipeline; each step consumes and returns `self`.
///
/// ```ignore
/// let png = ScanPreprocessor::from_bytes(&scan)?
///     .prepare_for_ocr()
///     .to_png_bytes()?;
/// ```
pub struct ScanPreprocessor {
    image: DynamicImage,
}

impl ScanPreprocessor {
    /// Decode raw image bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            PagewrightError::ImageError(format!("failed to decode scan image: {}", err))
        })?;
        info!(width = image.width(), height = image.height(), "Scan image loaded");
        Ok(Self { image })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    pub fn grayscale(self) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Scale luma distance from mid-grey by `factor`. Values above 1.0
    /// increase contrast. The result is greyscale.
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let mut gray = self.image.to_luma8();
        for pixel in gray.pixels_mut() {
            let value = factor * (pixel.0[0] as f32 - 128.0) + 128.0;
            pixel.0[0] = value.clamp(0.0, 255.0) as u8;
        }
        Self {
            image: DynamicImage::ImageLuma8(gray),
        }
    }

    /// Global binarization at the Otsu threshold of the luma histogram.
    #[instrument(skip(self))]
    pub fn binarize_otsu(self) -> Self {
        let gray = self.image.to_luma8();
        let level = otsu_level(&gray);
        debug!(level, "Otsu threshold computed");

        // Otsu's level is the top of the dark class, so it counts as ink.
        let cutoff = level.saturating_add(1);
        Self {
            image: DynamicImage::ImageLuma8(threshold_with(&gray, |_, _| cutoff)),
        }
    }

    /// Adaptive binarization against the local mean.
    ///
    /// Each pixel is compared with the mean of its `(2r+1)²` neighbourhood
    /// minus `c`; darker pixels become black and the rest white. Uneven
    /// lighting across a photographed page survives this where a global
    /// threshold would not.
    #[instrument(skip(self))]
    pub fn binarize(self, block_radius: u32, c: i32) -> Self {
        let gray = self.image.to_luma8();
        let table = SummedArea::new(&gray);

        let output = threshold_with(&gray, |x, y| {
            let mean = table.mean_around(x, y, block_radius);
            (mean.round() as i32 - c).clamp(0, 255) as u8
        });

        debug!(block_radius, c, "Adaptive binarization complete");
        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    /// Grayscale, boost contrast, then binarize adaptively. The usual
    /// preparation for a scanned page before recognition.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn prepare_for_ocr(self) -> Self {
        self.grayscale()
            .adjust_contrast(OCR_CONTRAST)
            .binarize(OCR_BLOCK_RADIUS, OCR_THRESHOLD_OFFSET)
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| PagewrightError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Black where a pixel is strictly darker than its threshold, white elsewhere.
fn threshold_with(gray: &GrayImage, level: impl Fn(u32, u32) -> u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let ink = gray.get_pixel(x, y).0[0] < level(x, y);
        Luma([if ink { 0 } else { 255 }])
    })
}

/// Summed-area table with a zero row and column on the top/left edge, so
/// `sums[(y * stride) + x]` covers the rectangle `[0, x) × [0, y)`.
struct SummedArea {
    sums: Vec<u64>,
    width: u32,
    height: u32,
}

impl SummedArea {
    fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0u64; stride * (height as usize + 1)];

        for (y, row) in gray.rows().enumerate() {
            let mut running = 0u64;
            for (x, pixel) in row.enumerate() {
                running += pixel.0[0] as u64;
                sums[(y + 1) * stride + x + 1] = running + sums[y * stride + x + 1];
            }
        }

        Self { sums, width, height }
    }

    /// Mean of the square window centred on (x, y), clipped to the image.
    fn mean_around(&self, x: u32, y: u32, radius: u32) -> f64 {
        let stride = self.width as usize + 1;
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = (x.saturating_add(radius) as usize + 1).min(self.width as usize);
        let y1 = (y.saturating_add(radius) as usize + 1).min(self.height as usize);

        let area = (x1 - x0) * (y1 - y0);
        if area == 0 {
            return 128.0;
        }

        let total = self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0];
        total as f64 / area as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Light page with a dark 10x10 "glyph" in the middle and a lighting
    /// gradient left to right.
    fn page_with_glyph() -> GrayImage {
        GrayImage::from_fn(60, 40, |x, y| {
            let glyph = (25..35).contains(&x) && (15..25).contains(&y);
            let base = if glyph { 40 } else { 200 };
            Luma([base + (x / 4) as u8])
        })
    }

    fn is_binary(image: &DynamicImage) -> bool {
        image.to_luma8().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn summed_area_matches_brute_force() {
        let gray = GrayImage::from_fn(7, 5, |x, y| Luma([(x * 10 + y * 3) as u8]));
        let table = SummedArea::new(&gray);

        let (cx, cy, r) = (3u32, 2u32, 1u32);
        let mut sum = 0u64;
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                sum += gray.get_pixel(x, y).0[0] as u64;
            }
        }
        assert!((table.mean_around(cx, cy, r) - sum as f64 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn window_is_clipped_at_corners() {
        let gray = GrayImage::from_pixel(4, 4, Luma([90]));
        let table = SummedArea::new(&gray);
        assert_eq!(table.mean_around(0, 0, 10), 90.0);
        assert_eq!(table.mean_around(3, 3, 1), 90.0);
    }

    #[test]
    fn contrast_pushes_away_from_mid_grey() {
        let gray = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 100 } else { 160 }]));
        let out = ScanPreprocessor::from_dynamic(DynamicImage::ImageLuma8(gray))
            .adjust_contrast(2.0)
            .into_dynamic()
            .to_luma8();
        assert_eq!(out.get_pixel(0, 0).0, [72]);
        assert_eq!(out.get_pixel(1, 0).0, [192]);
    }

    #[test]
    fn otsu_separates_two_levels() {
        let image = DynamicImage::ImageLuma8(page_with_glyph());
        let out = ScanPreprocessor::from_dynamic(image).binarize_otsu().into_dynamic();

        assert!(is_binary(&out));
        let gray = out.to_luma8();
        assert_eq!(gray.get_pixel(30, 20).0, [0]);
        assert_eq!(gray.get_pixel(5, 5).0, [255]);
    }

    #[test]
    fn prepare_for_ocr_keeps_the_glyph_dark() {
        let image = DynamicImage::ImageLuma8(page_with_glyph());
        let out = ScanPreprocessor::from_dynamic(image).prepare_for_ocr().into_dynamic();

        assert!(is_binary(&out));
        let gray = out.to_luma8();
        assert_eq!(gray.get_pixel(26, 16).0, [0]);
        assert_eq!(gray.get_pixel(2, 2).0, [255]);
        assert_eq!(gray.get_pixel(55, 35).0, [255]);
    }

    #[test]
    fn png_round_trips_through_from_bytes() {
        let image = DynamicImage::ImageLuma8(page_with_glyph());
        let bytes = ScanPreprocessor::from_dynamic(image).to_png_bytes().unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));

        let reloaded = ScanPreprocessor::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.as_dynamic().width(), 60);
    }

    #[test]
    fn undecodable_bytes_are_image_errors() {
        assert!(matches!(
            ScanPreprocessor::from_bytes(b"nope"),
            Err(PagewrightError::ImageError(_))
        ));
    }
}

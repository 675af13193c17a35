// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PagewrightError, Result};
use crate::types::{PaperSize, Rgb};

/// Physical layout constants for one output page.
///
/// Every size here is a base value at scale 1.0; the layout fitter shrinks
/// fonts, spacing, and padding by one shared factor when a page overflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Margin on all four sides, in points (71pt is roughly one inch).
    pub margin_pt: f32,
    /// Base font size for reflowed prose.
    pub prose_font_size: f32,
    /// Base font size for code blocks.
    pub code_font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Vertical gap between consecutive blocks.
    pub block_spacing: f32,
    /// Inner vertical padding of the code background panel.
    pub code_padding: f32,
    /// Smallest scale the fitter will try. Content that still overflows at
    /// this scale is rendered anyway.
    pub min_scale: f32,
    /// Decrement between scale attempts.
    pub scale_step: f32,
    /// Page number footer size (never scaled).
    pub footer_font_size: f32,
    /// Fill colour of the code background panel.
    pub code_background: Rgb,
    /// Border colour of the code background panel.
    pub code_border: Rgb,
    /// Border stroke width of the code background panel.
    pub code_border_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_pt: 71.0,
            prose_font_size: 11.0,
            code_font_size: 10.0,
            line_height_factor: 1.35,
            block_spacing: 14.0,
            code_padding: 6.0,
            min_scale: 0.6,
            scale_step: 0.05,
            footer_font_size: 8.0,
            code_background: Rgb::new(246, 248, 250),
            code_border: Rgb::new(208, 215, 222),
            code_border_width: 0.5,
        }
    }
}

impl LayoutConfig {
    /// Reject values that would make the fitter loop forever or divide by zero.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("prose_font_size", self.prose_font_size),
            ("code_font_size", self.code_font_size),
            ("line_height_factor", self.line_height_factor),
            ("scale_step", self.scale_step),
            ("footer_font_size", self.footer_font_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PagewrightError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("margin_pt", self.margin_pt),
            ("block_spacing", self.block_spacing),
            ("code_padding", self.code_padding),
            ("code_border_width", self.code_border_width),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PagewrightError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            return Err(PagewrightError::InvalidConfig(format!(
                "min_scale must be in (0, 1], got {}",
                self.min_scale
            )));
        }

        Ok(())
    }
}

/// Persistent render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output page size.
    pub paper_size: PaperSize,
    /// Page geometry and typography.
    pub layout: LayoutConfig,
    /// Title embedded in the output PDF.
    pub title: String,
    /// Maximum number of pages translated at the same time.
    pub translate_concurrency: usize,
    /// Per-page limit for an external translator, in seconds.
    pub translate_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            layout: LayoutConfig::default(),
            title: "Pagewright Document".to_string(),
            translate_concurrency: 4,
            translate_timeout_secs: 120,
        }
    }
}

impl RenderConfig {
    /// Load a config from a JSON file and validate it.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded render config");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "Saved render config");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        let (width, height) = self.paper_size.dimensions_pt();
        let margin = self.layout.margin_pt;
        if width - 2.0 * margin <= 0.0 || height - 2.0 * margin <= 0.0 {
            return Err(PagewrightError::InvalidConfig(format!(
                "margin {margin}pt leaves no content area on a {width:.0}x{height:.0}pt page"
            )));
        }

        if self.translate_concurrency == 0 {
            return Err(PagewrightError::InvalidConfig(
                "translate_concurrency must be at least 1".to_string(),
            ));
        }

        if self.translate_timeout_secs == 0 {
            return Err(PagewrightError::InvalidConfig(
                "translate_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

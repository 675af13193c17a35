// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout fitter. Finds the largest uniform font scale at which a page's
// blocks fit its content area.
//
// Line wrapping makes height a step function of font size, so instead of
// solving for a scale we walk a fixed ladder of candidates from 1.0 downward
// and take the first one that fits. The ladder ends at `min_scale`; content
// that still overflows there is laid out at the floor anyway, trading a
// strict one-page guarantee for legible text.

use pagewright_core::error::{PagewrightError, Result};
use pagewright_core::{FontFace, LayoutConfig};
use tracing::{debug, instrument, trace, warn};

use crate::segment::{BlockKind, ContentBlock};
use crate::sink::TextMeasure;

/// Slack for float comparisons against the page height.
const HEIGHT_EPSILON: f32 = 1e-3;

/// Lowest floor the ladder will descend to.
const MIN_FLOOR: f32 = 0.01;

/// Upper bound on scale candidates per page.
const MAX_RUNGS: u32 = 1000;

/// A block wrapped at one specific scale. Never reused across scales.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub block: ContentBlock,
    /// Wrapped output lines; never empty.
    pub wrapped_lines: Vec<String>,
    /// Height including the code panel padding, in points.
    pub rendered_height: f32,
}

/// Everything the compositor needs to draw one page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub measured_blocks: Vec<MeasuredBlock>,
    pub prose_font_size: f32,
    pub code_font_size: f32,
    pub line_height_factor: f32,
    pub inter_block_spacing: f32,
    /// Vertical and horizontal inset of code text inside its panel.
    pub code_padding: f32,
    /// Width the blocks were wrapped to.
    pub content_width: f32,
    /// The scale that produced this plan.
    pub scale: f32,
    /// How far the content exceeds the available height, when even the
    /// minimum scale did not fit.
    pub overflow: Option<f32>,
}

impl LayoutPlan {
    fn empty(config: &LayoutConfig, content_width: f32) -> Self {
        Self {
            measured_blocks: Vec::new(),
            prose_font_size: config.prose_font_size,
            code_font_size: config.code_font_size,
            line_height_factor: config.line_height_factor,
            inter_block_spacing: config.block_spacing,
            code_padding: config.code_padding,
            content_width,
            scale: 1.0,
            overflow: None,
        }
    }

    pub fn font_size(&self, kind: BlockKind) -> f32 {
        match kind {
            BlockKind::Prose => self.prose_font_size,
            BlockKind::Code => self.code_font_size,
        }
    }

    pub fn line_height(&self, kind: BlockKind) -> f32 {
        self.font_size(kind) * self.line_height_factor
    }

    /// Sum of block heights and the gaps between them.
    pub fn total_height(&self) -> f32 {
        let blocks: f32 = self.measured_blocks.iter().map(|b| b.rendered_height).sum();
        let gaps = self.measured_blocks.len().saturating_sub(1) as f32;
        blocks + gaps * self.inter_block_spacing
    }

    pub fn fits(&self) -> bool {
        self.overflow.is_none()
    }
}

/// Typeface used for a block kind.
pub fn face_for(kind: BlockKind) -> FontFace {
    match kind {
        BlockKind::Prose => FontFace::Serif,
        BlockKind::Code => FontFace::Monospace,
    }
}

/// Result of laying the page out at one candidate scale.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutAttempt {
    Fits(LayoutPlan),
    Overflow { plan: LayoutPlan, by: f32 },
}

/// Lay out `blocks` in a `max_width` x `max_height` content area.
///
/// Returns the plan for the largest candidate scale that fits, or the plan at
/// `min_scale` with `overflow` set when none does. A measurement failure
/// aborts the whole page.
#[instrument(skip(blocks, measure, config), fields(blocks = blocks.len()))]
pub fn fit<M: TextMeasure + ?Sized>(
    blocks: &[ContentBlock],
    max_width: f32,
    max_height: f32,
    measure: &M,
    config: &LayoutConfig,
) -> Result<LayoutPlan> {
    config.validate()?;
    if blocks.is_empty() {
        return Ok(LayoutPlan::empty(config, max_width));
    }

    let mut last_overflow = None;
    for scale in scale_candidates(config) {
        match attempt(blocks, scale, max_width, max_height, measure, config)? {
            LayoutAttempt::Fits(plan) => {
                debug!(scale, height = plan.total_height(), max_height, "Layout fits");
                return Ok(plan);
            }
            LayoutAttempt::Overflow { plan, by } => {
                trace!(scale, by, "Layout overflows");
                last_overflow = Some((plan, by));
            }
        }
    }

    match last_overflow {
        Some((mut plan, by)) => {
            warn!(
                scale = plan.scale,
                overflow_pt = by,
                "Content overflows at minimum scale; rendering anyway"
            );
            plan.overflow = Some(by);
            Ok(plan)
        }
        None => Err(PagewrightError::InvalidConfig(
            "layout produced no scale candidates".to_string(),
        )),
    }
}

/// Lay out every block at one scale and report whether it fits.
pub fn attempt<M: TextMeasure + ?Sized>(
    blocks: &[ContentBlock],
    scale: f32,
    max_width: f32,
    max_height: f32,
    measure: &M,
    config: &LayoutConfig,
) -> Result<LayoutAttempt> {
    let mut plan = LayoutPlan {
        measured_blocks: Vec::with_capacity(blocks.len()),
        prose_font_size: config.prose_font_size * scale,
        code_font_size: config.code_font_size * scale,
        line_height_factor: config.line_height_factor,
        inter_block_spacing: config.block_spacing * scale,
        code_padding: config.code_padding * scale,
        content_width: max_width,
        scale,
        overflow: None,
    };

    for block in blocks {
        let measured = measure_block(block, &plan, measure)?;
        plan.measured_blocks.push(measured);
    }

    let height = plan.total_height();
    if height <= max_height + HEIGHT_EPSILON {
        Ok(LayoutAttempt::Fits(plan))
    } else {
        Ok(LayoutAttempt::Overflow {
            by: height - max_height,
            plan,
        })
    }
}

fn measure_block<M: TextMeasure + ?Sized>(
    block: &ContentBlock,
    plan: &LayoutPlan,
    measure: &M,
) -> Result<MeasuredBlock> {
    let size = plan.font_size(block.kind);
    let face = face_for(block.kind);

    let (wrapped_lines, padding) = match block.kind {
        BlockKind::Prose => (
            measure.wrap_text(&block.raw_text, face, size, plan.content_width)?,
            0.0,
        ),
        BlockKind::Code => {
            // Source lines wrap independently so structure is never merged.
            let width = plan.content_width - 2.0 * plan.code_padding;
            let mut lines = Vec::new();
            for source_line in block.raw_text.split('\n') {
                lines.extend(measure.wrap_text(source_line, face, size, width)?);
            }
            (lines, plan.code_padding)
        }
    };

    if wrapped_lines.is_empty() {
        return Err(PagewrightError::Measurement(format!(
            "no lines returned for a {} character {:?} block",
            block.raw_text.len(),
            block.kind
        )));
    }

    let rendered_height =
        wrapped_lines.len() as f32 * plan.line_height(block.kind) + 2.0 * padding;

    Ok(MeasuredBlock {
        block: block.clone(),
        wrapped_lines,
        rendered_height,
    })
}

/// Scales to try, from 1.0 down to and including `min_scale`.
///
/// The rung count is fixed before the ladder is built, so float drift can't
/// add or skip a rung and a malformed config can't make it unbounded. A
/// non-finite floor or step collapses the ladder to `[1.0]`.
fn scale_candidates(config: &LayoutConfig) -> Vec<f32> {
    let floor = if config.min_scale.is_finite() {
        config.min_scale.clamp(MIN_FLOOR, 1.0)
    } else {
        1.0
    };
    let step = if config.scale_step.is_finite() && config.scale_step > 0.0 {
        config.scale_step
    } else {
        1.0
    };

    let rungs = ((1.0 - floor) / step).ceil().min(MAX_RUNGS as f32) as u32;
    let mut scales: Vec<f32> = (0..rungs)
        .map(|index| 1.0 - index as f32 * step)
        .filter(|scale| *scale > floor + 1e-4)
        .collect();
    scales.push(floor);
    scales
}

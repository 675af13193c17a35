// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor. Places a fitted layout plan onto the current sink page:
// prose as plain ink, code as a tinted panel with per-token colour runs, and a
// page number footer.

use pagewright_core::error::Result;
use pagewright_core::{FontFace, LayoutConfig, Rgb};
use tracing::{debug, instrument};

use crate::layout::{LayoutPlan, MeasuredBlock, face_for};
use crate::segment::BlockKind;
use crate::sink::{DocumentSink, Rect, RectStyle};
use crate::tokenize::{palette, tokenize_line};

/// Ink for reflowed prose.
const PROSE_INK: Rgb = Rgb::BLACK;

/// Ink for the page number footer.
const FOOTER_INK: Rgb = Rgb::new(87, 96, 106);

/// Draw `plan` on the sink's current page and add the footer.
///
/// The plan is consumed: it was measured for this page only.
#[instrument(skip(sink, plan, config), fields(blocks = plan.measured_blocks.len(), scale = plan.scale))]
pub fn compose_page<S: DocumentSink + ?Sized>(
    sink: &mut S,
    plan: LayoutPlan,
    page_number: usize,
    config: &LayoutConfig,
) -> Result<()> {
    let (page_width, page_height) = sink.page_size();
    let left = config.margin_pt;
    let mut top = config.margin_pt;

    for measured in &plan.measured_blocks {
        match measured.block.kind {
            BlockKind::Prose => draw_prose(sink, measured, &plan, left, top),
            BlockKind::Code => draw_code(sink, measured, &plan, left, top, config)?,
        }
        top += measured.rendered_height + plan.inter_block_spacing;
    }

    draw_footer(sink, page_number, page_width, page_height, config)?;

    debug!(page_number, used_height = top - config.margin_pt, "Page composed");
    Ok(())
}

/// Baseline of a line whose box starts at `line_top`, roughly centring the
/// glyphs' x-height in the line box.
fn baseline(line_top: f32, line_height: f32, font_size: f32) -> f32 {
    line_top + (line_height + font_size * 0.6) / 2.0
}

fn draw_prose<S: DocumentSink + ?Sized>(
    sink: &mut S,
    measured: &MeasuredBlock,
    plan: &LayoutPlan,
    left: f32,
    top: f32,
) {
    let size = plan.font_size(BlockKind::Prose);
    let line_height = plan.line_height(BlockKind::Prose);

    sink.set_font(face_for(BlockKind::Prose));
    sink.set_font_size(size);
    sink.set_text_color(PROSE_INK);

    for (index, line) in measured.wrapped_lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_top = top + index as f32 * line_height;
        sink.draw_text(line, left, baseline(line_top, line_height, size));
    }
}

fn draw_code<S: DocumentSink + ?Sized>(
    sink: &mut S,
    measured: &MeasuredBlock,
    plan: &LayoutPlan,
    left: f32,
    top: f32,
    config: &LayoutConfig,
) -> Result<()> {
    let size = plan.font_size(BlockKind::Code);
    let line_height = plan.line_height(BlockKind::Code);
    let face = face_for(BlockKind::Code);

    sink.draw_rect(
        Rect {
            x: left,
            y: top,
            width: plan.content_width,
            height: measured.rendered_height,
        },
        RectStyle {
            fill: Some(config.code_background),
            stroke: Some((config.code_border, config.code_border_width)),
        },
    );

    sink.set_font(face);
    sink.set_font_size(size);

    let text_left = left + plan.code_padding;
    let mut current_ink = None;

    for (index, line) in measured.wrapped_lines.iter().enumerate() {
        let line_top = top + plan.code_padding + index as f32 * line_height;
        let y = baseline(line_top, line_height, size);
        let mut x = text_left;

        for token in tokenize_line(line) {
            let advance = sink.text_width(&token.text, face, size)?;
            if !token.text.trim().is_empty() {
                let ink = palette(token.class);
                if current_ink != Some(ink) {
                    sink.set_text_color(ink);
                    current_ink = Some(ink);
                }
                sink.draw_text(&token.text, x, y);
            }
            x += advance;
        }
    }

    Ok(())
}

fn draw_footer<S: DocumentSink + ?Sized>(
    sink: &mut S,
    page_number: usize,
    page_width: f32,
    page_height: f32,
    config: &LayoutConfig,
) -> Result<()> {
    let label = page_number.to_string();
    let size = config.footer_font_size;
    let width = sink.text_width(&label, FontFace::SansSerif, size)?;

    sink.set_font(FontFace::SansSerif);
    sink.set_font_size(size);
    sink.set_text_color(FOOTER_INK);
    sink.draw_text(
        &label,
        (page_width - width) / 2.0,
        page_height - config.margin_pt / 2.0,
    );
    Ok(())
}

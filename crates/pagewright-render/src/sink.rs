// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Abstract seams between the rendering engine and a concrete document backend.

use pagewright_core::error::Result;
use pagewright_core::{FontFace, Rgb};

/// Text metrics capability: the measurement oracle the layout fitter depends
/// on. Implemented by the document writer, faked in tests.
pub trait TextMeasure {
    /// Advance width of `text` set in `face` at `size` points.
    fn text_width(&self, text: &str, face: FontFace, size: f32) -> Result<f32>;

    /// Break `text` into lines no wider than `max_width` points.
    ///
    /// Prose (serif/sans) is word-wrapped and explicit newlines are honoured.
    /// Monospace text is treated as a single source line whose whitespace is
    /// significant, so indentation survives wrapping. Empty input yields one
    /// empty line.
    fn wrap_text(&self, text: &str, face: FontFace, size: f32, max_width: f32)
    -> Result<Vec<String>>;
}

/// A rectangle in page coordinates (top-left origin, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// How a rectangle is painted. `None` on both sides draws nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectStyle {
    pub fill: Option<Rgb>,
    /// Border colour and stroke width.
    pub stroke: Option<(Rgb, f32)>,
}

/// Drawing primitives of the output document.
///
/// Coordinates use a top-left origin with y growing downward; text is placed
/// by its baseline. Implementations translate to their native coordinate
/// space.
pub trait DocumentSink: TextMeasure {
    /// Start a new page; subsequent drawing lands on it.
    fn add_page(&mut self);

    /// Width and height of the current page in points.
    fn page_size(&self) -> (f32, f32);

    fn set_font(&mut self, face: FontFace);

    fn set_font_size(&mut self, size: f32);

    fn set_text_color(&mut self, color: Rgb);

    /// Draw a run of text with the current font, size, and colour.
    fn draw_text(&mut self, text: &str, x: f32, y: f32);

    fn draw_rect(&mut self, rect: Rect, style: RectStyle);

    /// Serialise everything drawn so far. Writers may start afresh afterwards.
    fn output_bytes(&mut self) -> Result<Vec<u8>>;
}

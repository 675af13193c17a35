// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic fakes for the measurement oracle and the document sink.

use pagewright_core::error::{PagewrightError, Result};
use pagewright_core::{FontFace, Rgb};

use crate::sink::{DocumentSink, Rect, RectStyle, TextMeasure};

/// Every character is `em` wide, whatever the face.
#[derive(Debug, Clone, Copy)]
pub struct FixedPitchMeasure {
    pub em: f32,
}

impl Default for FixedPitchMeasure {
    fn default() -> Self {
        Self { em: 0.5 }
    }
}

impl FixedPitchMeasure {
    fn max_chars(&self, size: f32, max_width: f32) -> usize {
        ((max_width / (self.em * size)).floor() as usize).max(1)
    }
}

impl TextMeasure for FixedPitchMeasure {
    fn text_width(&self, text: &str, _face: FontFace, size: f32) -> Result<f32> {
        Ok(text.chars().count() as f32 * self.em * size)
    }

    fn wrap_text(
        &self,
        text: &str,
        face: FontFace,
        size: f32,
        max_width: f32,
    ) -> Result<Vec<String>> {
        let max_chars = self.max_chars(size, max_width);

        if face == FontFace::Monospace {
            let chars: Vec<char> = text.chars().collect();
            if chars.is_empty() {
                return Ok(vec![String::new()]);
            }
            return Ok(chars
                .chunks(max_chars)
                .map(|chunk| chunk.iter().collect())
                .collect());
        }

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let needed = if current.is_empty() {
                    word.chars().count()
                } else {
                    current.chars().count() + 1 + word.chars().count()
                };
                if !current.is_empty() && needed > max_chars {
                    lines.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            lines.push(current);
        }
        Ok(lines)
    }
}

/// Oracle that is always unavailable.
pub struct FailingMeasure;

impl TextMeasure for FailingMeasure {
    fn text_width(&self, _text: &str, _face: FontFace, _size: f32) -> Result<f32> {
        Err(PagewrightError::Measurement("metrics backend offline".into()))
    }

    fn wrap_text(&self, _: &str, _: FontFace, _: f32, _: f32) -> Result<Vec<String>> {
        Err(PagewrightError::Measurement("metrics backend offline".into()))
    }
}

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    AddPage,
    Font(FontFace),
    FontSize(f32),
    TextColor(Rgb),
    Text { text: String, x: f32, y: f32 },
    Rect(Rect, RectStyle),
}

/// Sink that records every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub measure: FixedPitchMeasure,
    pub ops: Vec<SinkOp>,
    pub page: (f32, f32),
}

impl RecordingSink {
    pub fn a4() -> Self {
        Self {
            page: (595.0, 842.0),
            ..Self::default()
        }
    }

    /// Every text run with the colour it was drawn in.
    pub fn texts(&self) -> Vec<(String, Rgb, f32, f32)> {
        let mut color = Rgb::BLACK;
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                SinkOp::TextColor(c) => color = *c,
                SinkOp::Text { text, x, y } => out.push((text.clone(), color, *x, *y)),
                _ => {}
            }
        }
        out
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Rect(rect, _) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSink {
    fn text_width(&self, text: &str, face: FontFace, size: f32) -> Result<f32> {
        self.measure.text_width(text, face, size)
    }

    fn wrap_text(
        &self,
        text: &str,
        face: FontFace,
        size: f32,
        max_width: f32,
    ) -> Result<Vec<String>> {
        self.measure.wrap_text(text, face, size, max_width)
    }
}

impl DocumentSink for RecordingSink {
    fn add_page(&mut self) {
        self.ops.push(SinkOp::AddPage);
    }

    fn page_size(&self) -> (f32, f32) {
        self.page
    }

    fn set_font(&mut self, face: FontFace) {
        self.ops.push(SinkOp::Font(face));
    }

    fn set_font_size(&mut self, size: f32) {
        self.ops.push(SinkOp::FontSize(size));
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.ops.push(SinkOp::TextColor(color));
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        self.ops.push(SinkOp::Text {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn draw_rect(&mut self, rect: Rect, style: RectStyle) {
        self.ops.push(SinkOp::Rect(rect, style));
    }

    fn output_bytes(&mut self) -> Result<Vec<u8>> {
        let pages = self.ops.iter().filter(|op| **op == SinkOp::AddPage).count();
        Ok(format!("recorded {pages} pages").into_bytes())
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: a `DocumentSink` backed by `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The writer accumulates one op list per page and
// converts the render engine's top-left coordinates to PDF's bottom-left
// origin as it goes.

use std::path::Path;

use pagewright_core::error::Result;
use pagewright_core::{FontFace, PaperSize, Rgb};
use pagewright_render::{DocumentSink, Rect, RectStyle, TextMeasure};
use printpdf::{
    BuiltinFont, Color, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, TextItem, WindingOrder,
};
use tracing::{debug, info, instrument, warn};

use super::metrics;

/// Renders pages into an in-memory PDF document.
///
/// Text uses the base-14 fonts (Times-Roman, Courier, Helvetica), so nothing
/// is embedded and measurement comes from the static tables in
/// [`metrics`](super::metrics).
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    finished: Vec<PdfPage>,
    /// Ops for the page currently being drawn.
    current: Option<Vec<Op>>,
    font: FontFace,
    font_size: f32,
    text_color: Rgb,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
            finished: Vec::new(),
            current: None,
            font: FontFace::Serif,
            font_size: 11.0,
            text_color: Rgb::BLACK,
        }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Pages started so far, including the one being drawn.
    pub fn page_count(&self) -> usize {
        self.finished.len() + usize::from(self.current.is_some())
    }

    /// Serialise the document and write it to `path`.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.output_bytes()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    fn page_height_pt(&self) -> f32 {
        self.paper_size.dimensions_pt().1
    }

    fn close_current(&mut self) {
        if let Some(ops) = self.current.take() {
            let (page_w, page_h) = self.page_dimensions();
            self.finished.push(PdfPage::new(page_w, page_h, ops));
        }
    }

    /// Ops for the current page, starting one if nothing has been drawn yet.
    fn ops(&mut self) -> &mut Vec<Op> {
        self.current.get_or_insert_with(Vec::new)
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point {
            x: Pt(x),
            y: Pt(self.page_height_pt() - y),
        }
    }
}

fn builtin_font(face: FontFace) -> BuiltinFont {
    match face {
        FontFace::Serif => BuiltinFont::TimesRoman,
        FontFace::Monospace => BuiltinFont::Courier,
        FontFace::SansSerif => BuiltinFont::Helvetica,
    }
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

impl TextMeasure for PdfWriter {
    fn text_width(&self, text: &str, face: FontFace, size: f32) -> Result<f32> {
        metrics::text_width(text, face, size)
    }

    fn wrap_text(&self, text: &str, face: FontFace, size: f32, max_width: f32) -> Result<Vec<String>> {
        metrics::wrap_text(text, face, size, max_width)
    }
}

impl DocumentSink for PdfWriter {
    fn add_page(&mut self) {
        self.close_current();
        self.current = Some(Vec::new());
        debug!(page = self.finished.len() + 1, "Page started");
    }

    fn page_size(&self) -> (f32, f32) {
        self.paper_size.dimensions_pt()
    }

    fn set_font(&mut self, face: FontFace) {
        self.font = face;
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        let font = builtin_font(self.font);
        let size = Pt(self.font_size);
        let col = pdf_color(self.text_color);
        let pos = self.point(x, y);

        self.ops().extend([
            Op::StartTextSection,
            Op::SetFillColor { col },
            Op::SetTextCursor { pos },
            Op::SetFontSizeBuiltinFont { size, font },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font,
            },
            Op::EndTextSection,
        ]);
    }

    fn draw_rect(&mut self, rect: Rect, style: RectStyle) {
        let mode = match (style.fill.is_some(), style.stroke.is_some()) {
            (true, true) => PaintMode::FillStroke,
            (true, false) => PaintMode::Fill,
            (false, true) => PaintMode::Stroke,
            (false, false) => return,
        };

        let corners = [
            (rect.x, rect.y),
            (rect.x + rect.width, rect.y),
            (rect.x + rect.width, rect.y + rect.height),
            (rect.x, rect.y + rect.height),
        ];
        let points = corners
            .iter()
            .map(|&(x, y)| LinePoint {
                p: self.point(x, y),
                bezier: false,
            })
            .collect();

        let mut ops = vec![Op::SaveGraphicsState];
        if let Some(fill) = style.fill {
            ops.push(Op::SetFillColor {
                col: pdf_color(fill),
            });
        }
        if let Some((stroke, width)) = style.stroke {
            ops.push(Op::SetOutlineColor {
                col: pdf_color(stroke),
            });
            ops.push(Op::SetOutlineThickness { pt: Pt(width) });
        }
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing { points }],
                mode,
                winding_order: WindingOrder::NonZero,
            },
        });
        ops.push(Op::RestoreGraphicsState);

        self.ops().extend(ops);
    }

    /// Serialise every page drawn so far and reset the writer.
    #[instrument(skip(self), fields(paper = ?self.paper_size))]
    fn output_bytes(&mut self) -> Result<Vec<u8>> {
        self.close_current();
        let mut pages = std::mem::take(&mut self.finished);

        if pages.is_empty() {
            let (page_w, page_h) = self.page_dimensions();
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let title = self.title.as_deref().unwrap_or("Pagewright Document");
        let page_count = pages.len();
        let mut doc = PdfDocument::new(title);
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }

        info!(title, pages = page_count, bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

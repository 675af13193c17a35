// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewright-document: the PDF side of Pagewright.
//
// Reads source PDFs (text layer, page images), cleans up scans and runs OCR
// when built with the `ocr` feature, hands raw pages to a translator, and
// writes the typeset result through a printpdf-backed document sink.

pub mod pdf;
pub mod pipeline;
pub mod scan;
pub mod translate;

pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use pipeline::{ConversionPipeline, RenderOutput};
pub use scan::preprocess::ScanPreprocessor;
pub use translate::{CommandTranslator, PageTranslator, Passthrough};

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrEngine};

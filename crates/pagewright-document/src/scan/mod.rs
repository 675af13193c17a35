// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanned-page handling: image cleanup ahead of recognition, and the OCR
// engine itself when the `ocr` feature is enabled.

pub mod preprocess;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use preprocess::ScanPreprocessor;

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};

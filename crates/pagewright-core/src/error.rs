// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewright.

use thiserror::Error;

/// Top-level error type for all Pagewright operations.
///
/// Ordinary malformed page text never produces an error; the rendering core
/// degrades to prose instead. Only collaborator failures end up here.
#[derive(Debug, Error)]
pub enum PagewrightError {
    // -- Source document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    // -- Rendering errors --
    #[error("text measurement failed: {0}")]
    Measurement(String),

    #[error("translation failed for page {page}: {detail}")]
    Translation { page: usize, detail: String },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewrightError>;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewright-render: the reflow and syntax-highlighting engine.
//
// Cleans raw page text, splits it into prose and fenced code blocks, finds the
// largest font scale at which a page fits its content area, and composes the
// page through an abstract document sink. The engine never touches a concrete
// PDF backend; `pagewright-document` supplies one.

pub mod clean;
pub mod compose;
pub mod document;
pub mod layout;
pub mod segment;
pub mod sink;
pub mod tokenize;

#[cfg(test)]
pub(crate) mod testing;

pub use clean::clean;
pub use compose::compose_page;
pub use document::{PageReport, render_pages};
pub use layout::{LayoutAttempt, LayoutPlan, MeasuredBlock, fit};
pub use segment::{BlockKind, ContentBlock, segment};
pub use sink::{DocumentSink, Rect, RectStyle, TextMeasure};
pub use tokenize::{ColorClass, Token, palette, tokenize_line};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document renderer. Drives clean, segment, fit and compose for each page,
// strictly in order, one output page per input page.

use pagewright_core::LayoutConfig;
use pagewright_core::error::Result;
use tracing::{info, instrument, warn};

use crate::clean::clean;
use crate::compose::compose_page;
use crate::layout::fit;
use crate::segment::segment;
use crate::sink::DocumentSink;

/// Outcome of laying out one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// 1-based position in the output document.
    pub page_number: usize,
    pub block_count: usize,
    pub scale: f32,
    /// Points by which content exceeds the page at minimum scale.
    pub overflow: Option<f32>,
}

/// Render each page string onto its own sink page.
///
/// Pages are composed sequentially because numbering is positional. An
/// empty page still produces an output page carrying only its footer.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn render_pages<S, P>(sink: &mut S, pages: &[P], config: &LayoutConfig) -> Result<Vec<PageReport>>
where
    S: DocumentSink + ?Sized,
    P: AsRef<str>,
{
    config.validate()?;
    let mut reports = Vec::with_capacity(pages.len());

    for (index, raw) in pages.iter().enumerate() {
        let page_number = index + 1;
        let blocks = segment(&clean(raw.as_ref()));

        sink.add_page();
        let (width, height) = sink.page_size();
        let content_width = width - 2.0 * config.margin_pt;
        let content_height = height - 2.0 * config.margin_pt;

        let plan = fit(&blocks, content_width, content_height, &*sink, config)?;
        let report = PageReport {
            page_number,
            block_count: blocks.len(),
            scale: plan.scale,
            overflow: plan.overflow,
        };
        compose_page(sink, plan, page_number, config)?;

        match report.overflow {
            Some(by) => warn!(page = page_number, scale = report.scale, overflow_pt = by, "Page overflows"),
            None => info!(
                page = page_number,
                blocks = report.block_count,
                scale = report.scale,
                "Page rendered"
            ),
        }
        reports.push(report);
    }

    Ok(reports)
}

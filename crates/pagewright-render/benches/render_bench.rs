// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pagewright-render engine: tokenizing a typical
// line of C and fitting a dense page that needs to shrink.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pagewright_core::error::Result;
use pagewright_core::{FontFace, LayoutConfig};
use pagewright_render::{TextMeasure, clean, fit, segment, tokenize_line};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Half-em fixed pitch metrics with a greedy character wrap; close enough to
/// real fonts to exercise the same number of fitter iterations.
struct HalfEm;

impl TextMeasure for HalfEm {
    fn text_width(&self, text: &str, _face: FontFace, size: f32) -> Result<f32> {
        Ok(text.chars().count() as f32 * 0.5 * size)
    }

    fn wrap_text(&self, text: &str, _face: FontFace, size: f32, max_width: f32) -> Result<Vec<String>> {
        let per_line = ((max_width / (0.5 * size)) as usize).max(1);
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Ok(vec![String::new()]);
        }
        Ok(chars.chunks(per_line).map(|c| c.iter().collect()).collect())
    }
}

fn dense_page() -> String {
    let mut page = String::new();
    for section in 0..4 {
        page.push_str(&format!(
            "Section {section} describes the buffer management strategy in some detail, \
             including how pages are pinned, evicted, and written back to disk.\n\n"
        ));
        page.push_str("```c\n");
        for line in 0..18 {
            page.push_str(&format!(
                "    buffer[{line}] = read_page(fd, 0x{line:02X} * PAGE_SIZE); // load\n"
            ));
        }
        page.push_str("```\n\n");
    }
    page
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_tokenize_line(c: &mut Criterion) {
    let line = "    static int count = parse_header(&buf[0x10], \"v1.2\", len); /* hdr */";
    c.bench_function("tokenize_line (c declaration)", |b| {
        b.iter(|| black_box(tokenize_line(black_box(line))));
    });
}

/// Fit a page whose content overflows at full scale, so the linear search
/// walks several rungs before settling.
fn bench_fit_dense_page(c: &mut Criterion) {
    let blocks = segment(&clean(&dense_page()));
    let config = LayoutConfig::default();

    c.bench_function("fit (dense A4 page)", |b| {
        b.iter(|| {
            let plan = fit(black_box(&blocks), 453.0, 700.0, &HalfEm, &config)
                .expect("fake metrics never fail");
            black_box(plan.scale);
        });
    });
}

criterion_group!(benches, bench_tokenize_line, bench_fit_dense_page);
criterion_main!(benches);

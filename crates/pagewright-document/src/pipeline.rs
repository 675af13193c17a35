// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline: source PDF -> per-page raw text -> translated page
// Markdown -> typeset PDF, one output page per source page.

use std::collections::HashMap;
use std::sync::Arc;

use pagewright_core::RenderConfig;
use pagewright_core::error::{PagewrightError, Result};
use pagewright_render::{DocumentSink, PageReport, render_pages};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{info, instrument, warn};

use crate::pdf::{PdfReader, PdfWriter};
use crate::translate::PageTranslator;

#[cfg(feature = "ocr")]
use crate::scan::{OcrEngine, ScanPreprocessor};

/// A finished document and what happened on each page.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub reports: Vec<PageReport>,
}

impl RenderOutput {
    /// Pages that still overflow at the minimum scale.
    pub fn overflowing_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.reports.iter().filter(|report| report.overflow.is_some())
    }
}

pub struct ConversionPipeline<T: PageTranslator> {
    config: RenderConfig,
    translator: Arc<T>,
    #[cfg(feature = "ocr")]
    ocr: Option<OcrEngine>,
}

impl<T: PageTranslator> ConversionPipeline<T> {
    pub fn new(config: RenderConfig, translator: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            translator: Arc::new(translator),
            #[cfg(feature = "ocr")]
            ocr: None,
        })
    }

    /// Fall back to OCR for pages that have no text layer.
    #[cfg(feature = "ocr")]
    pub fn with_ocr(mut self, engine: OcrEngine) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Raw text of every page, in order.
    ///
    /// A page whose text layer is missing or unreadable yields an empty
    /// string unless OCR is available for it.
    #[instrument(skip_all, fields(pages = reader.page_count()))]
    pub fn extract_pages(&self, reader: &PdfReader) -> Result<Vec<String>> {
        let mut pages = Vec::with_capacity(reader.page_count());

        for page_number in 1..=reader.page_count() {
            let text = match reader.page_text(page_number) {
                Ok(text) => text,
                Err(err) => {
                    warn!(page = page_number, %err, "Text layer unreadable");
                    String::new()
                }
            };

            let text = if text.trim().is_empty() {
                self.recognize_page(reader, page_number)?
            } else {
                text
            };
            pages.push(text);
        }

        Ok(pages)
    }

    #[cfg(feature = "ocr")]
    fn recognize_page(&self, reader: &PdfReader, page_number: usize) -> Result<String> {
        let Some(engine) = &self.ocr else {
            warn!(page = page_number, "No text layer and OCR is not configured");
            return Ok(String::new());
        };
        match reader.page_image(page_number)? {
            Some(image) => {
                let prepared = ScanPreprocessor::from_dynamic(image).prepare_for_ocr();
                let text = engine.recognize_text(prepared.as_dynamic())?;
                info!(page = page_number, chars = text.len(), "Page recognised");
                Ok(text)
            }
            None => {
                warn!(page = page_number, "Page has neither text nor a usable image");
                Ok(String::new())
            }
        }
    }

    #[cfg(not(feature = "ocr"))]
    fn recognize_page(&self, _reader: &PdfReader, page_number: usize) -> Result<String> {
        warn!(page = page_number, "No text layer; build with the `ocr` feature to recognise scans");
        Ok(String::new())
    }

    /// Translate pages concurrently, at most `translate_concurrency` at a
    /// time. Output order matches input order regardless of completion
    /// order. The first failure cancels the remaining pages.
    #[instrument(skip_all, fields(pages = pages.len(), jobs = self.config.translate_concurrency))]
    pub async fn translate_pages(&self, pages: Vec<String>) -> Result<Vec<String>> {
        let permits = Arc::new(Semaphore::new(self.config.translate_concurrency));
        let mut tasks = JoinSet::new();
        let mut task_pages: HashMap<task::Id, usize> = HashMap::with_capacity(pages.len());
        let total = pages.len();

        for (index, raw_text) in pages.into_iter().enumerate() {
            let translator = Arc::clone(&self.translator);
            let permits = Arc::clone(&permits);
            let handle = tasks.spawn(async move {
                let page_number = index + 1;
                let _permit = permits.acquire_owned().await.map_err(|err| {
                    PagewrightError::Translation {
                        page: page_number,
                        detail: err.to_string(),
                    }
                })?;
                let translated = translator.translate(page_number, raw_text).await?;
                Ok::<_, PagewrightError>((index, translated))
            });
            task_pages.insert(handle.id(), index + 1);
        }

        let mut slots: Vec<Option<String>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (index, translated) = joined.map_err(|err| PagewrightError::Translation {
                page: task_pages.get(&err.id()).copied().unwrap_or_default(),
                detail: format!("translation task did not complete: {err}"),
            })??;
            slots[index] = Some(translated);
        }

        info!(pages = total, "Pages translated");
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| PagewrightError::Translation {
                    page: index + 1,
                    detail: "no result produced".into(),
                })
            })
            .collect()
    }

    /// Render page Markdown into a PDF, one output page per entry.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn typeset<P: AsRef<str>>(&self, pages: &[P]) -> Result<RenderOutput> {
        let mut writer = PdfWriter::new(self.config.paper_size);
        writer.set_title(self.config.title.clone());

        let reports = render_pages(&mut writer, pages, &self.config.layout)?;
        let bytes = writer.output_bytes()?;

        let overflowing = reports.iter().filter(|r| r.overflow.is_some()).count();
        info!(pages = reports.len(), overflowing, bytes_len = bytes.len(), "Document typeset");
        Ok(RenderOutput { bytes, reports })
    }

    /// Extract, translate and typeset a whole source PDF.
    ///
    /// Extraction (and OCR) runs on the calling task.
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    pub async fn convert_pdf(&self, pdf_bytes: &[u8]) -> Result<RenderOutput> {
        let raw_pages = {
            let reader = PdfReader::from_bytes(pdf_bytes)?;
            self.extract_pages(&reader)?
        };
        let translated = self.translate_pages(raw_pages).await?;
        self.typeset(&translated)
    }
}

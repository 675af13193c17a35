// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pagewright_core::RenderConfig;
use pagewright_core::error::Result;
use pagewright_document::{
    CommandTranslator, ConversionPipeline, PageTranslator, Passthrough, RenderOutput,
};
use pagewright_render::PageReport;
use tracing::{info, instrument, warn};

/// Separates pages inside one Markdown file.
const FORM_FEED: char = '\u{0c}';

#[derive(Debug, clap::Args)]
pub struct ConvertArgs {
    /// Source PDF (scanned or with a text layer)
    pub input: PathBuf,

    /// Where to write the typeset PDF
    #[clap(short, long)]
    pub output: PathBuf,

    /// Command that turns raw page text into page Markdown, e.g. "fixup --lang en"
    #[clap(long, env = "PAGEWRIGHT_TRANSLATOR")]
    pub translator_cmd: Option<String>,

    /// Pages translated at once (overrides the config file)
    #[clap(short, long)]
    pub jobs: Option<usize>,

    /// Title embedded in the output PDF
    #[clap(long)]
    pub title: Option<String>,

    /// Directory holding the OCR models
    #[cfg(feature = "ocr")]
    #[clap(long)]
    pub ocr_models: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct TypesetArgs {
    /// Page Markdown files, in page order; form feeds split a file into pages
    #[clap(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Where to write the typeset PDF
    #[clap(short, long)]
    pub output: PathBuf,

    /// Title embedded in the output PDF
    #[clap(long)]
    pub title: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Write the effective config here instead of printing it
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip_all, fields(input = %args.input.display()))]
pub async fn convert(args: ConvertArgs, mut config: RenderConfig) -> Result<()> {
    if let Some(jobs) = args.jobs {
        config.translate_concurrency = jobs;
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }

    let source = tokio::fs::read(&args.input).await?;
    let timeout = Duration::from_secs(config.translate_timeout_secs);

    let output = match &args.translator_cmd {
        Some(command_line) => {
            let translator = CommandTranslator::from_command_line(command_line, timeout)?;
            info!(program = translator.program(), "Using external translator");
            let pipeline = build_pipeline(&args, config, translator)?;
            pipeline.convert_pdf(&source).await?
        }
        None => {
            let pipeline = build_pipeline(&args, config, Passthrough)?;
            pipeline.convert_pdf(&source).await?
        }
    };

    finish(&output, &args.output).await
}

#[cfg_attr(not(feature = "ocr"), allow(unused_variables))]
fn build_pipeline<T: PageTranslator>(
    args: &ConvertArgs,
    config: RenderConfig,
    translator: T,
) -> Result<ConversionPipeline<T>> {
    let pipeline = ConversionPipeline::new(config, translator)?;

    #[cfg(feature = "ocr")]
    let pipeline = {
        use pagewright_document::{OcrConfig, OcrEngine};

        let ocr_config = match &args.ocr_models {
            Some(dir) => OcrConfig::from_dir(dir),
            None => OcrConfig::default(),
        };
        if args.ocr_models.is_some() || ocr_config.models_available() {
            pipeline.with_ocr(OcrEngine::new(ocr_config)?)
        } else {
            warn!("OCR models not found; scanned pages without text will be blank");
            pipeline
        }
    };

    Ok(pipeline)
}

#[instrument(skip_all, fields(files = args.inputs.len()))]
pub async fn typeset(args: TypesetArgs, mut config: RenderConfig) -> Result<()> {
    if let Some(title) = &args.title {
        config.title = title.clone();
    }

    let mut pages = Vec::new();
    for path in &args.inputs {
        let text = tokio::fs::read_to_string(path).await?;
        pages.extend(split_pages(&text));
    }

    let pipeline = ConversionPipeline::new(config, Passthrough)?;
    let output = pipeline.typeset(&pages)?;
    finish(&output, &args.output).await
}

pub fn config(args: ConfigArgs, config: &RenderConfig) -> Result<()> {
    match &args.output {
        Some(path) => {
            config.save(path)?;
            println!("Wrote config to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

/// Pages of one Markdown file. A file without form feeds is a single page;
/// a trailing form feed does not add an empty page.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|last| last.trim().is_empty()) {
        pages.pop();
    }
    pages
}

async fn finish(output: &RenderOutput, path: &Path) -> Result<()> {
    tokio::fs::write(path, &output.bytes).await?;

    for report in output.overflowing_pages() {
        warn!(
            page = report.page_number,
            overflow_pt = report.overflow.unwrap_or_default(),
            "Page still overflows at the minimum scale"
        );
    }
    println!("{}", summary(&output.reports, path));
    Ok(())
}

fn summary(reports: &[PageReport], path: &Path) -> String {
    let shrunk = reports.iter().filter(|r| r.scale < 1.0).count();
    let overflowing = reports.iter().filter(|r| r.overflow.is_some()).count();
    let mut line = format!("Wrote {} page(s) to {}", reports.len(), path.display());
    if shrunk > 0 {
        line.push_str(&format!(", {shrunk} shrunk to fit"));
    }
    if overflowing > 0 {
        line.push_str(&format!(", {overflowing} overflowing"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(page_number: usize, scale: f32, overflow: Option<f32>) -> PageReport {
        PageReport {
            page_number,
            block_count: 1,
            scale,
            overflow,
        }
    }

    #[test]
    fn form_feeds_split_pages() {
        assert_eq!(split_pages("one"), vec!["one"]);
        assert_eq!(split_pages("one\u{0c}two"), vec!["one", "two"]);
        assert_eq!(split_pages("one\u{0c}two\u{0c}\n"), vec!["one", "two"]);
        assert_eq!(split_pages("\u{0c}"), vec![""]);
        assert_eq!(split_pages(""), vec![""]);
    }

    #[test]
    fn summary_mentions_shrunk_and_overflowing_pages() {
        let path = Path::new("out.pdf");
        assert_eq!(
            summary(&[report(1, 1.0, None)], path),
            "Wrote 1 page(s) to out.pdf"
        );
        assert_eq!(
            summary(&[report(1, 0.8, None), report(2, 0.6, Some(12.0))], path),
            "Wrote 2 page(s) to out.pdf, 2 shrunk to fit, 1 overflowing"
        );
    }

    #[tokio::test]
    async fn typeset_writes_one_page_per_form_feed_section() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pages.md");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, "# One\n\nfirst\u{0c}```c\nint two;\n```").unwrap();

        let args = TypesetArgs {
            inputs: vec![input],
            output: output.clone(),
            title: Some("Two pages".into()),
        };
        typeset(args, RenderConfig::default()).await.unwrap();

        let bytes = std::fs::read(&output).unwrap();
        let reader = pagewright_document::PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 2);
    }

    #[test]
    fn config_command_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config(ConfigArgs { output: Some(path.clone()) }, &RenderConfig::default()).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap(), RenderConfig::default());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optical character recognition for scanned pages without a text layer.
//
// Backed by `ocrs`, a pure-Rust engine whose neural network models run on
// `rten`. Only compiled with the `ocr` feature.
//
// The engine needs two model files, `text-detection.rten` and
// `text-recognition.rten`. Running `ocrs-cli` once downloads them to the
// default cache directory, `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).
// `PAGEWRIGHT_OCR_MODELS` overrides that location.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use pagewright_core::error::{PagewrightError, Result};
use rten::Model;
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Environment variable naming a directory that holds both models.
pub const MODEL_DIR_ENV: &str = "PAGEWRIGHT_OCR_MODELS";

/// Directory searched for models when none is given explicitly.
pub fn default_model_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(MODEL_DIR_ENV) {
        PathBuf::from(dir)
    } else if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect `text-detection.rten` and `text-recognition.rten` inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Both model files are present.
    pub fn models_available(&self) -> bool {
        self.detection_model_path.exists() && self.recognition_model_path.exists()
    }

    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(PagewrightError::OcrError(format!(
                    "{role} model not found at {}; run `ocrs-cli` once to download models \
                     or set {MODEL_DIR_ENV}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(role: &str, path: &Path) -> Result<Model> {
    info!(role, "Loading OCR model");
    Model::load_file(path).map_err(|err| {
        PagewrightError::OcrError(format!(
            "failed to load {role} model from {}: {}",
            path.display(),
            err
        ))
    })
}

/// Recognises text on page images.
///
/// Model loading is the expensive step, so build one engine and reuse it for
/// every page. The `ocrs` and `rten` crates are painfully slow in debug
/// builds; run OCR from release binaries.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let detection_model = load_model("detection", &config.detection_model_path)?;
        let recognition_model = load_model("recognition", &config.recognition_model_path)?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            PagewrightError::OcrError(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrConfig::from_dir(dir))
    }

    /// All text on the page, one recognised line per output line.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            PagewrightError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self.engine.prepare_input(source).map_err(|err| {
            PagewrightError::OcrError(format!("OCR preprocessing failed: {}", err))
        })?;

        let text = self.engine.get_text(&input).map_err(|err| {
            PagewrightError::OcrError(format!("OCR text recognition failed: {}", err))
        })?;

        debug!(lines = text.lines().count(), chars = text.len(), "OCR complete");
        Ok(text)
    }
}

impl std::fmt::Debug for OcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_dir() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn default_config_uses_known_filenames() {
        let config = OcrConfig::default();
        assert!(config.detection_model_path.ends_with(DETECTION_MODEL_FILENAME));
        assert!(config.recognition_model_path.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn missing_models_fail_validation() {
        let config = OcrConfig::from_dir("/nonexistent/path/ocr-models");
        assert!(!config.models_available());
        assert!(matches!(config.validate(), Err(PagewrightError::OcrError(_))));
        assert!(matches!(
            OcrEngine::from_model_dir("/nonexistent/path/ocr-models"),
            Err(PagewrightError::OcrError(_))
        ));
    }

    #[test]
    fn half_present_models_name_the_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DETECTION_MODEL_FILENAME), b"").unwrap();

        let err = OcrConfig::from_dir(dir.path()).validate().unwrap_err();
        assert!(err.to_string().contains("recognition model"));
    }
}

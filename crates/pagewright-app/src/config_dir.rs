// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware config file resolution.

use std::path::{Path, PathBuf};

use pagewright_core::RenderConfig;
use pagewright_core::error::Result;
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// `$XDG_CONFIG_HOME/pagewright`, else `~/.config/pagewright`.
pub fn config_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        PathBuf::from(".")
    };
    base.join("pagewright")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Load the effective config.
///
/// An explicit path must exist. The default location is optional; when it
/// holds no file the built-in defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<RenderConfig> {
    match explicit {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            RenderConfig::load(path)
        }
        None => load_or_default(&default_config_path()),
    }
}

fn load_or_default(path: &Path) -> Result<RenderConfig> {
    if path.exists() {
        info!(path = %path.display(), "Loading config");
        RenderConfig::load(path)
    } else {
        debug!(path = %path.display(), "No config file; using defaults");
        Ok(RenderConfig::default())
    }
}

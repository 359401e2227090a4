// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BlattwerkError, Result};

/// Persistent application settings.
///
/// Unknown or missing fields fall back to their defaults so that config
/// files written by older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the scanner device used for capturing. Empty means not set;
    /// the session driver will resolve a device through the callback.
    pub scanner_device: String,
    /// Capture mode requested from the device ("Gray" or "Color").
    pub scanner_mode: String,
    /// Capture resolution requested from the device, in pixels per inch.
    pub scanner_resolution: u32,
    /// Delay in seconds between consecutive page captures.
    pub scanner_delay: u64,
    /// Directory the import transport reads page images from. None means
    /// the application's default inbox directory.
    pub import_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner_device: String::new(),
            scanner_mode: "Gray".to_owned(),
            scanner_resolution: 150,
            scanner_delay: 0,
            import_dir: None,
        }
    }
}

impl Config {
    /// Load the configuration from `path`, creating the file with defaults
    /// on first run.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw).map_err(|err| {
                BlattwerkError::Config(format!("cannot load config from {}: {err}", path.display()))
            })
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// The inter-page delay as a `Duration`.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.scanner_delay)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend service wiring: configuration, catalog, and page store.

use std::path::PathBuf;

use tracing::info;

use blattwerk_catalog::Catalog;
use blattwerk_core::Config;
use blattwerk_core::error::Result;
use blattwerk_document::PageStore;

use super::data_dir;

/// Everything a command needs to run: loaded configuration and open
/// storage handles, plus the paths they came from.
pub struct AppServices {
    pub config: Config,
    pub config_path: PathBuf,
    pub catalog: Catalog,
    pub catalog_path: PathBuf,
    pub pages: PageStore,
}

impl AppServices {
    /// Open the catalog and load (or create) the configuration.
    pub fn init() -> Result<Self> {
        let config_path = data_dir::config_dir().join("config.json");
        let config = Config::load_or_default(&config_path)?;

        let catalog_path = data_dir::data_dir().join("catalog.db");
        let catalog = Catalog::open(&catalog_path)?;

        let pages = PageStore::new(data_dir::data_subdir("pages"));

        info!(
            config = %config_path.display(),
            catalog = %catalog_path.display(),
            "backend services initialised"
        );
        Ok(Self {
            config,
            config_path,
            catalog,
            catalog_path,
            pages,
        })
    }

    /// The directory the import transport reads page images from.
    pub fn import_root(&self) -> PathBuf {
        self.config
            .import_dir
            .clone()
            .unwrap_or_else(|| data_dir::data_subdir("inbox"))
    }

    /// Default location for a new notebook's PDF.
    pub fn default_pdf_path(&self, title: &str) -> PathBuf {
        data_dir::data_subdir("documents").join(format!("{title}.pdf"))
    }

    /// Persist the current configuration.
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image store.
//
// Finalized page images live as JPEG files under a pages root, one
// directory per notebook, addressed by the notebook's deterministic
// page-path mapping. The scanner callback saves through this store; PDF
// assembly reads back through it.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, instrument};

use blattwerk_core::Notebook;
use blattwerk_core::error::{BlattwerkError, Result};

/// Filesystem store for a notebook's page images.
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the given page of the notebook is (or will be) stored.
    pub fn path(&self, notebook: &Notebook, page: u32) -> PathBuf {
        notebook.page_path(&self.root, page)
    }

    /// Write a finalized page image, creating the notebook's directory on
    /// first use. Returns the path written.
    #[instrument(skip(self, notebook, image), fields(notebook = notebook.title()))]
    pub fn save(&self, notebook: &Notebook, page: u32, image: &DynamicImage) -> Result<PathBuf> {
        let path = self.path(notebook, page);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // JPEG carries no alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        rgb.save(&path).map_err(|err| {
            BlattwerkError::ImageError(format!("failed to save {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), "page image saved");
        Ok(path)
    }

    /// Read a stored page image back.
    pub fn load(&self, notebook: &Notebook, page: u32) -> Result<DynamicImage> {
        let path = self.path(notebook, page);
        image::open(&path).map_err(|err| {
            BlattwerkError::ImageError(format!("failed to open {}: {err}", path.display()))
        })
    }
}

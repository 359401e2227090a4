// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed scanner transport.
//
// Presents a directory of image files as a virtual scanner device: each
// capture pops the next file in page order. This is the shipping transport
// on systems without scanner hardware and the integration seam for the
// CLI; a hardware transport implements the same traits.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info};

use crate::device::{
    DeviceCapabilities, DeviceDescriptor, DeviceError, DeviceHandle, DeviceTransport, OptionValue,
};

/// Resolutions the virtual device advertises.
const RESOLUTIONS: [u32; 4] = [75, 150, 300, 600];

/// A transport that reads page images from a directory.
pub struct ImportTransport {
    root: PathBuf,
}

impl ImportTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The device name enumeration reports and `open` accepts.
    pub fn device_name(&self) -> String {
        format!("import:{}", self.root.display())
    }

    fn capabilities() -> DeviceCapabilities {
        DeviceCapabilities::new()
            .with_option(
                "format",
                vec![
                    OptionValue::Text("jpeg".to_owned()),
                    OptionValue::Text("png".to_owned()),
                ],
            )
            .with_option(
                "mode",
                vec![
                    OptionValue::Text("Gray".to_owned()),
                    OptionValue::Text("Color".to_owned()),
                ],
            )
            .with_option(
                "resolution",
                RESOLUTIONS.iter().copied().map(OptionValue::Number).collect(),
            )
    }
}

impl DeviceTransport for ImportTransport {
    type Handle = ImportDevice;

    /// One virtual device per import directory; none when the directory is
    /// missing, which the driver reports as "no devices found".
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        if !self.root.is_dir() {
            debug!(root = %self.root.display(), "import directory missing");
            return Ok(Vec::new());
        }
        Ok(vec![DeviceDescriptor {
            name: self.device_name(),
            vendor: "Blattwerk".to_owned(),
            model: "Directory import".to_owned(),
            class: "virtual".to_owned(),
        }])
    }

    fn open(&self, name: &str) -> Result<ImportDevice, DeviceError> {
        if name != self.device_name() {
            return Err(DeviceError::Backend(format!("unknown device '{name}'")));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .map_err(|err| DeviceError::Backend(format!("cannot read import directory: {err}")))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_page_image(path))
            .collect();
        files.sort_by_key(|path| page_order_key(path));

        info!(count = files.len(), root = %self.root.display(), "import device opened");
        Ok(ImportDevice {
            name: name.to_owned(),
            caps: Self::capabilities(),
            resolution: 150,
            files: files.into(),
        })
    }
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png")
        })
}

/// Numeric file stems sort numerically ("2.png" before "10.png"); anything
/// else sorts after them by name.
fn page_order_key(path: &Path) -> (u8, u64, String) {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_owned();
    match stem.parse::<u64>() {
        Ok(number) => (0, number, stem),
        Err(_) => (1, 0, stem),
    }
}

/// An open import session: a queue of image files consumed one per capture.
pub struct ImportDevice {
    name: String,
    caps: DeviceCapabilities,
    resolution: u32,
    files: VecDeque<PathBuf>,
}

impl DeviceHandle for ImportDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    fn configure(&mut self, option: &str, value: &OptionValue) -> Result<(), DeviceError> {
        // Mode and format have no effect on already-encoded files; the
        // resolution tells the geometry engine the images' capture density.
        if option == "resolution" {
            if let OptionValue::Number(resolution) = value {
                self.resolution = *resolution;
            }
        }
        Ok(())
    }

    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn capture(&mut self) -> Result<DynamicImage, DeviceError> {
        let path = self
            .files
            .pop_front()
            .ok_or_else(|| DeviceError::Backend("import directory is exhausted".to_owned()))?;
        debug!(file = %path.display(), "importing page image");
        image::open(&path)
            .map_err(|err| DeviceError::Backend(format!("cannot decode {}: {err}", path.display())))
    }

    fn close(self) {
        debug!(device = %self.name, "import device closed");
    }
}

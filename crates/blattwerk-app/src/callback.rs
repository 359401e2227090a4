// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CLI implementation of the scanner callback.
//
// Prints session progress to the terminal and owns all persistence side
// effects: page images go to the page store as they arrive, and when the
// session finishes the notebook is saved to the catalog and its PDF
// reassembled.

use std::io::Write as _;
use std::path::PathBuf;

use image::DynamicImage;
use tracing::error;

use blattwerk_catalog::Catalog;
use blattwerk_core::Notebook;
use blattwerk_document::{NotebookPdf, PageStore};
use blattwerk_scan::{DeviceDescriptor, ScanCallback};

pub struct CliCallback {
    catalog: Catalog,
    pages: PageStore,
    /// Capture resolution the PDF assembly assumes, in pixels per inch.
    resolution: u32,
}

impl CliCallback {
    pub fn new(catalog: Catalog, pages: PageStore, resolution: u32) -> Self {
        Self {
            catalog,
            pages,
            resolution,
        }
    }

    fn separator() {
        println!("----------------------------------------");
    }
}

impl ScanCallback for CliCallback {
    fn on_searching_for_devices(&mut self) {
        println!("Searching for available devices...");
    }

    fn on_set_device(&mut self, devices: &[DeviceDescriptor]) -> Option<String> {
        println!("Available devices:");
        for (index, device) in devices.iter().enumerate() {
            println!("  [{index}] {device}");
        }
        print!("Choose a device by number: ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok()?;
        let choice: usize = line.trim().parse().ok()?;
        devices.get(choice).map(|device| device.name.clone())
    }

    fn on_start(&mut self, device_name: &str, pages_queue: &[u32]) {
        Self::separator();
        println!("Using device '{device_name}'.");
        Self::separator();
        let pages_to_scan = pages_queue
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("The following pages will be scanned: {pages_to_scan}.");
    }

    fn on_start_scan_page(&mut self, page: u32) {
        println!("Scanning page {page}...");
    }

    fn on_finish_scan_page(&mut self, notebook: &Notebook, page: u32, image: DynamicImage) {
        match self.pages.save(notebook, page, &image) {
            Ok(path) => println!("Page {page} saved at {}", path.display()),
            Err(err) => {
                error!(%err, page, "failed to save page image");
                eprintln!("Error: {err}");
            }
        }
    }

    fn on_finish(&mut self, notebook: &Notebook) {
        let mut notebook = notebook.clone();
        if let Err(err) = self.catalog.save_notebook(&mut notebook) {
            error!(%err, "failed to save notebook");
            eprintln!("Error: {err}");
            return;
        }

        Self::separator();
        println!("Creating PDF...");
        let target: PathBuf = notebook.path().to_path_buf();
        let assembler = NotebookPdf::new(self.resolution);
        match assembler.write_to_file(&notebook, &self.pages, &target) {
            Ok(()) => {
                println!("PDF saved at '{}'.", target.display());
                Self::separator();
                println!("Done.");
            }
            Err(err) => {
                error!(%err, "failed to assemble notebook PDF");
                eprintln!("Error: {err}");
            }
        }
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("Error: {message}");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Blattwerk notebook scanner.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Geometry descriptor for a family of notebooks: declared page size in
/// millimetres and whether two logical pages share one physical scan.
///
/// Setters coerce invalid input instead of failing: a blank title becomes
/// "Untitled" and negative dimensions become 0. The descriptor is immutable
/// for the lifetime of any notebook that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookType {
    id: i64,
    title: String,
    page_width_mm: u32,
    page_height_mm: u32,
    pages_paired: bool,
}

impl NotebookType {
    /// Create a type with the given title and page size in millimetres.
    pub fn new(title: &str, page_width_mm: i32, page_height_mm: i32) -> Self {
        let mut kind = Self {
            id: -1,
            title: String::new(),
            page_width_mm: 0,
            page_height_mm: 0,
            pages_paired: false,
        };
        kind.set_title(title);
        kind.set_page_width_mm(page_width_mm);
        kind.set_page_height_mm(page_height_mm);
        kind
    }

    /// Database row id, -1 until the type has been persisted.
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// Title of the type. Unique within the catalog.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Blank or whitespace-only titles are coerced to "Untitled".
    pub fn set_title(&mut self, title: &str) {
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            "Untitled".to_owned()
        } else {
            trimmed.to_owned()
        };
    }

    /// Declared page width in millimetres.
    pub fn page_width_mm(&self) -> u32 {
        self.page_width_mm
    }

    /// Negative widths are coerced to 0.
    pub fn set_page_width_mm(&mut self, width_mm: i32) {
        self.page_width_mm = width_mm.max(0) as u32;
    }

    /// Declared page height in millimetres.
    pub fn page_height_mm(&self) -> u32 {
        self.page_height_mm
    }

    /// Negative heights are coerced to 0.
    pub fn set_page_height_mm(&mut self, height_mm: i32) {
        self.page_height_mm = height_mm.max(0) as u32;
    }

    /// Whether two logical pages are captured per physical scan when they
    /// fit side by side (an open book spread).
    pub fn pages_paired(&self) -> bool {
        self.pages_paired
    }

    pub fn set_pages_paired(&mut self, paired: bool) {
        self.pages_paired = paired;
    }
}

/// A titled, ordered collection of scanned pages.
///
/// `total_pages` is the page ledger: it is mutated only by the scan session
/// driver and never decreases during a session. Persistence of the notebook
/// and of its page images happens outside this type, through the scanner
/// callback and the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    id: i64,
    title: String,
    kind: NotebookType,
    path: PathBuf,
    first_page_number: u32,
    total_pages: u32,
}

impl Notebook {
    /// Create a notebook of the given type whose assembled PDF lives at `path`.
    pub fn new(title: &str, kind: NotebookType, path: impl Into<PathBuf>) -> Self {
        let mut notebook = Self {
            id: -1,
            title: String::new(),
            kind,
            path: path.into(),
            first_page_number: 1,
            total_pages: 0,
        };
        notebook.set_title(title);
        notebook
    }

    /// Database row id, -1 until the notebook has been persisted.
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// Title of the notebook. Unique within the catalog.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Blank titles are coerced to "Untitled".
    pub fn set_title(&mut self, title: &str) {
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            "Untitled".to_owned()
        } else {
            trimmed.to_owned()
        };
    }

    /// The geometry descriptor this notebook was created with.
    pub fn kind(&self) -> &NotebookType {
        &self.kind
    }

    /// Path of the assembled PDF in the filesystem.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// The number the page numbering starts from.
    pub fn first_page_number(&self) -> u32 {
        self.first_page_number
    }

    /// Negative numbers are coerced to 1; zero is a valid first page.
    pub fn set_first_page_number(&mut self, number: i32) {
        self.first_page_number = if number >= 0 { number as u32 } else { 1 };
    }

    /// Number of pages captured so far.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Values below zero are floored at 0.
    pub fn set_total_pages(&mut self, total: i64) {
        self.total_pages = total.max(0) as u32;
    }

    /// Number of the last existing page, or `first_page_number - 1` when the
    /// notebook is empty. Signed because an empty notebook starting at page 0
    /// has a last page of -1.
    pub fn last_page_number(&self) -> i64 {
        self.first_page_number as i64 + self.total_pages as i64 - 1
    }

    /// Deterministic storage path for a page image:
    /// `<pages_root>/<title>/<page>.jpg`.
    pub fn page_path(&self, pages_root: &Path, page: u32) -> PathBuf {
        pages_root.join(&self.title).join(format!("{page}.jpg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_are_coerced_to_untitled() {
        let kind = NotebookType::new("  ", 210, 297);
        assert_eq!(kind.title(), "Untitled");

        let notebook = Notebook::new("", kind, "/tmp/untitled.pdf");
        assert_eq!(notebook.title(), "Untitled");
    }

    #[test]
    fn negative_dimensions_are_coerced_to_zero() {
        let kind = NotebookType::new("A4", -210, 297);
        assert_eq!(kind.page_width_mm(), 0);
        assert_eq!(kind.page_height_mm(), 297);
    }

    #[test]
    fn negative_first_page_number_defaults_to_one() {
        let kind = NotebookType::new("A4", 210, 297);
        let mut notebook = Notebook::new("notes", kind, "/tmp/notes.pdf");

        notebook.set_first_page_number(-3);
        assert_eq!(notebook.first_page_number(), 1);

        // Zero is explicitly allowed.
        notebook.set_first_page_number(0);
        assert_eq!(notebook.first_page_number(), 0);
    }

    #[test]
    fn total_pages_is_floored_at_zero() {
        let kind = NotebookType::new("A4", 210, 297);
        let mut notebook = Notebook::new("notes", kind, "/tmp/notes.pdf");

        notebook.set_total_pages(-5);
        assert_eq!(notebook.total_pages(), 0);

        notebook.set_total_pages(12);
        assert_eq!(notebook.total_pages(), 12);
    }

    #[test]
    fn last_page_number_accounts_for_first_page() {
        let kind = NotebookType::new("A4", 210, 297);
        let mut notebook = Notebook::new("notes", kind, "/tmp/notes.pdf");

        assert_eq!(notebook.last_page_number(), 0);

        notebook.set_first_page_number(3);
        notebook.set_total_pages(4);
        assert_eq!(notebook.last_page_number(), 6);

        notebook.set_first_page_number(0);
        notebook.set_total_pages(0);
        assert_eq!(notebook.last_page_number(), -1);
    }

    #[test]
    fn page_path_is_deterministic() {
        let kind = NotebookType::new("A4", 210, 297);
        let notebook = Notebook::new("lab journal", kind, "/tmp/lab.pdf");

        let path = notebook.page_path(Path::new("/data/pages"), 7);
        assert_eq!(path, PathBuf::from("/data/pages/lab journal/7.jpg"));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk Document — persistence of finalized page images and assembly of
// a notebook's pages into a single paginated PDF.

pub mod pages;
pub mod pdf;

pub use pages::PageStore;
pub use pdf::NotebookPdf;

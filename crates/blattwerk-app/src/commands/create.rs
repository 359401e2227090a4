// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `blattwerk create` — create a notebook of an existing type.

use std::path::PathBuf;

use blattwerk_core::Notebook;
use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_document::NotebookPdf;

use crate::services::AppServices;

pub fn run(
    services: &AppServices,
    title: &str,
    type_title: &str,
    path: Option<PathBuf>,
    first_page: i32,
) -> Result<()> {
    if services.catalog.notebook_exists(title)? {
        return Err(BlattwerkError::Database(format!(
            "notebook '{title}' already exists"
        )));
    }
    let kind = services
        .catalog
        .get_type_by_title(type_title)?
        .ok_or_else(|| {
            BlattwerkError::Database(format!(
                "no type '{type_title}', create it with `blattwerk types create`"
            ))
        })?;

    let pdf_path = path.unwrap_or_else(|| services.default_pdf_path(title));
    let mut notebook = Notebook::new(title, kind, pdf_path);
    notebook.set_first_page_number(first_page);
    services.catalog.save_notebook(&mut notebook)?;

    // Start with an empty, valid PDF so the path is usable right away.
    NotebookPdf::new(services.config.scanner_resolution).write_to_file(
        &notebook,
        &services.pages,
        notebook.path(),
    )?;

    println!(
        "Created notebook '{}' at '{}'.",
        notebook.title(),
        notebook.path().display()
    );
    Ok(())
}

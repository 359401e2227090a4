// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `blattwerk delete` — remove a notebook from the catalog.

use blattwerk_core::error::{BlattwerkError, Result};

use crate::services::AppServices;

pub fn run(services: &AppServices, title: &str) -> Result<()> {
    if !services.catalog.notebook_exists(title)? {
        return Err(BlattwerkError::Database(format!("no notebook '{title}'")));
    }
    services.catalog.delete_notebook_by_title(title)?;

    println!("Deleted notebook '{title}' from the catalog.");
    println!("Its page images and PDF were left on disk.");
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `blattwerk types` — list, create, and delete notebook types.

use blattwerk_core::NotebookType;
use blattwerk_core::error::{BlattwerkError, Result};

use crate::services::AppServices;

pub fn list(services: &AppServices) -> Result<()> {
    let types = services.catalog.get_types()?;
    if types.is_empty() {
        println!("No types found. Create one with `blattwerk types create`.");
        return Ok(());
    }

    for kind in types {
        let paired = if kind.pages_paired() {
            "  (paired pages)"
        } else {
            ""
        };
        println!(
            "{}  {}x{}mm{paired}",
            kind.title(),
            kind.page_width_mm(),
            kind.page_height_mm()
        );
    }
    Ok(())
}

pub fn create(
    services: &AppServices,
    title: &str,
    width_mm: i32,
    height_mm: i32,
    paired: bool,
) -> Result<()> {
    if services.catalog.type_exists(title)? {
        return Err(BlattwerkError::Database(format!(
            "type '{title}' already exists"
        )));
    }
    let mut kind = NotebookType::new(title, width_mm, height_mm);
    kind.set_pages_paired(paired);
    services.catalog.save_type(&mut kind)?;

    println!(
        "Created type '{}' ({}x{}mm).",
        kind.title(),
        kind.page_width_mm(),
        kind.page_height_mm()
    );
    Ok(())
}

pub fn delete(services: &AppServices, title: &str) -> Result<()> {
    services.catalog.delete_type_by_title(title)?;
    println!("Deleted type '{title}'.");
    Ok(())
}

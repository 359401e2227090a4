// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `blattwerk list` — list all notebooks.

use blattwerk_core::error::Result;

use crate::services::AppServices;

pub fn run(services: &AppServices) -> Result<()> {
    let notebooks = services.catalog.get_notebooks()?;
    if notebooks.is_empty() {
        println!("No notebooks found. Create one with `blattwerk create`.");
        return Ok(());
    }

    for notebook in notebooks {
        println!(
            "{}  [{}]  {} page(s)  {}",
            notebook.title(),
            notebook.kind().title(),
            notebook.total_pages(),
            notebook.path().display()
        );
    }
    Ok(())
}

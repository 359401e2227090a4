// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `blattwerk scan` — run a scan session against a notebook.

use blattwerk_catalog::Catalog;
use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_scan::{ImportTransport, ScanRequest, Scanner};

use crate::callback::CliCallback;
use crate::services::AppServices;

pub fn run(
    services: &mut AppServices,
    title: &str,
    append: u32,
    replace: &[u32],
    set_device: bool,
) -> Result<()> {
    let notebook = services
        .catalog
        .get_notebook_by_title(title)?
        .ok_or_else(|| {
            BlattwerkError::Database(format!(
                "no notebook '{title}', create one with `blattwerk create`"
            ))
        })?;

    if set_device {
        services.config.scanner_device.clear();
    }

    let mut request = ScanRequest::new(notebook);
    for &page in replace {
        request.enqueue(page);
    }
    request.enqueue_append(append);

    let transport = ImportTransport::new(services.import_root());
    let mut scanner = Scanner::new(transport, services.config.clone());

    // The callback owns its own catalog connection; persistence happens
    // there, not in the driver.
    let callback = CliCallback::new(
        Catalog::open(&services.catalog_path)?,
        services.pages.clone(),
        services.config.scanner_resolution,
    );
    scanner.register(Box::new(callback));

    scanner.scan(&mut request)?;

    // A device picked during the session sticks for the next run.
    if scanner.config().scanner_device != services.config.scanner_device {
        services.config.scanner_device = scanner.config().scanner_device.clone();
        services.save_config()?;
    }
    Ok(())
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner event protocol.
//
// The session driver holds an implementation of `ScanCallback` and routes
// every externally visible event through it: progress, device selection,
// finished page images, errors. All persistence side effects (saving page
// images, saving the notebook) belong to the callback implementation; the
// driver itself retains no output state.

use blattwerk_core::Notebook;
use image::DynamicImage;

use crate::device::DeviceDescriptor;

/// Events emitted by a scan session, one method per event.
///
/// There is no default behaviour; implementors decide what each event
/// means for their surface (CLI output, persistence, tests).
pub trait ScanCallback {
    /// Device enumeration is about to start. Informational.
    fn on_searching_for_devices(&mut self);

    /// No device is configured; pick one from the enumerated list.
    ///
    /// Return the chosen device name, or `None` (or an empty string) to
    /// abort the session without opening anything.
    fn on_set_device(&mut self, devices: &[DeviceDescriptor]) -> Option<String>;

    /// The device is open and the session is about to capture. The
    /// snapshot lists the queued page numbers in capture order.
    fn on_start(&mut self, device_name: &str, pages_queue: &[u32]);

    /// Fired immediately before the physical capture of `page`.
    fn on_start_scan_page(&mut self, page: u32);

    /// Fired after a page's geometry processing completed. The recipient
    /// is responsible for persisting `image`.
    fn on_finish_scan_page(&mut self, notebook: &Notebook, page: u32, image: DynamicImage);

    /// The queue is exhausted and the session finished normally.
    fn on_finish(&mut self, notebook: &Notebook);

    /// A reportable condition occurred. Fatal conditions abort the session
    /// after this call; non-fatal ones (per-option configuration problems)
    /// let it continue.
    fn on_error(&mut self, message: &str);
}

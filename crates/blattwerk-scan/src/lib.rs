// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blattwerk Scan — scanner device abstraction, page-geometry engine, and the
// scan-session driver.  This crate turns raw captures from a scanner device
// into correctly cropped, correctly oriented page images and walks a queue of
// page numbers against a notebook's page ledger.

pub mod callback;
pub mod device;
pub mod geometry;
pub mod import;
pub mod request;
pub mod scanner;

pub use callback::ScanCallback;
pub use device::{
    DeviceCapabilities, DeviceDescriptor, DeviceError, DeviceHandle, DeviceTransport, OptionValue,
};
pub use import::ImportTransport;
pub use request::ScanRequest;
pub use scanner::{Scanner, SessionState};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Blattwerk.

use thiserror::Error;

/// Top-level error type for all Blattwerk operations.
///
/// The scan-session variants double as the user-visible messages delivered
/// through the scanner callback's `on_error` event, so their wording is part
/// of the driver's observable behaviour.
#[derive(Debug, Error)]
pub enum BlattwerkError {
    // -- Device resolution --
    #[error("No devices found")]
    NoDevicesFound,

    #[error("Device is not set")]
    DeviceNotSet,

    #[error("failed to load the list of devices: {0}")]
    DeviceList(String),

    // -- Scan session --
    #[error("failed to open device '{name}': {reason}")]
    DeviceOpen { name: String, reason: String },

    #[error("scanner option '{0}' cannot be set")]
    OptionNotSupported(String),

    #[error("wrong value '{value}' for scanner option '{option}' in config, allowed values: {allowed}")]
    OptionValueNotAllowed {
        option: String,
        value: String,
        allowed: String,
    },

    #[error("failed to apply scanner option '{option}': {reason}")]
    OptionApply { option: String, reason: String },

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("interrupted {0}")]
    Interrupted(String),

    #[error("Nothing to scan")]
    NothingToScan,

    // -- Document errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF assembly failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BlattwerkError>;

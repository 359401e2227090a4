// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner device abstraction.
//
// The session driver never talks to scanner hardware directly; it goes
// through the `DeviceTransport`/`DeviceHandle` traits defined here.  A
// transport value owns whatever library-wide state its backend needs, so
// acquiring and dropping the transport replaces any global init/exit pair a
// scanner library might otherwise require.

use std::collections::HashMap;

use image::DynamicImage;
use thiserror::Error;

/// Error returned by transport and device calls.
///
/// `Interrupted` is the cooperative-cancellation signal: a transport that
/// notices an external interrupt during a blocking call (enumerate, open,
/// capture) returns it, and the driver aborts the session without calling
/// `on_finish`.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("interrupted")]
    Interrupted,

    #[error("{0}")]
    Backend(String),
}

/// A scanner device as reported by enumeration.
///
/// Used only for presentation and selection; nothing is retained from it
/// beyond the chosen name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Backend-specific device name, the value passed to `open`.
    pub name: String,
    pub vendor: String,
    pub model: String,
    /// Device class, e.g. "flatbed scanner" or "virtual".
    pub class: String,
}

impl std::fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {}, {})", self.name, self.vendor, self.model, self.class)
    }
}

/// A configurable device option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Number(u32),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// The options a device exposes, mapped to their allowed values.
///
/// The driver applies a configured option only when the option is present
/// here **and** the configured value is a member of its allowed set;
/// anything else is reported and the hardware default is kept.
#[derive(Debug, Clone, Default)]
pub struct DeviceCapabilities {
    options: HashMap<String, Vec<OptionValue>>,
}

impl DeviceCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of an option and its allowed values.
    pub fn with_option(mut self, name: &str, values: Vec<OptionValue>) -> Self {
        self.options.insert(name.to_owned(), values);
        self
    }

    /// Whether the device exposes the option at all.
    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Whether `value` is in the allowed set for `name`. False when the
    /// option is not exposed.
    pub fn allows(&self, name: &str, value: &OptionValue) -> bool {
        self.options
            .get(name)
            .is_some_and(|values| values.contains(value))
    }

    /// The allowed values for an option, if it is exposed.
    pub fn allowed_values(&self, name: &str) -> Option<&[OptionValue]> {
        self.options.get(name).map(Vec::as_slice)
    }

    /// Comma-joined allowed values, for error messages.
    pub fn describe_allowed(&self, name: &str) -> String {
        match self.options.get(name) {
            Some(values) => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            None => String::new(),
        }
    }
}

/// Access to scanner hardware: enumeration and opening.
///
/// All calls are blocking; there is no internal parallelism anywhere in the
/// scan path.
pub trait DeviceTransport {
    type Handle: DeviceHandle;

    /// List the devices this transport can open.
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, DeviceError>;

    /// Open a device by the name reported in its descriptor.
    fn open(&self, name: &str) -> Result<Self::Handle, DeviceError>;
}

/// An open scanner device session.
pub trait DeviceHandle {
    /// The name the device was opened under.
    fn name(&self) -> &str;

    /// The options this device exposes.
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Apply an option value. Callers are expected to validate against
    /// `capabilities` first; a backend may still reject the value.
    fn configure(&mut self, option: &str, value: &OptionValue) -> Result<(), DeviceError>;

    /// The effective capture resolution in pixels per inch, after any
    /// configuration has been applied.
    fn resolution(&self) -> u32;

    /// Perform one blocking capture and return the raw image.
    fn capture(&mut self) -> Result<DynamicImage, DeviceError>;

    /// Release the device. Consumes the handle so a session is closed at
    /// most once.
    fn close(self);
}

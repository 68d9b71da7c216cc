//! Driver core for Vivaldi-class keyboards.
//!
//! Brings a matched device from `Unattached` to `Ready`: parse the
//! report descriptor, extract the function-row map, start the
//! transport, and — only when a quirk or the configuration opts in —
//! run the vendor diagnostic exchange. Drivers live in an explicit
//! [`DriverRegistry`] with register/unregister lifecycle instead of
//! process-global tables.

#![deny(clippy::unwrap_used)]

pub mod attributes;
pub mod config;
pub mod probe;
pub mod quirks;
pub mod registry;

pub use attributes::*;
pub use config::*;
pub use probe::*;
pub use quirks::*;
pub use registry::*;

use hid_vivaldi_protocol::VivaldiProtocolError;
use openvivaldi_hid_common::HidCommonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Transport error: {0}")]
    Transport(#[from] HidCommonError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] VivaldiProtocolError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No registered driver matches device {0}")]
    NoDriver(String),

    #[error("Driver handle is no longer registered")]
    StaleHandle,
}

pub type DriverResult<T> = Result<T, DriverError>;

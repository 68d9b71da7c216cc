//! Common HID utilities for Vivaldi keyboard support
//!
//! This crate provides the transport-facing abstractions shared by the
//! OpenVivaldi driver and protocol crates: device identity, the
//! [`HidTransport`] seam (with a recording mock for tests), report
//! payload staging, and a report-descriptor walker that reduces a raw
//! descriptor to typed fields.

#![deny(clippy::unwrap_used)]

pub mod descriptor;
pub mod device_info;
pub mod hid_traits;
pub mod report;

pub use descriptor::*;
pub use device_info::*;
pub use hid_traits::*;
pub use report::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Report descriptor unavailable: {0}")]
    DescriptorUnavailable(String),

    #[error("Malformed report descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Failed to start transport: {0}")]
    StartError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Operation not supported by transport: {0}")]
    Unsupported(&'static str),

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HidCommonError {
    /// True for the distinct "transport cannot do this at all" failure
    /// that callers may react to with a fallback path. All other
    /// variants are terminal for the attempted operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, HidCommonError::Unsupported(_))
    }
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HidCommonError::DeviceNotFound("hidraw3".to_string());
        assert_eq!(format!("{err}"), "Device not found: hidraw3");

        let err = HidCommonError::Disconnected;
        assert_eq!(format!("{err}"), "Device disconnected");
    }

    #[test]
    fn test_unsupported_is_distinct() {
        assert!(HidCommonError::Unsupported("output reports").is_unsupported());
        assert!(!HidCommonError::WriteError("short write".to_string()).is_unsupported());
        assert!(!HidCommonError::Disconnected.is_unsupported());
    }
}

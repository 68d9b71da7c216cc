//! HID protocol support for Vivaldi-class keyboards.
//!
//! "Vivaldi" is the Chrome OS function-row keyboard scheme: instead of
//! fixed F1..F12 semantics, the keyboard publishes the physical
//! top-row layout as a feature report on the Google vendor usage page,
//! and the host exposes that key-to-scancode mapping to user space.
//!
//! This crate is I/O-free. It carries:
//! - the identity constants and the device match table (`ids`),
//! - decoding of the function-row physmap feature report (`fmap`),
//! - the vendor diagnostic payload encoders (`diagnostics`), the
//!   opt-in "ITE debug" SET_REPORT exchange some bring-up units use.
//!
//! ## Sources
//!
//! - Linux kernel `hid-vivaldi.c` / `hid-vivaldi-common.c` (mainline)
//! - Chrome OS Vivaldi keyboard documentation
//!   (`chromium.googlesource.com` → `docs/custom_keyboard.md`)

#![deny(clippy::unwrap_used)]

pub mod diagnostics;
pub mod fmap;
pub mod ids;

pub use diagnostics::*;
pub use fmap::*;
pub use ids::*;

use thiserror::Error;

/// Errors returned by Vivaldi protocol operations.
#[derive(Error, Debug)]
pub enum VivaldiProtocolError {
    #[error("Field width of {0} bits is not decodable")]
    UnsupportedFieldWidth(u32),

    #[error("Feature report too short: need {needed} bytes, got {actual}")]
    TruncatedFeatureReport { needed: usize, actual: usize },

    #[error("Field declares no physmap positions")]
    EmptyPhysmapField,

    #[error("Invalid payload length: expected {expected}, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },
}

/// Convenience result alias for Vivaldi protocol operations.
pub type VivaldiProtocolResult<T> = Result<T, VivaldiProtocolError>;

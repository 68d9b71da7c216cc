//! Driver configuration

use crate::{DriverError, DriverResult};
use serde::{Deserialize, Serialize};

/// Host-side driver configuration. Everything defaults to off: a stock
/// attach parses, maps the function row and starts the transport, with
/// no vendor traffic beyond the physmap GET_REPORT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Force the ITE debug SET_REPORT exchange on every matched
    /// device, regardless of the per-device quirk table. Bench/bring-up
    /// use only.
    pub ite_debug_handshake: bool,
}

impl DriverConfig {
    pub fn from_json(json: &str) -> DriverResult<Self> {
        serde_json::from_str(json).map_err(|e| DriverError::Config(e.to_string()))
    }
}

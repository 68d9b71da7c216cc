//! Per-device quirks.
//!
//! Diagnostic behavior is polymorphic over device quirks: the default
//! variant does nothing, and vendor traffic at attach happens only
//! when a quirk table entry or the host configuration opts a device
//! in.

use crate::DriverConfig;
use hid_vivaldi_protocol::ITE_VENDOR_ID;

/// Device-specific attach-time quirks, keyed by VID/PID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceQuirks {
    /// Run the ITE debug SET_REPORT exchange after transport start.
    pub ite_debug_handshake: bool,
}

impl DeviceQuirks {
    /// Look up quirks for a device. Unknown devices get the no-op
    /// default.
    pub fn for_device(vendor_id: u16, product_id: u16) -> Self {
        match vendor_id {
            ITE_VENDOR_ID => Self::ite_quirks(product_id),
            _ => Self::default(),
        }
    }

    /// ITE embedded-controller keyboards. The debug handshake stays
    /// off even here: it is bench tooling, enabled per host via
    /// [`DriverConfig`], never per product.
    fn ite_quirks(_product_id: u16) -> Self {
        Self {
            ite_debug_handshake: false,
        }
    }

    /// Fold host configuration into the table entry. Config can only
    /// enable behavior, not mask a table quirk.
    pub fn with_config(mut self, config: &DriverConfig) -> Self {
        self.ite_debug_handshake |= config.ite_debug_handshake;
        self
    }

    pub fn has_quirks(&self) -> bool {
        self.ite_debug_handshake
    }
}

//! Vivaldi identity constants and the device match table.
//!
//! Vivaldi keyboards are not matched by vendor/product pair: the bus
//! layer assigns HID group `0x0105` to any keyboard whose descriptor
//! carries the Google vendor top-row usage, and the driver binds to
//! the whole group. Vendor and product therefore stay wildcards in the
//! match table.
//!
//! Verified against Linux kernel `hid.h` (`HID_GROUP_VIVALDI`) and
//! `hid-vivaldi-common.c` (Google vendor usage page / physmap usage).

use openvivaldi_hid_common::{BusType, HidDeviceInfo};

/// HID group id the bus layer assigns to Vivaldi-class keyboards.
///
/// Source: Linux kernel `include/linux/hid.h` (`HID_GROUP_VIVALDI`).
pub const HID_GROUP_VIVALDI: u16 = 0x0105;

/// Google vendor-defined HID usage page carrying the physmap.
///
/// Source: Linux kernel `hid-vivaldi-common.c` (`HID_UP_GOOGLEVENDOR`).
pub const USAGE_PAGE_GOOGLE_VENDOR: u16 = 0xFFD1;

/// Usage id of the function-row physmap within the Google vendor page.
pub const USAGE_ID_FN_ROW_PHYSMAP: u16 = 0x0001;

/// Extended usage (`page << 16 | id`) of the function-row physmap.
pub const USAGE_FN_ROW_PHYSMAP: u32 =
    (USAGE_PAGE_GOOGLE_VENDOR as u32) << 16 | USAGE_ID_FN_ROW_PHYSMAP as u32;

/// HID usage page whose usages number the physmap positions 1..N.
pub const USAGE_PAGE_ORDINAL: u16 = 0x0014;

/// Upper bound on function-row keys a Vivaldi keyboard may declare.
///
/// Source: Linux kernel `vivaldi-fmap.h` (`VIVALDI_MAX_FUNCTION_ROW_KEYS`).
pub const MAX_FUNCTION_ROW_KEYS: usize = 24;

/// ITE Tech USB Vendor ID. ITE embedded controllers back many Vivaldi
/// keyboards; the vendor diagnostic exchange in [`crate::diagnostics`]
/// originated on these units.
pub const ITE_VENDOR_ID: u16 = 0x048D;

/// One entry of a driver's device match table. `None` wildcards a
/// dimension; matching is exact on the group id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMatch {
    pub bus: Option<BusType>,
    pub group: u16,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub version: Option<u32>,
}

impl DeviceMatch {
    /// Entry accepting every device in `group`, on any bus, from any
    /// vendor, at any version.
    pub const fn any_in_group(group: u16) -> Self {
        Self {
            bus: None,
            group,
            vendor_id: None,
            product_id: None,
            version: None,
        }
    }

    pub fn matches(&self, info: &HidDeviceInfo) -> bool {
        self.group == info.group
            && self.bus.is_none_or(|bus| bus == info.bus)
            && self.vendor_id.is_none_or(|id| id == info.vendor_id)
            && self.product_id.is_none_or(|id| id == info.product_id)
            && self.version.is_none_or(|v| v == info.version)
    }
}

/// The Vivaldi driver's match table: any bus, group vivaldi, any
/// vendor, any product, any version.
pub const MATCH_TABLE: &[DeviceMatch] = &[DeviceMatch::any_in_group(HID_GROUP_VIVALDI)];

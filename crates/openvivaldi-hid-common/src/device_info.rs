//! Device identity types for HID devices

use serde::{Deserialize, Serialize};

/// Transport bus a HID device is attached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusType {
    Usb,
    Bluetooth,
    I2c,
    Uart,
    Virtual,
}

/// Identity record for an attached HID device.
///
/// The `group` field carries the HID group id assigned by the bus
/// layer during enumeration; driver match tables key on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub bus: BusType,
    pub group: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u32,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(bus: BusType, group: u16, vendor_id: u16, product_id: u16, path: String) -> Self {
        Self {
            bus,
            group,
            vendor_id,
            product_id,
            version: 0,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            path,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

impl Default for HidDeviceInfo {
    fn default() -> Self {
        Self {
            bus: BusType::Usb,
            group: 0,
            vendor_id: 0,
            product_id: 0,
            version: 0,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            path: String::new(),
        }
    }
}

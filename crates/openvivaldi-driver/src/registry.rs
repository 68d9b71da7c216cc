//! Explicit driver registry.
//!
//! The original driver registered itself through a process-global
//! module table. Here registration is an explicit lifecycle: a
//! [`DriverRegistry`] owned by the host registers driver descriptors
//! at startup, dispatches each device attach to the first matching
//! driver (invoking its probe exactly once per attach), and
//! deregisters everything at shutdown.

use crate::{AttachedDevice, DeviceQuirks, DriverConfig, DriverError, DriverResult};
use hid_vivaldi_protocol::{DeviceMatch, MATCH_TABLE};
use openvivaldi_hid_common::HidTransport;
use tracing::debug;

/// Probe entry point of a registered driver.
pub type ProbeFn = fn(&mut dyn HidTransport, &DeviceQuirks) -> DriverResult<AttachedDevice>;

/// What a driver hands to the registry: a name, the devices it binds
/// to, and its attach handler.
#[derive(Debug, Clone, Copy)]
pub struct DriverDescriptor {
    pub name: &'static str,
    pub match_table: &'static [DeviceMatch],
    pub probe: ProbeFn,
}

/// The Vivaldi keyboard driver: any bus, group vivaldi, any
/// vendor/product/version.
pub fn vivaldi_driver() -> DriverDescriptor {
    DriverDescriptor {
        name: "hid-vivaldi",
        match_table: MATCH_TABLE,
        probe: crate::probe::probe,
    }
}

/// Token returned by [`DriverRegistry::register`]; required for
/// matching deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverHandle(u64);

pub struct DriverRegistry {
    config: DriverConfig,
    next_handle: u64,
    drivers: Vec<(DriverHandle, DriverDescriptor)>,
}

impl DriverRegistry {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            next_handle: 1,
            drivers: Vec::new(),
        }
    }

    pub fn register(&mut self, descriptor: DriverDescriptor) -> DriverHandle {
        let handle = DriverHandle(self.next_handle);
        self.next_handle += 1;
        debug!(driver = descriptor.name, "driver registered");
        self.drivers.push((handle, descriptor));
        handle
    }

    pub fn unregister(&mut self, handle: DriverHandle) -> DriverResult<()> {
        let before = self.drivers.len();
        self.drivers.retain(|(h, _)| *h != handle);
        if self.drivers.len() == before {
            return Err(DriverError::StaleHandle);
        }
        Ok(())
    }

    /// Route one device attach to the first registered driver whose
    /// match table accepts the device identity. The matched driver's
    /// probe runs exactly once; no match is the `NoDriver` outcome.
    pub fn dispatch_attach(
        &self,
        transport: &mut dyn HidTransport,
    ) -> DriverResult<AttachedDevice> {
        let info = transport.device_info().clone();
        let descriptor = self
            .drivers
            .iter()
            .find(|(_, d)| d.match_table.iter().any(|entry| entry.matches(&info)))
            .map(|(_, d)| *d)
            .ok_or_else(|| DriverError::NoDriver(info.display_name()))?;

        let quirks =
            DeviceQuirks::for_device(info.vendor_id, info.product_id).with_config(&self.config);
        debug!(
            driver = descriptor.name,
            device = %info.display_name(),
            quirky = quirks.has_quirks(),
            "dispatching attach"
        );
        (descriptor.probe)(transport, &quirks)
    }

    /// Deregister every driver. The registry stays usable; drivers can
    /// be registered again.
    pub fn shutdown(&mut self) {
        for (_, descriptor) in self.drivers.drain(..) {
            debug!(driver = descriptor.name, "driver deregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

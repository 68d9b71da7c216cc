//! The attach handler.
//!
//! One synchronous, single-shot call per device instance:
//! `Unattached → Allocated → Parsed → TransportActive → (Diagnosed) →
//! Ready`, aborting at the first fatal step. Parse and transport-start
//! failures propagate; everything about the diagnostic exchange is
//! logged and swallowed — a device must reach `Ready` even when
//! diagnostics fail completely. Nothing here retries: every operation
//! is attempted exactly once.

use crate::{AttributeGroup, DeviceQuirks, DriverResult};
use hid_vivaldi_protocol::{DiagnosticPayload, FunctionRowMap, find_physmap_field};
use openvivaldi_hid_common::{ConnectFlags, HidCommonError, HidTransport, ReportDescriptor};
use tracing::{debug, warn};

/// Lifecycle of one attach call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    Unattached,
    Allocated,
    Parsed,
    TransportActive,
    Diagnosed,
    Ready,
}

/// Per-device private state, created at probe entry and dropped with
/// the attached-device handle.
#[derive(Debug, Clone, Default)]
pub struct VivaldiDeviceData {
    pub function_row: FunctionRowMap,
}

/// A device that completed attach. Owns the private state and the
/// exported attribute group; teardown is the owner dropping it.
#[derive(Debug)]
pub struct AttachedDevice {
    state: AttachState,
    data: VivaldiDeviceData,
    attributes: AttributeGroup,
    diagnostics_ran: bool,
}

impl AttachedDevice {
    pub fn state(&self) -> AttachState {
        self.state
    }

    pub fn function_row(&self) -> &FunctionRowMap {
        &self.data.function_row
    }

    pub fn attributes(&self) -> &AttributeGroup {
        &self.attributes
    }

    pub fn diagnostics_ran(&self) -> bool {
        self.diagnostics_ran
    }
}

/// Bring a matched device into the operating state.
pub fn probe(transport: &mut dyn HidTransport, quirks: &DeviceQuirks) -> DriverResult<AttachedDevice> {
    let info = transport.device_info().clone();
    let mut state = AttachState::Unattached;
    debug!(
        vendor = info.vendor_id,
        product = info.product_id,
        path = %info.path,
        ?state,
        "attach started"
    );

    let mut data = VivaldiDeviceData::default();
    state = AttachState::Allocated;
    debug!(?state, "device data allocated");

    let raw = transport.report_descriptor()?;
    let descriptor = ReportDescriptor::parse(&raw)?;
    state = AttachState::Parsed;
    debug!(fields = descriptor.fields.len(), ?state, "descriptor parsed");

    // Feature mapping: a keyboard without the physmap field is still a
    // valid device; the map just stays empty. Fetch/decode trouble is
    // likewise non-fatal.
    if let Some(field) = find_physmap_field(&descriptor) {
        let report_id = field.report_id.unwrap_or(0);
        match transport.get_feature_report(report_id, field.byte_len()) {
            Ok(report) => match FunctionRowMap::decode(field, &report) {
                Ok(decoded) => {
                    for usage in &decoded.skipped_usages {
                        warn!(usage = *usage, "skipping physmap position");
                    }
                    debug!(keys = decoded.map.len(), "function row mapped");
                    data.function_row = decoded.map;
                }
                Err(e) => warn!(error = %e, "failed to decode function-row physmap"),
            },
            Err(e) => warn!(report_id, error = %e, "failed to fetch physmap feature report"),
        }
    }

    let attributes = AttributeGroup::vivaldi(&data.function_row);

    transport.start(ConnectFlags::default())?;
    state = AttachState::TransportActive;
    debug!(?state, "transport started");

    let mut diagnostics_ran = false;
    if quirks.ite_debug_handshake {
        send_diagnostic(transport, &DiagnosticPayload::short());
        send_diagnostic(transport, &DiagnosticPayload::full());
        diagnostics_ran = true;
        state = AttachState::Diagnosed;
        debug!(?state, "diagnostic exchange finished");
    }

    state = AttachState::Ready;
    debug!(?state, "attach complete");
    Ok(AttachedDevice {
        state,
        data,
        attributes,
        diagnostics_ran,
    })
}

/// Transmit one diagnostic payload: primary output-report path first;
/// only the transport's distinct "unsupported" condition triggers the
/// single raw SET_REPORT fallback. No failure here is ever fatal.
fn send_diagnostic(transport: &mut dyn HidTransport, payload: &DiagnosticPayload) {
    debug!(len = payload.len(), "sending diagnostic report");
    match transport.send_output_report(payload.bytes()) {
        Ok(_) => {}
        Err(HidCommonError::Unsupported(_)) => {
            if let Err(e) = transport.send_feature_report(payload.report_id(), payload.bytes()) {
                warn!(
                    report_id = payload.report_id(),
                    len = payload.len(),
                    error = %e,
                    "diagnostic fallback failed"
                );
            }
        }
        Err(e) => warn!(len = payload.len(), error = %e, "diagnostic send failed"),
    }
}

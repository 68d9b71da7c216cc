//! End-to-end attach scenarios against the mock transport.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hid_vivaldi_protocol::{
    DIAG_FULL_LEN, DIAG_REPORT_ID, DIAG_SHORT_LEN, HID_GROUP_VIVALDI, ITE_VENDOR_ID,
};
use openvivaldi_driver::{
    ATTR_FUNCTION_ROW_PHYSMAP, AttachState, DeviceQuirks, DriverConfig, DriverError,
    DriverRegistry, probe, vivaldi_driver,
};
use openvivaldi_hid_common::mock::{MockTransport, SendBehavior};
use openvivaldi_hid_common::{BusType, HidDeviceInfo};

const PHYSMAP_REPORT_ID: u8 = 0x09;
const SCANCODES: [u32; 4] = [0xC4, 0xC3, 0xC2, 0x3E];

/// Descriptor of a Vivaldi keyboard: a keyboard input field plus the
/// function-row physmap feature field (four 32-bit positions) inside a
/// Logical collection on the Google vendor usage.
fn vivaldi_descriptor() -> Vec<u8> {
    vec![
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x06, // Usage (Keyboard)
        0xA1, 0x01, // Collection (Application)
        0x75, 0x08, //   Report Size (8)
        0x95, 0x08, //   Report Count (8)
        0x81, 0x02, //   Input (Data,Var,Abs)
        0x06, 0xD1, 0xFF, // Usage Page (Vendor 0xFFD1)
        0x09, 0x01, //   Usage (0x01)
        0xA1, 0x02, //   Collection (Logical)
        0x05, 0x14, //     Usage Page (Ordinal)
        0x85, PHYSMAP_REPORT_ID, // Report ID
        0x19, 0x01, //     Usage Minimum (1)
        0x29, 0x04, //     Usage Maximum (4)
        0x75, 0x20, //     Report Size (32)
        0x95, 0x04, //     Report Count (4)
        0xB1, 0x02, //     Feature (Data,Var,Abs)
        0xC0, //         End Collection
        0xC0, // End Collection
    ]
}

fn physmap_report() -> Vec<u8> {
    SCANCODES.iter().flat_map(|c| c.to_le_bytes()).collect()
}

fn keyboard() -> MockTransport {
    let info = HidDeviceInfo::new(
        BusType::Usb,
        HID_GROUP_VIVALDI,
        ITE_VENDOR_ID,
        0x0001,
        "/dev/hidraw0".into(),
    )
    .with_product_name("Vivaldi Keyboard");
    MockTransport::new(info)
        .with_descriptor(vivaldi_descriptor())
        .with_feature_report(PHYSMAP_REPORT_ID, physmap_report())
}

fn quiet() -> DeviceQuirks {
    DeviceQuirks::for_device(ITE_VENDOR_ID, 0x0001)
}

fn debugging() -> DeviceQuirks {
    quiet().with_config(&DriverConfig {
        ite_debug_handshake: true,
    })
}

#[test]
fn attach_maps_function_row_and_starts_transport() {
    let mut transport = keyboard();
    let attached = probe(&mut transport, &quiet()).expect("attach");

    assert_eq!(attached.state(), AttachState::Ready);
    assert_eq!(attached.function_row().scancodes(), &SCANCODES);
    assert_eq!(
        attached.attributes().read(ATTR_FUNCTION_ROW_PHYSMAP),
        Some("C4 C3 C2 3E")
    );
    assert!(transport.started_with().expect("started").input_reports);
    assert_eq!(
        transport.feature_get_history(),
        &[(PHYSMAP_REPORT_ID, 16)]
    );
    // Default quirks: no vendor traffic at all.
    assert!(!attached.diagnostics_ran());
    assert!(transport.output_history().is_empty());
    assert!(transport.feature_set_history().is_empty());
}

#[test]
fn attach_without_physmap_field_exports_empty_map() {
    let mut transport = MockTransport::new(HidDeviceInfo::new(
        BusType::Bluetooth,
        HID_GROUP_VIVALDI,
        0x18D1,
        0x5050,
        "bt:aa:bb".into(),
    ))
    .with_descriptor(vec![
        0x05, 0x01, 0x09, 0x06, 0xA1, 0x01, 0x75, 0x08, 0x95, 0x08, 0x81, 0x02, 0xC0,
    ]);

    let attached = probe(&mut transport, &quiet()).expect("attach");
    assert!(attached.function_row().is_empty());
    assert_eq!(attached.attributes().read(ATTR_FUNCTION_ROW_PHYSMAP), Some(""));
    assert!(transport.feature_get_history().is_empty());
}

#[test]
fn attach_survives_missing_feature_report() {
    // Descriptor declares the physmap but GET_REPORT has nothing.
    let mut transport = MockTransport::new(HidDeviceInfo::new(
        BusType::Usb,
        HID_GROUP_VIVALDI,
        ITE_VENDOR_ID,
        0x0002,
        "/dev/hidraw1".into(),
    ))
    .with_descriptor(vivaldi_descriptor());

    let attached = probe(&mut transport, &quiet()).expect("attach");
    assert_eq!(attached.state(), AttachState::Ready);
    assert!(attached.function_row().is_empty());
}

#[test]
fn diagnostics_send_both_payloads_on_primary_path() {
    let mut transport = keyboard();
    let attached = probe(&mut transport, &debugging()).expect("attach");

    assert!(attached.diagnostics_ran());
    let sent = transport.output_history();
    assert_eq!(sent.len(), 2);

    assert_eq!(sent[0].len(), DIAG_SHORT_LEN);
    assert_eq!(sent[0][0], DIAG_REPORT_ID);
    for i in 1..DIAG_SHORT_LEN {
        assert_eq!(sent[0][i], i as u8);
    }

    assert_eq!(sent[1].len(), DIAG_FULL_LEN);
    for i in 0..DIAG_FULL_LEN {
        assert_eq!(sent[1][i], (i % 256) as u8);
    }

    assert!(transport.feature_set_history().is_empty());
}

#[test]
fn diagnostics_unsupported_primary_falls_back_per_payload() {
    let mut transport = keyboard().with_output_behavior(SendBehavior::Unsupported);
    let attached = probe(&mut transport, &debugging()).expect("attach");

    assert_eq!(attached.state(), AttachState::Ready);
    assert!(transport.output_history().is_empty());

    let fallbacks = transport.feature_set_history();
    assert_eq!(fallbacks.len(), 2, "exactly one fallback per payload");
    assert_eq!(fallbacks[0].0, DIAG_REPORT_ID);
    assert_eq!(fallbacks[0].1.len(), DIAG_SHORT_LEN);
    assert_eq!(fallbacks[1].0, DIAG_REPORT_ID);
    assert_eq!(fallbacks[1].1.len(), DIAG_FULL_LEN);
}

#[test]
fn diagnostics_hard_primary_failure_skips_fallback() {
    let mut transport =
        keyboard().with_output_behavior(SendBehavior::Fail("pipe stall".to_string()));
    let attached = probe(&mut transport, &debugging()).expect("attach still succeeds");

    assert_eq!(attached.state(), AttachState::Ready);
    assert!(transport.output_history().is_empty());
    assert!(transport.feature_set_history().is_empty());
}

#[test]
fn diagnostics_total_failure_never_fails_attach() {
    let mut transport = keyboard()
        .with_output_behavior(SendBehavior::Unsupported)
        .with_feature_set_behavior(SendBehavior::Fail("nak".to_string()));

    let attached = probe(&mut transport, &debugging()).expect("attach");
    assert_eq!(attached.state(), AttachState::Ready);
}

#[test]
fn parse_failure_aborts_before_transport_start() {
    let mut transport = MockTransport::new(HidDeviceInfo::new(
        BusType::Usb,
        HID_GROUP_VIVALDI,
        ITE_VENDOR_ID,
        0x0001,
        "/dev/hidraw0".into(),
    ))
    // Truncated usage-page item.
    .with_descriptor(vec![0x06, 0xD1]);

    let err = probe(&mut transport, &debugging()).unwrap_err();
    assert!(matches!(err, DriverError::Transport(_)));
    assert!(transport.started_with().is_none());
    assert!(transport.output_history().is_empty());
    assert!(transport.feature_set_history().is_empty());
}

#[test]
fn missing_descriptor_aborts_attach() {
    let mut transport = MockTransport::new(HidDeviceInfo::new(
        BusType::Usb,
        HID_GROUP_VIVALDI,
        ITE_VENDOR_ID,
        0x0001,
        "/dev/hidraw0".into(),
    ));

    let err = probe(&mut transport, &quiet()).unwrap_err();
    assert!(matches!(err, DriverError::Transport(_)));
    assert!(transport.started_with().is_none());
}

#[test]
fn start_failure_aborts_before_diagnostics() {
    let mut transport = keyboard().failing_start("endpoint busy");
    let err = probe(&mut transport, &debugging()).unwrap_err();

    assert!(matches!(err, DriverError::Transport(_)));
    assert!(transport.output_history().is_empty());
    assert!(transport.feature_set_history().is_empty());
}

#[test]
fn registry_dispatches_vivaldi_attach_with_config_quirks() {
    let mut registry = DriverRegistry::new(DriverConfig {
        ite_debug_handshake: true,
    });
    let handle = registry.register(vivaldi_driver());

    let mut transport = keyboard().with_output_behavior(SendBehavior::Unsupported);
    let attached = registry.dispatch_attach(&mut transport).expect("attach");

    assert_eq!(attached.state(), AttachState::Ready);
    assert_eq!(
        attached.attributes().read(ATTR_FUNCTION_ROW_PHYSMAP),
        Some("C4 C3 C2 3E")
    );
    // Config-enabled diagnostics went through the fallback path.
    assert_eq!(transport.feature_set_history().len(), 2);

    registry.unregister(handle).expect("unregister");
    let mut transport = keyboard();
    assert!(matches!(
        registry.dispatch_attach(&mut transport),
        Err(DriverError::NoDriver(_))
    ));
}

//! HID transport trait and a recording mock for tests

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo};

/// Report classes a transport is asked to wire up at start.
///
/// The default enables everything, matching the bus layer's default
/// connect behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectFlags {
    pub input_reports: bool,
    pub output_reports: bool,
    pub feature_reports: bool,
}

impl Default for ConnectFlags {
    fn default() -> Self {
        Self {
            input_reports: true,
            output_reports: true,
            feature_reports: true,
        }
    }
}

/// One attached device's transport, owned exclusively by the attach
/// path. All operations are synchronous and attempted exactly once by
/// callers; there is no retry policy at this seam.
///
/// Feature report payloads at this boundary exclude the report id
/// byte: it travels as an explicit argument, as in the underlying
/// SET_REPORT/GET_REPORT control transfers.
pub trait HidTransport: Send {
    fn device_info(&self) -> &HidDeviceInfo;

    /// Fetch the raw report descriptor bytes.
    fn report_descriptor(&mut self) -> HidCommonResult<Vec<u8>>;

    /// Bring the transport into the active state.
    fn start(&mut self, flags: ConnectFlags) -> HidCommonResult<()>;

    fn stop(&mut self);

    /// Primary output-report path. Returns
    /// [`HidCommonError::Unsupported`] when the transport has no
    /// output-report pipe at all; any other error is terminal for this
    /// attempt only.
    fn send_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    /// Raw SET_REPORT control request for a feature report.
    fn send_feature_report(&mut self, report_id: u8, data: &[u8]) -> HidCommonResult<usize>;

    /// Raw GET_REPORT control request for a feature report of up to
    /// `len` bytes.
    fn get_feature_report(&mut self, report_id: u8, len: usize) -> HidCommonResult<Vec<u8>>;

    fn is_connected(&self) -> bool;
}

pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// How the mock answers a send on a given path.
    #[derive(Debug, Clone, Default)]
    pub enum SendBehavior {
        #[default]
        Accept,
        Unsupported,
        Fail(String),
    }

    /// Scriptable transport that records everything the driver does to
    /// it. Owned by the test before and after the attach call, so the
    /// histories are plain fields.
    pub struct MockTransport {
        info: HidDeviceInfo,
        descriptor: Option<Vec<u8>>,
        start_error: Option<String>,
        output_behavior: SendBehavior,
        feature_set_behavior: SendBehavior,
        feature_reports: HashMap<u8, Vec<u8>>,
        started_with: Option<ConnectFlags>,
        stopped: bool,
        descriptor_fetches: usize,
        output_history: Vec<Vec<u8>>,
        feature_set_history: Vec<(u8, Vec<u8>)>,
        feature_get_history: Vec<(u8, usize)>,
    }

    impl MockTransport {
        pub fn new(info: HidDeviceInfo) -> Self {
            Self {
                info,
                descriptor: None,
                start_error: None,
                output_behavior: SendBehavior::Accept,
                feature_set_behavior: SendBehavior::Accept,
                feature_reports: HashMap::new(),
                started_with: None,
                stopped: false,
                descriptor_fetches: 0,
                output_history: Vec::new(),
                feature_set_history: Vec::new(),
                feature_get_history: Vec::new(),
            }
        }

        pub fn with_descriptor(mut self, descriptor: Vec<u8>) -> Self {
            self.descriptor = Some(descriptor);
            self
        }

        /// Seed the payload returned by GET_REPORT for `report_id`
        /// (report id byte excluded).
        pub fn with_feature_report(mut self, report_id: u8, payload: Vec<u8>) -> Self {
            self.feature_reports.insert(report_id, payload);
            self
        }

        pub fn with_output_behavior(mut self, behavior: SendBehavior) -> Self {
            self.output_behavior = behavior;
            self
        }

        pub fn with_feature_set_behavior(mut self, behavior: SendBehavior) -> Self {
            self.feature_set_behavior = behavior;
            self
        }

        pub fn failing_start(mut self, reason: impl Into<String>) -> Self {
            self.start_error = Some(reason.into());
            self
        }

        pub fn started_with(&self) -> Option<ConnectFlags> {
            self.started_with
        }

        pub fn descriptor_fetches(&self) -> usize {
            self.descriptor_fetches
        }

        pub fn output_history(&self) -> &[Vec<u8>] {
            &self.output_history
        }

        pub fn feature_set_history(&self) -> &[(u8, Vec<u8>)] {
            &self.feature_set_history
        }

        pub fn feature_get_history(&self) -> &[(u8, usize)] {
            &self.feature_get_history
        }

        fn apply(behavior: &SendBehavior, path: &'static str) -> HidCommonResult<()> {
            match behavior {
                SendBehavior::Accept => Ok(()),
                SendBehavior::Unsupported => Err(HidCommonError::Unsupported(path)),
                SendBehavior::Fail(reason) => Err(HidCommonError::WriteError(reason.clone())),
            }
        }
    }

    impl HidTransport for MockTransport {
        fn device_info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn report_descriptor(&mut self) -> HidCommonResult<Vec<u8>> {
            self.descriptor_fetches += 1;
            self.descriptor.clone().ok_or_else(|| {
                HidCommonError::DescriptorUnavailable(self.info.display_name())
            })
        }

        fn start(&mut self, flags: ConnectFlags) -> HidCommonResult<()> {
            if let Some(reason) = &self.start_error {
                return Err(HidCommonError::StartError(reason.clone()));
            }
            self.started_with = Some(flags);
            Ok(())
        }

        fn stop(&mut self) {
            self.stopped = true;
        }

        fn send_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
            Self::apply(&self.output_behavior, "output reports")?;
            self.output_history.push(data.to_vec());
            Ok(data.len())
        }

        fn send_feature_report(&mut self, report_id: u8, data: &[u8]) -> HidCommonResult<usize> {
            Self::apply(&self.feature_set_behavior, "feature set-report")?;
            self.feature_set_history.push((report_id, data.to_vec()));
            Ok(data.len())
        }

        fn get_feature_report(&mut self, report_id: u8, len: usize) -> HidCommonResult<Vec<u8>> {
            self.feature_get_history.push((report_id, len));
            let payload = self.feature_reports.get(&report_id).ok_or_else(|| {
                HidCommonError::ReadError(format!("no feature report {report_id:#04x}"))
            })?;
            Ok(payload.iter().copied().take(len).collect())
        }

        fn is_connected(&self) -> bool {
            !self.stopped
        }
    }
}

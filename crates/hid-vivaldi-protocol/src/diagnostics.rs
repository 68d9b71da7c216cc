//! Vendor diagnostic payload encoders (the "ITE debug" exchange).
//!
//! Some Vivaldi keyboards with ITE embedded controllers accept a
//! bring-up diagnostic: two SET_REPORT payloads carrying an
//! index-keyed fill pattern, one short (64 bytes) and one spanning the
//! full 256-byte staging buffer. The exchange has no steady-state
//! function; firmware uses it to verify report plumbing on the bench.
//! It is opt-in at the driver layer and failures are never fatal.
//!
//! Both payloads use the ascending fill (`byte i == i mod 256`), so
//! every valid index of the staging buffer is written exactly once;
//! the short payload overrides byte 0 with the report id.

use crate::{VivaldiProtocolError, VivaldiProtocolResult};
use openvivaldi_hid_common::ReportBuilder;

/// Report id of the diagnostic exchange.
pub const DIAG_REPORT_ID: u8 = 0x01;

/// Declared length of the first (short) diagnostic payload.
pub const DIAG_SHORT_LEN: usize = 64;

/// Declared length of the second (full-buffer) diagnostic payload.
pub const DIAG_FULL_LEN: usize = 256;

/// One staged diagnostic report: the wire bytes plus the report id
/// used for the raw SET_REPORT fallback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticPayload {
    report_id: u8,
    data: Vec<u8>,
}

impl DiagnosticPayload {
    /// First payload: byte 0 is the report id, bytes 1..=63 the
    /// ascending fill.
    pub fn short() -> Self {
        let mut builder = ReportBuilder::new(DIAG_SHORT_LEN);
        builder
            .write_u8(DIAG_REPORT_ID)
            .write_index_fill(1, DIAG_SHORT_LEN - 1);
        Self {
            report_id: DIAG_REPORT_ID,
            data: builder.into_inner(),
        }
    }

    /// Second payload: the ascending fill across the whole 256-byte
    /// buffer (`byte i == i mod 256` for every i).
    pub fn full() -> Self {
        let mut builder = ReportBuilder::new(DIAG_FULL_LEN);
        builder.write_index_fill(0, DIAG_FULL_LEN);
        Self {
            report_id: DIAG_REPORT_ID,
            data: builder.into_inner(),
        }
    }

    pub fn report_id(&self) -> u8 {
        self.report_id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check the staging invariant: the buffer length equals the
    /// declared wire length, so transmission never reads past the
    /// staged bytes.
    pub fn verify_length(&self, declared: usize) -> VivaldiProtocolResult<()> {
        if self.data.len() != declared {
            return Err(VivaldiProtocolError::InvalidPayloadLength {
                expected: declared,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

//! HID report descriptor parsing
//!
//! Walks the short-item stream of a report descriptor and reduces it
//! to the typed [`ReportField`]s a driver cares about: report id,
//! usage page, resolved usages, bit width/count, and the usage of the
//! enclosing logical collection (the HID "logical" a field belongs
//! to). Item-level decoding follows section 6.2.2 of the HID spec:
//! short items carry a 2-bit size code in the prefix byte, long items
//! (prefix `0xFE`) are skipped whole.

use crate::{HidCommonError, HidCommonResult};
use tracing::trace;

/// Direction class of a main item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Output,
    Feature,
}

/// One Input/Output/Feature main item with its resolved state.
#[derive(Debug, Clone)]
pub struct ReportField {
    pub kind: FieldKind,
    pub report_id: Option<u8>,
    pub usage_page: u16,
    /// Extended usages (`page << 16 | id`), one per declared usage,
    /// usage ranges expanded in order.
    pub usages: Vec<u32>,
    /// Extended usage of the innermost enclosing Logical collection,
    /// 0 when the field sits outside any.
    pub logical: u32,
    /// Field width in bits.
    pub report_size: u32,
    pub report_count: u32,
    pub logical_min: i32,
    pub logical_max: i32,
}

impl ReportField {
    /// Packed payload length of this field in bytes, report id byte
    /// excluded.
    pub fn byte_len(&self) -> usize {
        (self.report_size as usize * self.report_count as usize).div_ceil(8)
    }
}

/// Parsed capability model of one device descriptor.
#[derive(Debug, Clone, Default)]
pub struct ReportDescriptor {
    pub fields: Vec<ReportField>,
}

impl ReportDescriptor {
    pub fn parse(data: &[u8]) -> HidCommonResult<Self> {
        Parser::new(data).run()
    }

    pub fn feature_fields(&self) -> impl Iterator<Item = &ReportField> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Feature)
    }
}

// Short item tag constants (prefix byte with the size bits cleared).
const TAG_INPUT: u8 = 0x80;
const TAG_OUTPUT: u8 = 0x90;
const TAG_COLLECTION: u8 = 0xA0;
const TAG_FEATURE: u8 = 0xB0;
const TAG_END_COLLECTION: u8 = 0xC0;
const TAG_USAGE_PAGE: u8 = 0x04;
const TAG_LOGICAL_MIN: u8 = 0x14;
const TAG_LOGICAL_MAX: u8 = 0x24;
const TAG_REPORT_SIZE: u8 = 0x74;
const TAG_REPORT_ID: u8 = 0x84;
const TAG_REPORT_COUNT: u8 = 0x94;
const TAG_PUSH: u8 = 0xA4;
const TAG_POP: u8 = 0xB4;
const TAG_USAGE: u8 = 0x08;
const TAG_USAGE_MIN: u8 = 0x18;
const TAG_USAGE_MAX: u8 = 0x28;

const LONG_ITEM_PREFIX: u8 = 0xFE;
const COLLECTION_LOGICAL: u8 = 0x02;

/// Largest usage range a single Usage Minimum/Maximum pair may expand
/// to before the descriptor is treated as malformed.
const MAX_USAGE_RANGE: u32 = 1024;

#[derive(Debug, Clone, Copy, Default)]
struct GlobalState {
    usage_page: u16,
    report_id: Option<u8>,
    report_size: u32,
    report_count: u32,
    logical_min: i32,
    logical_max: i32,
}

#[derive(Debug, Default)]
struct LocalState {
    usages: Vec<u32>,
    usage_min: Option<u32>,
    usage_max: Option<u32>,
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
    global: GlobalState,
    global_stack: Vec<GlobalState>,
    local: LocalState,
    // One entry per open collection; Some(usage) for Logical ones.
    collections: Vec<Option<u32>>,
    fields: Vec<ReportField>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            global: GlobalState::default(),
            global_stack: Vec::new(),
            local: LocalState::default(),
            collections: Vec::new(),
            fields: Vec::new(),
        }
    }

    fn run(mut self) -> HidCommonResult<ReportDescriptor> {
        while self.pos < self.data.len() {
            self.item()?;
        }
        Ok(ReportDescriptor {
            fields: self.fields,
        })
    }

    fn item(&mut self) -> HidCommonResult<()> {
        let prefix = self.data[self.pos];

        if prefix == LONG_ITEM_PREFIX {
            // Long item: skip over prefix, size byte, tag byte, data.
            let size = *self
                .data
                .get(self.pos + 1)
                .ok_or_else(|| truncated(self.pos))? as usize;
            let end = self.pos + 3 + size;
            if end > self.data.len() {
                return Err(truncated(self.pos));
            }
            trace!(pos = self.pos, size, "skipping long item");
            self.pos = end;
            return Ok(());
        }

        let size = match prefix & 0b11 {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 4,
        };
        let tag = prefix & !0b11;
        let start = self.pos + 1;
        let end = start + size;
        if end > self.data.len() {
            return Err(truncated(self.pos));
        }
        let payload = &self.data[start..end];
        self.pos = end;

        match tag {
            TAG_USAGE_PAGE => self.global.usage_page = unsigned(payload) as u16,
            TAG_LOGICAL_MIN => self.global.logical_min = signed(payload),
            TAG_LOGICAL_MAX => self.global.logical_max = signed(payload),
            TAG_REPORT_SIZE => self.global.report_size = unsigned(payload),
            TAG_REPORT_COUNT => self.global.report_count = unsigned(payload),
            TAG_REPORT_ID => self.global.report_id = Some(unsigned(payload) as u8),
            TAG_PUSH => self.global_stack.push(self.global),
            TAG_POP => {
                if let Some(saved) = self.global_stack.pop() {
                    self.global = saved;
                }
            }

            TAG_USAGE => {
                let usage = self.resolve_usage(payload);
                self.local.usages.push(usage);
            }
            TAG_USAGE_MIN => self.local.usage_min = Some(self.resolve_usage(payload)),
            TAG_USAGE_MAX => self.local.usage_max = Some(self.resolve_usage(payload)),

            TAG_COLLECTION => {
                let kind = unsigned(payload) as u8;
                let usage = self.local.usages.first().copied();
                self.collections
                    .push((kind == COLLECTION_LOGICAL).then(|| usage.unwrap_or(0)));
                self.local = LocalState::default();
            }
            TAG_END_COLLECTION => {
                if self.collections.pop().is_none() {
                    return Err(HidCommonError::InvalidDescriptor(format!(
                        "unbalanced End Collection at offset {}",
                        self.pos
                    )));
                }
                self.local = LocalState::default();
            }

            TAG_INPUT => self.main_item(FieldKind::Input)?,
            TAG_OUTPUT => self.main_item(FieldKind::Output)?,
            TAG_FEATURE => self.main_item(FieldKind::Feature)?,

            other => {
                // Physical range, unit, string/designator indexes and
                // anything vendor-defined carry no field semantics we
                // consume.
                trace!(tag = other, "skipping item");
            }
        }

        Ok(())
    }

    fn resolve_usage(&self, payload: &[u8]) -> u32 {
        let value = unsigned(payload);
        if payload.len() == 4 {
            // 4-byte usages carry their own page in the high half.
            value
        } else {
            (u32::from(self.global.usage_page) << 16) | (value & 0xFFFF)
        }
    }

    fn main_item(&mut self, kind: FieldKind) -> HidCommonResult<()> {
        let mut usages = std::mem::take(&mut self.local.usages);

        if let (Some(min), Some(max)) = (self.local.usage_min, self.local.usage_max) {
            if max < min || max - min >= MAX_USAGE_RANGE {
                return Err(HidCommonError::InvalidDescriptor(format!(
                    "usage range {min:#010x}..={max:#010x} is invalid"
                )));
            }
            usages.extend(min..=max);
        }

        let logical = self
            .collections
            .iter()
            .rev()
            .find_map(|entry| *entry)
            .unwrap_or(0);

        self.fields.push(ReportField {
            kind,
            report_id: self.global.report_id,
            usage_page: self.global.usage_page,
            usages,
            logical,
            report_size: self.global.report_size,
            report_count: self.global.report_count,
            logical_min: self.global.logical_min,
            logical_max: self.global.logical_max,
        });
        self.local = LocalState::default();
        Ok(())
    }
}

fn truncated(pos: usize) -> HidCommonError {
    HidCommonError::InvalidDescriptor(format!("item truncated at offset {pos}"))
}

fn unsigned(payload: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes[..payload.len()].copy_from_slice(payload);
    u32::from_le_bytes(bytes)
}

fn signed(payload: &[u8]) -> i32 {
    match *payload {
        [] => 0,
        [a] => i32::from(a as i8),
        [a, b] => i32::from(i16::from_le_bytes([a, b])),
        [a, b, c] => i32::from_le_bytes([a, b, c, ((c as i8) >> 7) as u8]),
        [a, b, c, d] => i32::from_le_bytes([a, b, c, d]),
        _ => 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Feature field on the Ordinal page inside a Logical collection
    // whose usage is a Google vendor physmap usage, the way Vivaldi
    // keyboards declare the function-row map.
    fn physmap_descriptor() -> Vec<u8> {
        vec![
            0x06, 0xD1, 0xFF, // Usage Page (Vendor 0xFFD1)
            0x09, 0x01, //       Usage (0x01)
            0xA1, 0x02, //       Collection (Logical)
            0x05, 0x14, //         Usage Page (Ordinal)
            0x85, 0x09, //         Report ID (9)
            0x15, 0x00, //         Logical Minimum (0)
            0x26, 0xFF, 0x00, //   Logical Maximum (255)
            0x19, 0x01, //         Usage Minimum (1)
            0x29, 0x0A, //         Usage Maximum (10)
            0x75, 0x20, //         Report Size (32)
            0x95, 0x0A, //         Report Count (10)
            0xB1, 0x02, //         Feature (Data,Var,Abs)
            0xC0, //             End Collection
        ]
    }

    #[test]
    fn test_parse_physmap_feature_field() {
        let desc = ReportDescriptor::parse(&physmap_descriptor()).expect("parse");
        assert_eq!(desc.fields.len(), 1);

        let field = &desc.fields[0];
        assert_eq!(field.kind, FieldKind::Feature);
        assert_eq!(field.report_id, Some(0x09));
        assert_eq!(field.usage_page, 0x0014);
        assert_eq!(field.logical, 0xFFD1_0001);
        assert_eq!(field.report_size, 32);
        assert_eq!(field.report_count, 10);
        assert_eq!(field.byte_len(), 40);
        assert_eq!(field.usages.len(), 10);
        assert_eq!(field.usages[0], 0x0014_0001);
        assert_eq!(field.usages[9], 0x0014_000A);
    }

    #[test]
    fn test_parse_input_field_outside_logical_collection() {
        let desc = ReportDescriptor::parse(&[
            0x05, 0x01, // Usage Page (Generic Desktop)
            0x09, 0x06, // Usage (Keyboard)
            0xA1, 0x01, // Collection (Application)
            0x75, 0x08, //   Report Size (8)
            0x95, 0x08, //   Report Count (8)
            0x81, 0x02, //   Input (Data,Var,Abs)
            0xC0, //       End Collection
        ])
        .expect("parse");

        assert_eq!(desc.fields.len(), 1);
        let field = &desc.fields[0];
        assert_eq!(field.kind, FieldKind::Input);
        assert_eq!(field.logical, 0);
        assert_eq!(field.report_id, None);
        assert!(desc.feature_fields().next().is_none());
    }

    #[test]
    fn test_parse_truncated_item() {
        // Two-byte usage page item with one byte of data missing.
        let err = ReportDescriptor::parse(&[0x06, 0xD1]).unwrap_err();
        assert!(matches!(err, HidCommonError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_parse_unbalanced_end_collection() {
        let err = ReportDescriptor::parse(&[0xC0]).unwrap_err();
        assert!(matches!(err, HidCommonError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_parse_skips_long_items() {
        let desc = ReportDescriptor::parse(&[
            0xFE, 0x02, 0x42, 0xAA, 0xBB, // long item, 2 data bytes
            0x05, 0x14, // Usage Page (Ordinal)
        ])
        .expect("parse");
        assert!(desc.fields.is_empty());
    }

    #[test]
    fn test_parse_usage_range_too_wide() {
        let err = ReportDescriptor::parse(&[
            0x05, 0x07, // Usage Page (Keyboard)
            0x19, 0x00, // Usage Minimum (0)
            0x2A, 0xFF, 0x7F, // Usage Maximum (0x7FFF)
            0x81, 0x00, // Input
        ])
        .unwrap_err();
        assert!(matches!(err, HidCommonError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_signed_decode_sign_extends() {
        assert_eq!(signed(&[0xFF]), -1);
        assert_eq!(signed(&[0x00, 0x80]), -32768);
        assert_eq!(signed(&[0x7F]), 127);
        assert_eq!(signed(&[]), 0);
    }

    #[test]
    fn test_push_pop_restores_globals() {
        let desc = ReportDescriptor::parse(&[
            0x05, 0x01, // Usage Page (Generic Desktop)
            0x75, 0x08, // Report Size (8)
            0x95, 0x01, // Report Count (1)
            0xA4, // Push
            0x75, 0x10, // Report Size (16)
            0x09, 0x30, // Usage (X)
            0x81, 0x02, // Input
            0xB4, // Pop
            0x09, 0x31, // Usage (Y)
            0x81, 0x02, // Input
        ])
        .expect("parse");

        assert_eq!(desc.fields[0].report_size, 16);
        assert_eq!(desc.fields[1].report_size, 8);
    }
}

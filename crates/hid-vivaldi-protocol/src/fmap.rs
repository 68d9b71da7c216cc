//! Function-row physmap decoding.
//!
//! A Vivaldi keyboard publishes its top-row layout as a feature field
//! inside a Logical collection whose usage is the Google vendor
//! physmap usage. The field's own usages sit on the Ordinal page and
//! number the physical positions 1..N left to right; the value stored
//! in the feature report at each position is the scancode the key
//! emits.

use crate::{
    MAX_FUNCTION_ROW_KEYS, USAGE_FN_ROW_PHYSMAP, USAGE_PAGE_ORDINAL, VivaldiProtocolError,
    VivaldiProtocolResult,
};
use openvivaldi_hid_common::{ReportDescriptor, ReportField};
use serde::{Deserialize, Serialize};

/// Locate the physmap feature field in a parsed descriptor.
pub fn find_physmap_field(descriptor: &ReportDescriptor) -> Option<&ReportField> {
    descriptor
        .feature_fields()
        .find(|field| field.logical == USAGE_FN_ROW_PHYSMAP)
}

/// Ordered physical scancodes of the function-row keys.
///
/// Index 0 is the leftmost top-row key. Positions the keyboard never
/// declared decode to 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRowMap {
    physmap: Vec<u32>,
}

/// Result of decoding a physmap feature report: the map plus any
/// usages that had to be skipped (wrong page or position out of the
/// 1..=24 range). Callers decide whether skips are worth logging.
#[derive(Debug, Clone, Default)]
pub struct DecodedPhysmap {
    pub map: FunctionRowMap,
    pub skipped_usages: Vec<u32>,
}

impl FunctionRowMap {
    /// Decode the physmap from `field` and its feature report payload
    /// (report id byte excluded).
    pub fn decode(field: &ReportField, report: &[u8]) -> VivaldiProtocolResult<DecodedPhysmap> {
        let bits = field.report_size;
        if bits == 0 || bits > 32 {
            return Err(VivaldiProtocolError::UnsupportedFieldWidth(bits));
        }
        if field.usages.is_empty() {
            return Err(VivaldiProtocolError::EmptyPhysmapField);
        }
        let needed = field.byte_len();
        if report.len() < needed {
            return Err(VivaldiProtocolError::TruncatedFeatureReport {
                needed,
                actual: report.len(),
            });
        }

        let mut entries: Vec<(usize, u32)> = Vec::new();
        let mut skipped = Vec::new();
        let slots = field.report_count as usize;

        for (slot, usage) in field.usages.iter().enumerate().take(slots) {
            let page = (usage >> 16) as u16;
            let position = (usage & 0xFFFF) as usize;
            if page != USAGE_PAGE_ORDINAL || !(1..=MAX_FUNCTION_ROW_KEYS).contains(&position) {
                skipped.push(*usage);
                continue;
            }
            // In-range by construction of `needed` above.
            if let Some(code) = read_field_value(report, slot, bits) {
                entries.push((position, code));
            }
        }

        let mut physmap = vec![0u32; entries.iter().map(|(p, _)| *p).max().unwrap_or(0)];
        for (position, code) in entries {
            physmap[position - 1] = code;
        }

        Ok(DecodedPhysmap {
            map: Self { physmap },
            skipped_usages: skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.physmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.physmap.is_empty()
    }

    pub fn scancodes(&self) -> &[u32] {
        &self.physmap
    }

    /// Render the map the way the kernel driver exposes it in sysfs:
    /// space-separated `%02X` scancodes, leftmost key first.
    pub fn to_attribute_value(&self) -> String {
        self.physmap
            .iter()
            .map(|code| format!("{code:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract the `slot`-th value of a packed report field, LSB-first bit
/// order as HID packs multi-slot fields. Returns `None` when the
/// payload is too short.
pub fn read_field_value(report: &[u8], slot: usize, bits: u32) -> Option<u32> {
    if bits == 0 || bits > 32 {
        return None;
    }
    let start = slot.checked_mul(bits as usize)?;
    let end = start.checked_add(bits as usize)?;
    if end > report.len() * 8 {
        return None;
    }

    let mut value = 0u32;
    for offset in 0..bits as usize {
        let bit = start + offset;
        if report[bit / 8] >> (bit % 8) & 1 == 1 {
            value |= 1 << offset;
        }
    }
    Some(value)
}

//! Read-only attribute export.
//!
//! The userspace-visible equivalent of the kernel driver's sysfs
//! attribute group: a named set of read-only string attributes hung
//! off the attached device. The function-row map renders exactly as
//! sysfs does (space-separated `%02X` scancodes).

use hid_vivaldi_protocol::FunctionRowMap;

/// Attribute name carrying the function-row scancode map.
pub const ATTR_FUNCTION_ROW_PHYSMAP: &str = "function_row_physmap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: String,
}

/// A named group of read-only attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeGroup {
    pub name: &'static str,
    attributes: Vec<Attribute>,
}

impl AttributeGroup {
    /// Build the Vivaldi attribute group. An empty map still exports
    /// the attribute (with an empty value), mirroring the kernel
    /// behavior of registering the group unconditionally.
    pub fn vivaldi(map: &FunctionRowMap) -> Self {
        Self {
            name: "vivaldi",
            attributes: vec![Attribute {
                name: ATTR_FUNCTION_ROW_PHYSMAP,
                value: map.to_attribute_value(),
            }],
        }
    }

    pub fn read(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().map(|attr| attr.name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

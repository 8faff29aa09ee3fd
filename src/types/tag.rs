//! Tag types for the registry

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identity of a tag: two tags with equal identities are the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagIdentity {
    pub epc: Vec<u8>,
    pub pc_bits: u16,
}

/// A single RFID tag record
///
/// Values are immutable once parsed. Equality and hashing only look at the
/// identity fields (`epc`, `pc_bits`); `length`, `epc_length_bits` and
/// `read_data` are carried along but do not distinguish tags.
#[derive(Debug, Clone)]
pub struct Tag {
    pub pc_bits: u16,
    pub length: u16,
    pub epc_length_bits: u16,
    pub epc: Vec<u8>,
    pub read_data: Vec<u8>,
}

impl Tag {
    /// Create a new tag
    pub fn new(
        pc_bits: u16,
        length: u16,
        epc_length_bits: u16,
        epc: Vec<u8>,
        read_data: Vec<u8>,
    ) -> Self {
        Self {
            pc_bits,
            length,
            epc_length_bits,
            epc,
            read_data,
        }
    }

    /// Identity tuple used for dedupe and delete matching
    pub fn identity(&self) -> TagIdentity {
        TagIdentity {
            epc: self.epc.clone(),
            pc_bits: self.pc_bits,
        }
    }

    /// Render the tag in its canonical external string form
    pub fn to_fields(&self) -> TagFields {
        TagFields {
            pc_bits: format!("{:04X}", self.pc_bits),
            length: self.length.to_string(),
            epc_length_bits: self.epc_length_bits.to_string(),
            epc: hex::encode_upper(&self.epc),
            read_data: hex::encode_upper(&self.read_data),
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.pc_bits == other.pc_bits && self.epc == other.epc
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epc.hash(state);
        self.pc_bits.hash(state);
    }
}

/// Tag in external string form, as carried on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFields {
    #[serde(rename = "PCBits", default)]
    pub pc_bits: String,
    #[serde(rename = "Length", default)]
    pub length: String,
    #[serde(rename = "EPCLengthBits", default)]
    pub epc_length_bits: String,
    #[serde(rename = "EPC", default)]
    pub epc: String,
    #[serde(rename = "ReadData", default)]
    pub read_data: String,
}

impl TagFields {
    /// Create tag fields from raw strings
    pub fn new(
        pc_bits: impl Into<String>,
        length: impl Into<String>,
        epc_length_bits: impl Into<String>,
        epc: impl Into<String>,
        read_data: impl Into<String>,
    ) -> Self {
        Self {
            pc_bits: pc_bits.into(),
            length: length.into(),
            epc_length_bits: epc_length_bits.into(),
            epc: epc.into(),
            read_data: read_data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_non_identity_fields() {
        let a = Tag::new(0x3000, 6, 96, vec![0xE2, 0x00], vec![]);
        let b = Tag::new(0x3000, 8, 128, vec![0xE2, 0x00], vec![0xAB]);
        assert_eq!(a, b);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_different_pc_bits_is_different_tag() {
        let a = Tag::new(0x3000, 6, 96, vec![0xE2, 0x00], vec![]);
        let b = Tag::new(0x3400, 6, 96, vec![0xE2, 0x00], vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_to_fields_is_canonical() {
        let tag = Tag::new(0x3000, 6, 96, vec![0xE2, 0x00, 0x0a], vec![0xff]);
        let fields = tag.to_fields();
        assert_eq!(fields, TagFields::new("3000", "6", "96", "E2000A", "FF"));
    }

    #[test]
    fn test_tag_fields_wire_names() {
        let fields = TagFields::new("3000", "6", "96", "E200", "");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["PCBits"], "3000");
        assert_eq!(json["EPCLengthBits"], "96");
        assert_eq!(json["ReadData"], "");
    }

    #[test]
    fn test_tag_fields_missing_keys_default_to_empty() {
        let fields: TagFields = serde_json::from_str(r#"{"EPC":"E200"}"#).unwrap();
        assert_eq!(fields.epc, "E200");
        assert!(fields.pc_bits.is_empty());
    }
}

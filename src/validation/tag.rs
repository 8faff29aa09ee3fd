//! Tag field parsing
//!
//! Turns the five external string fields of a tag into a typed [`Tag`]:
//!
//! | field           | format                         |
//! |-----------------|--------------------------------|
//! | `PCBits`        | hex, 16 bits                   |
//! | `Length`        | decimal, 16 bits               |
//! | `EPCLengthBits` | decimal, 16 bits               |
//! | `EPC`           | hex bytes, required            |
//! | `ReadData`      | hex bytes, may be empty        |

use crate::error::TagParseError;
use crate::types::{Tag, TagFields};

/// Parse a tag from its string fields
pub fn parse_tag(fields: &TagFields) -> Result<Tag, TagParseError> {
    let pc_bits = parse_u16("PCBits", &fields.pc_bits, 16)?;
    let length = parse_u16("Length", &fields.length, 10)?;
    let epc_length_bits = parse_u16("EPCLengthBits", &fields.epc_length_bits, 10)?;

    let epc = decode_hex("EPC", &fields.epc)?;
    if epc.is_empty() {
        return Err(TagParseError::Missing { field: "EPC" });
    }
    let read_data = decode_hex("ReadData", &fields.read_data)?;

    Ok(Tag::new(pc_bits, length, epc_length_bits, epc, read_data))
}

/// Parse a batch of tags, failing on the first invalid one
pub fn parse_tags(batch: &[TagFields]) -> Result<Vec<Tag>, TagParseError> {
    batch.iter().map(parse_tag).collect()
}

fn parse_u16(field: &'static str, raw: &str, radix: u32) -> Result<u16, TagParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TagParseError::Missing { field });
    }
    u16::from_str_radix(value, radix).map_err(|_| TagParseError::InvalidNumber {
        field,
        value: value.to_string(),
        kind: if radix == 16 { "hex" } else { "decimal" },
    })
}

fn decode_hex(field: &'static str, raw: &str) -> Result<Vec<u8>, TagParseError> {
    let value = raw.trim();
    hex::decode(value).map_err(|_| TagParseError::InvalidHex {
        field,
        value: value.to_string(),
    })
}

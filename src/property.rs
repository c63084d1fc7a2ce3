//! Typed field extraction from inflated block data.
//!
//! World blocks hold a loose stream of tagged properties: the field name,
//! one NUL, a type tag, then a type-specific payload. The extractor does not
//! parse the stream structurally; it finds the field name by substring search
//! and decodes the payload that follows, which is all the fixed field set
//! requires and stays robust against unknown surrounding data.
//!
//! Character record blocks are laid out differently: no field names, just a
//! name length and name bytes at fixed offsets. The two paths are kept
//! separate because the block layouts genuinely differ.
//!
//! String lengths are sign-encoded: a positive declared length is a UTF-8
//! byte count including a single NUL terminator, a negative one is a UTF-16LE
//! code unit count including a two-byte terminator.

use crate::container::find;
use encoding_rs::UTF_16LE;

const TAG_U32: u8 = 0x02;
const TAG_STRING: u8 = 0x06;

/// Declared lengths above this are treated as corruption, not data. Field
/// values in practice are short names and GUIDs.
const MAX_DECLARED_LEN: usize = 100;

/// Offset of the name length field inside a character record block.
const RECORD_NAME_LEN_OFFSET: usize = 29;

fn le_i32(data: &[u8], pos: usize) -> Option<i32> {
    let bytes = data.get(pos..pos + 4)?;
    Some(i32::from_le_bytes(bytes.try_into().unwrap()))
}

fn le_u32(data: &[u8], pos: usize) -> Option<u32> {
    let bytes = data.get(pos..pos + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().unwrap()))
}

/// Decode a sign-length-prefixed string whose length field sits at `pos`.
///
/// Exactly one terminator is stripped: one byte for UTF-8, two for UTF-16LE.
/// Malformed text decodes with replacement characters rather than failing,
/// matching how the engine itself shrugs off mojibake in old saves.
fn decode_string_at(data: &[u8], pos: usize) -> Option<String> {
    let declared = le_i32(data, pos)?;
    let start = pos + 4;

    if declared > 0 {
        let bytes = declared as usize;
        if bytes > MAX_DECLARED_LEN {
            return None;
        }
        let raw = data.get(start..start + bytes - 1)?;
        Some(String::from_utf8_lossy(raw).into_owned())
    } else if declared < 0 {
        let units = declared.unsigned_abs() as usize;
        if units > MAX_DECLARED_LEN {
            return None;
        }
        let raw = data.get(start..start + units * 2 - 2)?;
        let (text, _) = UTF_16LE.decode_without_bom_handling(raw);
        Some(text.into_owned())
    } else {
        None
    }
}

fn field_payload(data: &[u8], key: &[u8], tag: u8) -> Option<usize> {
    let pos = find(data, key, 0)?;
    let mut at = pos + key.len();

    if *data.get(at)? != 0 {
        return None;
    }
    at += 1;

    if *data.get(at)? != tag {
        return None;
    }
    Some(at + 1)
}

/// Find a named string field and decode its value.
///
/// Returns `None` when the key is absent, the tag does not mark a string,
/// or the declared length runs past the buffer or the corruption guard.
///
/// ```
/// use mazarbul::property::find_string;
///
/// let data = b"junk SG_MN\x00\x06\x05\x00\x00\x00mine\x00 junk";
/// assert_eq!(find_string(data, b"SG_MN").as_deref(), Some("mine"));
/// assert_eq!(find_string(data, b"SG_WN"), None);
/// ```
pub fn find_string(data: &[u8], key: &[u8]) -> Option<String> {
    let payload = field_payload(data, key, TAG_STRING)?;
    decode_string_at(data, payload)
}

/// Find a named integer field and decode its value.
pub fn find_u32(data: &[u8], key: &[u8]) -> Option<u32> {
    let payload = field_payload(data, key, TAG_U32)?;
    le_u32(data, payload)
}

/// Read the character name out of an inflated record block.
///
/// Record blocks carry no field names; the name length lives at a fixed
/// offset with the same sign-encoded width convention as named fields.
pub fn character_name(block: &[u8]) -> Option<String> {
    decode_string_at(block, RECORD_NAME_LEN_OFFSET)
}

//! Locating and inflating the compressed blocks of a save file.
//!
//! A save file is a GVAS container holding one or more `CSDC` (compressed
//! save data) blocks. The compressed payload does not start at a fixed
//! distance past the block marker: the header length varies with the engine
//! version that wrote the file. Rather than model every writer revision, the
//! decoder probes a small table of known offsets and keeps the first inflation
//! that passes a structural sanity check.
//!
//! There is no checksum anywhere in the format, so "this inflated cleanly and
//! looks like field data" is the strongest validity signal available. Callers
//! must treat a decoded block as best-effort data.

use flate2::read::ZlibDecoder;
use std::io::Read;

/// Signature at byte 0 of every parseable save file.
pub const SIGNATURE: &[u8; 4] = b"GVAS";

/// Marker delimiting a compressed block, located by substring search.
pub const BLOCK_MARKER: &[u8; 4] = b"CSDC";

/// Sub-marker found at offset 4 of an inflated character record block.
pub const RECORD_MARKER: &[u8; 4] = b"SDCP";

/// Known distances from the block marker to the start of the zlib stream,
/// probed in ascending order. Extend this table for new writer revisions.
pub const INFLATE_OFFSETS: [usize; 7] = [24, 36, 48, 52, 56, 60, 64];

/// Inflated world data must contain a property key to be considered genuine.
const PROPERTY_KEY_PREFIX: &[u8] = b"SG_";

/// Shortest inflated world block that could plausibly hold field data.
const MIN_PROPERTY_LEN: usize = 10;

/// Shortest inflated character record that reaches the name field.
const MIN_RECORD_LEN: usize = 40;

pub(crate) fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }

    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(data);
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

/// Locate the first block in `data` and inflate it into tagged property data.
///
/// Every probe offset is tried in ascending order; an inflation only counts
/// if the result is long enough and contains a recognizable property key, so
/// a spurious zlib stream at the wrong offset is rejected rather than
/// returned as garbage.
///
/// Returns `None` when the marker is absent or no probe yields a valid block.
///
/// ```
/// use mazarbul::container::decode_property_block;
///
/// assert_eq!(decode_property_block(b"GVAS no marker here"), None);
/// ```
pub fn decode_property_block(data: &[u8]) -> Option<Vec<u8>> {
    let marker = find(data, BLOCK_MARKER, 0)?;

    for offset in INFLATE_OFFSETS {
        let Some(stream) = data.get(marker + offset..) else {
            break;
        };

        if let Some(inflated) = inflate(stream) {
            if inflated.len() > MIN_PROPERTY_LEN
                && find(&inflated, PROPERTY_KEY_PREFIX, 0).is_some()
            {
                return Some(inflated);
            }
        }
    }

    None
}

/// Locate and inflate the block holding a character's fixed-layout record.
///
/// Character files carry two blocks. The first is a small header; the record
/// of interest is usually the second, so every marker occurrence is visited
/// in turn and the first inflation carrying the [`RECORD_MARKER`] sub-marker
/// at offset 4 wins.
pub fn decode_record_block(data: &[u8]) -> Option<Vec<u8>> {
    let mut pos = 0;

    while let Some(marker) = find(data, BLOCK_MARKER, pos) {
        for offset in INFLATE_OFFSETS {
            let Some(stream) = data.get(marker + offset..) else {
                break;
            };

            if let Some(inflated) = inflate(stream) {
                if inflated.len() >= MIN_RECORD_LEN && &inflated[4..8] == RECORD_MARKER {
                    return Some(inflated);
                }
            }
        }

        pos = marker + BLOCK_MARKER.len();
    }

    None
}

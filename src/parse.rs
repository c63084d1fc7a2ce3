//! Decoding one save file into an identity record.

use crate::container::{decode_property_block, decode_record_block, SIGNATURE};
use crate::errors::{Error, ErrorKind};
use crate::identity::{CharacterIdentity, WorldIdentity};
use crate::property::{character_name, find_string, find_u32};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// World name property key
pub const WORLD_NAME_KEY: &[u8] = b"SG_WN";

/// World GUID property key
pub const WORLD_GUID_KEY: &[u8] = b"SG_WGUID";

/// World seed property key
pub const WORLD_SEED_KEY: &[u8] = b"SG_WS";

/// Map name property key
pub const MAP_NAME_KEY: &[u8] = b"SG_MN";

/// Placeholder when a world block decodes but carries no name field
pub const UNKNOWN_WORLD: &str = "Unknown World";

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn check_signature(data: &[u8], path: &Path) -> Result<(), Error> {
    if data.starts_with(SIGNATURE) {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::InvalidSignature {
            path: path.to_path_buf(),
        }))
    }
}

/// Decode the identity of a world save file.
///
/// The file must start with the GVAS signature and contain at least one
/// decodable property block. Fields absent from the block degrade to their
/// defaults; a file without any decodable block is an error, which callers
/// downgrade to "unparseable" rather than propagate.
pub fn parse_world(path: &Path) -> Result<WorldIdentity, Error> {
    let data = fs::read(path)?;
    check_signature(&data, path)?;

    let block = decode_property_block(&data).ok_or_else(|| {
        Error::new(ErrorKind::NoDecodableBlock {
            path: path.to_path_buf(),
        })
    })?;

    Ok(WorldIdentity::new(
        path.to_path_buf(),
        find_string(&block, WORLD_NAME_KEY).unwrap_or_else(|| String::from(UNKNOWN_WORLD)),
        find_string(&block, WORLD_GUID_KEY).unwrap_or_default(),
        find_string(&block, MAP_NAME_KEY).unwrap_or_default(),
        find_u32(&block, WORLD_SEED_KEY),
        modified_time(path),
    ))
}

/// Decode the identity of a character save file.
///
/// Only I/O and a bad signature are errors. A missing record block or name
/// degrades to an identity without a name, whose display name falls back to
/// the base identity.
pub fn parse_character(path: &Path) -> Result<CharacterIdentity, Error> {
    let data = fs::read(path)?;
    check_signature(&data, path)?;

    let name = decode_record_block(&data)
        .as_deref()
        .and_then(character_name);

    Ok(CharacterIdentity::new(
        path.to_path_buf(),
        name,
        modified_time(path),
    ))
}

/// Decode just the world name out of a single save file.
///
/// Convenience for callers that only label a file and do not need the full
/// identity record.
pub fn world_name(path: &Path) -> Option<String> {
    parse_world(path).ok().map(|info| info.world_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::BLOCK_MARKER;
    use crate::errors::ErrorKind;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn string_field(key: &[u8], value: &str) -> Vec<u8> {
        let mut out = Vec::from(key);
        out.push(0);
        out.push(0x06);
        out.extend_from_slice(&(value.len() as i32 + 1).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
        out.push(0);
        out
    }

    fn world_file(name: &str, guid: &str, map: &str, seed: u32) -> Vec<u8> {
        let mut props = string_field(WORLD_NAME_KEY, name);
        props.extend_from_slice(&string_field(WORLD_GUID_KEY, guid));
        props.extend_from_slice(&string_field(MAP_NAME_KEY, map));
        props.extend_from_slice(WORLD_SEED_KEY);
        props.push(0);
        props.push(0x02);
        props.extend_from_slice(&seed.to_le_bytes());

        let mut data = Vec::from(*SIGNATURE);
        data.extend_from_slice(&[0u8; 12]);
        let marker = data.len();
        data.extend_from_slice(BLOCK_MARKER);
        data.resize(marker + 60, 0);
        data.extend_from_slice(&deflate(&props));
        data
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_parse_world() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "MW_AA11.sav",
            &world_file("Khazad-dûm", "d0e6-77aa", "M_Elven", 1_234_567),
        );

        let info = parse_world(&path).unwrap();
        assert_eq!(info.world_name(), "Khazad-dûm");
        assert_eq!(info.world_guid(), "d0e6-77aa");
        assert_eq!(info.map_name(), "M_Elven");
        assert_eq!(info.world_seed(), Some(1_234_567));
        assert_eq!(info.base_identity(), "MW_AA11");
        assert!(info.modified().is_some());
    }

    #[test]
    fn test_parse_world_bad_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "MW_AA11.sav", b"SAVEGAME something else");

        let err = parse_world(&path).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature { .. }));
    }

    #[test]
    fn test_parse_world_truncated_before_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "MW_AA11.sav", b"GVAS\x00\x00\x00\x00");

        let err = parse_world(&path).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NoDecodableBlock { .. }));
    }

    #[test]
    fn test_parse_world_missing_file() {
        let err = parse_world(std::path::Path::new("/nonexistent/MW_AA11.sav")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
    }

    #[test]
    fn test_world_name_helper() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "MW_AA11.sav", &world_file("Moria", "", "", 0));
        assert_eq!(world_name(&path).as_deref(), Some("Moria"));
        assert_eq!(world_name(&dir.path().join("MW_BB22.sav")), None);
    }

    #[test]
    fn test_parse_character_without_record_block() {
        // GVAS-valid character file with no decodable record still yields
        // an identity; display falls back to the base identity
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "MC_FF00.sav", b"GVAS\x00\x00\x00\x00");

        let info = parse_character(&path).unwrap();
        assert_eq!(info.character_name(), None);
        assert_eq!(info.display_name(), "MC_FF00");
    }

    #[test]
    fn test_parse_character() {
        let mut record = vec![0u8; 4];
        record.extend_from_slice(b"SDCP");
        record.resize(29, 0);
        record.extend_from_slice(&6i32.to_le_bytes());
        record.extend_from_slice(b"Gimli\x00");
        record.resize(48, 0);

        let mut data = Vec::from(*SIGNATURE);
        data.extend_from_slice(&[0u8; 8]);
        let marker = data.len();
        data.extend_from_slice(BLOCK_MARKER);
        data.resize(marker + 24, 0);
        data.extend_from_slice(&deflate(&record));

        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "MC_FF00.sav", &data);

        let info = parse_character(&path).unwrap();
        assert_eq!(info.character_name(), Some("Gimli"));
        assert_eq!(info.display_name(), "Gimli");
    }
}

//! Directory scanning and version-set reconciliation.
//!
//! A scan enumerates the save directory once, classifies every filename,
//! decodes identity from the primary files, and attaches every recognized
//! file to the entity owning its base identity. Entities whose primary file
//! is gone are recovered from the best remaining file (template first, then
//! numbered backups ascending, then marked-bad files) so that stray backups
//! still show up with a real name instead of vanishing.
//!
//! Each scan is a self-contained snapshot: nothing is cached between calls,
//! and a rescan is the only way to observe filesystem changes.

use crate::classify::{classify, SaveFamily, VersionRole};
use crate::errors::Error;
use crate::identity::{
    role_rank, CharacterIdentity, CharacterWithVersions, EntityWithVersions, SaveFileVersion,
    WorldIdentity, WorldWithVersions,
};
use crate::parse::{parse_character, parse_world};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Capability set the generic aggregator needs for one entity kind.
///
/// Implemented by [`WorldKind`] and [`CharacterKind`]; the scan logic itself
/// is written once.
pub trait EntityKind {
    /// Identity record produced by the parser
    type Identity;

    /// Filename family this kind scans
    const FAMILY: SaveFamily;

    /// Decode one file into an identity
    fn parse(path: &Path) -> Result<Self::Identity, Error>;

    /// Whether the parse recovered a display identity. A character file can
    /// parse cleanly yet carry no decodable name; such a parse must not end
    /// the search through an orphan group.
    fn decoded(identity: &Self::Identity) -> bool;

    /// Identity synthesized from the base identity string alone, used when
    /// no file of an orphan group decodes
    fn fallback(base: &str, path: &Path, modified: Option<SystemTime>) -> Self::Identity;

    /// Modification time the entity list sorts by
    fn modified(identity: &Self::Identity) -> Option<SystemTime>;
}

/// World entity kind (`MW_` files)
pub struct WorldKind;

/// Character entity kind (`MC_` files)
pub struct CharacterKind;

impl EntityKind for WorldKind {
    type Identity = WorldIdentity;
    const FAMILY: SaveFamily = SaveFamily::World;

    fn parse(path: &Path) -> Result<WorldIdentity, Error> {
        parse_world(path)
    }

    fn decoded(_identity: &WorldIdentity) -> bool {
        true
    }

    fn fallback(base: &str, path: &Path, modified: Option<SystemTime>) -> WorldIdentity {
        let guid = base.get(Self::FAMILY.prefix().len()..).unwrap_or_default();
        WorldIdentity::new(
            path.to_path_buf(),
            base.to_string(),
            guid.to_string(),
            String::new(),
            None,
            modified,
        )
    }

    fn modified(identity: &WorldIdentity) -> Option<SystemTime> {
        identity.modified()
    }
}

impl EntityKind for CharacterKind {
    type Identity = CharacterIdentity;
    const FAMILY: SaveFamily = SaveFamily::Character;

    fn parse(path: &Path) -> Result<CharacterIdentity, Error> {
        parse_character(path)
    }

    fn decoded(identity: &CharacterIdentity) -> bool {
        identity.character_name().is_some()
    }

    fn fallback(_base: &str, path: &Path, modified: Option<SystemTime>) -> CharacterIdentity {
        // display name already falls back to the base identity
        CharacterIdentity::new(path.to_path_buf(), None, modified)
    }

    fn modified(identity: &CharacterIdentity) -> Option<SystemTime> {
        identity.modified()
    }
}

struct Entry {
    path: PathBuf,
    base: String,
    role: VersionRole,
    ordinal: Option<u8>,
    modified: Option<SystemTime>,
    size: u64,
}

fn enumerate(dir: &Path, family: SaveFamily) -> Vec<Entry> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(err) => {
            debug!("save directory {} not readable: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for dent in read.flatten() {
        let path = dent.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(classified) = classify(family, name) else {
            continue;
        };

        let base = classified.base.to_string();
        let (role, ordinal) = (classified.role, classified.ordinal);
        let (modified, size) = match fs::metadata(&path) {
            Ok(meta) => (meta.modified().ok(), meta.len()),
            Err(err) => {
                warn!("could not stat {}: {}", path.display(), err);
                (None, 0)
            }
        };

        entries.push(Entry {
            path,
            base,
            role,
            ordinal,
            modified,
            size,
        });
    }
    entries
}

fn version_of(entry: &Entry) -> SaveFileVersion {
    SaveFileVersion::new(
        entry.path.clone(),
        entry.role,
        entry.ordinal,
        entry.modified,
        entry.size,
    )
}

/// Scan a directory and reconcile every recognized file of one entity kind
/// into entities with complete version sets, newest first.
///
/// A missing or unreadable directory yields an empty list. Unparseable
/// primary files are logged and skipped; their secondary files are still
/// recovered as orphan entities.
pub fn scan_with_versions<K: EntityKind>(dir: &Path) -> Vec<EntityWithVersions<K::Identity>> {
    let entries = enumerate(dir, K::FAMILY);

    // identity comes from the primaries first
    let mut entities: HashMap<String, EntityWithVersions<K::Identity>> = HashMap::new();
    for entry in entries.iter().filter(|e| e.role == VersionRole::Primary) {
        match K::parse(&entry.path) {
            Ok(identity) => {
                entities.insert(entry.base.clone(), EntityWithVersions::new(identity));
            }
            Err(err) => warn!("unparseable save {}: {}", entry.path.display(), err),
        }
    }

    // attach every file to its entity, buffering files whose primary is
    // missing or unreadable
    let mut orphans: HashMap<String, Vec<&Entry>> = HashMap::new();
    for entry in &entries {
        if let Some(entity) = entities.get_mut(&entry.base) {
            entity.push(version_of(entry));
        } else if entry.role != VersionRole::Primary {
            orphans.entry(entry.base.clone()).or_default().push(entry);
        }
    }

    // recover identity for orphan groups from the best file that decodes
    for (base, mut group) in orphans {
        group.sort_by(|a, b| {
            role_rank(a.role)
                .cmp(&role_rank(b.role))
                .then(a.ordinal.cmp(&b.ordinal))
                .then_with(|| a.path.cmp(&b.path))
        });

        let mut identity = None;
        for entry in &group {
            match K::parse(&entry.path) {
                Ok(parsed) if K::decoded(&parsed) => {
                    identity = Some(parsed);
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    debug!("orphan candidate {} did not decode: {}", entry.path.display(), err)
                }
            }
        }

        let identity = identity.unwrap_or_else(|| {
            let first = &group[0];
            K::fallback(&base, &first.path, first.modified)
        });

        let mut entity = EntityWithVersions::new(identity);
        for entry in group {
            entity.push(version_of(entry));
        }
        entities.insert(base, entity);
    }

    let mut result: Vec<_> = entities.into_values().collect();
    for entity in &mut result {
        entity.sort_versions();
    }
    // newest first; entities with no known time sort last
    result.sort_by(|a, b| K::modified(b.identity()).cmp(&K::modified(a.identity())));
    result
}

/// All worlds in a save directory with their version sets, newest first
pub fn worlds_with_versions(dir: &Path) -> Vec<WorldWithVersions> {
    scan_with_versions::<WorldKind>(dir)
}

/// All characters in a save directory with their version sets, newest first
pub fn characters_with_versions(dir: &Path) -> Vec<CharacterWithVersions> {
    scan_with_versions::<CharacterKind>(dir)
}

fn scan_primaries<K: EntityKind>(dir: &Path) -> Vec<K::Identity> {
    let entries = enumerate(dir, K::FAMILY);
    let mut identities = Vec::new();

    for entry in entries.iter().filter(|e| e.role == VersionRole::Primary) {
        match K::parse(&entry.path) {
            Ok(identity) => identities.push(identity),
            Err(err) => warn!("unparseable save {}: {}", entry.path.display(), err),
        }
    }

    identities.sort_by(|a, b| K::modified(b).cmp(&K::modified(a)));
    identities
}

/// Identities of the primary world saves only, newest first
pub fn world_saves(dir: &Path) -> Vec<WorldIdentity> {
    scan_primaries::<WorldKind>(dir)
}

/// Identities of the primary character saves only, newest first
pub fn character_saves(dir: &Path) -> Vec<CharacterIdentity> {
    scan_primaries::<CharacterKind>(dir)
}

/// Map from base identity to world name for every parseable primary world
pub fn world_name_mapping(dir: &Path) -> HashMap<String, String> {
    world_saves(dir)
        .iter()
        .map(|world| {
            (
                world.base_identity().to_string(),
                world.world_name().to_string(),
            )
        })
        .collect()
}

//! Read-only snapshots of what lives on disk for one world or character.
//!
//! Everything here is constructed fresh by a directory scan and never
//! mutated afterwards. Renaming, promoting, or deleting files happens
//! outside this crate and requires a rescan to become visible.

use crate::classify::{base_identity, VersionRole};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One physical file belonging to an entity's version set
#[derive(Debug, Clone)]
pub struct SaveFileVersion {
    path: PathBuf,
    role: VersionRole,
    ordinal: Option<u8>,
    modified: Option<SystemTime>,
    size: u64,
}

impl SaveFileVersion {
    pub(crate) fn new(
        path: PathBuf,
        role: VersionRole,
        ordinal: Option<u8>,
        modified: Option<SystemTime>,
        size: u64,
    ) -> SaveFileVersion {
        SaveFileVersion {
            path,
            role,
            ordinal,
            modified,
            size,
        }
    }

    /// Absolute path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Role of the file within the version set
    pub fn role(&self) -> VersionRole {
        self.role
    }

    /// Two-digit ordinal for numbered-backup and marked-bad files
    pub fn ordinal(&self) -> Option<u8> {
        self.ordinal
    }

    /// Last modification time, when the filesystem could report one
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// File size in bytes (0 when the file could not be stat'ed)
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Final path component
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Human-readable label for this version
    pub fn display_name(&self) -> String {
        let ordinal = self.ordinal.unwrap_or(0);
        match self.role {
            VersionRole::Primary => String::from("Current Save (.sav)"),
            VersionRole::Template => String::from("Fresh Backup (.sav.fresh)"),
            VersionRole::NumberedBackup => {
                format!("Backup #{ordinal:02} (.{ordinal:02}.bak)")
            }
            VersionRole::MarkedBad => {
                format!("Marked Bad #{ordinal:02} (.sav.{ordinal:02}.bad)")
            }
        }
    }
}

/// Metadata decoded from a world save file
#[derive(Debug, Clone)]
pub struct WorldIdentity {
    path: PathBuf,
    world_name: String,
    world_guid: String,
    map_name: String,
    world_seed: Option<u32>,
    modified: Option<SystemTime>,
}

impl WorldIdentity {
    pub(crate) fn new(
        path: PathBuf,
        world_name: String,
        world_guid: String,
        map_name: String,
        world_seed: Option<u32>,
        modified: Option<SystemTime>,
    ) -> WorldIdentity {
        WorldIdentity {
            path,
            world_name,
            world_guid,
            map_name,
            world_seed,
            modified,
        }
    }

    /// Path of the file the identity was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Grouping key shared by every file of this world
    pub fn base_identity(&self) -> &str {
        base_identity(self.filename())
    }

    /// Player-chosen world name ("Unknown World" when undecodable)
    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    /// World GUID, possibly empty
    pub fn world_guid(&self) -> &str {
        &self.world_guid
    }

    /// Map name, possibly empty
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// World generation seed
    pub fn world_seed(&self) -> Option<u32> {
        self.world_seed
    }

    /// Last modification time of the source file
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

/// Metadata decoded from a character save file
#[derive(Debug, Clone)]
pub struct CharacterIdentity {
    path: PathBuf,
    character_name: Option<String>,
    modified: Option<SystemTime>,
}

impl CharacterIdentity {
    pub(crate) fn new(
        path: PathBuf,
        character_name: Option<String>,
        modified: Option<SystemTime>,
    ) -> CharacterIdentity {
        CharacterIdentity {
            path,
            character_name,
            modified,
        }
    }

    /// Path of the file the identity was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component
    pub fn filename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Grouping key shared by every file of this character
    pub fn base_identity(&self) -> &str {
        base_identity(self.filename())
    }

    /// Decoded character name, if the record block held one
    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }

    /// Name to show a human: the character name, or the base identity when
    /// no name was decoded
    pub fn display_name(&self) -> &str {
        match self.character_name.as_deref() {
            Some(name) => name,
            None => self.base_identity(),
        }
    }

    /// Last modification time of the source file
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

/// An entity and every physical file sharing its base identity
#[derive(Debug, Clone)]
pub struct EntityWithVersions<I> {
    identity: I,
    versions: Vec<SaveFileVersion>,
}

/// A world and its version set
pub type WorldWithVersions = EntityWithVersions<WorldIdentity>;

/// A character and its version set
pub type CharacterWithVersions = EntityWithVersions<CharacterIdentity>;

impl<I> EntityWithVersions<I> {
    pub(crate) fn new(identity: I) -> EntityWithVersions<I> {
        EntityWithVersions {
            identity,
            versions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, version: SaveFileVersion) {
        self.versions.push(version);
    }

    pub(crate) fn sort_versions(&mut self) {
        self.versions.sort_by(|a, b| {
            role_rank(a.role())
                .cmp(&role_rank(b.role()))
                .then(a.ordinal().cmp(&b.ordinal()))
                .then_with(|| a.filename().cmp(b.filename()))
        });
    }

    /// The decoded (or recovered) identity record
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// All versions: primary first, then template, then numbered backups
    /// and marked-bad files ascending by ordinal
    pub fn versions(&self) -> &[SaveFileVersion] {
        &self.versions
    }

    /// The live `.sav` version, if one exists on disk
    pub fn primary(&self) -> Option<&SaveFileVersion> {
        self.versions
            .iter()
            .find(|v| v.role() == VersionRole::Primary)
    }

    /// The `.sav.fresh` template version, if present
    pub fn template(&self) -> Option<&SaveFileVersion> {
        self.versions
            .iter()
            .find(|v| v.role() == VersionRole::Template)
    }

    /// Numbered backups in ascending ordinal order
    pub fn backups(&self) -> Vec<&SaveFileVersion> {
        let mut backups: Vec<&SaveFileVersion> = self
            .versions
            .iter()
            .filter(|v| v.role() == VersionRole::NumberedBackup)
            .collect();
        backups.sort_by_key(|v| v.ordinal());
        backups
    }

    /// Whether a live `.sav` file exists; front-ends show a warning
    /// indicator when it does not
    pub fn has_primary(&self) -> bool {
        self.primary().is_some()
    }
}

pub(crate) fn role_rank(role: VersionRole) -> u8 {
    match role {
        VersionRole::Primary => 0,
        VersionRole::Template => 1,
        VersionRole::NumberedBackup => 2,
        VersionRole::MarkedBad => 3,
    }
}

impl WorldWithVersions {
    /// Shorthand for the identity's world name
    pub fn world_name(&self) -> &str {
        self.identity.world_name()
    }

    /// Shorthand for the identity's base identity
    pub fn base_identity(&self) -> &str {
        self.identity.base_identity()
    }
}

impl CharacterWithVersions {
    /// Shorthand for the identity's display name
    pub fn display_name(&self) -> &str {
        self.identity.display_name()
    }

    /// Shorthand for the identity's base identity
    pub fn base_identity(&self) -> &str {
        self.identity.base_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn version(name: &str, role: VersionRole, ordinal: Option<u8>) -> SaveFileVersion {
        SaveFileVersion::new(PathBuf::from(name), role, ordinal, None, 0)
    }

    #[test]
    fn test_display_names() {
        let v = version("MW_A.sav", VersionRole::Primary, None);
        assert_eq!(v.display_name(), "Current Save (.sav)");

        let v = version("MW_A.03.bak", VersionRole::NumberedBackup, Some(3));
        assert_eq!(v.display_name(), "Backup #03 (.03.bak)");

        let v = version("MW_A.sav.12.bad", VersionRole::MarkedBad, Some(12));
        assert_eq!(v.display_name(), "Marked Bad #12 (.sav.12.bad)");
    }

    #[test]
    fn test_derived_views() {
        let identity = WorldIdentity::new(
            PathBuf::from("/saves/MW_A.sav"),
            "Moria".into(),
            String::new(),
            String::new(),
            None,
            None,
        );
        let mut entity = WorldWithVersions::new(identity);
        entity.push(version("MW_A.02.bak", VersionRole::NumberedBackup, Some(2)));
        entity.push(version("MW_A.sav.fresh", VersionRole::Template, None));
        entity.push(version("MW_A.00.bak", VersionRole::NumberedBackup, Some(0)));
        entity.push(version("MW_A.sav", VersionRole::Primary, None));
        entity.sort_versions();

        assert!(entity.has_primary());
        assert_eq!(entity.primary().unwrap().filename(), "MW_A.sav");
        assert_eq!(entity.template().unwrap().filename(), "MW_A.sav.fresh");
        let ordinals: Vec<_> = entity.backups().iter().map(|v| v.ordinal()).collect();
        assert_eq!(ordinals, [Some(0), Some(2)]);
        assert_eq!(entity.versions()[0].role(), VersionRole::Primary);
    }

    #[test]
    fn test_character_display_fallback() {
        let named = CharacterIdentity::new(PathBuf::from("MC_B.sav"), Some("Gimli".into()), None);
        assert_eq!(named.display_name(), "Gimli");

        let unnamed = CharacterIdentity::new(PathBuf::from("MC_B.00.bak"), None, None);
        assert_eq!(unnamed.display_name(), "MC_B");
    }
}

/*!

A metadata extractor and backup-version reconciler for [Return to
Moria](https://www.returntomoria.com/) save files.

The game writes Unreal GVAS containers holding zlib-compressed `CSDC`
blocks, and keeps a small family of files per world or character: the live
`.sav`, a `.sav.fresh` template, rotating `.NN.bak` backups, and
`.sav.NN.bad` files set aside after a failed load. Mazarbul decodes the
identity hidden in those containers (world name, GUID, map, seed, character
name) and reconciles the on-disk family into one record per entity, even
when the live file is gone and only backups remain.

## Quick Start

```rust
use mazarbul::{classify, SaveFamily, VersionRole};

let c = classify(SaveFamily::World, "MW_AB12CD.02.bak").unwrap();
assert_eq!(c.base, "MW_AB12CD");
assert_eq!(c.role, VersionRole::NumberedBackup);
assert_eq!(c.ordinal, Some(2));
```

Scanning a save directory groups every recognized file under its entity and
sorts entities newest first:

```rust,no_run
use std::path::Path;

let save_dir = Path::new("Saved/SaveGamesSteam");
for world in mazarbul::worlds_with_versions(save_dir) {
    println!(
        "{} ({} versions{})",
        world.world_name(),
        world.versions().len(),
        if world.has_primary() { "" } else { ", no live save!" },
    );
}
```

## Caveats

The save format is undocumented and carries no checksum, so block decoding
is best-effort: a block is accepted when it inflates and looks like genuine
field data. Corrupt files degrade to "unparseable" and are logged through
the [`log`](https://docs.rs/log) facade rather than failing the scan; a
single bad file never hides the rest of the directory.

This crate reads a fixed set of fields. It is not a general GVAS
deserializer and does not write save files back.

*/

mod classify;
pub mod container;
mod errors;
mod identity;
mod parse;
pub mod property;
mod scan;

pub use self::classify::{base_identity, classify, Classified, SaveFamily, VersionRole};
pub use self::errors::{Error, ErrorKind};
pub use self::identity::{
    CharacterIdentity, CharacterWithVersions, EntityWithVersions, SaveFileVersion, WorldIdentity,
    WorldWithVersions,
};
pub use self::parse::{
    parse_character, parse_world, world_name, MAP_NAME_KEY, UNKNOWN_WORLD, WORLD_GUID_KEY,
    WORLD_NAME_KEY, WORLD_SEED_KEY,
};
pub use self::scan::{
    character_saves, characters_with_versions, scan_with_versions, world_name_mapping, world_saves,
    worlds_with_versions, CharacterKind, EntityKind, WorldKind,
};

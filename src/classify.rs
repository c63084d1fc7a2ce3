//! Filename classification for the four recognized version roles.
//!
//! Classification is purely lexical: it never opens the file. The grammar,
//! matched case-insensitively after the family prefix:
//!
//! ```text
//! MW_<id>.sav            primary
//! MW_<id>.sav.fresh      template
//! MW_<id>.<NN>.bak       numbered backup
//! MW_<id>.sav.<NN>.bad   marked bad
//! ```
//!
//! (`MC_` for characters.) Everything before the first `.` is the base
//! identity that groups the physical files of one world or character.

/// The two save-file families, distinguished by filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFamily {
    /// `MW_` world saves
    World,
    /// `MC_` character saves
    Character,
}

impl SaveFamily {
    /// Returns the filename prefix for this family
    pub fn prefix(self) -> &'static str {
        match self {
            SaveFamily::World => "MW_",
            SaveFamily::Character => "MC_",
        }
    }
}

/// The role a physical file plays within its entity's version set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRole {
    /// The live `.sav` file
    Primary,

    /// The `.sav.fresh` template the game keeps alongside the live file
    Template,

    /// A rotating `.NN.bak` backup
    NumberedBackup,

    /// A `.sav.NN.bad` file the game renamed aside after a failed load
    MarkedBad,
}

/// The outcome of classifying one filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    /// Base identity: the filename segment before the first `.`
    pub base: &'a str,

    /// Recognized role of the file
    pub role: VersionRole,

    /// Two-digit ordinal, present for numbered-backup and marked-bad roles
    pub ordinal: Option<u8>,
}

fn two_digits(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => Some((a - b'0') * 10 + (b - b'0')),
        _ => None,
    }
}

/// Classify a filename into its base identity, role, and ordinal.
///
/// Returns `None` for anything outside the recognized grammar, including
/// files of the other family; unrecognized suffixes under a matching prefix
/// are ignored by design, not an error.
///
/// ```
/// use mazarbul::{classify, Classified, SaveFamily, VersionRole};
///
/// assert_eq!(
///     classify(SaveFamily::World, "MW_AB12.sav"),
///     Some(Classified { base: "MW_AB12", role: VersionRole::Primary, ordinal: None }),
/// );
/// assert_eq!(
///     classify(SaveFamily::World, "MW_AB12.sav.02.bad"),
///     Some(Classified { base: "MW_AB12", role: VersionRole::MarkedBad, ordinal: Some(2) }),
/// );
/// assert_eq!(classify(SaveFamily::World, "MC_AB12.sav"), None);
/// ```
pub fn classify(family: SaveFamily, filename: &str) -> Option<Classified<'_>> {
    let prefix = family.prefix();
    if !filename
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    {
        return None;
    }

    let dot = filename.find('.')?;
    if dot <= prefix.len() {
        return None;
    }

    let base = &filename[..dot];
    let rest = filename[dot..].as_bytes();

    let (role, ordinal) = if rest.eq_ignore_ascii_case(b".sav") {
        (VersionRole::Primary, None)
    } else if rest.eq_ignore_ascii_case(b".sav.fresh") {
        (VersionRole::Template, None)
    } else if rest.len() == 7 && rest[3] == b'.' && rest[4..].eq_ignore_ascii_case(b"bak") {
        (VersionRole::NumberedBackup, Some(two_digits(&rest[1..3])?))
    } else if rest.len() == 11
        && rest[..5].eq_ignore_ascii_case(b".sav.")
        && rest[7] == b'.'
        && rest[8..].eq_ignore_ascii_case(b"bad")
    {
        (VersionRole::MarkedBad, Some(two_digits(&rest[5..7])?))
    } else {
        return None;
    };

    Some(Classified {
        base,
        role,
        ordinal,
    })
}

/// Base identity of a filename: everything before the first `.`.
///
/// Agrees with [`classify`] on every recognized filename, but is total, so
/// it can also derive a grouping key for a file that failed to parse.
pub fn base_identity(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use rstest::*;

    #[rstest]
    #[case("MW_ABC123.sav", "MW_ABC123", VersionRole::Primary, None)]
    #[case("MW_ABC123.SAV", "MW_ABC123", VersionRole::Primary, None)]
    #[case("mw_abc123.sav", "mw_abc123", VersionRole::Primary, None)]
    #[case("MW_ABC123.sav.fresh", "MW_ABC123", VersionRole::Template, None)]
    #[case("MW_ABC123.00.bak", "MW_ABC123", VersionRole::NumberedBackup, Some(0))]
    #[case("MW_ABC123.27.BAK", "MW_ABC123", VersionRole::NumberedBackup, Some(27))]
    #[case("MW_ABC123.99.bak", "MW_ABC123", VersionRole::NumberedBackup, Some(99))]
    #[case("MW_ABC123.sav.00.bad", "MW_ABC123", VersionRole::MarkedBad, Some(0))]
    #[case("MW_ABC123.sav.13.bad", "MW_ABC123", VersionRole::MarkedBad, Some(13))]
    fn test_world_grammar(
        #[case] filename: &str,
        #[case] base: &str,
        #[case] role: VersionRole,
        #[case] ordinal: Option<u8>,
    ) {
        assert_eq!(
            classify(SaveFamily::World, filename),
            Some(Classified {
                base,
                role,
                ordinal
            })
        );
        // world grammar never matches the character family
        assert_eq!(classify(SaveFamily::Character, filename), None);
    }

    #[rstest]
    #[case("MC_1F2E.sav", VersionRole::Primary)]
    #[case("MC_1F2E.sav.fresh", VersionRole::Template)]
    fn test_character_grammar(#[case] filename: &str, #[case] role: VersionRole) {
        let classified = classify(SaveFamily::Character, filename).unwrap();
        assert_eq!(classified.base, "MC_1F2E");
        assert_eq!(classified.role, role);
    }

    #[rstest]
    #[case("MW_ABC123")] // no suffix at all
    #[case("MW_.sav")] // empty id
    #[case("MW_ABC123.sav.bak")] // missing ordinal
    #[case("MW_ABC123.5.bak")] // one digit
    #[case("MW_ABC123.123.bak")] // three digits
    #[case("MW_ABC123.sav.5.bad")]
    #[case("MW_ABC123.00.bad")] // bad without .sav.
    #[case("MW_ABC123.sav.00.bak")] // bak with .sav.
    #[case("MW_ABC123.sav.old")]
    #[case("MW_ABC123.savx")]
    #[case("MWABC123.sav")] // no underscore
    #[case("Backup_MW_ABC123.sav")]
    #[case("MA_ABC123.sav")] // account family is not recognized
    #[case("MW_ABC123.xx.bak")]
    fn test_rejected(#[case] filename: &str) {
        assert_eq!(classify(SaveFamily::World, filename), None);
    }

    #[test]
    fn test_non_ascii_filename() {
        assert_eq!(classify(SaveFamily::World, "MW_ドワーフ.sav").map(|c| c.role), Some(VersionRole::Primary));
        assert_eq!(classify(SaveFamily::World, "鉱山.sav"), None);
    }

    #[test]
    fn test_base_identity() {
        assert_eq!(base_identity("MW_ABC123.sav.01.bad"), "MW_ABC123");
        assert_eq!(base_identity("MW_ABC123"), "MW_ABC123");
        assert_eq!(base_identity(""), "");
    }

    #[derive(Debug, Clone)]
    struct Id(String);

    impl Arbitrary for Id {
        fn arbitrary(g: &mut Gen) -> Self {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            let len = usize::arbitrary(g) % 12 + 1;
            Id((0..len)
                .map(|_| *g.choose(CHARSET).unwrap() as char)
                .collect())
        }
    }

    #[quickcheck]
    fn prop_roundtrip(id: Id, ordinal: u8) -> bool {
        let ordinal = ordinal % 100;
        let base = format!("MW_{}", id.0);
        let cases = [
            (format!("{base}.sav"), VersionRole::Primary, None),
            (format!("{base}.sav.fresh"), VersionRole::Template, None),
            (
                format!("{base}.{ordinal:02}.bak"),
                VersionRole::NumberedBackup,
                Some(ordinal),
            ),
            (
                format!("{base}.sav.{ordinal:02}.bad"),
                VersionRole::MarkedBad,
                Some(ordinal),
            ),
        ];

        cases.iter().all(|(filename, role, ordinal)| {
            classify(SaveFamily::World, filename)
                == Some(Classified {
                    base: &base,
                    role: *role,
                    ordinal: *ordinal,
                })
        })
    }
}

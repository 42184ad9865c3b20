//! Latest-usable version selection
//!
//! Selection is over a total order (semver precedence, with build metadata
//! as the final tiebreaker), so the result never depends on entry order.
//! Version strings are read leniently: surrounding whitespace and one
//! leading `v` or `=` are accepted, as published indexes carry both forms.

use std::collections::BTreeSet;

use semver::{Version, VersionReq};
use tracing::trace;
use x07_core::types::IndexEntry;

/// Version selector over the usable entries of one package
#[derive(Debug, Clone, Default)]
pub struct VersionSelector {
    /// Non-yanked, valid versions in ascending order
    usable: BTreeSet<Version>,
}

impl VersionSelector {
    /// Keep entries that are not yanked and carry a valid semver version
    pub fn from_entries(entries: &[IndexEntry]) -> Self {
        let usable = entries
            .iter()
            .filter(|entry| !entry.yanked)
            .filter_map(|entry| match parse_version(&entry.version) {
                Ok(version) => Some(version),
                Err(e) => {
                    trace!("skipping {}@{}: {}", entry.name, entry.version, e);
                    None
                },
            })
            .collect();
        Self { usable }
    }

    /// Highest usable version
    pub fn latest_usable(&self) -> Option<&Version> {
        self.usable.iter().next_back()
    }

    /// Highest usable version satisfying `req`
    pub fn select_matching(&self, req: &VersionReq) -> Option<&Version> {
        self.usable.iter().rev().find(|version| req.matches(version))
    }

    /// Usable versions, highest first
    pub fn usable_versions(&self) -> impl Iterator<Item = &Version> {
        self.usable.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.usable.is_empty()
    }
}

/// Parse an index version, tolerating whitespace and a `v` or `=` prefix
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    Version::parse(bare)
}

/// Latest usable version among `entries`, or `None` if nothing qualifies
pub fn latest_usable_version(entries: &[IndexEntry]) -> Option<Version> {
    VersionSelector::from_entries(entries).latest_usable().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(version: &str, yanked: bool) -> IndexEntry {
        IndexEntry::new("x07lang-demo", version, "sha256:00", yanked)
    }

    #[test]
    fn test_yanked_versions_ignored() {
        let entries = vec![entry("1.0.0", false), entry("1.1.0", true)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_prerelease_outranks_older_release() {
        let entries = vec![
            entry("1.0.0", false),
            entry("1.1.0", true),
            entry("2.0.0-rc.1", false),
        ];
        assert_eq!(
            latest_usable_version(&entries).map(|v| v.to_string()),
            Some("2.0.0-rc.1".to_string())
        );
    }

    #[test]
    fn test_release_outranks_its_prerelease() {
        let entries = vec![entry("2.0.0", false), entry("2.0.0-rc.1", false)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn test_invalid_versions_ignored() {
        let entries = vec![
            entry("banana", false),
            entry("1.2", false),
            entry("vv1.0.0", false),
            entry("0.3.0", false),
        ];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(0, 3, 0)));
    }

    #[test]
    fn test_prefixed_versions_usable() {
        let entries = vec![entry("1.0.0", false), entry("v2.0.0", false)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(2, 0, 0)));

        let entries = vec![entry("1.0.0", false), entry(" =1.2.3 ", false)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(1, 2, 3)));

        let entries = vec![entry("0.3.0", false), entry("v9.0.0", false)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(9, 0, 0)));
    }

    #[test]
    fn test_parse_version_forms() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("=1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("  1.2.3\n").unwrap(), Version::new(1, 2, 3));
        assert!(parse_version("v=1.2.3").is_err());
        assert!(parse_version("1.2").is_err());
        assert!(parse_version("").is_err());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let entries = vec![entry("1.9.0", false), entry("1.10.0", false)];
        assert_eq!(latest_usable_version(&entries), Some(Version::new(1, 10, 0)));
    }

    #[test]
    fn test_nothing_qualifies() {
        assert_eq!(latest_usable_version(&[]), None);
        let entries = vec![entry("1.0.0", true), entry("nope", false)];
        assert_eq!(latest_usable_version(&entries), None);
        assert!(VersionSelector::from_entries(&entries).is_empty());
    }

    #[test]
    fn test_select_matching() {
        let entries = vec![
            entry("1.0.0", false),
            entry("1.4.2", false),
            entry("1.5.0", true),
            entry("2.0.0", false),
        ];
        let selector = VersionSelector::from_entries(&entries);

        let req = VersionReq::parse("^1").unwrap();
        assert_eq!(selector.select_matching(&req), Some(&Version::new(1, 4, 2)));

        let req = VersionReq::parse(">=3").unwrap();
        assert_eq!(selector.select_matching(&req), None);

        let listed: Vec<String> = selector.usable_versions().map(|v| v.to_string()).collect();
        assert_eq!(listed, vec!["2.0.0", "1.4.2", "1.0.0"]);
    }

    fn arb_version() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u64..4, 0u64..4, 0u64..4).prop_map(|(a, b, c)| format!("{}.{}.{}", a, b, c)),
            (0u64..4, 0u64..4, 0u64..4, 0u64..3)
                .prop_map(|(a, b, c, rc)| format!("{}.{}.{}-rc.{}", a, b, c, rc)),
            Just("not-a-version".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn selection_is_maximal_and_order_independent(
            raw in prop::collection::vec((arb_version(), any::<bool>()), 0..16)
        ) {
            let entries: Vec<IndexEntry> =
                raw.iter().map(|(v, yanked)| entry(v, *yanked)).collect();
            let mut reversed = entries.clone();
            reversed.reverse();

            let selected = latest_usable_version(&entries);
            prop_assert_eq!(&selected, &latest_usable_version(&reversed));

            let qualifying: Vec<Version> = entries
                .iter()
                .filter(|e| !e.yanked)
                .filter_map(|e| parse_version(&e.version).ok())
                .collect();

            match selected {
                Some(best) => {
                    prop_assert!(qualifying.iter().all(|v| v <= &best));
                    prop_assert!(qualifying.contains(&best));
                }
                None => prop_assert!(qualifying.is_empty()),
            }
        }
    }
}

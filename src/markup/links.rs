use std::fmt;

use serde::Serialize;

use crate::domain::{IndexedRevision, RevisionKeyIndex, key::has_separator};

/// The outcome of resolving an internal `[[KEY]]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No hierarchy separator: a free-text search term, never validated.
    Soft,
    /// Exactly one online revision matches.
    Unique(&'a IndexedRevision),
    /// Several online revisions match; the reference is ambiguous.
    Multi(Vec<&'a IndexedRevision>),
    /// No online revision matches.
    Broken,
}

impl Resolution<'_> {
    /// The classification without the matched revisions.
    #[must_use]
    pub const fn kind(&self) -> LinkKind {
        match self {
            Self::Soft => LinkKind::Soft,
            Self::Unique(_) => LinkKind::Unique,
            Self::Multi(_) => LinkKind::Multi,
            Self::Broken => LinkKind::Broken,
        }
    }

    /// Number of matching online revisions.
    #[must_use]
    pub fn match_count(&self) -> usize {
        match self {
            Self::Soft | Self::Broken => 0,
            Self::Unique(_) => 1,
            Self::Multi(matches) => matches.len(),
        }
    }
}

/// Classification of an internal link, as reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Search term, not validated.
    Soft,
    /// Resolves to one revision.
    Unique,
    /// Resolves to a search over several revisions.
    Multi,
    /// Resolves to nothing.
    Broken,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Soft => "soft",
            Self::Unique => "unique",
            Self::Multi => "multi",
            Self::Broken => "broken",
        };
        f.write_str(name)
    }
}

/// Classify an internal link reference against the revisions that are online
/// on the index's evaluation date.
///
/// Keys without the hierarchy separator are soft links and never touch the
/// index. Keys compare case-insensitively.
#[must_use]
pub fn classify_internal_link<'a>(key: &str, index: &'a RevisionKeyIndex) -> Resolution<'a> {
    if !has_separator(key) {
        return Resolution::Soft;
    }
    let mut matches = index.lookup(key);
    match matches.len() {
        0 => Resolution::Broken,
        1 => matches.pop().map_or(Resolution::Broken, Resolution::Unique),
        _ => Resolution::Multi(matches),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;

    fn today() -> NaiveDate {
        "2024-06-01".parse().unwrap()
    }

    fn entry(key: &str, listed_from: Option<&str>, listed_until: Option<&str>) -> IndexedRevision {
        IndexedRevision {
            key: key.parse().unwrap(),
            service_name: "Email".to_string(),
            listed_from: listed_from.map(|d| d.parse().unwrap()),
            listed_until: listed_until.map(|d| d.parse().unwrap()),
        }
    }

    fn index(entries: Vec<IndexedRevision>) -> RevisionKeyIndex {
        let mut index = RevisionKeyIndex::new(today());
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    #[test_case("email"; "plain word")]
    #[test_case("COLLABEMAIL"; "no separator")]
    #[test_case(""; "empty")]
    fn keys_without_separator_are_soft(key: &str) {
        let populated = index(vec![entry("COLLAB-EMAIL-1.0", Some("2024-01-01"), None)]);
        assert_eq!(classify_internal_link(key, &populated), Resolution::Soft);
        let empty = index(vec![]);
        assert_eq!(classify_internal_link(key, &empty).kind(), LinkKind::Soft);
    }

    #[test]
    fn one_online_revision_is_unique() {
        let index = index(vec![entry("COLLAB-EMAIL-1.0", Some("2024-01-01"), None)]);
        let resolution = classify_internal_link("COLLAB-EMAIL", &index);
        assert_eq!(resolution.kind(), LinkKind::Unique);
        assert_eq!(resolution.match_count(), 1);
    }

    #[test]
    fn two_online_revisions_are_multi() {
        let index = index(vec![
            entry("COLLAB-EMAIL-1.0", Some("2024-01-01"), None),
            entry("COLLAB-EMAIL-2.0", Some("2024-02-01"), None),
        ]);
        let resolution = classify_internal_link("COLLAB-EMAIL", &index);
        assert_eq!(resolution.kind(), LinkKind::Multi);
        assert_eq!(resolution.match_count(), 2);
        assert_eq!(
            classify_internal_link("COLLAB-EMAIL-2.0", &index).kind(),
            LinkKind::Unique
        );
    }

    #[test]
    fn no_online_revision_is_broken() {
        let index = index(vec![
            entry("COLLAB-EMAIL-1.0", None, None),
            entry("COLLAB-EMAIL-2.0", Some("2023-01-01"), Some("2024-01-01")),
        ]);
        assert_eq!(
            classify_internal_link("COLLAB-EMAIL", &index),
            Resolution::Broken
        );
        assert_eq!(
            classify_internal_link("COLLAB-NOPE", &index),
            Resolution::Broken
        );
    }

    #[test]
    fn retired_revisions_do_not_make_a_link_ambiguous() {
        let index = index(vec![
            entry("COLLAB-EMAIL-1.0", Some("2023-01-01"), Some("2024-01-01")),
            entry("COLLAB-EMAIL-2.0", Some("2024-01-01"), None),
        ]);
        match classify_internal_link("collab-email", &index) {
            Resolution::Unique(revision) => assert_eq!(revision.key.version(), "2.0"),
            other => panic!("expected a unique match, got {other:?}"),
        }
    }
}

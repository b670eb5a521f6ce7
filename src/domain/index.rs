use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{
    key::RevisionKey,
    lifecycle::{Listing, classify},
};

/// One revision as seen by the link resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRevision {
    /// Full revision key.
    pub key: RevisionKey,
    /// Display name of the owning service.
    pub service_name: String,
    /// First day of public listing.
    pub listed_from: Option<NaiveDate>,
    /// Day public listing ends.
    pub listed_until: Option<NaiveDate>,
}

impl IndexedRevision {
    fn is_online(&self, today: NaiveDate) -> bool {
        classify(self.listed_from, self.listed_until, today) == Listing::Online
    }
}

/// Maps composite keys to the revisions they match.
///
/// Each revision is reachable under its revision key
/// (`CATEGORY-SERVICE-VERSION`, exactly one match) and under its service key
/// (`CATEGORY-SERVICE`, every revision of the service). Keys compare
/// case-insensitively. Lookups only return revisions that are online on the
/// index's evaluation date.
///
/// The index is built once and then shared read-only.
#[derive(Debug, Clone)]
pub struct RevisionKeyIndex {
    today: NaiveDate,
    revisions: Vec<IndexedRevision>,
    by_key: BTreeMap<String, Vec<usize>>,
}

impl RevisionKeyIndex {
    /// Creates an empty index evaluated on `today`.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            revisions: Vec::new(),
            by_key: BTreeMap::new(),
        }
    }

    /// The date lifecycle filtering is evaluated on.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Adds a revision under its revision key and its service key.
    pub fn insert(&mut self, revision: IndexedRevision) {
        let position = self.revisions.len();
        let keys = [
            revision.key.to_string(),
            revision.key.service_key().to_string(),
        ];
        for key in keys {
            self.by_key
                .entry(key.to_lowercase())
                .or_default()
                .push(position);
        }
        self.revisions.push(revision);
    }

    /// The online revisions matching `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Vec<&IndexedRevision> {
        self.by_key
            .get(&key.trim().to_lowercase())
            .into_iter()
            .flatten()
            .map(|&position| &self.revisions[position])
            .filter(|revision| revision.is_online(self.today))
            .collect()
    }

    /// Number of indexed revisions, whatever their lifecycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// `true` if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

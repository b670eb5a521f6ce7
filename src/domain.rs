//! Domain models for the service catalogue.
//!
//! This module contains the core domain types: composite keys, lifecycle
//! evaluation, localized text, the catalogue entities, the key index used by
//! the link resolver, and configuration.

/// Composite key types and parsing.
pub mod key;
pub use key::{Acronym, KeyError, RevisionKey, ServiceKey, Version};

/// Listing and availability evaluation.
pub mod lifecycle;
pub use lifecycle::{Availability, DateError, Dates, Evaluation, Listing, Windows};

mod localized;
pub use localized::LocalizedText;

mod catalogue;
pub use catalogue::{
    Catalogue, Category, FieldText, RevisionRef, Scope, Service, ServiceRevision, TextField,
};

mod index;
pub use index::{IndexedRevision, RevisionKeyIndex};

mod config;
pub use config::{Config, Fields};

#[cfg(test)]
pub(crate) use catalogue::tests as fixtures;

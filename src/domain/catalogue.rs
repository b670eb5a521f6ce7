use chrono::NaiveDate;
use serde::Deserialize;

use super::{
    index::{IndexedRevision, RevisionKeyIndex},
    key::{Acronym, RevisionKey, ServiceKey, Version},
    lifecycle::{Availability, Dates, Listing},
    localized::LocalizedText,
};
use crate::markup::Capability;

/// A grouping of services; its acronym is the first key segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    /// Key segment, e.g. `COLLAB`.
    pub acronym: Acronym,
    /// Optional sort key; categories without one sort last, by acronym.
    #[serde(default)]
    pub order: Option<String>,
    /// Display name.
    pub name: LocalizedText,
    /// Description shown in catalogues.
    #[serde(default)]
    pub description: LocalizedText,
    /// Category owner.
    #[serde(default)]
    pub responsible: Option<String>,
}

/// A service and its governance metadata.
///
/// A service is only publicly visible while at least one of its revisions
/// is online.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Service {
    /// Acronym of the owning category.
    pub category: Acronym,
    /// Key segment, e.g. `EMAIL`.
    pub acronym: Acronym,
    /// Optional sort key within the category.
    #[serde(default)]
    pub order: Option<String>,
    /// Display name.
    pub name: LocalizedText,
    /// Main purpose or added value. Plain text only.
    pub purpose: LocalizedText,
    /// Service owner.
    #[serde(default)]
    pub responsible: Option<String>,
    /// Versioned delivery details, ordered by version.
    #[serde(default)]
    pub revisions: Vec<ServiceRevision>,
}

impl Service {
    /// The `CATEGORY-SERVICE` key.
    #[must_use]
    pub fn key(&self) -> ServiceKey {
        ServiceKey::new(self.category.clone(), self.acronym.clone())
    }

    /// `true` if any revision is online on `today`.
    #[must_use]
    pub fn is_visible(&self, today: NaiveDate) -> bool {
        self.revisions
            .iter()
            .any(|revision| revision.dates().listing(today) == Listing::Online)
    }
}

/// Versioned delivery details of a service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceRevision {
    /// Version segment of the revision key.
    pub version: Version,
    /// Submitted for review by an editor.
    #[serde(default)]
    pub submitted: bool,
    /// Extra search keywords, never displayed.
    #[serde(default)]
    pub keywords: LocalizedText,
    /// First day of public listing.
    #[serde(default)]
    pub listed_from: Option<NaiveDate>,
    /// Day public listing ends.
    #[serde(default)]
    pub listed_until: Option<NaiveDate>,
    /// First day of availability.
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    /// Day availability ends (end of life).
    #[serde(default)]
    pub available_until: Option<NaiveDate>,
    /// Direct link to the service.
    #[serde(default)]
    pub url: Option<String>,
    /// Contact address for service requests.
    #[serde(default)]
    pub contact: Option<String>,
    /// Public, self-contained description.
    pub description: LocalizedText,
    /// Internal notes, not translated.
    #[serde(default)]
    pub description_internal: Option<String>,
    /// Highlighted usage notes.
    #[serde(default)]
    pub usage_information: LocalizedText,
    /// Requirements for using the service.
    #[serde(default)]
    pub requirements: LocalizedText,
    /// Further details.
    #[serde(default)]
    pub details: LocalizedText,
    /// Available options.
    #[serde(default)]
    pub options: LocalizedText,
    /// Service level agreement.
    #[serde(default)]
    pub service_level: LocalizedText,
    /// What happens at end of life, not translated.
    #[serde(default)]
    pub eol: Option<String>,
}

impl ServiceRevision {
    /// The lifecycle dates of this revision.
    #[must_use]
    pub const fn dates(&self) -> Dates {
        Dates {
            listed_from: self.listed_from,
            listed_until: self.listed_until,
            available_from: self.available_from,
            available_until: self.available_until,
        }
    }

    /// `true` if an end-of-life note is present.
    #[must_use]
    pub fn has_eol_note(&self) -> bool {
        self.eol.as_deref().is_some_and(|eol| !eol.trim().is_empty())
    }
}

/// The formatted text fields of services and revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum TextField {
    /// `Service::purpose`
    Purpose,
    /// `ServiceRevision::description`
    Description,
    /// `ServiceRevision::description_internal`
    DescriptionInternal,
    /// `ServiceRevision::usage_information`
    UsageInformation,
    /// `ServiceRevision::requirements`
    Requirements,
    /// `ServiceRevision::details`
    Details,
    /// `ServiceRevision::options`
    Options,
    /// `ServiceRevision::service_level`
    ServiceLevel,
    /// `ServiceRevision::eol`
    Eol,
}

impl TextField {
    /// Every field, in display order.
    pub const ALL: [Self; 9] = [
        Self::Purpose,
        Self::Description,
        Self::DescriptionInternal,
        Self::UsageInformation,
        Self::Requirements,
        Self::Details,
        Self::Options,
        Self::ServiceLevel,
        Self::Eol,
    ];

    /// The field name as used in storage and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Purpose => "purpose",
            Self::Description => "description",
            Self::DescriptionInternal => "description_internal",
            Self::UsageInformation => "usage_information",
            Self::Requirements => "requirements",
            Self::Details => "details",
            Self::Options => "options",
            Self::ServiceLevel => "service_level",
            Self::Eol => "eol",
        }
    }

    /// Which markup this field supports.
    #[must_use]
    pub const fn capability(self) -> Capability {
        match self {
            Self::Purpose => Capability::Strict,
            Self::Description => Capability::StrictLinked,
            _ => Capability::Full,
        }
    }

    /// `true` for fields holding one text per language.
    #[must_use]
    pub const fn is_translated(self) -> bool {
        !matches!(self, Self::DescriptionInternal | Self::Eol)
    }
}

/// The stored value of one text field.
#[derive(Debug, Clone, Copy)]
pub enum FieldText<'a> {
    /// A translated field.
    Localized(&'a LocalizedText),
    /// A single-language field.
    Plain(Option<&'a str>),
}

impl<'a> FieldText<'a> {
    /// The text for `language`, following the fallback chain for
    /// translated fields.
    #[must_use]
    pub fn get(self, language: &str, fallbacks: &[String]) -> Option<&'a str> {
        match self {
            Self::Localized(text) => text.get(language, fallbacks),
            Self::Plain(text) => text.filter(|text| !text.trim().is_empty()),
        }
    }

    /// Every stored variant, as `(language, text)`. Plain fields have no
    /// language.
    #[must_use]
    pub fn variants(self) -> Vec<(Option<&'a str>, &'a str)> {
        match self {
            Self::Localized(text) => text.iter().map(|(lang, text)| (Some(lang), text)).collect(),
            Self::Plain(text) => text
                .filter(|text| !text.trim().is_empty())
                .map(|text| (None, text))
                .into_iter()
                .collect(),
        }
    }
}

/// A revision together with the service it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RevisionRef<'a> {
    /// The owning service.
    pub service: &'a Service,
    /// The revision itself.
    pub revision: &'a ServiceRevision,
}

impl<'a> RevisionRef<'a> {
    /// The `CATEGORY-SERVICE-VERSION` key.
    #[must_use]
    pub fn key(&self) -> RevisionKey {
        self.service.key().with_version(self.revision.version.clone())
    }

    /// The stored value of `field`.
    #[must_use]
    pub fn text(&self, field: TextField) -> FieldText<'a> {
        let revision = self.revision;
        match field {
            TextField::Purpose => FieldText::Localized(&self.service.purpose),
            TextField::Description => FieldText::Localized(&revision.description),
            TextField::UsageInformation => FieldText::Localized(&revision.usage_information),
            TextField::Requirements => FieldText::Localized(&revision.requirements),
            TextField::Details => FieldText::Localized(&revision.details),
            TextField::Options => FieldText::Localized(&revision.options),
            TextField::ServiceLevel => FieldText::Localized(&revision.service_level),
            TextField::DescriptionInternal => {
                FieldText::Plain(revision.description_internal.as_deref())
            }
            TextField::Eol => FieldText::Plain(revision.eol.as_deref()),
        }
    }
}

/// Which revisions a listing or validation pass covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Scope {
    /// Active or scheduled listing, or active or scheduled availability.
    #[default]
    Default,
    /// Revisions listed in the public catalogue.
    Catalogue,
    /// Listed and available revisions with a direct URL.
    Online,
    /// Every revision.
    All,
}

impl Scope {
    /// `true` if `revision` belongs to this scope on `today`.
    #[must_use]
    pub fn includes(self, revision: &ServiceRevision, today: NaiveDate) -> bool {
        let dates = revision.dates();
        match self {
            Self::Default => dates.in_default_scope(today),
            Self::Catalogue => dates.listing(today) == Listing::Online,
            Self::Online => {
                dates.listing(today) == Listing::Online
                    && dates.availability(today) == Availability::Available
                    && revision.url.as_deref().is_some_and(|url| !url.trim().is_empty())
            }
            Self::All => true,
        }
    }
}

/// The complete set of categories and services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    categories: Vec<Category>,
    services: Vec<Service>,
}

impl Catalogue {
    /// Builds a catalogue, sorting categories and services for listings.
    ///
    /// Entries with an `order` come first, by `order`; the rest follow by
    /// acronym.
    #[must_use]
    pub fn new(mut categories: Vec<Category>, mut services: Vec<Service>) -> Self {
        categories.sort_by(|a, b| {
            (a.order.is_none(), &a.order, &a.acronym).cmp(&(b.order.is_none(), &b.order, &b.acronym))
        });
        let category_order = |acronym: &Acronym| {
            categories
                .iter()
                .position(|category| &category.acronym == acronym)
                .unwrap_or(usize::MAX)
        };
        services.sort_by(|a, b| {
            (category_order(&a.category), a.order.is_none(), &a.order, &a.acronym).cmp(&(
                category_order(&b.category),
                b.order.is_none(),
                &b.order,
                &b.acronym,
            ))
        });
        for service in &mut services {
            service.revisions.sort_by(|a, b| a.version.cmp(&b.version));
        }
        Self {
            categories,
            services,
        }
    }

    /// All categories in listing order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All services in listing order.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Look up a category by acronym.
    #[must_use]
    pub fn category(&self, acronym: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.acronym.as_str() == acronym)
    }

    /// Every revision in listing order.
    pub fn revisions(&self) -> impl Iterator<Item = RevisionRef<'_>> {
        self.services.iter().flat_map(|service| {
            service
                .revisions
                .iter()
                .map(move |revision| RevisionRef { service, revision })
        })
    }

    /// Revisions in `scope` on `today`, in listing order.
    pub fn revisions_in(
        &self,
        scope: Scope,
        today: NaiveDate,
    ) -> impl Iterator<Item = RevisionRef<'_>> {
        self.revisions()
            .filter(move |revision| scope.includes(revision.revision, today))
    }

    /// Find a revision by its exact key, regardless of lifecycle.
    #[must_use]
    pub fn find(&self, key: &RevisionKey) -> Option<RevisionRef<'_>> {
        self.revisions().find(|revision| &revision.key() == key)
    }

    /// Find a currently listed revision by key, case-insensitively.
    ///
    /// Only fully qualified revision keys are accepted; anything else yields
    /// `None`.
    #[must_use]
    pub fn find_listed(&self, key: &str, today: NaiveDate) -> Option<RevisionRef<'_>> {
        let key: RevisionKey = key.to_uppercase().parse().ok()?;
        self.revisions().find(|revision| {
            revision.key().to_string().eq_ignore_ascii_case(&key.to_string())
                && revision.revision.dates().listing(today) == Listing::Online
        })
    }

    /// Build the key index used to resolve internal links on `today`.
    ///
    /// Service names are taken in `language` with the given fallbacks.
    #[must_use]
    pub fn index(&self, today: NaiveDate, language: &str, fallbacks: &[String]) -> RevisionKeyIndex {
        let mut index = RevisionKeyIndex::new(today);
        for revision in self.revisions() {
            index.insert(IndexedRevision {
                key: revision.key(),
                service_name: revision
                    .service
                    .name
                    .get(language, fallbacks)
                    .unwrap_or_default()
                    .to_string(),
                listed_from: revision.revision.listed_from,
                listed_until: revision.revision.listed_until,
            });
        }
        index
    }
}

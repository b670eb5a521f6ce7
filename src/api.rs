//! Read-only JSON views of the catalogue.
//!
//! Each view exposes exactly what the corresponding public page shows: the
//! online services directory only names and links services, the catalogue
//! adds descriptions, dates and the enabled optional fields. Texts are
//! returned in one language, following the configured fallback chain.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    Availability, Category, Config, Listing, LocalizedText, RevisionRef,
    lifecycle::DiscontinuationWarning,
};

/// Builds API entries for one language on one day.
#[derive(Debug, Clone, Copy)]
pub struct Api<'a> {
    config: &'a Config,
    language: &'a str,
    today: NaiveDate,
}

/// A category reference inside an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef<'a> {
    /// Display name.
    pub name: Option<&'a str>,
    /// Key segment.
    pub acronym: &'a str,
}

/// Upcoming end of availability, with a display message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// The last day of availability.
    pub available_until: NaiveDate,
    /// Days remaining.
    pub days_left: i64,
    /// Message shown next to the service.
    pub message: String,
}

impl From<DiscontinuationWarning> for Warning {
    fn from(warning: DiscontinuationWarning) -> Self {
        Self {
            available_until: warning.available_until,
            days_left: warning.days_left,
            message: warning.to_string(),
        }
    }
}

/// An entry of the online services directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineEntry<'a> {
    /// `CATEGORY-SERVICE`
    pub service_key: String,
    /// `CATEGORY-SERVICE-VERSION`
    pub revision_key: String,
    /// Service name.
    pub service_name: Option<&'a str>,
    /// Owning category.
    pub category: CategoryRef<'a>,
    /// Version segment.
    pub version: &'a str,
    /// Direct link to the service.
    pub url: Option<&'a str>,
    /// Link to the detail page.
    pub detail_url: String,
    /// Recently listed.
    pub is_new: bool,
    /// Upcoming end of availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinuation_warning: Option<Warning>,
}

/// An entry of the service catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry<'a> {
    /// `CATEGORY-SERVICE`
    pub service_key: String,
    /// `CATEGORY-SERVICE-VERSION`
    pub revision_key: String,
    /// Service name.
    pub service_name: Option<&'a str>,
    /// Service purpose.
    pub service_purpose: Option<&'a str>,
    /// Owning category.
    pub category: CategoryRef<'a>,
    /// Version segment.
    pub version: &'a str,
    /// Public description.
    pub description: Option<&'a str>,
    /// Link to the detail page.
    pub detail_url: String,
    /// Direct link to the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<&'a str>,
    /// Contact for requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<&'a str>,
    /// First day of availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    /// Last day of availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<NaiveDate>,
    /// Usage notes, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_information: Option<&'a str>,
    /// Requirements, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<&'a str>,
    /// Details, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a str>,
    /// Options, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a str>,
    /// Service level, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_level: Option<&'a str>,
    /// Listing state.
    pub listing: Listing,
    /// Availability state.
    pub availability: Availability,
    /// Recently listed.
    pub is_new: bool,
    /// Available but not publicly listed.
    pub not_publicly_listed: bool,
    /// Upcoming end of availability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinuation_warning: Option<Warning>,
}

impl<'a> Api<'a> {
    /// Creates a view builder for `language` on `today`.
    #[must_use]
    pub const fn new(config: &'a Config, language: &'a str, today: NaiveDate) -> Self {
        Self {
            config,
            language,
            today,
        }
    }

    fn text(&self, text: &'a LocalizedText) -> Option<&'a str> {
        text.get(self.language, self.config.languages())
    }

    fn category(&self, category: Option<&'a Category>, acronym: &'a str) -> CategoryRef<'a> {
        CategoryRef {
            name: category.and_then(|category| self.text(&category.name)),
            acronym,
        }
    }

    fn detail_url(&self, revision: &RevisionRef<'_>) -> String {
        format!("{}{}", self.config.detail_base, revision.key())
    }

    fn optional(&self, enabled: bool, text: &'a LocalizedText) -> Option<&'a str> {
        if enabled { self.text(text) } else { None }
    }

    /// The online services directory entry of `revision`.
    #[must_use]
    pub fn online_entry(
        &self,
        revision: RevisionRef<'a>,
        category: Option<&'a Category>,
    ) -> OnlineEntry<'a> {
        let evaluation = revision.revision.dates().evaluate(self.today, self.config.windows());
        OnlineEntry {
            service_key: revision.service.key().to_string(),
            revision_key: revision.key().to_string(),
            service_name: self.text(&revision.service.name),
            category: self.category(category, revision.service.category.as_str()),
            version: revision.revision.version.as_str(),
            url: revision.revision.url.as_deref(),
            detail_url: self.detail_url(&revision),
            is_new: evaluation.is_new,
            discontinuation_warning: evaluation.discontinuation_warning.map(Warning::from),
        }
    }

    /// The catalogue entry of `revision`.
    #[must_use]
    pub fn catalogue_entry(
        &self,
        revision: RevisionRef<'a>,
        category: Option<&'a Category>,
    ) -> CatalogueEntry<'a> {
        let service = revision.service;
        let rev = revision.revision;
        let fields = self.config.fields;
        let evaluation = rev.dates().evaluate(self.today, self.config.windows());
        CatalogueEntry {
            service_key: service.key().to_string(),
            revision_key: revision.key().to_string(),
            service_name: self.text(&service.name),
            service_purpose: self.text(&service.purpose),
            category: self.category(category, service.category.as_str()),
            version: rev.version.as_str(),
            description: self.text(&rev.description),
            detail_url: self.detail_url(&revision),
            url: rev.url.as_deref().filter(|url| !url.trim().is_empty()),
            contact: rev.contact.as_deref().filter(|contact| !contact.trim().is_empty()),
            available_from: rev.available_from,
            available_until: rev.available_until,
            usage_information: self.optional(fields.usage_information, &rev.usage_information),
            requirements: self.optional(fields.requirements, &rev.requirements),
            details: self.optional(fields.details, &rev.details),
            options: self.optional(fields.options, &rev.options),
            service_level: self.optional(fields.service_level, &rev.service_level),
            listing: evaluation.listing,
            availability: evaluation.availability,
            is_new: evaluation.is_new,
            not_publicly_listed: evaluation.not_publicly_listed,
            discontinuation_warning: evaluation.discontinuation_warning.map(Warning::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Catalogue,
        fixtures::{category, date, revision, service},
    };

    fn catalogue() -> Catalogue {
        let mut rev = revision("1.0", Some("2024-05-30"));
        rev.url = Some("https://mail.example.org".to_string());
        rev.available_until = Some(date("2024-06-20"));
        rev.details = LocalizedText::new().with("de", "Einzelheiten");
        rev.options = LocalizedText::new().with("en", "Options");
        Catalogue::new(
            vec![category("COLLAB")],
            vec![service("COLLAB", "EMAIL", vec![rev])],
        )
    }

    #[test]
    fn online_entry_flags() {
        let catalogue = catalogue();
        let config = Config::default();
        let api = Api::new(&config, "en", date("2024-06-01"));
        let revision = catalogue.revisions().next().unwrap();
        let entry = api.online_entry(revision, catalogue.category("COLLAB"));

        assert_eq!(entry.revision_key, "COLLAB-EMAIL-1.0");
        assert_eq!(entry.detail_url, "/services/COLLAB-EMAIL-1.0");
        assert!(entry.is_new);
        let warning = entry.discontinuation_warning.unwrap();
        assert_eq!(warning.days_left, 19);
        assert_eq!(
            warning.message,
            "Availability currently scheduled only until 2024-06-20."
        );
    }

    #[test]
    fn catalogue_entry_follows_language_and_field_toggles() {
        let catalogue = catalogue();
        let mut config = Config::default();
        config.fields.options = false;
        let api = Api::new(&config, "en", date("2024-06-01"));
        let revision = catalogue.revisions().next().unwrap();
        let entry = api.catalogue_entry(revision, catalogue.category("COLLAB"));

        assert_eq!(entry.details, Some("Einzelheiten"));
        assert_eq!(entry.options, None);
        assert_eq!(entry.listing, Listing::Online);
        assert!(!entry.not_publicly_listed);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["category"]["acronym"], "COLLAB");
        assert_eq!(json["listing"], "online");
        assert!(json.get("options").is_none());
    }
}

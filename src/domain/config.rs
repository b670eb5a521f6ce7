use std::path::Path;

use serde::{Deserialize, Serialize};

use super::lifecycle::Windows;

/// Configuration for a service catalogue.
///
/// Controls which languages are served and in which fallback order, the
/// lifecycle windows, where internal links point, and which optional revision
/// fields are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Language tags in fallback order. The first is the default language.
    languages: Vec<String>,

    /// Days a freshly listed revision is flagged as new.
    new_window_days: u32,

    /// Days before the end of availability that a warning is shown.
    discontinuation_window_days: u32,

    /// Prefix of revision detail links in HTML output.
    pub detail_base: String,

    /// Search page used for ambiguous internal links in HTML output.
    pub search_base: String,

    /// Which optional revision fields are published.
    pub fields: Fields,
}

/// Toggles for the optional revision fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Fields {
    /// Publish `usage_information`.
    pub usage_information: bool,
    /// Publish `requirements`.
    pub requirements: bool,
    /// Publish `details`.
    pub details: bool,
    /// Publish `options`.
    pub options: bool,
    /// Publish `service_level`.
    pub service_level: bool,
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            usage_information: true,
            requirements: true,
            details: true,
            options: true,
            service_level: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            new_window_days: default_new_window_days(),
            discontinuation_window_days: default_discontinuation_window_days(),
            detail_base: default_detail_base(),
            search_base: default_search_base(),
            fields: Fields::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The configured languages, in fallback order.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// The language used when none is requested.
    #[must_use]
    pub fn default_language(&self) -> &str {
        self.languages.first().map_or("en", String::as_str)
    }

    /// Resolves a requested language, falling back to the default language
    /// for unknown tags.
    #[must_use]
    pub fn language(&self, requested: Option<&str>) -> &str {
        requested
            .and_then(|requested| {
                self.languages
                    .iter()
                    .find(|language| language.eq_ignore_ascii_case(requested))
            })
            .map_or_else(|| self.default_language(), String::as_str)
    }

    /// The lifecycle windows.
    #[must_use]
    pub const fn windows(&self) -> Windows {
        Windows {
            new_days: self.new_window_days,
            discontinuation_days: self.discontinuation_window_days,
        }
    }

    /// Adds a language to the end of the fallback chain.
    ///
    /// Tags are normalized to lowercase. Returns `true` if the language was
    /// added, `false` if it already existed.
    pub fn add_language(&mut self, language: &str) -> bool {
        let language = language.to_lowercase();
        if self.languages.contains(&language) {
            false
        } else {
            self.languages.push(language);
            true
        }
    }
}

fn default_languages() -> Vec<String> {
    vec!["de".to_string(), "en".to_string()]
}

const fn default_new_window_days() -> u32 {
    7
}

const fn default_discontinuation_window_days() -> u32 {
    28
}

fn default_detail_base() -> String {
    "/services/".to_string()
}

fn default_search_base() -> String {
    "/services/listed/".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_languages")]
        languages: Vec<String>,

        #[serde(default = "default_new_window_days")]
        new_window_days: u32,

        #[serde(default = "default_discontinuation_window_days")]
        discontinuation_window_days: u32,

        #[serde(default = "default_detail_base")]
        detail_base: String,

        #[serde(default = "default_search_base")]
        search_base: String,

        #[serde(default)]
        fields: Fields,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                languages,
                new_window_days,
                discontinuation_window_days,
                detail_base,
                search_base,
                fields,
            } => Self {
                languages: if languages.is_empty() {
                    default_languages()
                } else {
                    languages.iter().map(|l| l.to_lowercase()).collect()
                },
                new_window_days,
                discontinuation_window_days,
                detail_base,
                search_base,
                fields,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            languages: config.languages,
            new_window_days: config.new_window_days,
            discontinuation_window_days: config.discontinuation_window_days,
            detail_base: config.detail_base,
            search_base: config.search_base,
            fields: config.fields,
        }
    }
}

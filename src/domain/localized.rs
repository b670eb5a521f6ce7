use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Text in several languages, keyed by language tag (`de`, `en`, ...).
///
/// Lookups follow a fallback chain: the requested language first, then the
/// given fallback languages in order. Empty or whitespace-only entries count
/// as missing, so a half-translated field falls through to the next
/// language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct LocalizedText(BTreeMap<String, String>);

impl From<BTreeMap<String, String>> for LocalizedText {
    fn from(texts: BTreeMap<String, String>) -> Self {
        texts.into_iter().fold(Self::new(), |text, (language, value)| text.with(language, value))
    }
}

impl From<LocalizedText> for BTreeMap<String, String> {
    fn from(text: LocalizedText) -> Self {
        text.0
    }
}

impl LocalizedText {
    /// Creates an empty text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text for one language, replacing any previous value.
    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.0.insert(language.into().to_lowercase(), text.into());
    }

    /// Adds a translation, builder style.
    #[must_use]
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(language, text);
        self
    }

    /// The text in exactly this language, if present and non-blank.
    #[must_use]
    pub fn exact(&self, language: &str) -> Option<&str> {
        self.0
            .get(&language.to_lowercase())
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    /// The text in `language`, falling back through `fallbacks` in order.
    #[must_use]
    pub fn get<'a>(&'a self, language: &str, fallbacks: &[String]) -> Option<&'a str> {
        std::iter::once(language)
            .chain(fallbacks.iter().map(String::as_str))
            .find_map(|lang| self.exact(lang))
    }

    /// All non-blank translations as `(language, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(lang, text)| (lang.as_str(), text.as_str()))
    }

    /// `true` if no language has a non-blank text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<String> {
        vec!["de".to_string(), "en".to_string()]
    }

    #[test]
    fn requested_language_wins() {
        let text = LocalizedText::new().with("de", "Hallo").with("en", "Hello");
        assert_eq!(text.get("en", &chain()), Some("Hello"));
    }

    #[test]
    fn falls_back_when_missing_or_blank() {
        let text = LocalizedText::new().with("de", "Hallo").with("en", "  ");
        assert_eq!(text.get("en", &chain()), Some("Hallo"));
        assert_eq!(text.get("fr", &chain()), Some("Hallo"));
    }

    #[test]
    fn empty_text_has_no_value() {
        let text = LocalizedText::new().with("en", "");
        assert!(text.is_empty());
        assert_eq!(text.get("en", &chain()), None);
    }

    #[test]
    fn language_tags_are_case_insensitive() {
        let text = LocalizedText::new().with("EN", "Hello");
        assert_eq!(text.exact("en"), Some("Hello"));
    }

    #[test]
    fn deserializes_from_a_mapping() {
        let text: LocalizedText = serde_yaml::from_str("de: Hallo\nEN: Hello\n").unwrap();
        assert_eq!(text.exact("de"), Some("Hallo"));
        assert_eq!(text.exact("en"), Some("Hello"));
        assert_eq!(text.iter().count(), 2);
    }
}

use std::{cmp::Ordering, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// The character joining category, service and version components of a
/// composite key.
pub const KEY_SEPARATOR: char = '-';

/// Returns `true` if the string contains the hierarchy separator.
#[must_use]
pub fn has_separator(s: &str) -> bool {
    s.contains(KEY_SEPARATOR)
}

/// A validated acronym used as a key segment.
///
/// Acronyms are non-empty and contain neither the key separator nor
/// whitespace, so joining them with [`KEY_SEPARATOR`] is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Acronym(NonEmptyString);

impl Acronym {
    /// Creates a new `Acronym` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAcronymError` if the string is empty or contains the
    /// key separator or whitespace.
    pub fn new(s: String) -> Result<Self, InvalidAcronymError> {
        if s.contains(KEY_SEPARATOR) || s.chars().any(char::is_whitespace) {
            return Err(InvalidAcronymError(s));
        }
        let non_empty = NonEmptyString::new(s).map_err(InvalidAcronymError)?;
        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Acronym {
    type Error = InvalidAcronymError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Acronym {
    type Error = InvalidAcronymError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<Acronym> for String {
    fn from(acronym: Acronym) -> Self {
        acronym.0.as_str().to_string()
    }
}

impl AsRef<str> for Acronym {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Acronym {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for Acronym {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Acronym {
    type Err = InvalidAcronymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a string is not a valid acronym.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid acronym '{0}': must be non-empty and contain neither '-' nor whitespace"
)]
pub struct InvalidAcronymError(String);

/// Key of a service: `{CATEGORY}-{SERVICE}`.
///
/// Examples: `COLLAB-EMAIL`, `COMPUTE-HPC`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServiceKey {
    category: Acronym,
    service: Acronym,
}

impl ServiceKey {
    /// Create a service key from pre-validated acronyms.
    #[must_use]
    pub const fn new(category: Acronym, service: Acronym) -> Self {
        Self { category, service }
    }

    /// Returns the category acronym.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the service acronym.
    #[must_use]
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Extend this key with a version, producing the key of one revision.
    #[must_use]
    pub fn with_version(&self, version: Version) -> RevisionKey {
        RevisionKey {
            service: self.clone(),
            version,
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.category, self.service)
    }
}

impl FromStr for ServiceKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((category, service)) = s.split_once(KEY_SEPARATOR) else {
            return Err(KeyError::Syntax(s.to_string()));
        };
        if has_separator(service) {
            return Err(KeyError::Syntax(s.to_string()));
        }
        Ok(Self::new(category.parse()?, service.parse()?))
    }
}

/// The version segment of a revision key.
///
/// Versions are free-form (`1.0`, `v2.1`, `2024-beta`) but must be non-empty
/// and contain no whitespace.
///
/// Versions order by their digit runs numerically and everything else
/// lexically, so `9.0 < 10.0` and `1.0-beta < 1.0-rc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(NonEmptyString);

/// A run of digits or of non-digits within a version.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    /// Leading zeros stripped; a longer run is a larger number.
    Number { digits: usize, value: &'a str },
    Text(&'a str),
}

fn segments(version: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = version;
    while let Some(first) = rest.chars().next() {
        let numeric = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        segments.push(if numeric {
            let value = run.trim_start_matches('0');
            Segment::Number {
                digits: value.len(),
                value,
            }
        } else {
            Segment::Text(run)
        });
        rest = tail;
    }
    segments
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        segments(self.as_str())
            .cmp(&segments(other.as_str()))
            .then_with(|| self.as_str().cmp(other.as_str()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Version {
    /// Creates a new `Version`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Version`] if the string is empty or contains
    /// whitespace.
    pub fn new(s: String) -> Result<Self, KeyError> {
        if s.chars().any(char::is_whitespace) {
            return Err(KeyError::Version(s));
        }
        NonEmptyString::new(s).map(Self).map_err(KeyError::Version)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Version {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0.as_str().to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a service revision: `{CATEGORY}-{SERVICE}-{VERSION}`.
///
/// The version is everything after the second separator, so versions may
/// themselves contain `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RevisionKey {
    service: ServiceKey,
    version: Version,
}

impl RevisionKey {
    /// Returns the key of the service this revision belongs to.
    #[must_use]
    pub const fn service_key(&self) -> &ServiceKey {
        &self.service
    }

    /// Returns the version segment.
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.as_str()
    }
}

impl fmt::Display for RevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.service, self.version)
    }
}

impl FromStr for RevisionKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, KEY_SEPARATOR);
        let (Some(category), Some(service), Some(version)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(KeyError::Syntax(s.to_string()));
        };
        let service = ServiceKey::new(category.parse()?, service.parse()?);
        Ok(service.with_version(Version::new(version.to_string())?))
    }
}

/// Errors that can occur while parsing composite keys.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    /// Wrong number of segments.
    #[error("Invalid key format: {0}")]
    Syntax(String),

    /// Empty or whitespace-containing version.
    #[error("Invalid version '{0}': must be non-empty and contain no whitespace")]
    Version(String),

    /// Invalid category or service acronym.
    #[error(transparent)]
    Acronym(#[from] InvalidAcronymError),
}

/// Sanitize a key for use inside a LaTeX label.
///
/// Characters outside `[a-zA-Z0-9.:-]` become `-`; the result is lowercased
/// and stripped of leading and trailing `-`.
#[must_use]
pub fn sanitize_label(key: &str) -> String {
    let replaced: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    replaced.trim_matches('-').to_string()
}

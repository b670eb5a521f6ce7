//! Lifecycle evaluation for service revisions.
//!
//! Every state here is derived from a revision's dates and an injected
//! `today`; nothing is stored and nothing reads the system clock. Callers
//! pass [`chrono::Local::now`]-derived dates at the edges.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Public listing state of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    /// Not yet listed: no `listed_from`, or `listed_from` in the future.
    Draft,
    /// Listed in the public catalogue.
    Online,
    /// `listed_until` has been reached.
    Retired,
}

/// Availability of a revision to entitled users, independent of listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No `available_from`, or `available_from` in the future.
    NotYetAvailable,
    /// Usable today.
    Available,
    /// `available_until` has been reached.
    Ended,
}

/// Classify the listing state of a revision.
///
/// `listed_until <= today` wins over everything else, so a revision whose
/// listing ended is retired even when `listed_from` is missing.
#[must_use]
pub fn classify(
    listed_from: Option<NaiveDate>,
    listed_until: Option<NaiveDate>,
    today: NaiveDate,
) -> Listing {
    if listed_until.is_some_and(|until| until <= today) {
        return Listing::Retired;
    }
    match listed_from {
        Some(from) if from <= today => Listing::Online,
        _ => Listing::Draft,
    }
}

/// Classify the availability of a revision.
#[must_use]
pub fn classify_availability(
    available_from: Option<NaiveDate>,
    available_until: Option<NaiveDate>,
    today: NaiveDate,
) -> Availability {
    if available_until.is_some_and(|until| until <= today) {
        return Availability::Ended;
    }
    match available_from {
        Some(from) if from <= today => Availability::Available,
        _ => Availability::NotYetAvailable,
    }
}

/// Window sizes for the time-relative flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    /// How many days a freshly listed revision counts as new.
    pub new_days: u32,
    /// How many days ahead of `available_until` a warning is shown.
    pub discontinuation_days: u32,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            new_days: 7,
            discontinuation_days: 28,
        }
    }
}

/// `true` if the revision is online and was listed within the last
/// `window_days` days, inclusive.
#[must_use]
pub fn is_new(
    listed_from: Option<NaiveDate>,
    listed_until: Option<NaiveDate>,
    today: NaiveDate,
    window_days: u32,
) -> bool {
    if classify(listed_from, listed_until, today) != Listing::Online {
        return false;
    }
    listed_from.is_some_and(|from| from >= today - Duration::days(i64::from(window_days)))
}

/// A notice that a revision stops being available soon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscontinuationWarning {
    /// The last day of availability.
    pub available_until: NaiveDate,
    /// Days remaining until `available_until`.
    pub days_left: i64,
}

impl fmt::Display for DiscontinuationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Availability currently scheduled only until {}.",
            self.available_until
        )
    }
}

/// Returns a warning when `available_until` falls between `today` and
/// `today + window_days`, both inclusive.
#[must_use]
pub fn discontinuation_warning(
    available_until: Option<NaiveDate>,
    today: NaiveDate,
    window_days: u32,
) -> Option<DiscontinuationWarning> {
    let until = available_until?;
    let horizon = today + Duration::days(i64::from(window_days));
    (until >= today && until <= horizon).then(|| DiscontinuationWarning {
        available_until: until,
        days_left: (until - today).num_days(),
    })
}

/// `true` if a revision is usable today but not publicly listed.
#[must_use]
pub fn not_publicly_listed(listing: Listing, availability: Availability) -> bool {
    availability == Availability::Available && listing != Listing::Online
}

/// The date fields of a revision that drive its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dates {
    /// First day of public listing.
    pub listed_from: Option<NaiveDate>,
    /// Day public listing ends.
    pub listed_until: Option<NaiveDate>,
    /// First day of availability.
    pub available_from: Option<NaiveDate>,
    /// Day availability ends.
    pub available_until: Option<NaiveDate>,
}

impl Dates {
    /// Listing state on `today`.
    #[must_use]
    pub fn listing(&self, today: NaiveDate) -> Listing {
        classify(self.listed_from, self.listed_until, today)
    }

    /// Availability on `today`.
    #[must_use]
    pub fn availability(&self, today: NaiveDate) -> Availability {
        classify_availability(self.available_from, self.available_until, today)
    }

    /// Compute every derived flag at once.
    #[must_use]
    pub fn evaluate(&self, today: NaiveDate, windows: Windows) -> Evaluation {
        let listing = self.listing(today);
        let availability = self.availability(today);
        Evaluation {
            listing,
            availability,
            is_new: is_new(self.listed_from, self.listed_until, today, windows.new_days),
            discontinuation_warning: discontinuation_warning(
                self.available_until,
                today,
                windows.discontinuation_days,
            ),
            not_publicly_listed: not_publicly_listed(listing, availability),
        }
    }

    /// Whether the revision belongs to the default working scope.
    ///
    /// That is a listing which is active or scheduled, or an availability
    /// which is active or scheduled. Revisions without any dates and
    /// revisions whose end dates have both passed are out of scope.
    #[must_use]
    pub fn in_default_scope(&self, today: NaiveDate) -> bool {
        let active_or_future = |from: Option<NaiveDate>, until: Option<NaiveDate>| {
            from.is_some() && until.is_none_or(|until| until >= today)
        };
        active_or_future(self.listed_from, self.listed_until)
            || active_or_future(self.available_from, self.available_until)
    }

    /// Check the consistency rules between the date fields.
    ///
    /// `has_eol_note` reports whether the revision says what happens at end
    /// of life; it is required once `available_until` is set.
    ///
    /// # Errors
    ///
    /// Returns the first [`DateError`] found.
    pub fn validate(&self, has_eol_note: bool) -> Result<(), DateError> {
        match (self.listed_from, self.listed_until) {
            (None, Some(_)) => return Err(DateError::ListedUntilWithoutFrom),
            (Some(from), Some(until)) if until < from => {
                return Err(DateError::ListedUntilBeforeFrom);
            }
            _ => {}
        }
        if self.listed_until.is_some() && self.available_until.is_none() {
            return Err(DateError::ListedUntilWithoutAvailableUntil);
        }
        if self.available_until.is_some() && !has_eol_note {
            return Err(DateError::MissingEolNote);
        }
        match (self.available_from, self.available_until) {
            (None, Some(_)) => Err(DateError::AvailableUntilWithoutFrom),
            (Some(from), Some(until)) if until < from => Err(DateError::AvailableUntilBeforeFrom),
            _ => Ok(()),
        }
    }

    /// Editorial status of the listing, distinguishing submitted drafts.
    #[must_use]
    pub fn listing_status(&self, submitted: bool, today: NaiveDate) -> ListingStatus {
        match (self.listed_from, self.listed_until) {
            (None, _) if submitted => ListingStatus::Submitted,
            (None, _) => ListingStatus::NotSubmitted,
            (Some(from), _) if from > today => ListingStatus::Scheduled(from),
            (_, Some(until)) if until <= today => ListingStatus::Delisted(until),
            _ => ListingStatus::Listed,
        }
    }

    /// Status of availability, including a known end of life.
    #[must_use]
    pub fn availability_status(&self, today: NaiveDate) -> AvailabilityStatus {
        match (self.available_from, self.available_until) {
            (None, _) => AvailabilityStatus::NotScheduled,
            (Some(from), _) if from > today => AvailabilityStatus::Scheduled(from),
            (_, Some(until)) if until <= today => AvailabilityStatus::Ended(until),
            (_, Some(until)) => AvailabilityStatus::AvailableUntil(until),
            (_, None) => AvailabilityStatus::Available,
        }
    }
}

/// All lifecycle information derived for one revision on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Listing state.
    pub listing: Listing,
    /// Availability state.
    pub availability: Availability,
    /// Recently listed.
    pub is_new: bool,
    /// Upcoming end of availability, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinuation_warning: Option<DiscontinuationWarning>,
    /// Available but not listed.
    pub not_publicly_listed: bool,
}

/// Editorial listing status, displayed with a sortable numeric prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ListingStatus {
    /// No listing date and not submitted for review.
    NotSubmitted,
    /// Submitted for review, no listing date yet.
    Submitted,
    /// Listing starts on the given date.
    Scheduled(NaiveDate),
    /// Currently listed.
    Listed,
    /// No longer listed since the given date.
    Delisted(NaiveDate),
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSubmitted => write!(f, "0-not yet submitted"),
            Self::Submitted => write!(f, "1-submitted but not yet scheduled"),
            Self::Scheduled(date) => write!(f, "2-listing at {date}"),
            Self::Listed => write!(f, "3-currently listed"),
            Self::Delisted(date) => write!(f, "4-not more listed since {date}"),
        }
    }
}

/// Availability status, displayed with a sortable numeric prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AvailabilityStatus {
    /// No availability date set.
    NotScheduled,
    /// Available from the given date.
    Scheduled(NaiveDate),
    /// Available, end of life unknown.
    Available,
    /// Available with a known end of life.
    AvailableUntil(NaiveDate),
    /// No longer available since the given date.
    Ended(NaiveDate),
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotScheduled => write!(f, "0-availability not scheduled"),
            Self::Scheduled(date) => write!(f, "1-available at {date}"),
            Self::Available => write!(f, "2-available, EOL unknown"),
            Self::AvailableUntil(date) => write!(f, "3-available, EOL {date}"),
            Self::Ended(date) => write!(f, "4-not more available since {date}"),
        }
    }
}

/// Inconsistent revision dates, reported to content authors.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DateError {
    /// `listed_until` without `listed_from`.
    #[error(
        "If \"listed until\" is set please also indicate \"listed from\". Alternatively remove \"listed until\"."
    )]
    ListedUntilWithoutFrom,

    /// `listed_until` earlier than `listed_from`.
    #[error("\"listed until\" cannot be earlier than \"listed from\".")]
    ListedUntilBeforeFrom,

    /// `listed_until` without `available_until`.
    #[error(
        "If setting \"listed until\" please also indicate end of availability of service (\"available until\")."
    )]
    ListedUntilWithoutAvailableUntil,

    /// `available_until` without an end-of-life note.
    #[error("Please indicate what to do at EOL with remaining users (if any) in the EOL field.")]
    MissingEolNote,

    /// `available_until` without `available_from`.
    #[error(
        "If \"available until\" is set please also indicate \"available from\". Alternatively remove \"available until\"."
    )]
    AvailableUntilWithoutFrom,

    /// `available_until` earlier than `available_from`.
    #[error("\"available until\" cannot be earlier than \"available from\".")]
    AvailableUntilBeforeFrom,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn opt(s: &str) -> Option<NaiveDate> {
        Some(date(s))
    }

    #[test_case(None, None, "2024-06-01", Listing::Draft; "no dates")]
    #[test_case(opt("2024-07-01"), None, "2024-06-01", Listing::Draft; "future listing")]
    #[test_case(opt("2024-06-01"), None, "2024-06-01", Listing::Online; "listed today")]
    #[test_case(opt("2024-01-01"), opt("2024-06-02"), "2024-06-01", Listing::Online; "until tomorrow")]
    #[test_case(opt("2024-01-01"), opt("2024-06-01"), "2024-06-01", Listing::Retired; "until today")]
    #[test_case(None, opt("2024-05-01"), "2024-06-01", Listing::Retired; "until without from")]
    #[test_case(opt("2024-09-01"), opt("2024-05-01"), "2024-06-01", Listing::Retired; "until wins over future from")]
    fn listing_classification(
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
        today: &str,
        expected: Listing,
    ) {
        assert_eq!(classify(from, until, date(today)), expected);
    }

    #[test]
    fn classification_is_total_over_a_grid() {
        let today = date("2024-06-01");
        let candidates = [
            None,
            opt("2024-05-31"),
            opt("2024-06-01"),
            opt("2024-06-02"),
        ];
        for from in candidates {
            for until in candidates {
                let listing = classify(from, until, today);
                if until.is_some_and(|u| u <= today) {
                    assert_eq!(listing, Listing::Retired);
                } else if from.is_some_and(|f| f <= today) {
                    assert_eq!(listing, Listing::Online);
                } else {
                    assert_eq!(listing, Listing::Draft);
                }
            }
        }
    }

    #[test_case(None, None, Availability::NotYetAvailable)]
    #[test_case(opt("2024-01-01"), None, Availability::Available)]
    #[test_case(opt("2024-01-01"), opt("2024-06-01"), Availability::Ended)]
    #[test_case(opt("2024-01-01"), opt("2024-06-30"), Availability::Available)]
    #[test_case(opt("2024-06-02"), None, Availability::NotYetAvailable)]
    fn availability_classification(
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
        expected: Availability,
    ) {
        assert_eq!(
            classify_availability(from, until, date("2024-06-01")),
            expected
        );
    }

    #[test_case("2024-06-01", true; "listed today")]
    #[test_case("2024-05-25", true; "exactly seven days ago")]
    #[test_case("2024-05-24", false; "eight days ago")]
    #[test_case("2024-06-02", false; "not yet online")]
    fn new_flag(listed_from: &str, expected: bool) {
        assert_eq!(
            is_new(opt(listed_from), None, date("2024-06-01"), 7),
            expected
        );
    }

    #[test]
    fn retired_revision_is_never_new() {
        assert!(!is_new(
            opt("2024-05-30"),
            opt("2024-06-01"),
            date("2024-06-01"),
            7
        ));
    }

    #[test_case(None, None; "no end date")]
    #[test_case(opt("2024-05-31"), None; "already past")]
    #[test_case(opt("2024-06-30"), None; "beyond four weeks")]
    #[test_case(opt("2024-06-01"), Some(0); "ends today")]
    #[test_case(opt("2024-06-29"), Some(28); "last day of window")]
    fn discontinuation(until: Option<NaiveDate>, days_left: Option<i64>) {
        let warning = discontinuation_warning(until, date("2024-06-01"), 28);
        assert_eq!(warning.map(|w| w.days_left), days_left);
    }

    #[test]
    fn online_and_available_is_publicly_listed() {
        let dates = Dates {
            listed_from: opt("2024-01-01"),
            available_from: opt("2024-01-01"),
            ..Dates::default()
        };
        let evaluation = dates.evaluate(date("2024-06-01"), Windows::default());
        assert_eq!(evaluation.listing, Listing::Online);
        assert!(!evaluation.not_publicly_listed);
        assert!(!evaluation.is_new);
    }

    #[test]
    fn available_draft_is_not_publicly_listed() {
        let dates = Dates {
            available_from: opt("2024-01-01"),
            ..Dates::default()
        };
        let evaluation = dates.evaluate(date("2024-06-01"), Windows::default());
        assert_eq!(evaluation.listing, Listing::Draft);
        assert_eq!(evaluation.availability, Availability::Available);
        assert!(evaluation.not_publicly_listed);
    }

    #[test]
    fn default_scope() {
        let today = date("2024-06-01");
        assert!(!Dates::default().in_default_scope(today));

        let scheduled = Dates {
            listed_from: opt("2024-09-01"),
            ..Dates::default()
        };
        assert!(scheduled.in_default_scope(today));

        let retired = Dates {
            listed_from: opt("2023-01-01"),
            listed_until: opt("2024-01-01"),
            available_from: opt("2023-01-01"),
            available_until: opt("2024-02-01"),
        };
        assert!(!retired.in_default_scope(today));

        let ending_today = Dates {
            available_from: opt("2023-01-01"),
            available_until: opt("2024-06-01"),
            ..Dates::default()
        };
        assert!(ending_today.in_default_scope(today));
    }

    #[test]
    fn validation_rules() {
        let until_without_from = Dates {
            listed_until: opt("2024-01-01"),
            ..Dates::default()
        };
        assert_eq!(
            until_without_from.validate(true),
            Err(DateError::ListedUntilWithoutFrom)
        );

        let reversed = Dates {
            listed_from: opt("2024-02-01"),
            listed_until: opt("2024-01-01"),
            ..Dates::default()
        };
        assert_eq!(reversed.validate(true), Err(DateError::ListedUntilBeforeFrom));

        let no_eol = Dates {
            listed_from: opt("2024-01-01"),
            listed_until: opt("2024-03-01"),
            available_from: opt("2024-01-01"),
            available_until: opt("2024-04-01"),
        };
        assert_eq!(no_eol.validate(false), Err(DateError::MissingEolNote));
        assert_eq!(no_eol.validate(true), Ok(()));

        let listed_until_only = Dates {
            listed_from: opt("2024-01-01"),
            listed_until: opt("2024-03-01"),
            ..Dates::default()
        };
        assert_eq!(
            listed_until_only.validate(true),
            Err(DateError::ListedUntilWithoutAvailableUntil)
        );
    }

    #[test]
    fn status_descriptions_sort_by_prefix() {
        let today = date("2024-06-01");
        let draft = Dates::default();
        assert_eq!(
            draft.listing_status(false, today).to_string(),
            "0-not yet submitted"
        );
        assert_eq!(
            draft.listing_status(true, today).to_string(),
            "1-submitted but not yet scheduled"
        );

        let listed = Dates {
            listed_from: opt("2024-01-01"),
            available_from: opt("2024-01-01"),
            available_until: opt("2024-12-31"),
            ..Dates::default()
        };
        assert_eq!(listed.listing_status(false, today), ListingStatus::Listed);
        assert_eq!(
            listed.availability_status(today).to_string(),
            "3-available, EOL 2024-12-31"
        );
    }
}

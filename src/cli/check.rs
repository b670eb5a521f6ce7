use std::{collections::BTreeMap, path::PathBuf};

use catalogue::{
    Capability, RevisionKeyIndex, TextField,
    domain::{RevisionRef, Scope},
    markup::{
        LinkKind, classify_internal_link,
        detect::{Markup, extract_internal_links, extract_urls, unsupported_markup},
    },
};
use chrono::NaiveDate;
use clap::Parser;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{Colorize, Tone};

#[derive(Debug, Parser)]
#[command(about = "Check URLs, internal links, strict-field markup and revision dates")]
pub struct Check {
    /// Check every revision, not only active and scheduled ones
    #[arg(long)]
    all_services: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

/// Where a URL or link was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
struct Location {
    key: String,
    field: String,
}

#[derive(Debug, Clone, Serialize)]
struct LinkFinding {
    #[serde(flatten)]
    location: Location,
    reference: String,
    kind: LinkKind,
    matches: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MarkupFinding {
    #[serde(flatten)]
    location: Location,
    markup: Vec<Markup>,
}

#[derive(Debug, Clone, Serialize)]
struct DateFinding {
    key: String,
    message: String,
}

/// What one revision contributes to the report.
#[derive(Debug, Default)]
struct RevisionReport {
    urls: Vec<(String, Location)>,
    links: Vec<LinkFinding>,
    markup: Vec<MarkupFinding>,
    dates: Vec<DateFinding>,
}

#[derive(Debug, Default, Serialize)]
struct CheckResult {
    revisions: usize,
    urls: BTreeMap<String, Vec<Location>>,
    links: Vec<LinkFinding>,
    markup: Vec<MarkupFinding>,
    dates: Vec<DateFinding>,
}

impl CheckResult {
    fn collect(revisions: &[RevisionRef<'_>], index: &RevisionKeyIndex) -> Self {
        let reports: Vec<RevisionReport> = revisions
            .par_iter()
            .map(|revision| check_revision(revision, index))
            .collect();

        let mut result = Self {
            revisions: revisions.len(),
            ..Self::default()
        };
        for report in reports {
            for (url, location) in report.urls {
                result.urls.entry(url).or_default().push(location);
            }
            result.links.extend(report.links);
            result.markup.extend(report.markup);
            result.dates.extend(report.dates);
        }
        result.markup.extend(check_purposes(revisions));
        result.markup.sort_by(|a, b| a.location.cmp(&b.location));
        result
    }

    /// Only broken links fail a check; everything else is a warning.
    fn failed(&self) -> bool {
        self.count(LinkKind::Broken) > 0
    }

    fn count(&self, kind: LinkKind) -> usize {
        self.links.iter().filter(|link| link.kind == kind).count()
    }

    fn broken(&self) -> impl Iterator<Item = &LinkFinding> {
        self.links.iter().filter(|link| link.kind == LinkKind::Broken)
    }

    fn soft(&self) -> impl Iterator<Item = &LinkFinding> {
        self.links.iter().filter(|link| link.kind == LinkKind::Soft)
    }

    fn url_references(&self) -> usize {
        self.urls.values().map(Vec::len).sum()
    }

    fn warnings(&self) -> usize {
        self.count(LinkKind::Soft) + self.markup.len() + self.dates.len()
    }
}

/// Fields whose URLs are auto-linked.
const URL_FIELDS: [TextField; 7] = [
    TextField::DescriptionInternal,
    TextField::UsageInformation,
    TextField::Requirements,
    TextField::Details,
    TextField::Options,
    TextField::ServiceLevel,
    TextField::Eol,
];

/// Fields whose `[[...]]` references are resolved.
const LINK_FIELDS: [TextField; 8] = [
    TextField::DescriptionInternal,
    TextField::Description,
    TextField::UsageInformation,
    TextField::Requirements,
    TextField::Details,
    TextField::Options,
    TextField::ServiceLevel,
    TextField::Eol,
];

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalogue = directory.catalogue();
        let config = directory.config();

        let scope = if self.all_services {
            Scope::All
        } else {
            Scope::Default
        };
        let revisions: Vec<RevisionRef<'_>> = catalogue.revisions_in(scope, today).collect();
        tracing::info!("Checking {} revisions ({scope:?} scope)", revisions.len());

        let index = catalogue.index(today, config.default_language(), config.languages());

        let result = CheckResult::collect(&revisions, &index);

        match self.output {
            OutputFormat::Table => self.output_table(&result),
            OutputFormat::Json => Self::output_json(&result)?,
            OutputFormat::Summary => Self::output_summary(&result),
        }

        if result.failed() {
            std::process::exit(1);
        }

        Ok(())
    }

    fn output_table(&self, result: &CheckResult) {
        if self.quiet {
            return;
        }

        println!("Checking {} revisions...\n", result.revisions);

        println!(
            "✓ URLs:       {} unique URLs in {} references (reachability not tested)",
            result.urls.len(),
            result.url_references()
        );
        for (url, locations) in &result.urls {
            println!("    {url}");
            for location in locations {
                println!("{}", format!("      {} · {}", location.key, location.field).dim());
            }
        }

        let broken = result.count(LinkKind::Broken);
        if broken == 0 {
            println!(
                "✓ Links:      {} references, none broken",
                result.links.len()
            );
        } else {
            println!(
                "{}",
                format!("✗ Links:      {broken} broken references").error()
            );
            for link in result.broken() {
                print_link(link);
            }
        }

        let soft = result.count(LinkKind::Soft);
        if soft > 0 {
            println!(
                "{}",
                format!("⚠ Soft links: {soft} references without key separator, not validated")
                    .warning()
            );
            for link in result.soft() {
                print_link(link);
            }
        }

        if result.markup.is_empty() {
            println!("✓ Markup:     No unsupported markup in strict fields");
        } else {
            println!(
                "{}",
                format!("⚠ Markup:     {} fields with unsupported markup", result.markup.len())
                    .warning()
            );
            for finding in &result.markup {
                let markup: Vec<String> = finding.markup.iter().map(ToString::to_string).collect();
                println!(
                    "    {} · {}: {}",
                    finding.location.key,
                    finding.location.field,
                    markup.join(", ")
                );
            }
        }

        if result.dates.is_empty() {
            println!("✓ Dates:      All revision dates consistent");
        } else {
            println!(
                "{}",
                format!("⚠ Dates:      {} revisions with inconsistent dates", result.dates.len())
                    .warning()
            );
            for finding in &result.dates {
                println!("    {}: {}", finding.key, finding.message);
            }
        }

        if broken == 0 {
            let warnings = result.warnings();
            if warnings == 0 {
                println!("\n{}", "All links valid, no warnings".success());
            } else {
                println!(
                    "\n{}",
                    format!("All links valid ({warnings} warnings)").success()
                );
            }
        } else {
            println!(
                "\n{}",
                format!("Summary: {broken} broken internal links").error()
            );
            println!(
                "{}",
                "Broken links point at keys without a listed revision; fix the key or list the revision"
                    .dim()
            );
        }
    }

    fn output_json(result: &CheckResult) -> anyhow::Result<()> {
        use serde_json::json;

        let broken = result.count(LinkKind::Broken);
        let output = json!({
            "status": if broken == 0 { "ok" } else { "broken_links" },
            "revisions": result.revisions,
            "urls": result.urls,
            "links": result.links,
            "markup": result.markup,
            "dates": result.dates,
            "summary": {
                "unique_urls": result.urls.len(),
                "url_references": result.url_references(),
                "links": result.links.len(),
                "broken": broken,
                "multi": result.count(LinkKind::Multi),
                "unique": result.count(LinkKind::Unique),
                "soft": result.count(LinkKind::Soft),
                "warnings": result.warnings(),
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(result: &CheckResult) {
        println!(
            "broken={} soft={} markup={} dates={}",
            result.count(LinkKind::Broken),
            result.count(LinkKind::Soft),
            result.markup.len(),
            result.dates.len()
        );
    }
}

fn print_link(link: &LinkFinding) {
    let tone = Tone::from(link.kind);
    println!(
        "    {} {}  {} · {}",
        tone.marker(),
        tone.paint(&format!("[[{}]]", link.reference)),
        link.location.key,
        link.location.field
    );
}

fn check_revision(revision: &RevisionRef<'_>, index: &RevisionKeyIndex) -> RevisionReport {
    let key = revision.key().to_string();
    let location = |field: String| Location {
        key: key.clone(),
        field,
    };
    let mut report = RevisionReport::default();

    if let Some(url) = revision.revision.url.as_deref() {
        let url = url.trim();
        if !url.is_empty() {
            report.urls.push((url.to_string(), location("url".to_string())));
        }
    }
    for field in URL_FIELDS {
        for (label, text) in super::field_variants(revision, field) {
            for url in extract_urls(text, field.capability()) {
                report.urls.push((url, location(label.clone())));
            }
        }
    }

    for field in LINK_FIELDS {
        for (label, text) in super::field_variants(revision, field) {
            for reference in extract_internal_links(text, field.capability()) {
                let resolution = classify_internal_link(&reference, index);
                report.links.push(LinkFinding {
                    location: location(label.clone()),
                    kind: resolution.kind(),
                    matches: resolution.match_count(),
                    reference,
                });
            }
        }
    }

    for (label, text) in super::field_variants(revision, TextField::Description) {
        let markup = unsupported_markup(text, TextField::Description.capability());
        if !markup.is_empty() {
            report.markup.push(MarkupFinding {
                location: location(label),
                markup,
            });
        }
    }

    if let Err(error) = revision
        .revision
        .dates()
        .validate(revision.revision.has_eol_note())
    {
        report.dates.push(DateFinding {
            key: key.clone(),
            message: error.to_string(),
        });
    }

    report
}

/// Purposes belong to services; each service in scope is checked once.
fn check_purposes(revisions: &[RevisionRef<'_>]) -> Vec<MarkupFinding> {
    let mut seen = BTreeMap::new();
    for revision in revisions {
        seen.entry(revision.service.key().to_string())
            .or_insert(*revision);
    }
    let mut findings = Vec::new();
    for (key, revision) in seen {
        for (label, text) in super::field_variants(&revision, TextField::Purpose) {
            let markup = unsupported_markup(text, Capability::Strict);
            if !markup.is_empty() {
                findings.push(MarkupFinding {
                    location: Location {
                        key: key.clone(),
                        field: label,
                    },
                    markup,
                });
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use catalogue::{
        Catalogue,
        domain::{DateError, LocalizedText, Service},
    };

    use super::*;
    use crate::cli::fixtures::{date, revision, service};

    fn catalogue() -> Catalogue {
        let mut first = revision("1.0", "2024-01-01");
        first.url = Some("https://mail.example.org".to_string());
        first.description = LocalizedText::new().with("en", "Use **IMAP**");
        first.available_until = Some(date("2024-12-31"));

        let mut second = revision("2.0", "2024-03-01");
        second.details = LocalizedText::new().with(
            "en",
            "See [[COLLAB-WIKI]], [[COLLAB-NOPE]] and [[mail]] at https://docs.example.org.",
        );

        let mut email = service("COLLAB", "EMAIL", vec![first, second]);
        email.purpose = LocalizedText::new().with("en", "**Mail** for everyone");
        let wiki = service("COLLAB", "WIKI", vec![revision("1.0", "2024-01-01")]);

        Catalogue::new(Vec::new(), vec![email, wiki])
    }

    fn check(catalogue: &Catalogue) -> CheckResult {
        let today = date("2024-06-01");
        let index = catalogue.index(today, "en", &["en".to_string()]);
        let revisions: Vec<_> = catalogue.revisions_in(Scope::All, today).collect();
        CheckResult::collect(&revisions, &index)
    }

    fn link<'a>(result: &'a CheckResult, reference: &str) -> &'a LinkFinding {
        result
            .links
            .iter()
            .find(|link| link.reference == reference)
            .unwrap()
    }

    #[test]
    fn links_are_classified_per_reference() {
        let catalogue = catalogue();
        let result = check(&catalogue);

        assert_eq!(result.revisions, 3);
        assert_eq!(result.links.len(), 3);
        assert_eq!(link(&result, "COLLAB-WIKI").kind, LinkKind::Unique);
        assert_eq!(link(&result, "COLLAB-NOPE").kind, LinkKind::Broken);
        assert_eq!(link(&result, "mail").kind, LinkKind::Soft);
        assert_eq!(link(&result, "COLLAB-NOPE").location.key, "COLLAB-EMAIL-2.0");
        assert_eq!(link(&result, "COLLAB-NOPE").location.field, "details (en)");
    }

    #[test]
    fn broken_links_fail_the_check() {
        assert!(check(&catalogue()).failed());
    }

    #[test]
    fn soft_links_and_markup_only_warn() {
        let services: Vec<Service> = catalogue()
            .services()
            .iter()
            .cloned()
            .map(|mut service| {
                for revision in &mut service.revisions {
                    revision.details =
                        LocalizedText::new().with("en", "See [[mail]] or [[COLLAB-WIKI]]");
                }
                service
            })
            .collect();
        let catalogue = Catalogue::new(Vec::new(), services);
        let result = check(&catalogue);

        assert!(!result.failed());
        assert_eq!(result.count(LinkKind::Soft), 3);
        assert_eq!(result.count(LinkKind::Unique), 3);
        assert_eq!(result.markup.len(), 2);
        assert_eq!(result.dates.len(), 1);
        assert_eq!(result.warnings(), 6);
    }

    #[test]
    fn strict_fields_report_markup() {
        let catalogue = catalogue();
        let result = check(&catalogue);

        let findings: Vec<(&str, &str, &[Markup])> = result
            .markup
            .iter()
            .map(|finding| {
                (
                    finding.location.key.as_str(),
                    finding.location.field.as_str(),
                    finding.markup.as_slice(),
                )
            })
            .collect();
        assert_eq!(
            findings,
            [
                ("COLLAB-EMAIL", "purpose (en)", &[Markup::Bold][..]),
                ("COLLAB-EMAIL-1.0", "description (en)", &[Markup::Bold][..]),
            ]
        );
    }

    #[test]
    fn inconsistent_dates_are_reported() {
        let catalogue = catalogue();
        let result = check(&catalogue);

        assert_eq!(result.dates.len(), 1);
        assert_eq!(result.dates[0].key, "COLLAB-EMAIL-1.0");
        assert_eq!(
            result.dates[0].message,
            DateError::MissingEolNote.to_string()
        );
    }

    #[test]
    fn urls_are_grouped_by_address() {
        let catalogue = catalogue();
        let result = check(&catalogue);

        let urls: Vec<&str> = result.urls.keys().map(String::as_str).collect();
        assert_eq!(urls, ["https://docs.example.org", "https://mail.example.org"]);
        assert_eq!(result.url_references(), 2);
        assert_eq!(result.urls["https://mail.example.org"][0].field, "url");
    }
}

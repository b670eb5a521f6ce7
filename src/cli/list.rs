use std::path::PathBuf;

use anyhow::Context;
use catalogue::{
    api::Api,
    domain::{Catalogue, Config, RevisionRef, Scope},
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use regex::Regex;
use serde::Serialize;
use tracing::instrument;

use super::terminal::{Colorize, Tone};

/// Command arguments for `svc list`.
#[derive(Debug, Parser)]
#[command(about = "List revisions with their lifecycle state")]
pub struct List {
    /// Which revisions to include (default: active or scheduled).
    #[arg(long, value_enum, default_value_t)]
    scope: Scope,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,

    /// Language for names and descriptions (default: first configured).
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Filter by category acronym (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',', value_name = "CAT")]
    category: Vec<String>,

    /// Case-insensitive substring match against key, name and description.
    #[arg(long, conflicts_with = "regex")]
    contains: Option<String>,

    /// Regular expression match against key, name and description.
    #[arg(long)]
    regex: Option<String>,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// One revision as shown in table and CSV output.
#[derive(Debug, Clone, Serialize)]
struct Row {
    key: String,
    name: String,
    listing: String,
    availability: String,
    flags: Vec<&'static str>,
    #[serde(skip)]
    tone: Tone,
}

impl Row {
    const HEADERS: [&'static str; 5] = ["KEY", "NAME", "LISTING", "AVAILABILITY", "FLAGS"];
    const LISTING: usize = 2;

    fn new(revision: RevisionRef<'_>, config: &Config, language: &str, today: NaiveDate) -> Self {
        let dates = revision.revision.dates();
        let evaluation = dates.evaluate(today, config.windows());
        let mut flags = Vec::new();
        if evaluation.is_new {
            flags.push("new");
        }
        if evaluation.discontinuation_warning.is_some() {
            flags.push("discontinuing");
        }
        if evaluation.not_publicly_listed {
            flags.push("unlisted");
        }
        Self {
            key: revision.key().to_string(),
            name: revision
                .service
                .name
                .get(language, config.languages())
                .unwrap_or_default()
                .to_string(),
            listing: dates
                .listing_status(revision.revision.submitted, today)
                .to_string(),
            availability: dates.availability_status(today).to_string(),
            flags,
            tone: Tone::from(evaluation.listing),
        }
    }

    fn values(&self) -> [String; 5] {
        [
            self.key.clone(),
            self.name.clone(),
            self.listing.clone(),
            self.availability.clone(),
            self.flags.join(","),
        ]
    }
}

struct Filters<'a> {
    categories: Vec<String>,
    contains: Option<String>,
    regex: Option<Regex>,
    config: &'a Config,
    language: &'a str,
}

impl<'a> Filters<'a> {
    fn new(cmd: &List, config: &'a Config, language: &'a str) -> anyhow::Result<Self> {
        let regex = if let Some(pattern) = &cmd.regex {
            Some(Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))?)
        } else {
            None
        };

        Ok(Self {
            categories: cmd.category.iter().map(|c| c.trim().to_string()).collect(),
            contains: cmd.contains.as_deref().map(str::to_lowercase),
            regex,
            config,
            language,
        })
    }

    fn haystack(&self, revision: &RevisionRef<'_>) -> String {
        let fallbacks = self.config.languages();
        [
            Some(revision.key().to_string()),
            revision
                .service
                .name
                .get(self.language, fallbacks)
                .map(str::to_string),
            revision
                .revision
                .description
                .get(self.language, fallbacks)
                .map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn matches(&self, revision: &RevisionRef<'_>) -> bool {
        if !self.categories.is_empty()
            && !self
                .categories
                .iter()
                .any(|category| category.eq_ignore_ascii_case(revision.service.category.as_str()))
        {
            return false;
        }

        if self.contains.is_none() && self.regex.is_none() {
            return true;
        }

        let haystack = self.haystack(revision);
        if let Some(needle) = &self.contains {
            if !haystack.to_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(regex) = &self.regex {
            if !regex.is_match(&haystack) {
                return false;
            }
        }
        true
    }
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalogue = directory.catalogue();
        let config = directory.config();
        let language = config.language(self.lang.as_deref());

        let filters = Filters::new(&self, config, language)?;
        let revisions: Vec<RevisionRef<'_>> = catalogue
            .revisions_in(self.scope, today)
            .filter(|revision| filters.matches(revision))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        tracing::debug!("{} revisions match", revisions.len());

        match self.output {
            OutputFormat::Table => {
                let rows = Self::rows(&revisions, config, language, today);
                render_table(&rows, self.quiet);
            }
            OutputFormat::Csv => {
                let rows = Self::rows(&revisions, config, language, today);
                render_csv(&rows, self.quiet);
            }
            OutputFormat::Json => {
                self.render_json(catalogue, &revisions, config, language, today)?;
            }
        }

        Ok(())
    }

    fn rows(
        revisions: &[RevisionRef<'_>],
        config: &Config,
        language: &str,
        today: NaiveDate,
    ) -> Vec<Row> {
        revisions
            .iter()
            .map(|revision| Row::new(*revision, config, language, today))
            .collect()
    }

    /// The online and catalogue scopes emit the corresponding API entries;
    /// every other scope emits the table rows.
    fn render_json(
        &self,
        catalogue: &Catalogue,
        revisions: &[RevisionRef<'_>],
        config: &Config,
        language: &str,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let api = Api::new(config, language, today);
        let category = |revision: &RevisionRef<'_>| {
            catalogue.category(revision.service.category.as_str())
        };
        let stdout = std::io::stdout();
        match self.scope {
            Scope::Online => {
                let entries: Vec<_> = revisions
                    .iter()
                    .map(|revision| api.online_entry(*revision, category(revision)))
                    .collect();
                serde_json::to_writer_pretty(stdout, &entries)
            }
            Scope::Catalogue => {
                let entries: Vec<_> = revisions
                    .iter()
                    .map(|revision| api.catalogue_entry(*revision, category(revision)))
                    .collect();
                serde_json::to_writer_pretty(stdout, &entries)
            }
            Scope::Default | Scope::All => {
                let rows = Self::rows(revisions, config, language, today);
                serde_json::to_writer_pretty(stdout, &rows)
            }
        }
        .context("failed to render json output")?;
        println!();
        Ok(())
    }
}

fn render_table(rows: &[Row], quiet: bool) {
    let data: Vec<[String; 5]> = rows.iter().map(Row::values).collect();

    if quiet {
        for row in data {
            println!("{}", row.join("\t"));
        }
        return;
    }

    if data.is_empty() {
        println!("{}", "No matching revisions".dim());
        return;
    }

    // Determine column widths for alignment.
    let widths = Row::HEADERS
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in Row::HEADERS.iter().zip(&widths) {
        print!("{}  ", format!("{header:<width$}").info());
    }
    println!();

    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for (row, values) in rows.iter().zip(data) {
        for (column, (value, width)) in values.iter().zip(&widths).enumerate() {
            let cell = format!("{value:<width$}");
            if column == Row::LISTING {
                print!("{}  ", row.tone.paint(&cell));
            } else {
                print!("{cell}  ");
            }
        }
        println!();
    }
}

fn render_csv(rows: &[Row], quiet: bool) {
    if !quiet {
        println!("{}", Row::HEADERS.map(csv_escape).join(","));
    }

    for row in rows {
        println!("{}", row.values().map(|value| csv_escape(&value)).join(","));
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use catalogue::domain::Service;
    use test_case::test_case;

    use super::*;
    use crate::cli::fixtures::{revision, service};

    fn filters<'a>(config: &'a Config, categories: &[&str], contains: Option<&str>) -> Filters<'a> {
        Filters {
            categories: categories.iter().map(ToString::to_string).collect(),
            contains: contains.map(str::to_lowercase),
            regex: None,
            config,
            language: "en",
        }
    }

    fn first(service: &Service) -> RevisionRef<'_> {
        RevisionRef {
            service,
            revision: &service.revisions[0],
        }
    }

    #[test]
    fn category_filter_ignores_case_on_both_sides() {
        let config = Config::default();
        let filters = filters(&config, &["Collab"], None);
        let lower = service("collab", "EMAIL", vec![revision("1.0", "2024-01-01")]);
        let upper = service("COLLAB", "WIKI", vec![revision("1.0", "2024-01-01")]);
        let other = service("COMPUTE", "HPC", vec![revision("1.0", "2024-01-01")]);

        assert!(filters.matches(&first(&lower)));
        assert!(filters.matches(&first(&upper)));
        assert!(!filters.matches(&first(&other)));
    }

    #[test]
    fn substring_filter_searches_key_name_and_description() {
        let config = Config::default();
        let email = service("COLLAB", "EMAIL", vec![revision("2.0", "2024-01-01")]);

        assert!(filters(&config, &[], Some("collab-email")).matches(&first(&email)));
        assert!(filters(&config, &[], Some("EMAIL SERVICE")).matches(&first(&email)));
        assert!(filters(&config, &[], Some("version 2.0")).matches(&first(&email)));
        assert!(!filters(&config, &[], Some("wiki")).matches(&first(&email)));
    }

    #[test_case("plain", "plain"; "plain value")]
    #[test_case("a,b", "\"a,b\""; "comma")]
    #[test_case("say \"hi\"", "\"say \"\"hi\"\"\""; "quotes")]
    fn escapes_csv(input: &str, expected: &str) {
        assert_eq!(csv_escape(input), expected);
    }
}

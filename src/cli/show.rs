use std::path::PathBuf;

use catalogue::{
    Catalogue, Config, RevisionKey, TextField,
    api::Api,
    domain::RevisionRef,
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::instrument;

use super::terminal::{Colorize, Tone};

#[derive(Debug, Parser)]
#[command(about = "Display one revision of a service")]
pub struct Show {
    /// The revision key, `CATEGORY-SERVICE-VERSION` (case-insensitive)
    key: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Language for translated fields (default: first configured)
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Also find revisions that are not currently listed
    #[arg(long)]
    unlisted: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalogue = directory.catalogue();
        let config = directory.config();
        let language = config.language(self.lang.as_deref());

        let Some(revision) = self.find(catalogue, today) else {
            eprintln!("No listed revision {}", self.key);
            std::process::exit(1);
        };

        match self.output {
            OutputFormat::Pretty => Self::output_pretty(revision, config, language, today),
            OutputFormat::Json => {
                let api = Api::new(config, language, today);
                let category = catalogue.category(revision.service.category.as_str());
                let entry = api.catalogue_entry(revision, category);
                println!("{}", serde_json::to_string_pretty(&entry)?);
            }
        }

        Ok(())
    }

    fn find<'a>(&self, catalogue: &'a Catalogue, today: NaiveDate) -> Option<RevisionRef<'a>> {
        if !self.unlisted {
            return catalogue.find_listed(&self.key, today);
        }
        let key: RevisionKey = self.key.trim().to_uppercase().parse().ok()?;
        catalogue.find(&key)
    }

    fn output_pretty(revision: RevisionRef<'_>, config: &Config, language: &str, today: NaiveDate) {
        let fallbacks = config.languages();
        let service = revision.service;
        let rev = revision.revision;
        let dates = rev.dates();
        let evaluation = dates.evaluate(today, config.windows());

        // Header
        println!("# {}", revision.key());
        if let Some(name) = service.name.get(language, fallbacks) {
            println!("{name}");
        }
        println!();

        // Lifecycle
        println!("{}", "Lifecycle".dim());
        let listing = dates.listing_status(rev.submitted, today).to_string();
        println!(
            "  Listing:      {}",
            Tone::from(evaluation.listing).paint(&listing)
        );
        println!("  Availability: {}", dates.availability_status(today));
        if evaluation.is_new {
            println!("  {}", "New".success());
        }
        if evaluation.not_publicly_listed {
            println!("  {}", "Available but not publicly listed".warning());
        }
        if let Some(warning) = evaluation.discontinuation_warning {
            println!("  {}", warning.to_string().warning());
        }
        if let Err(error) = dates.validate(rev.has_eol_note()) {
            println!("  {}", error.to_string().warning());
        }

        // Access
        if rev.url.is_some() || rev.contact.is_some() || service.responsible.is_some() {
            println!("\n{}", "Access".dim());
            if let Some(url) = &rev.url {
                println!("  URL:          {url}");
            }
            if let Some(contact) = &rev.contact {
                println!("  Contact:      {contact}");
            }
            if let Some(responsible) = &service.responsible {
                println!("  Responsible:  {responsible}");
            }
        }

        // Texts
        for field in TextField::ALL {
            if let Some(text) = revision.text(field).get(language, fallbacks) {
                println!("\n{}", field.name().dim());
                for line in text.lines() {
                    println!("  {line}");
                }
            }
        }
    }
}

use std::path::PathBuf;

mod check;
mod export;
mod list;
mod render;
mod show;
mod terminal;

use anyhow::Context;
use catalogue::{
    Config, Directory, TextField,
    domain::RevisionRef,
    storage::Loaded,
};
use chrono::NaiveDate;
use check::Check;
use clap::ArgAction;
use export::Export;
use list::List;
use render::Render;
use show::Show;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the root of the catalogue directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Evaluate lifecycle rules on this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        tracing::debug!("Evaluating lifecycle on {today}");

        self.command.run(self.root, today)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new catalogue directory
    Init,

    /// Check URLs, internal links, strict-field markup and revision dates
    ///
    /// Exits with status 1 if any internal link is broken.
    Check(Check),

    /// List revisions with their lifecycle state
    List(List),

    /// Show one listed revision as a catalogue API entry
    Show(Show),

    /// Render one text field of a revision to HTML or LaTeX
    Render(Render),

    /// Export the listed catalogue as a LaTeX document body
    Export(Export),
}

impl Command {
    fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Init => Init::run(root)?,
            Self::Check(command) => command.run(root, today)?,
            Self::List(command) => command.run(root, today)?,
            Self::Show(command) => command.run(root, today)?,
            Self::Render(command) => command.run(root, today)?,
            Self::Export(command) => command.run(root, today)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: PathBuf) -> anyhow::Result<()> {
        if root.join(".catalogue").exists() {
            anyhow::bail!("Catalogue already initialized (found existing .catalogue directory)");
        }

        Directory::new(root.clone())
            .init(&Config::default())
            .context("Failed to initialize catalogue")?;

        println!("Initialized service catalogue in {}", root.display());
        println!("  Created: .catalogue/config.toml");
        println!("  Created: categories.yaml");
        println!("  Created: services/");
        println!();
        println!("Next steps:");
        println!("  Add categories to categories.yaml and one YAML file per service under services/");
        println!("  svc check");

        Ok(())
    }
}

/// Load the catalogue under `root`.
fn load(root: PathBuf) -> anyhow::Result<Directory<Loaded>> {
    let display = root.display().to_string();
    Directory::new(root)
        .load_all()
        .with_context(|| format!("Failed to load catalogue from {display}"))
}

/// Every stored variant of `field`, labelled for reports: `description (en)`
/// for translated fields, `eol` for plain ones.
fn field_variants<'a>(revision: &RevisionRef<'a>, field: TextField) -> Vec<(String, &'a str)> {
    revision
        .text(field)
        .variants()
        .into_iter()
        .map(|(language, text)| {
            let label = language.map_or_else(
                || field.name().to_string(),
                |language| format!("{} ({language})", field.name()),
            );
            (label, text)
        })
        .collect()
}

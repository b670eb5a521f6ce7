use std::{io::Read, path::PathBuf};

use anyhow::Context;
use catalogue::{
    Capability, RevisionKey, TextField, parse,
    markup::{Html, Latex, Render as Renderer},
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Render a text field to HTML or LaTeX")]
pub struct Render {
    /// The revision key, `CATEGORY-SERVICE-VERSION`
    #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
    key: Option<RevisionKey>,

    /// The field to render
    #[arg(long, value_enum, default_value = "description")]
    field: TextField,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "html")]
    format: Format,

    /// Language for translated fields (default: first configured)
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Read the text from standard input instead of a stored revision;
    /// `--field` still selects the markup rules
    #[arg(long)]
    stdin: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Format {
    #[default]
    Html,
    Latex,
    /// The parsed block structure, before rendering
    Json,
}

impl Render {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalogue = directory.catalogue();
        let config = directory.config();
        let language = config.language(self.lang.as_deref());

        let input;
        let text = if let Some(key) = &self.key {
            let revision = catalogue
                .find(key)
                .with_context(|| format!("revision {key} not found"))?;
            revision
                .text(self.field)
                .get(language, config.languages())
                .unwrap_or_default()
        } else {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read standard input")?;
            input = buffer;
            input.as_str()
        };

        let capability: Capability = self.field.capability();
        let blocks = parse(text, capability);

        let renderer: Box<dyn Renderer> = match self.format {
            Format::Html => Box::new(Html::from_config(config)),
            Format::Latex => Box::new(Latex),
            Format::Json => {
                tracing::debug!("Dumping {} as parsed blocks", self.field.name());
                serde_json::to_writer_pretty(std::io::stdout(), &blocks)
                    .context("failed to render json output")?;
                println!();
                return Ok(());
            }
        };
        tracing::debug!(
            "Rendering {} ({capability:?}) as {}",
            self.field.name(),
            renderer.name()
        );

        let index = catalogue.index(today, language, config.languages());
        println!("{}", renderer.render(&blocks, &index));

        Ok(())
    }
}

use std::path::PathBuf;

use anyhow::Context;
use catalogue::{
    Config, RevisionKeyIndex, TextField,
    domain::{Category, RevisionRef, Scope, Service},
    markup::{Latex, escape_latex, latex_url, render_text, revision_label, service_label},
};
use chrono::NaiveDate;
use clap::Parser;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Export the listed catalogue as a LaTeX document body")]
pub struct Export {
    /// Language for translated fields (default: first configured)
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,

    /// Write to this file instead of standard output
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Optional fields, in export order, with their headings.
const SECTIONS: [(TextField, &str); 5] = [
    (TextField::UsageInformation, "Usage information"),
    (TextField::Requirements, "Requirements"),
    (TextField::Details, "Details"),
    (TextField::Options, "Options"),
    (TextField::ServiceLevel, "Service level"),
];

/// Everything needed to render one service.
struct Exporter<'a> {
    config: &'a Config,
    language: &'a str,
    today: NaiveDate,
    index: &'a RevisionKeyIndex,
}

impl Export {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf, today: NaiveDate) -> anyhow::Result<()> {
        let directory = super::load(root)?;
        let catalogue = directory.catalogue();
        let config = directory.config();
        let language = config.language(self.lang.as_deref());
        let index = catalogue.index(today, language, config.languages());
        let exporter = Exporter {
            config,
            language,
            today,
            index: &index,
        };

        let services: Vec<String> = catalogue
            .services()
            .par_iter()
            .map(|service| exporter.service(service))
            .collect();

        let mut document = String::new();
        for category in catalogue.categories() {
            let body: String = catalogue
                .services()
                .iter()
                .zip(&services)
                .filter(|(service, _)| service.category == category.acronym)
                .map(|(_, rendered)| rendered.as_str())
                .collect();
            if body.is_empty() {
                continue;
            }
            document.push_str(&exporter.category(category));
            document.push_str(&body);
        }
        let exported = services.iter().filter(|service| !service.is_empty()).count();
        tracing::info!("Exported {exported} services with listed revisions");

        match self.output {
            Some(path) => std::fs::write(&path, document)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => print!("{document}"),
        }

        Ok(())
    }
}

impl Exporter<'_> {
    fn text<'t>(&self, revision: &RevisionRef<'t>, field: TextField) -> Option<&'t str> {
        revision
            .text(field)
            .get(self.language, self.config.languages())
    }

    fn render(&self, text: &str, field: TextField) -> String {
        render_text(text, field.capability(), &Latex, self.index)
    }

    fn enabled(&self, field: TextField) -> bool {
        let fields = self.config.fields;
        match field {
            TextField::UsageInformation => fields.usage_information,
            TextField::Requirements => fields.requirements,
            TextField::Details => fields.details,
            TextField::Options => fields.options,
            TextField::ServiceLevel => fields.service_level,
            _ => true,
        }
    }

    fn category(&self, category: &Category) -> String {
        let name = category
            .name
            .get(self.language, self.config.languages())
            .unwrap_or(category.acronym.as_str());
        let mut out = format!("\\section{{{}}}\n", escape_latex(name));
        if let Some(description) = category
            .description
            .get(self.language, self.config.languages())
        {
            out.push_str(&format!("{}\n\n", escape_latex(description)));
        }
        out
    }

    /// The listed revisions of `service`; empty if none is listed.
    fn service(&self, service: &Service) -> String {
        let mut out = String::new();
        let revisions = service
            .revisions
            .iter()
            .filter(|revision| Scope::Catalogue.includes(revision, self.today));
        for (position, revision) in revisions.enumerate() {
            let revision = RevisionRef { service, revision };
            let key = revision.key().to_string();
            let name = service
                .name
                .get(self.language, self.config.languages())
                .unwrap_or(service.acronym.as_str());

            out.push_str(&format!(
                "\\subsection{{{} ({})}}",
                escape_latex(name),
                escape_latex(&key)
            ));
            if position == 0 {
                out.push_str(&service_label(&service.key().to_string()));
            }
            out.push_str(&revision_label(&key));
            out.push_str("\n\n");

            // a purpose may span paragraphs
            if let Some(purpose) = self.text(&revision, TextField::Purpose) {
                out.push_str(&format!(
                    "{{\\itshape {}\\par}}\n\n",
                    self.render(purpose, TextField::Purpose)
                ));
            }
            if let Some(description) = self.text(&revision, TextField::Description) {
                out.push_str(&self.render(description, TextField::Description));
                out.push_str("\n\n");
            }
            if let Some(url) = revision.revision.url.as_deref().map(str::trim) {
                if !url.is_empty() {
                    out.push_str(&latex_url(url));
                    out.push_str("\n\n");
                }
            }
            for (field, heading) in SECTIONS {
                if !self.enabled(field) {
                    continue;
                }
                if let Some(text) = self.text(&revision, field) {
                    out.push_str(&format!(
                        "\\paragraph{{{heading}}}\n{}\n\n",
                        self.render(text, field)
                    ));
                }
            }
            if let Some(eol) = self.text(&revision, TextField::Eol) {
                out.push_str(&format!(
                    "\\paragraph{{End of life}}\n{}\n\n",
                    self.render(eol, TextField::Eol)
                ));
            }
        }
        out
    }
}

//! Report styling for the terminal

use catalogue::{domain::Listing, markup::LinkKind};
use owo_colors::{OwoColorize, colors::css};

/// How a piece of report output stands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pass,
    Warn,
    Fail,
    Heading,
    Muted,
}

impl Tone {
    /// `text` in this tone, or unchanged when stdout has no color support.
    pub fn paint(self, text: &str) -> String {
        if !color_enabled() {
            return text.to_string();
        }
        match self {
            Self::Pass => text.fg::<css::Green>().to_string(),
            Self::Warn => text.fg::<css::Orange>().to_string(),
            Self::Fail => text.fg::<css::Red>().to_string(),
            Self::Heading => text.fg::<css::LightBlue>().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }

    /// Marker in front of a check line.
    pub const fn marker(self) -> char {
        match self {
            Self::Pass => '✓',
            Self::Warn => '⚠',
            Self::Fail => '✗',
            Self::Heading | Self::Muted => '·',
        }
    }
}

/// Resolved links pass, search terms are only worth a look.
impl From<LinkKind> for Tone {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Unique | LinkKind::Multi => Self::Pass,
            LinkKind::Soft => Self::Warn,
            LinkKind::Broken => Self::Fail,
        }
    }
}

impl From<Listing> for Tone {
    fn from(listing: Listing) -> Self {
        match listing {
            Listing::Online => Self::Pass,
            Listing::Draft => Self::Muted,
            Listing::Retired => Self::Warn,
        }
    }
}

fn color_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Shorthands for painting report text.
pub trait Colorize {
    fn success(&self) -> String;
    fn warning(&self) -> String;
    fn error(&self) -> String;
    fn info(&self) -> String;
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        Tone::Pass.paint(self.as_ref())
    }

    fn warning(&self) -> String {
        Tone::Warn.paint(self.as_ref())
    }

    fn error(&self) -> String {
        Tone::Fail.paint(self.as_ref())
    }

    fn info(&self) -> String {
        Tone::Heading.paint(self.as_ref())
    }

    fn dim(&self) -> String {
        Tone::Muted.paint(self.as_ref())
    }
}

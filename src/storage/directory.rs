//! A filesystem backed service catalogue
//!
//! Layout of a catalogue root:
//!
//! ```text
//! .catalogue/config.toml   configuration (optional)
//! categories.yaml          list of categories
//! services/**/*.yaml       one service per file, revisions inline
//! ```

use std::{
    collections::BTreeSet,
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::domain::{Catalogue, Category, Config, Service};

const CONFIG_DIR: &str = ".catalogue";
const CONFIG_FILE: &str = "config.toml";
const CATEGORIES_FILE: &str = "categories.yaml";
const SERVICES_DIR: &str = "services";

/// A loaded catalogue and its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    catalogue: Catalogue,
    config: Config,
}

/// Marker for a directory that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed catalogue.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory the catalogue is stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The catalogue root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Create the configuration and an empty category list, keeping any
    /// files that already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    pub fn init(&self, config: &Config) -> Result<(), LoadError> {
        let config_dir = self.root.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).map_err(|source| LoadError::Io {
            path: config_dir.clone(),
            source,
        })?;
        let services = self.root.join(SERVICES_DIR);
        std::fs::create_dir_all(&services).map_err(|source| LoadError::Io {
            path: services,
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            tracing::info!("Keeping existing {}", config_path.display());
        } else {
            config.save(&config_path).map_err(LoadError::Config)?;
        }

        let categories = self.root.join(CATEGORIES_FILE);
        if !categories.exists() {
            std::fs::write(&categories, "[]\n").map_err(|source| LoadError::Io {
                path: categories,
                source,
            })?;
        }
        Ok(())
    }

    /// Load the configuration, categories and every service from disk.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable or malformed file, on services that
    /// name an unknown category, and on duplicate keys.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_all(self) -> Result<Directory<Loaded>, LoadError> {
        let config = load_config(&self.root);
        let categories = load_categories(&self.root.join(CATEGORIES_FILE))?;
        let paths = collect_service_paths(&self.root.join(SERVICES_DIR));
        tracing::debug!("Found {} service files", paths.len());

        let services: Vec<Service> = paths
            .par_iter()
            .map(|path| load_service(path))
            .collect::<Result<_, _>>()?;

        check_consistency(&categories, &services)?;
        tracing::info!(
            "Loaded {} categories and {} services",
            categories.len(),
            services.len()
        );

        Ok(Directory {
            root: self.root,
            state: Loaded {
                catalogue: Catalogue::new(categories, services),
                config,
            },
        })
    }
}

impl Directory<Loaded> {
    /// The loaded catalogue.
    #[must_use]
    pub const fn catalogue(&self) -> &Catalogue {
        &self.state.catalogue
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }
}

/// Errors raised while loading a catalogue.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file or directory could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A YAML document did not match the expected structure.
    #[error("{}: {source}", path.display())]
    Yaml {
        /// The offending file.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },

    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),

    /// A service refers to a category that does not exist.
    #[error("Service {service} refers to unknown category {category}")]
    UnknownCategory {
        /// Key of the service.
        service: String,
        /// The missing category acronym.
        category: String,
    },

    /// Two categories share an acronym.
    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    /// Two revisions share a key.
    #[error("Duplicate revision key: {0}")]
    DuplicateRevisionKey(String),
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_categories(path: &Path) -> Result<Vec<Category>, LoadError> {
    if !path.exists() {
        tracing::debug!("No category file at {}", path.display());
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&read(path)?).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn load_service(path: &Path) -> Result<Service, LoadError> {
    tracing::trace!("Loading {}", path.display());
    serde_yaml::from_str(&read(path)?).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_service_paths(services: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(services)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let extension = entry.path().extension();
            extension == Some(OsStr::new("yaml")) || extension == Some(OsStr::new("yml"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();
    paths
}

fn check_consistency(categories: &[Category], services: &[Service]) -> Result<(), LoadError> {
    let mut acronyms = BTreeSet::new();
    for category in categories {
        if !acronyms.insert(category.acronym.as_str()) {
            return Err(LoadError::DuplicateCategory(category.acronym.to_string()));
        }
    }

    let mut keys = BTreeSet::new();
    for service in services {
        if !acronyms.contains(service.category.as_str()) {
            return Err(LoadError::UnknownCategory {
                service: service.key().to_string(),
                category: service.category.to_string(),
            });
        }
        for revision in &service.revisions {
            let key = service
                .key()
                .with_version(revision.version.clone())
                .to_string()
                .to_lowercase();
            if !keys.insert(key) {
                return Err(LoadError::DuplicateRevisionKey(format!(
                    "{}-{}",
                    service.key(),
                    revision.version
                )));
            }
        }
    }
    Ok(())
}

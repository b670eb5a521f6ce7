//! Filesystem storage for service catalogues.

/// A directory of YAML documents holding a catalogue.
pub mod directory;
pub use directory::{Directory, LoadError, Loaded, Unloaded};

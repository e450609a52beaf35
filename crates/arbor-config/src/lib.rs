//! Arbor Configuration
//!
//! Two files live at the root of an arbor repository:
//! - `arbor.toml` - marks the git repository as an arbor repository and
//!   carries user-editable options ([`repo::RepoConfig`])
//! - `packages.toml` - the machine-edited registry of managed package
//!   paths ([`registry::PackageRegistry`]); its order is the default scope
//!   for every graph operation

pub mod registry;
pub mod repo;

pub use registry::{PackageEntry, PackageRegistry, EMPTY_TREE_ID};
pub use repo::{RepoConfig, REPO_CONFIG_FILE};

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML syntax in {}: {error}", file.display())]
    TomlParse {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("failed to serialize {}: {error}", file.display())]
    TomlSerialize {
        file: PathBuf,
        error: toml::ser::Error,
    },

    #[error("no package registered under path \"{0}\"")]
    UnknownPath(String),

    #[error("a package is already registered under path \"{0}\"")]
    DuplicatePath(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

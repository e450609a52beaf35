//! Package registry (packages.toml)
//!
//! An ordered `[[package]]` array of tables. The order is significant: it is
//! the default scope, in order, for dependency-graph construction, so load
//! and save must preserve it.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// git's well-known empty-tree object id, used as the "never verified" base
/// revision so diffs against it show the whole tree as new
pub const EMPTY_TREE_ID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// One registered package path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageEntry {
    /// Directory of the package checkout, relative to the git root
    pub path: String,
    /// Upstream origin URL the checkout is cloned from
    pub url: String,
    /// Last verified revision; empty means never verified
    #[serde(default)]
    pub verified: String,
    /// Whether the package was added as a dependency of another package
    #[serde(default)]
    pub asdeps: bool,
}

impl PackageEntry {
    /// The verified revision, substituting the empty-tree id when the
    /// package was never verified
    pub fn last_verified(&self) -> &str {
        if self.verified.is_empty() {
            EMPTY_TREE_ID
        } else {
            &self.verified
        }
    }
}

/// The ordered set of registered packages
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageRegistry {
    #[serde(default, rename = "package")]
    entries: Vec<PackageEntry>,
}

impl PackageRegistry {
    /// Load from a file; a missing file yields an empty registry
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        toml::from_str(&content).map_err(|error| ConfigError::TomlParse {
            file: path.to_path_buf(),
            error,
        })
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|error| ConfigError::TomlSerialize {
            file: path.to_path_buf(),
            error,
        })?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Registered paths in registry order
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PackageEntry> {
        self.entries.iter()
    }

    pub fn get(&self, path: &str) -> ConfigResult<&PackageEntry> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .ok_or_else(|| ConfigError::UnknownPath(path.to_string()))
    }

    pub fn get_mut(&mut self, path: &str) -> ConfigResult<&mut PackageEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.path == path)
            .ok_or_else(|| ConfigError::UnknownPath(path.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Append a new entry; registering an occupied path is an error
    pub fn add(&mut self, path: &str, url: &str, asdeps: bool) -> ConfigResult<()> {
        if self.contains(path) {
            return Err(ConfigError::DuplicatePath(path.to_string()));
        }
        self.entries.push(PackageEntry {
            path: path.to_string(),
            url: url.to_string(),
            verified: String::new(),
            asdeps,
        });
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> ConfigResult<PackageEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.path == path)
            .ok_or_else(|| ConfigError::UnknownPath(path.to_string()))?;
        Ok(self.entries.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

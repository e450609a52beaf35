//! Repository configuration (arbor.toml)
//!
//! The file's presence (tracked at the git root) is what makes a git
//! repository an arbor repository. Its content is user-edited; arbor only
//! writes it once, during `init`.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the repository configuration, relative to the git root
pub const REPO_CONFIG_FILE: &str = "arbor.toml";

/// Options from `arbor.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoConfig {
    /// File path of the package registry, relative to the git root
    #[serde(default = "default_packages_file")]
    pub packages_file: String,
}

fn default_packages_file() -> String {
    "packages.toml".to_string()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            packages_file: default_packages_file(),
        }
    }
}

impl RepoConfig {
    /// Load from a file; a missing file is [`ConfigError::NotFound`]
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;
        toml::from_str(&content).map_err(|error| ConfigError::TomlParse {
            file: path.to_path_buf(),
            error,
        })
    }

    /// Load from a file, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|error| ConfigError::TomlSerialize {
            file: path.to_path_buf(),
            error,
        })?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RepoConfig::default();
        assert_eq!(config.packages_file, "packages.toml");
    }

    #[test]
    fn test_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(REPO_CONFIG_FILE);
        let config = RepoConfig {
            packages_file: "pkg/index.toml".to_string(),
        };
        config.save(&path).unwrap();
        assert_eq!(RepoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = RepoConfig::load(Path::new("/nonexistent/arbor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = RepoConfig::load_or_default(Path::new("/nonexistent/arbor.toml")).unwrap();
        assert_eq!(config, RepoConfig::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(REPO_CONFIG_FILE);
        fs::write(&path, "").unwrap();
        let config = RepoConfig::load(&path).unwrap();
        assert_eq!(config.packages_file, "packages.toml");
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(REPO_CONFIG_FILE);
        fs::write(&path, "packages_file = [broken").unwrap();
        let err = RepoConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
    }
}

//! Arbor build orchestration
//!
//! Opens an arbor repository from any working directory, wraps each
//! registered package checkout ([`package::Package`]), and drives the
//! external build tool (`makepkg`) and package installer (`pacman`). The
//! ordering logic itself lives in `arbor-package`; this crate only supplies
//! the processes that run in that order.

pub mod install;
pub mod package;
pub mod repo;

pub use install::{depcheck, deptest, install, uninstalled, DepCheck};
pub use package::{log_tail, Package};
pub use repo::Repo;

use std::path::PathBuf;
use thiserror::Error;

/// Build orchestration errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("not inside an arbor repository")]
    NotAnArborRepo,

    #[error("package {0} is not verified")]
    Unverified(String),

    #[error("git clone failed for {0}")]
    CloneFailed(String),

    #[error("makepkg failed with exit status {status} in {path} (log: {})", log.display())]
    MakepkgFailed {
        path: String,
        status: i32,
        log: PathBuf,
    },

    #[error("{command} failed with exit status {status}")]
    InstallerFailed { command: String, status: i32 },

    #[error(transparent)]
    Package(#[from] arbor_package::PackageError),

    #[error(transparent)]
    Config(#[from] arbor_config::ConfigError),

    #[error(transparent)]
    Git(#[from] arbor_git::GitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BuildResult<T> = Result<T, BuildError>;

//! Arbor package metadata and build-order resolution
//!
//! Parses `.SRCINFO` metadata documents, answers field queries with
//! package/base fallback scoping, derives build artifact names, and computes
//! a dependency-respecting build order over a set of package checkouts.

pub mod artifact;
pub mod cache;
pub mod graph;
pub mod sort;
pub mod srcinfo;

pub use artifact::{build_artifacts, ArtifactOptions, PackageArtifact};
pub use cache::SrcinfoCache;
pub use graph::{compute_dep_graph, DepGraph, SRCINFO_FILE};
pub use sort::{depsort, SortOutcome};
pub use srcinfo::{
    strip_version_constraint, strip_version_constraints, Section, SectionKey, SectionKind,
    SrcinfoDocument,
};

use std::path::PathBuf;

/// Package metadata errors
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("line {line}: unrecognized syntax: \"{content}\"")]
    MalformedLine { line: usize, content: String },

    #[error("cannot read package metadata at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing field '{field}' for package '{package}'")]
    MissingField { package: String, field: String },
}

pub type Result<T> = std::result::Result<T, PackageError>;

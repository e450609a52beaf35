//! Build artifact names derived from a `.SRCINFO` document

use crate::srcinfo::SrcinfoDocument;
use crate::{PackageError, Result};
use std::fmt;

/// Context for artifact derivation: the platform tag used when a package is
/// not architecture-independent, and the archive suffix. Threaded explicitly
/// so there is no process-wide default.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub default_arch: String,
    pub suffix: String,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            default_arch: "x86_64".to_string(),
            suffix: ".pkg.tar.xz".to_string(),
        }
    }
}

/// One artifact a package build produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub suffix: String,
}

impl fmt::Display for PackageArtifact {
    /// Canonical artifact file name: `name-version-release-arch<suffix>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}{}",
            self.name, self.version, self.release, self.arch, self.suffix
        )
    }
}

/// Derive the artifacts for every package the document builds.
///
/// Version and release come from the first `pkgver`/`pkgrel` value with base
/// fallback; a package declaring the `any` architecture gets the generic tag,
/// everything else the configured platform tag.
pub fn build_artifacts(
    doc: &SrcinfoDocument,
    opts: &ArtifactOptions,
) -> Result<Vec<PackageArtifact>> {
    let mut artifacts = Vec::new();
    for name in doc.package_names() {
        let version = first_value(doc, &name, "pkgver")?;
        let release = first_value(doc, &name, "pkgrel")?;
        let arches = doc.query_package(&name, "arch");
        let arch = if arches.iter().any(|a| a == "any") {
            "any".to_string()
        } else {
            opts.default_arch.clone()
        };
        artifacts.push(PackageArtifact {
            name,
            version,
            release,
            arch,
            suffix: opts.suffix.clone(),
        });
    }
    Ok(artifacts)
}

fn first_value(doc: &SrcinfoDocument, package: &str, field: &str) -> Result<String> {
    doc.query_package(package, field)
        .into_iter()
        .next()
        .ok_or_else(|| PackageError::MissingField {
            package: package.to_string(),
            field: field.to_string(),
        })
}

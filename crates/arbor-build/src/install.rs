//! Installing built artifacts and probing the system package manager
//!
//! All probing goes through the `pacman` binary (`-T` for satisfiability,
//! `-Si` for sync-repo availability) rather than linking the package
//! manager's library.

use crate::package::Package;
use crate::{BuildError, BuildResult};
use arbor_package::{ArtifactOptions, PackageArtifact, SrcinfoCache};
use std::fmt;
use std::process::Command;

/// Install every artifact of `packages` and record the installation intent.
///
/// One `pacman -U` call installs all artifact files, then `pacman -D`
/// re-marks each package name as explicitly installed or as a dependency
/// according to its registry flag.
pub fn install(
    packages: &mut [Package],
    cache: &mut SrcinfoCache,
    opts: &ArtifactOptions,
) -> BuildResult<()> {
    let mut files = Vec::new();
    let mut explicit = Vec::new();
    let mut asdeps = Vec::new();
    for package in packages.iter_mut() {
        let is_dep = package.entry().asdeps;
        for artifact in package.artifacts(cache, opts)? {
            files.push(
                package
                    .fullpath()
                    .join(artifact.to_string())
                    .to_string_lossy()
                    .into_owned(),
            );
            if is_dep {
                asdeps.push(artifact.name);
            } else {
                explicit.push(artifact.name);
            }
        }
    }
    if files.is_empty() {
        return Ok(());
    }

    run_pacman(&["sudo", "pacman", "-U", "--noconfirm"], &files)?;
    if !explicit.is_empty() {
        run_pacman(&["sudo", "pacman", "-D", "--asexplicit"], &explicit)?;
    }
    if !asdeps.is_empty() {
        run_pacman(&["sudo", "pacman", "-D", "--asdeps"], &asdeps)?;
    }
    Ok(())
}

fn run_pacman(command: &[&str], args: &[String]) -> BuildResult<()> {
    let status = Command::new(command[0])
        .args(&command[1..])
        .args(args)
        .status()?;
    if !status.success() {
        return Err(BuildError::InstallerFailed {
            command: command.join(" "),
            status: status.code().unwrap_or(-1),
        });
    }
    Ok(())
}

/// Which of a package's artifacts are not yet installed at their version
pub fn uninstalled(
    package: &mut Package,
    cache: &mut SrcinfoCache,
    opts: &ArtifactOptions,
) -> BuildResult<Vec<PackageArtifact>> {
    let artifacts = package.artifacts(cache, opts)?;
    let specs: Vec<String> = artifacts
        .iter()
        .map(|a| format!("{}={}-{}", a.name, a.version, a.release))
        .collect();
    let unsatisfied = deptest(&specs)?;
    Ok(artifacts
        .into_iter()
        .zip(specs)
        .filter(|(_, spec)| unsatisfied.contains(spec))
        .map(|(artifact, _)| artifact)
        .collect())
}

/// `pacman -T`: the subset of `specs` the installed system does not satisfy
pub fn deptest(specs: &[String]) -> BuildResult<Vec<String>> {
    if specs.is_empty() {
        return Ok(Vec::new());
    }
    let output = Command::new("pacman").arg("-T").args(specs).output()?;
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Classification of unresolved dependency names against the system
/// package manager
#[derive(Debug, Default)]
pub struct DepCheck {
    /// Already satisfied by an installed package
    pub installed: Vec<String>,
    /// Installable from a sync repository
    pub available: Vec<String>,
    /// Known to no repository; candidates for `arbor add`
    pub missing: Vec<String>,
}

impl fmt::Display for DepCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "installed = {}", self.installed.join(", "))?;
        writeln!(f, "available = {}", self.available.join(", "))?;
        write!(f, "missing   = {}", self.missing.join(", "))
    }
}

/// Sort dependency `names` into installed / repo-available / missing
pub fn depcheck(names: &[String]) -> BuildResult<DepCheck> {
    let mut result = DepCheck::default();
    if names.is_empty() {
        return Ok(result);
    }
    let unsatisfied = deptest(names)?;
    for name in names {
        if !unsatisfied.contains(name) {
            result.installed.push(name.clone());
            continue;
        }
        let in_repo = Command::new("pacman")
            .args(["-Si", name])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if in_repo {
            result.available.push(name.clone());
        } else {
            result.missing.push(name.clone());
        }
    }
    Ok(result)
}

//! One registered package checkout

use crate::{BuildError, BuildResult};
use arbor_config::PackageEntry;
use arbor_git::GitRepo;
use arbor_package::{
    build_artifacts, ArtifactOptions, PackageArtifact, SrcinfoCache, SRCINFO_FILE,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A registered package path: its registry entry, its checkout directory,
/// and the git repository inside it
#[derive(Debug)]
pub struct Package {
    entry: PackageEntry,
    fullpath: PathBuf,
    git: GitRepo,
    // pkgver() output, memoized per Package
    vcs_version: Option<String>,
}

impl Package {
    /// Wrap the entry's checkout under the arbor repository root
    pub fn new(entry: PackageEntry, root: &Path) -> Self {
        let fullpath = root.join(&entry.path);
        let git = GitRepo::new(&fullpath);
        Self {
            entry,
            fullpath,
            git,
            vcs_version: None,
        }
    }

    /// Registry path, relative to the arbor repository root
    pub fn path(&self) -> &str {
        &self.entry.path
    }

    pub fn entry(&self) -> &PackageEntry {
        &self.entry
    }

    /// Absolute path of the checkout directory
    pub fn fullpath(&self) -> &Path {
        &self.fullpath
    }

    pub fn git(&self) -> &GitRepo {
        &self.git
    }

    pub fn srcinfo_path(&self) -> PathBuf {
        self.fullpath.join(SRCINFO_FILE)
    }

    /// Clone the checkout from its origin URL, or fast-forward an existing one
    pub fn fetch(&self) -> BuildResult<()> {
        if !self.fullpath.is_dir() {
            let status = Command::new("git")
                .arg("clone")
                .arg(&self.entry.url)
                .arg(&self.fullpath)
                .status()?;
            if !status.success() {
                return Err(BuildError::CloneFailed(self.entry.path.clone()));
            }
        } else {
            self.git.call_success(&["pull", "--ff-only"])?;
        }
        Ok(())
    }

    /// The last verified revision (the empty-tree id when never verified)
    pub fn last_verified(&self) -> &str {
        self.entry.last_verified()
    }

    /// Whether HEAD matches the last verified revision
    pub fn is_verified(&self) -> BuildResult<bool> {
        if !self.git.exists() {
            return Ok(false);
        }
        Ok(self.git.head()? == self.last_verified())
    }

    /// Fail with [`BuildError::Unverified`] unless HEAD is verified
    pub fn ensure_verified(&self) -> BuildResult<()> {
        self.git.ensure_exists()?;
        if self.git.head()? != self.last_verified() {
            return Err(BuildError::Unverified(self.entry.path.clone()));
        }
        Ok(())
    }

    /// Names this package depends on, per its metadata
    pub fn dependencies(&self, cache: &mut SrcinfoCache) -> BuildResult<Vec<String>> {
        Ok(cache.load(&self.srcinfo_path())?.dependencies())
    }

    /// Names this package provides, per its metadata
    pub fn provides(&self, cache: &mut SrcinfoCache) -> BuildResult<Vec<String>> {
        Ok(cache.load(&self.srcinfo_path())?.provides())
    }

    /// For a verified VCS package, the version its PKGBUILD's `pkgver()`
    /// reports; empty for packages without a `pkgver()` function
    pub fn vcs_pkgver(&mut self) -> BuildResult<String> {
        self.ensure_verified()?;
        if let Some(version) = &self.vcs_version {
            return Ok(version.clone());
        }
        // Source the recipe with a no-op default so the real pkgver(), if
        // defined, replaces it.
        let script = "pkgver() { true; } ; srcdir='src/' ; . PKGBUILD ; pkgver";
        let output = Command::new("bash")
            .args(["-c", script])
            .current_dir(&self.fullpath)
            .output()?;
        let version = String::from_utf8_lossy(&output.stdout)
            .trim_end_matches('\n')
            .to_string();
        self.vcs_version = Some(version.clone());
        Ok(version)
    }

    /// The artifact files a build of this package produces. For a verified
    /// checkout, the metadata version is overridden by [`Self::vcs_pkgver`]
    /// when it reports one.
    pub fn artifacts(
        &mut self,
        cache: &mut SrcinfoCache,
        opts: &ArtifactOptions,
    ) -> BuildResult<Vec<PackageArtifact>> {
        let doc = cache.load(&self.srcinfo_path())?;
        let mut artifacts = build_artifacts(doc, opts)?;
        if self.is_verified()? {
            let vcs_version = self.vcs_pkgver()?;
            if !vcs_version.is_empty() {
                for artifact in &mut artifacts {
                    artifact.version = vcs_version.clone();
                }
            }
        }
        Ok(artifacts)
    }

    /// Whether every artifact file already exists in the checkout
    pub fn is_built(
        &mut self,
        cache: &mut SrcinfoCache,
        opts: &ArtifactOptions,
    ) -> BuildResult<bool> {
        for artifact in self.artifacts(cache, opts)? {
            if !self.fullpath.join(artifact.to_string()).is_file() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Download and extract the sources the build needs (`makepkg --nobuild`)
    pub fn fetch_sources(&self) -> BuildResult<PathBuf> {
        self.ensure_verified()?;
        self.run_makepkg(&["--nobuild"], "fetch-sources")
    }

    /// Run the build (`makepkg`), logging to a timestamped file in the
    /// checkout; the log path is returned so callers can point the user at it
    pub fn build(&self) -> BuildResult<PathBuf> {
        self.ensure_verified()?;
        self.run_makepkg(&[], "build")
    }

    fn run_makepkg(&self, args: &[&str], log_prefix: &str) -> BuildResult<PathBuf> {
        let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M");
        let log = self.fullpath.join(format!("{log_prefix}-{stamp}.log"));
        let logfile = File::create(&log)?;
        let status = Command::new("makepkg")
            .args(args)
            .current_dir(&self.fullpath)
            .stdout(logfile.try_clone()?)
            .stderr(logfile)
            .status()?;
        if !status.success() {
            return Err(BuildError::MakepkgFailed {
                path: self.entry.path.clone(),
                status: status.code().unwrap_or(-1),
                log,
            });
        }
        Ok(log)
    }
}

/// Last `count` lines of a log file, for failure reports
pub fn log_tail(log: &Path, count: usize) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(log) else {
        return Vec::new();
    };
    let lines: Vec<&str> = content.trim_end_matches('\n').lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_config::EMPTY_TREE_ID;
    use std::fs;
    use tempfile::TempDir;

    fn entry(path: &str) -> PackageEntry {
        PackageEntry {
            path: path.to_string(),
            url: format!("https://aur.archlinux.org/{path}.git"),
            verified: String::new(),
            asdeps: false,
        }
    }

    #[test]
    fn test_paths_derived_from_entry() {
        let tmp = TempDir::new().unwrap();
        let package = Package::new(entry("foo"), tmp.path());
        assert_eq!(package.path(), "foo");
        assert_eq!(package.fullpath(), tmp.path().join("foo"));
        assert_eq!(package.srcinfo_path(), tmp.path().join("foo").join(".SRCINFO"));
    }

    #[test]
    fn test_last_verified_defaults_to_empty_tree() {
        let tmp = TempDir::new().unwrap();
        let package = Package::new(entry("foo"), tmp.path());
        assert_eq!(package.last_verified(), EMPTY_TREE_ID);
    }

    #[test]
    fn test_unverified_without_checkout() {
        let tmp = TempDir::new().unwrap();
        let package = Package::new(entry("foo"), tmp.path());
        assert!(!package.is_verified().unwrap());
        assert!(matches!(
            package.ensure_verified(),
            Err(BuildError::Git(_))
        ));
    }

    #[test]
    fn test_artifacts_without_git_skip_vcs_override() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("foo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(".SRCINFO"),
            "pkgbase = foo\n\tpkgver = 1.0\n\tpkgrel = 1\n\tarch = any\npkgname = foo\n",
        )
        .unwrap();

        let mut package = Package::new(entry("foo"), tmp.path());
        let mut cache = SrcinfoCache::new();
        let artifacts = package
            .artifacts(&mut cache, &ArtifactOptions::default())
            .unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].to_string(), "foo-1.0-1-any.pkg.tar.xz");
    }

    #[test]
    fn test_is_built_checks_artifact_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("foo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(".SRCINFO"),
            "pkgbase = foo\n\tpkgver = 1.0\n\tpkgrel = 1\n\tarch = any\npkgname = foo\n",
        )
        .unwrap();

        let mut package = Package::new(entry("foo"), tmp.path());
        let mut cache = SrcinfoCache::new();
        let opts = ArtifactOptions::default();
        assert!(!package.is_built(&mut cache, &opts).unwrap());

        fs::write(dir.join("foo-1.0-1-any.pkg.tar.xz"), "").unwrap();
        assert!(package.is_built(&mut cache, &opts).unwrap());
    }

    #[test]
    fn test_log_tail() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("build.log");
        fs::write(&log, "one\ntwo\nthree\n").unwrap();
        assert_eq!(log_tail(&log, 2), vec!["two", "three"]);
        assert_eq!(log_tail(&log, 10).len(), 3);
        assert!(log_tail(&tmp.path().join("missing.log"), 2).is_empty());
    }
}

//! The arbor repository: git root, configuration, registry, metadata cache

use crate::package::Package;
use crate::{BuildError, BuildResult};
use arbor_config::{PackageRegistry, RepoConfig, REPO_CONFIG_FILE};
use arbor_git::{detect_git, GitRepo};
use arbor_package::{compute_dep_graph, DepGraph, SrcinfoCache};
use std::path::{Path, PathBuf};

/// An opened arbor repository.
///
/// Owns the parse cache shared by every resolution in this process;
/// everything else is reloaded per command by the CLI.
pub struct Repo {
    git: GitRepo,
    config: RepoConfig,
    registry: PackageRegistry,
    cache: SrcinfoCache,
}

impl Repo {
    /// Open the arbor repository enclosing `cwd`.
    ///
    /// When `cwd` sits inside a package checkout (which is its own git
    /// repository), the detected git root is not the arbor root; in that
    /// case detection is retried from the checkout root's parent.
    pub fn open(cwd: &Path) -> BuildResult<Self> {
        let git = find_arbor_git(cwd).ok_or(BuildError::NotAnArborRepo)?;
        let config = RepoConfig::load_or_default(&git.work_tree().join(REPO_CONFIG_FILE))?;
        let registry = PackageRegistry::load(&git.work_tree().join(&config.packages_file))?;
        Ok(Self {
            git,
            config,
            registry,
            cache: SrcinfoCache::new(),
        })
    }

    /// Create a fresh arbor repository rooted at `root`: `git init`, default
    /// config, empty registry, all committed
    pub fn init(root: &Path) -> BuildResult<Self> {
        if detect_git(root).is_some() {
            return Err(BuildError::Git(arbor_git::GitError::CommandFailed {
                command: "init".to_string(),
                status: 1,
                stderr: format!("already inside a git repository at {}", root.display()),
            }));
        }
        let git = GitRepo::new(root);
        git.call_success(&["init"])?;

        // Pathspecs resolve against the process cwd, which need not be the
        // work tree, so stage everything by absolute path.
        let config = RepoConfig::default();
        let config_file = root.join(REPO_CONFIG_FILE);
        config.save(&config_file)?;
        git.call_success(&["add", &config_file.to_string_lossy()])?;

        let registry = PackageRegistry::default();
        let registry_file = root.join(&config.packages_file);
        registry.save(&registry_file)?;
        git.call_success(&["add", &registry_file.to_string_lossy()])?;

        git.call_success(&["commit", "-m", "Initial commit"])?;
        Ok(Self {
            git,
            config,
            registry,
            cache: SrcinfoCache::new(),
        })
    }

    pub fn git(&self) -> &GitRepo {
        &self.git
    }

    pub fn root(&self) -> &Path {
        self.git.work_tree()
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PackageRegistry {
        &mut self.registry
    }

    pub fn cache_mut(&mut self) -> &mut SrcinfoCache {
        &mut self.cache
    }

    /// Absolute path of the registry file
    pub fn registry_file(&self) -> PathBuf {
        self.root().join(&self.config.packages_file)
    }

    /// Persist the registry and commit it (plus any other staged changes)
    pub fn commit_registry(&self, message: &str) -> BuildResult<()> {
        let registry_file = self.registry_file();
        self.registry.save(&registry_file)?;
        self.git.call_success(&["add", &registry_file.to_string_lossy()])?;
        self.git.call_success(&["commit", "-m", message])?;
        Ok(())
    }

    /// The package registered under `path`
    pub fn package(&self, path: &str) -> BuildResult<Package> {
        let entry = self.registry.get(path)?.clone();
        Ok(Package::new(entry, self.root()))
    }

    /// Requester/provider multimaps for `paths`, loaded through the shared
    /// metadata cache
    pub fn dep_graph(&mut self, paths: &[String], guess_provides: bool) -> BuildResult<DepGraph> {
        let root = self.git.work_tree().to_path_buf();
        Ok(compute_dep_graph(
            &root,
            paths,
            &mut self.cache,
            guess_provides,
        )?)
    }
}

fn find_arbor_git(cwd: &Path) -> Option<GitRepo> {
    let root = detect_git(cwd)?;
    let repo = GitRepo::new(&root);
    if is_arbor_repo(&repo) {
        return Some(repo);
    }
    // Perhaps this was a package checkout's git; try its parent.
    let parent = root.parent()?;
    let repo = GitRepo::new(detect_git(parent)?);
    is_arbor_repo(&repo).then_some(repo)
}

fn is_arbor_repo(git: &GitRepo) -> bool {
    git.is_tracked(&git.work_tree().join(REPO_CONFIG_FILE))
        .unwrap_or(false)
}

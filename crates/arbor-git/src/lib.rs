//! Thin wrapper over the `git` binary
//!
//! Every arbor repository and every package checkout inside it is a plain
//! git repository; this crate runs git against a fixed work tree / git dir
//! pair and gives callers captured, checked, or pass-through execution.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Git invocation errors
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("git work tree {} does not exist", .0.display())]
    MissingWorkTree(PathBuf),

    #[error("git directory {} does not exist", .0.display())]
    MissingGitDir(PathBuf),
}

pub type GitResult<T> = Result<T, GitError>;

/// Captured result of a git command
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A git repository addressed by its work tree
#[derive(Debug, Clone)]
pub struct GitRepo {
    work_tree: PathBuf,
    git_dir: PathBuf,
}

impl GitRepo {
    /// Wrap the repository whose work tree is at `path` (the git dir is
    /// assumed at `path/.git`); nothing is checked until a command runs
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let work_tree = path.into();
        let git_dir = work_tree.join(".git");
        Self { work_tree, git_dir }
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg(format!("--work-tree={}", self.work_tree.display()))
            .arg(format!("--git-dir={}", self.git_dir.display()))
            .args(args);
        cmd
    }

    /// Run a git command with inherited stdio, returning its exit status
    pub fn plain_call(&self, args: &[&str]) -> GitResult<i32> {
        let status = self.command(args).status()?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Run a git command capturing stdout, stderr, and the exit status
    pub fn call(&self, args: &[&str]) -> GitResult<GitOutput> {
        let output = self.command(args).output()?;
        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }

    /// Run a git command that must succeed, returning its stdout.
    ///
    /// A non-zero status becomes [`GitError::CommandFailed`] carrying the
    /// command and its stderr; stderr of a successful command is forwarded
    /// to the user.
    pub fn call_success(&self, args: &[&str]) -> GitResult<String> {
        let output = self.call(args)?;
        if !output.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                status: output.status,
                stderr: output.stderr.trim_end().to_string(),
            });
        }
        if !output.stderr.is_empty() {
            eprint!("git: {}", output.stderr);
        }
        Ok(output.stdout)
    }

    /// Whether `filepath` is tracked (absolute or relative to the cwd)
    pub fn is_tracked(&self, filepath: &Path) -> GitResult<bool> {
        let filepath = filepath.to_string_lossy();
        let output = self.call(&["ls-files", "--error-unmatch", &filepath])?;
        Ok(output.success())
    }

    /// Current revision id of HEAD
    pub fn head(&self) -> GitResult<String> {
        Ok(self.call_success(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// The cwd relative to the root of the working tree (empty at the root)
    pub fn prefix_of_cwd(&self) -> GitResult<String> {
        Ok(self
            .call_success(&["rev-parse", "--show-prefix"])?
            .trim()
            .to_string())
    }

    /// Whether both the work tree and the git dir exist on disk
    pub fn exists(&self) -> bool {
        self.work_tree.is_dir() && self.git_dir.is_dir()
    }

    pub fn ensure_exists(&self) -> GitResult<()> {
        if !self.git_dir.is_dir() {
            return Err(GitError::MissingGitDir(self.git_dir.clone()));
        }
        if !self.work_tree.is_dir() {
            return Err(GitError::MissingWorkTree(self.work_tree.clone()));
        }
        Ok(())
    }
}

/// Absolute path of the git root enclosing `cwd`, or `None` when `cwd` is
/// not inside a git repository (or git is not runnable)
pub fn detect_git(cwd: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(cwd)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let root = stdout.trim_end_matches(['\r', '\n', '/']);
    if root.is_empty() {
        None
    } else {
        Some(PathBuf::from(root))
    }
}

pub mod add;
pub mod build;
pub mod cat_srcinfo;
pub mod depadd;
pub mod diff;
pub mod fetch;
pub mod git;
pub mod init;
pub mod remove;
pub mod status;
pub mod verify;
pub mod why;

use anyhow::Result;
use arbor_build::Repo;
use colored::Colorize;

/// Open the arbor repository enclosing the current working directory
pub fn open_repo() -> Result<Repo> {
    Ok(Repo::open(&std::env::current_dir()?)?)
}

/// Turn the user's path arguments into a scope of registry paths.
///
/// Given paths are prefixed with the cwd's position inside the work tree so
/// relative arguments work from subdirectories; with no arguments the whole
/// registry, in registry order, is the scope. The second component tells
/// whether the scope was defaulted (commands behave interactively then).
pub fn resolve_scope(repo: &Repo, paths: &[String]) -> Result<(Vec<String>, bool)> {
    if paths.is_empty() {
        return Ok((repo.registry().paths(), true));
    }
    let prefix = repo.git().prefix_of_cwd()?;
    let prefixed = paths.iter().map(|p| format!("{prefix}{p}")).collect();
    Ok((prefixed, false))
}

/// Colored section header used by diff and verify output
pub fn header(text: &str) -> String {
    format!(
        "{} {} {}",
        "========".yellow(),
        text.bright_white().bold(),
        "========".yellow()
    )
}

/// The AUR origin URL for a package name
pub fn aur_url(name: &str) -> String {
    format!("https://aur.archlinux.org/{name}.git")
}

//! Initialize an empty arbor repository (arbor init)

use anyhow::{bail, Context, Result};
use arbor_build::Repo;
use arbor_git::detect_git;

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    if let Some(existing) = detect_git(&cwd) {
        bail!("already a git repository in {}", existing.display());
    }
    let repo = Repo::init(&cwd).context("failed to initialize the repository")?;
    println!("Initialized arbor repository in {}", repo.root().display());
    Ok(())
}

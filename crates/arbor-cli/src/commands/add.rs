//! Register a new package (arbor add)

use crate::commands::{aur_url, open_repo};
use anyhow::Result;

pub fn run(asdeps: bool, name: &str, path: Option<&str>) -> Result<()> {
    let mut repo = open_repo()?;
    let prefix = repo.git().prefix_of_cwd()?;
    let path = format!("{prefix}{}", path.unwrap_or(name));

    repo.registry_mut().add(&path, &aur_url(name), asdeps)?;
    repo.commit_registry(&format!("Add {path}"))?;
    println!("Registered {path}");
    Ok(())
}

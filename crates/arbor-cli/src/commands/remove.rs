//! Unregister a package and delete its checkout (arbor rm)

use crate::commands::open_repo;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub fn run(path: &str) -> Result<()> {
    let mut repo = open_repo()?;
    let prefix = repo.git().prefix_of_cwd()?;
    let path = format!("{prefix}{path}");

    repo.registry_mut().remove(&path)?;
    let checkout = repo.root().join(&path);
    if checkout.exists() {
        remove_tree(&checkout)
            .with_context(|| format!("failed to delete {}", checkout.display()))?;
    }
    repo.commit_registry(&format!("Remove {path}"))?;
    println!("Removed {path}");
    Ok(())
}

/// Delete a checkout tree. Build directories regularly contain read-only
/// subtrees extracted from source archives, so directory permissions are
/// widened before removal.
fn remove_tree(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() {
            let mut perms = entry.metadata()?.permissions();
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                perms.set_mode(perms.mode() | 0o700);
            }
            let _ = fs::set_permissions(entry.path(), perms);
        }
    }
    fs::remove_dir_all(root)?;
    Ok(())
}

//! Mark checked-out trees as reviewed (arbor verify)

use crate::commands::{header, open_repo, resolve_scope};
use anyhow::Result;
use dialoguer::Confirm;

pub fn run(paths: &[String]) -> Result<()> {
    let mut repo = open_repo()?;
    let (scope, defaulted) = resolve_scope(&repo, paths)?;

    for path in &scope {
        let package = repo.package(path)?;
        package.git().ensure_exists()?;
        let head = package.git().head()?;
        if head == package.last_verified() {
            if !defaulted {
                println!("{path} is up to date");
            }
            continue;
        }

        if defaulted {
            // Interactive run over the whole registry: show what changed
            // and let the user decide per package.
            let range = format!("{}..HEAD", package.last_verified());
            let output = package
                .git()
                .call(&["diff", "--color=always", &range])?;
            println!("{}", header(path));
            print!("{}", output.stdout);
            let accept = Confirm::new()
                .with_prompt(format!("Verify {path}?"))
                .default(false)
                .interact()?;
            if !accept {
                continue;
            }
        }

        let entry = repo.registry_mut().get_mut(path)?;
        entry.verified = head;
        repo.commit_registry(&format!("Verify {path}"))?;
        println!("Verified {path}");
    }
    Ok(())
}

//! Show what changed since the last verified tree (arbor diff)

use crate::commands::{header, open_repo, resolve_scope};
use anyhow::Result;

pub fn run(paths: &[String]) -> Result<()> {
    let repo = open_repo()?;
    let (scope, defaulted) = resolve_scope(&repo, paths)?;

    for path in &scope {
        let package = repo.package(path)?;
        if !package.git().exists() {
            if !defaulted {
                println!("{}", header(&format!("{path} (not fetched)")));
            }
            continue;
        }
        let range = format!("{}..HEAD", package.last_verified());
        let output = package
            .git()
            .call(&["diff", "--color=always", &range])?;
        if output.stdout.is_empty() && defaulted {
            continue;
        }
        println!("{}", header(path));
        print!("{}", output.stdout);
    }
    Ok(())
}

//! Per-package overview of the repository (arbor status)

use crate::commands::{open_repo, resolve_scope};
use anyhow::Result;
use arbor_config::EMPTY_TREE_ID;
use colored::Colorize;

pub fn run(paths: &[String]) -> Result<()> {
    let repo = open_repo()?;
    let (scope, _) = resolve_scope(&repo, paths)?;

    let width = scope.iter().map(|p| p.len()).max().unwrap_or(0);
    for path in &scope {
        let package = repo.package(path)?;
        let state = if !package.git().exists() {
            "not fetched".dimmed().to_string()
        } else {
            let head = package.git().head()?;
            if head == package.last_verified() {
                format!("{} {}", crop(&head).green(), "verified".green())
            } else if package.last_verified() == EMPTY_TREE_ID {
                format!("{} {}", crop(&head).red(), "never verified".red())
            } else {
                format!("{} {}", crop(&head).red(), "unverified".red())
            }
        };
        let asdeps = if package.entry().asdeps {
            " (dependency)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{path:width$}  {state}{asdeps}");
    }
    Ok(())
}

fn crop(hash: &str) -> &str {
    &hash[..hash.len().min(10)]
}

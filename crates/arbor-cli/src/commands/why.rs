//! Explain why a package is in the repository (arbor why)

use crate::commands::{open_repo, resolve_scope};
use anyhow::Result;
use colored::Colorize;

pub fn run(paths: &[String]) -> Result<()> {
    let mut repo = open_repo()?;
    let (scope, _) = resolve_scope(&repo, paths)?;

    // The graph spans the whole registry: a package queried by path may be
    // needed by packages outside the requested scope.
    let all = repo.registry().paths();
    let graph = repo.dep_graph(&all, true)?;

    for path in &scope {
        let entry = repo.registry().get(path)?;
        if entry.asdeps {
            println!("{} was added as a dependency", path.bold());
        } else {
            println!("{} was added explicitly", path.bold());
        }

        let provided: Vec<&str> = graph
            .providers
            .iter()
            .filter(|(_, providers)| providers.iter().any(|p| p == path))
            .map(|(name, _)| name.as_str())
            .collect();
        for name in provided {
            let requesters: Vec<&str> = graph
                .requesters
                .get(name)
                .map(|paths| {
                    paths
                        .iter()
                        .filter(|p| p.as_str() != path)
                        .map(String::as_str)
                        .collect()
                })
                .unwrap_or_default();
            if requesters.is_empty() {
                println!("  {name}: required by nothing else");
            } else {
                println!("  {name}: required by {}", requesters.join(", "));
            }
        }
    }
    Ok(())
}

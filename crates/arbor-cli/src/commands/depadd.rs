//! Resolve missing dependencies for the registered packages (arbor depadd)

use crate::commands::{aur_url, open_repo, resolve_scope};
use anyhow::{Context, Result};
use arbor_build::depcheck;
use colored::Colorize;
use dialoguer::Confirm;
use std::process::Command;

pub fn run(paths: &[String]) -> Result<()> {
    let mut repo = open_repo()?;
    let (scope, _) = resolve_scope(&repo, paths)?;

    let graph = repo.dep_graph(&scope, true)?;
    let unresolved: Vec<String> = graph
        .unresolved()
        .into_iter()
        .map(str::to_string)
        .collect();
    if unresolved.is_empty() {
        println!("No missing dependencies");
        return Ok(());
    }

    let check = depcheck(&unresolved)?;
    print!("{check}");

    if !check.available.is_empty() {
        let prompt = format!(
            "Install from the repositories as dependencies: {}?",
            check.available.join(", ")
        );
        if Confirm::new().with_prompt(prompt).default(true).interact()? {
            let status = Command::new("sudo")
                .args(["pacman", "-S", "--asdeps"])
                .args(&check.available)
                .status()
                .context("failed to run pacman")?;
            if !status.success() {
                eprintln!("{}", "pacman -S failed; continuing".yellow());
            }
        }
    }

    for name in &check.missing {
        let prompt = format!("Register {name} as a new arbor package (dependency)?");
        if !Confirm::new().with_prompt(prompt).default(true).interact()? {
            continue;
        }
        let requesters = graph
            .requesters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let required_by: Vec<String> =
            requesters.iter().map(|path| format!("  - {path}")).collect();
        repo.registry_mut().add(name, &aur_url(name), true)?;
        repo.commit_registry(&format!(
            "Add dependency {name}\n\nIt is required by:\n{}",
            required_by.join("\n")
        ))?;
        println!("Registered {name}");
    }
    Ok(())
}

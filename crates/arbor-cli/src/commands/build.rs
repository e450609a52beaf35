//! Build packages in dependency order, then install them (arbor build)

use crate::commands::{open_repo, resolve_scope};
use anyhow::Result;
use arbor_build::{install, log_tail, uninstalled, BuildError, Package};
use arbor_package::{depsort, ArtifactOptions};
use colored::Colorize;

pub fn run(install_flag: bool, paths: &[String]) -> Result<()> {
    let mut repo = open_repo()?;
    let (scope, defaulted) = resolve_scope(&repo, paths)?;
    // A bare `arbor build` keeps the whole system in sync, so it installs.
    let install_flag = install_flag || defaulted;
    let opts = ArtifactOptions::default();

    let graph = repo.dep_graph(&scope, true)?;
    for (path, name) in &graph.guesses {
        println!("Guessing that {path} provides {name}");
    }
    let outcome = depsort(&graph);
    if outcome.has_cycles() {
        eprintln!(
            "{} {}",
            "Ignoring packages because of cyclic dependencies:".yellow(),
            outcome.cyclic.join(", ")
        );
    }
    println!("Building the packages: {}", outcome.order.join(", "));

    let mut to_install: Vec<Package> = Vec::new();
    for path in &outcome.order {
        println!(":: {path}");
        let mut package = repo.package(path)?;
        match package.ensure_verified() {
            Ok(()) => {}
            Err(BuildError::Unverified(p)) => {
                println!(":: Skipping unverified {p}");
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        if !package.is_built(repo.cache_mut(), &opts)? {
            package.fetch_sources()?;
            if let Err(err) = package.build() {
                if let BuildError::MakepkgFailed { log, .. } = &err {
                    for line in log_tail(log, 10) {
                        eprintln!("{line}");
                    }
                }
                return Err(err.into());
            }
        } else {
            println!("Built packages up to date");
        }

        if install_flag && !uninstalled(&mut package, repo.cache_mut(), &opts)?.is_empty() {
            to_install.push(package);
        }
    }

    if !to_install.is_empty() {
        install(&mut to_install, repo.cache_mut(), &opts)?;
    }
    Ok(())
}

//! Clone or update the registered checkouts (arbor fetch)

use crate::commands::{open_repo, resolve_scope};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

pub fn run(paths: &[String]) -> Result<()> {
    let repo = open_repo()?;
    let (scope, _) = resolve_scope(&repo, paths)?;

    let pb = ProgressBar::new(scope.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .context("invalid progress template")?,
    );
    for path in &scope {
        pb.set_message(path.clone());
        pb.println(format!("Fetching {path}"));
        let package = repo.package(path)?;
        package.fetch()?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

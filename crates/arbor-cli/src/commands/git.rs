//! Pass a git command through to the arbor repository (arbor git)

use crate::commands::open_repo;
use anyhow::Result;

pub fn run(args: &[String]) -> Result<()> {
    let repo = open_repo()?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let status = repo.git().plain_call(&args)?;
    std::process::exit(status);
}

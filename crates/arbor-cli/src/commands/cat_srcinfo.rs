//! Reprint parsed .SRCINFO files (arbor cat-srcinfo)

use anyhow::{Context, Result};
use arbor_package::SrcinfoDocument;
use std::path::PathBuf;

pub fn run(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("cannot read {}", file.display()))?;
        let doc = SrcinfoDocument::parse(&text)
            .with_context(|| format!("cannot parse {}", file.display()))?;
        print!("{doc}");
    }
    Ok(())
}

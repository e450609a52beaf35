//! Dependency graph construction over a set of package checkouts

use crate::cache::SrcinfoCache;
use crate::{PackageError, Result};
use indexmap::IndexMap;
use std::path::Path;

/// Metadata file name inside each package directory
pub const SRCINFO_FILE: &str = ".SRCINFO";

/// The two multimaps a build-order resolution works on.
///
/// Both maps only ever reference paths from the scope they were built from.
/// A dependency name with no in-scope provider still appears as a
/// `requesters` key; it is treated as externally satisfied.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    /// Dependency name to the paths that require it, in scope order
    pub requesters: IndexMap<String, Vec<String>>,
    /// Package name to the paths that provide it, in scope order
    pub providers: IndexMap<String, Vec<String>>,
    /// `(path, guessed name)` pairs recorded when metadata was absent and
    /// provide-guessing was on; callers report these to the user
    pub guesses: Vec<(String, String)>,
}

impl DepGraph {
    /// Dependency names with no in-scope provider
    pub fn unresolved(&self) -> Vec<&str> {
        self.requesters
            .keys()
            .filter(|name| !self.providers.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Build the requester/provider multimaps for `paths` (relative to `root`).
///
/// Each path's metadata is loaded through `cache`. A path with no readable
/// metadata contributes nothing, unless `guess_provides` is set, in which
/// case it is assumed to provide exactly one package named after its final
/// path component. Malformed metadata aborts the whole computation.
pub fn compute_dep_graph(
    root: &Path,
    paths: &[String],
    cache: &mut SrcinfoCache,
    guess_provides: bool,
) -> Result<DepGraph> {
    let mut graph = DepGraph::default();
    for path in paths {
        let srcinfo_path = root.join(path).join(SRCINFO_FILE);
        match cache.load(&srcinfo_path) {
            Ok(doc) => {
                for dep in doc.dependencies() {
                    graph.requesters.entry(dep).or_default().push(path.clone());
                }
                for name in doc.provides() {
                    graph.providers.entry(name).or_default().push(path.clone());
                }
            }
            Err(PackageError::Unavailable { .. }) => {
                if guess_provides {
                    let name = final_component(path);
                    graph.guesses.push((path.clone(), name.clone()));
                    graph.providers.entry(name).or_default().push(path.clone());
                }
            }
            Err(err) => return Err(err),
        }
    }
    Ok(graph)
}

fn final_component(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

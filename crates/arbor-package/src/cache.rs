//! Memoized `.SRCINFO` loading keyed by file path

use crate::srcinfo::SrcinfoDocument;
use crate::{PackageError, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse-once-per-process document cache.
///
/// [`load`](Self::load) reads and parses a file at most once; re-reading the
/// file requires an explicit [`reload`](Self::reload) or
/// [`invalidate`](Self::invalidate). Failed loads are not cached, so a file
/// that appears later is picked up by the next `load`.
#[derive(Debug, Default)]
pub struct SrcinfoCache {
    documents: HashMap<PathBuf, SrcinfoDocument>,
}

impl SrcinfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached document for `path`, parsing it on first use.
    ///
    /// A missing or unreadable file is [`PackageError::Unavailable`];
    /// unparseable content is [`PackageError::MalformedLine`].
    pub fn load(&mut self, path: &Path) -> Result<&SrcinfoDocument> {
        match self.documents.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let doc = read_document(path)?;
                Ok(entry.insert(doc))
            }
        }
    }

    /// Re-read `path` unconditionally, replacing any cached document
    pub fn reload(&mut self, path: &Path) -> Result<&SrcinfoDocument> {
        let doc = read_document(path)?;
        self.documents.insert(path.to_path_buf(), doc);
        self.load(path)
    }

    /// Drop the cached document for `path`, if any
    pub fn invalidate(&mut self, path: &Path) {
        self.documents.remove(path);
    }
}

fn read_document(path: &Path) -> Result<SrcinfoDocument> {
    let text = fs::read_to_string(path).map_err(|source| PackageError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    SrcinfoDocument::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_srcinfo(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_is_memoized() {
        let file = write_srcinfo("pkgbase = x\n\tpkgver = 1\n");
        let mut cache = SrcinfoCache::new();
        cache.load(file.path()).unwrap();

        // Overwrite on disk; the cached parse must still be served.
        fs::write(file.path(), "pkgbase = x\n\tpkgver = 2\n").unwrap();
        let doc = cache.load(file.path()).unwrap();
        assert_eq!(doc.query_any("pkgver"), vec!["1"]);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let file = write_srcinfo("pkgbase = x\n\tpkgver = 1\n");
        let mut cache = SrcinfoCache::new();
        cache.load(file.path()).unwrap();

        fs::write(file.path(), "pkgbase = x\n\tpkgver = 2\n").unwrap();
        let doc = cache.reload(file.path()).unwrap();
        assert_eq!(doc.query_any("pkgver"), vec!["2"]);
    }

    #[test]
    fn test_invalidate_forces_reparse() {
        let file = write_srcinfo("pkgbase = x\n\tpkgver = 1\n");
        let mut cache = SrcinfoCache::new();
        cache.load(file.path()).unwrap();
        cache.invalidate(file.path());

        fs::write(file.path(), "pkgbase = x\n\tpkgver = 3\n").unwrap();
        let doc = cache.load(file.path()).unwrap();
        assert_eq!(doc.query_any("pkgver"), vec!["3"]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let mut cache = SrcinfoCache::new();
        let err = cache.load(Path::new("/nonexistent/.SRCINFO")).unwrap_err();
        assert!(matches!(err, PackageError::Unavailable { .. }));
    }

    #[test]
    fn test_malformed_content_is_not_unavailable() {
        let file = write_srcinfo("not a srcinfo\n");
        let mut cache = SrcinfoCache::new();
        let err = cache.load(file.path()).unwrap_err();
        assert!(matches!(err, PackageError::MalformedLine { line: 1, .. }));
    }
}

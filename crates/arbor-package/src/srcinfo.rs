//! `.SRCINFO` parsing, serialization, and field queries
//!
//! The format is line-oriented: a `name = value` line at zero indentation
//! opens a new section, a single-tab-indented `key = value` line appends a
//! value to the open section, and `#` starts a comment line. One `pkgbase`
//! section carries defaults that `pkgname` sections fall back to.

use crate::{PackageError, Result};
use indexmap::IndexMap;
use std::fmt;

/// What a section header declares
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `pkgbase` - shared defaults for every package in the document
    Base,
    /// `pkgname` - one concrete package
    Package,
    /// Any other header name; kept verbatim so re-serialization is faithful
    Other(String),
}

impl SectionKind {
    fn from_header(name: &str) -> Self {
        match name {
            "pkgbase" => SectionKind::Base,
            "pkgname" => SectionKind::Package,
            other => SectionKind::Other(other.to_string()),
        }
    }

    /// Header name as it appears in the file
    pub fn header_name(&self) -> &str {
        match self {
            SectionKind::Base => "pkgbase",
            SectionKind::Package => "pkgname",
            SectionKind::Other(name) => name,
        }
    }
}

/// Identifies a section: header kind plus the header's value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub kind: SectionKind,
    pub name: String,
}

impl SectionKey {
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Base,
            name: name.into(),
        }
    }

    pub fn package(name: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Package,
            name: name.into(),
        }
    }
}

/// Field key to ordered values, in insertion order
pub type Section = IndexMap<String, Vec<String>>;

/// A parsed `.SRCINFO` document: sections in document order.
///
/// A duplicate section key replaces the earlier section's content while
/// keeping its original position. That matches the reference behavior for
/// (out-of-spec) duplicate headers and is deliberately not merged or
/// rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SrcinfoDocument {
    sections: IndexMap<SectionKey, Section>,
}

impl SrcinfoDocument {
    /// Parse a document, failing with [`PackageError::MalformedLine`] on the
    /// first line that matches none of the recognized forms.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: IndexMap<SectionKey, Section> = IndexMap::new();
        let mut current: Option<(SectionKey, Section)> = None;

        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if is_blank_or_comment(line) {
                continue;
            }
            let malformed = || PackageError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            };
            if let Some(rest) = line.strip_prefix('\t') {
                // Field line: exactly one leading tab, then `key = value`.
                let (key, value) = split_assignment(rest).ok_or_else(malformed)?;
                let (_, section) = current.as_mut().ok_or_else(malformed)?;
                section
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
            } else {
                // Header line: flush the accumulating section, open a new one.
                let (name, value) = split_assignment(line).ok_or_else(malformed)?;
                let key = SectionKey {
                    kind: SectionKind::from_header(name),
                    name: value.to_string(),
                };
                if let Some((prev_key, prev_section)) = current.replace((key, Section::new())) {
                    sections.insert(prev_key, prev_section);
                }
            }
        }
        if let Some((key, section)) = current {
            sections.insert(key, section);
        }

        Ok(Self { sections })
    }

    /// Sections in document order
    pub fn sections(&self) -> impl Iterator<Item = (&SectionKey, &Section)> {
        self.sections.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All values of `field` across every section, in document order
    pub fn query_any(&self, field: &str) -> Vec<String> {
        let mut values = Vec::new();
        for section in self.sections.values() {
            if let Some(found) = section.get(field) {
                values.extend(found.iter().cloned());
            }
        }
        values
    }

    /// Values of `field` for the `pkgname` section named `package`, falling
    /// back to the `pkgbase` section when the package-level result is empty
    pub fn query_package(&self, package: &str, field: &str) -> Vec<String> {
        let mut values = Vec::new();
        let mut fallback = Vec::new();
        for (key, section) in &self.sections {
            match key.kind {
                SectionKind::Package if key.name == package => {
                    if let Some(found) = section.get(field) {
                        values.extend(found.iter().cloned());
                    }
                }
                SectionKind::Base => {
                    if let Some(found) = section.get(field) {
                        fallback.extend(found.iter().cloned());
                    }
                }
                _ => {}
            }
        }
        if values.is_empty() {
            fallback
        } else {
            values
        }
    }

    /// Names of the packages this document builds (`pkgname` section names)
    pub fn package_names(&self) -> Vec<String> {
        self.sections
            .keys()
            .filter(|key| key.kind == SectionKind::Package)
            .map(|key| key.name.clone())
            .collect()
    }

    /// Names this document's packages depend on, constraint-stripped.
    ///
    /// Build-time dependencies first, then runtime, then check dependencies;
    /// the fixed order keeps the result stable across calls.
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps = self.query_any("makedepends");
        deps.extend(self.query_any("depends"));
        deps.extend(self.query_any("checkdepends"));
        strip_version_constraints(deps).collect()
    }

    /// Names this document's packages make available: the package names
    /// themselves plus the `provides` field, constraint-stripped
    pub fn provides(&self) -> Vec<String> {
        let mut names = self.package_names();
        names.extend(self.query_any("provides"));
        strip_version_constraints(names).collect()
    }
}

impl fmt::Display for SrcinfoDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, section) in &self.sections {
            writeln!(f, "{} = {}", key.kind.header_name(), key.name)?;
            for (field, values) in section {
                for value in values {
                    writeln!(f, "\t{field} = {value}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Drop the version constraint from a dependency token: the longest prefix
/// before the first `<`, `>`, or `=`
pub fn strip_version_constraint(token: &str) -> &str {
    match token.find(['<', '>', '=']) {
        Some(pos) => &token[..pos],
        None => token,
    }
}

/// Constraint-strip every entry of a dependency list
pub fn strip_version_constraints<I>(tokens: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
{
    tokens
        .into_iter()
        .map(|token| strip_version_constraint(&token).to_string())
}

fn is_blank_or_comment(line: &str) -> bool {
    let rest = line.trim_start_matches([' ', '\t']);
    rest.is_empty() || rest.starts_with('#')
}

/// Split a `key = value` line. The key must be non-empty and free of spaces,
/// tabs, and `=`; the separator is exactly one space, `=`, one space. The
/// value may be empty.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(" = ")?;
    if key.is_empty() || key.contains([' ', '\t', '=']) {
        return None;
    }
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SAMPLE: &str = "\
pkgbase = mypkg
\tpkgver = 1.0
\tpkgrel = 2
\tarch = x86_64
\tmakedepends = cmake
\tdepends = glibc>=2.28

pkgname = mypkg
\tdepends = libfoo

pkgname = mypkg-doc
\tarch = any
";

    #[test]
    fn test_parse_sections_in_order() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        let keys: Vec<_> = doc.sections().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                SectionKey::base("mypkg"),
                SectionKey::package("mypkg"),
                SectionKey::package("mypkg-doc"),
            ]
        );
    }

    #[test]
    fn test_parse_repeated_field_appends() {
        let text = "pkgbase = x\n\tdepends = a\n\tdepends = b\n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.query_any("depends"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let text = "# leading comment\n\npkgbase = x\n   \t# indented comment\n\tpkgver = 1\n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.query_any("pkgver"), vec!["1"]);
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let text = "pkgbase = x\r\n\tpkgver = 1\r\n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.query_any("pkgver"), vec!["1"]);
    }

    #[test]
    fn test_parse_empty_value() {
        let text = "pkgbase = x\n\tinstall = \n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.query_any("install"), vec![""]);
    }

    #[rstest]
    #[case("garbage line\n", 1, "garbage line")]
    #[case("pkgbase = x\n\tno-separator\n", 2, "\tno-separator")]
    #[case("pkgbase = x\n\t\tkey = value\n", 2, "\t\tkey = value")]
    #[case("pkgbase = x\nkey  =  doubled\n", 2, "key  =  doubled")]
    fn test_parse_malformed_line(#[case] text: &str, #[case] line: usize, #[case] content: &str) {
        match SrcinfoDocument::parse(text) {
            Err(PackageError::MalformedLine {
                line: got_line,
                content: got_content,
            }) => {
                assert_eq!(got_line, line);
                assert_eq!(got_content, content);
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_field_line_before_any_header() {
        let err = SrcinfoDocument::parse("\tpkgver = 1\n").unwrap_err();
        assert!(matches!(err, PackageError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_unknown_header_kind_accepted() {
        let doc = SrcinfoDocument::parse("custom = thing\n\tkey = v\n").unwrap();
        let (key, _) = doc.sections().next().unwrap();
        assert_eq!(key.kind, SectionKind::Other("custom".to_string()));
        assert_eq!(doc.query_any("key"), vec!["v"]);
    }

    #[test]
    fn test_duplicate_section_key_overwrites() {
        // Known quirk: the later section replaces the earlier one's content
        // while keeping the original position.
        let text = "pkgname = x\n\tdepends = old\npkgname = x\n\tdepends = new\n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.query_package("x", "depends"), vec!["new"]);
        assert_eq!(doc.sections().count(), 1);
    }

    #[test]
    fn test_roundtrip_is_semantically_equal() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        let reparsed = SrcinfoDocument::parse(&doc.to_string()).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn test_query_any_concatenates_in_document_order() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.query_any("depends"), vec!["glibc>=2.28", "libfoo"]);
        assert_eq!(doc.query_any("arch"), vec!["x86_64", "any"]);
    }

    #[test]
    fn test_query_package_prefers_package_level() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        // Set in both: the package-level value wins exclusively.
        assert_eq!(doc.query_package("mypkg", "depends"), vec!["libfoo"]);
    }

    #[test]
    fn test_query_package_falls_back_to_base() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.query_package("mypkg-doc", "pkgver"), vec!["1.0"]);
        assert_eq!(doc.query_package("mypkg-doc", "arch"), vec!["any"]);
    }

    #[test]
    fn test_query_package_unknown_field_is_empty() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        assert!(doc.query_package("mypkg", "license").is_empty());
    }

    #[test]
    fn test_package_names() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.package_names(), vec!["mypkg", "mypkg-doc"]);
    }

    #[test]
    fn test_dependencies_order_and_stripping() {
        let doc = SrcinfoDocument::parse(SAMPLE).unwrap();
        // makedepends, then depends, then checkdepends.
        assert_eq!(doc.dependencies(), vec!["cmake", "glibc", "libfoo"]);
    }

    #[test]
    fn test_provides_includes_package_names() {
        let text = "pkgbase = x\npkgname = x\n\tprovides = libx=1.2\n";
        let doc = SrcinfoDocument::parse(text).unwrap();
        assert_eq!(doc.provides(), vec!["x", "libx"]);
    }

    #[rstest]
    #[case("foo>=1.2.3", "foo")]
    #[case("bar", "bar")]
    #[case("baz<2", "baz")]
    #[case("qux=1", "qux")]
    #[case("", "")]
    fn test_strip_version_constraint(#[case] token: &str, #[case] expected: &str) {
        assert_eq!(strip_version_constraint(token), expected);
    }

    #[test]
    fn test_strip_version_constraints_is_restartable() {
        let tokens = vec!["a>1".to_string(), "b".to_string()];
        let first: Vec<_> = strip_version_constraints(tokens.clone()).collect();
        let second: Vec<_> = strip_version_constraints(tokens).collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = SrcinfoDocument::parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.to_string(), "");
    }
}

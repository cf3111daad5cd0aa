//! Source kinds, candidates and their expected compiler outputs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix of every compiled output file
pub const CLASS_SUFFIX: &str = ".class";

/// Kind of source file recognized by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Groovy source, the primary language
    Groovy,
    /// Java source, compiled jointly with Groovy
    Java,
}

impl SourceKind {
    /// Get the file suffix for this kind, including the leading dot
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Groovy => ".groovy",
            Self::Java => ".java",
        }
    }

    /// Whether this is the primary language (subject to root-package fallback)
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Groovy)
    }

    /// All recognized kinds
    pub fn all() -> [SourceKind; 2] {
        [Self::Groovy, Self::Java]
    }

    /// Classify a file name by suffix
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|kind| name.ends_with(kind.suffix()))
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Groovy => write!(f, "groovy"),
            Self::Java => write!(f, "java"),
        }
    }
}

/// A candidate file name relative to a source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidate {
    name: String,
    kind: SourceKind,
}

impl SourceCandidate {
    /// Classify a relative file name.
    ///
    /// Returns `None` for unrecognized suffixes and for names that consist of
    /// nothing but the suffix.
    pub fn classify(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let kind = SourceKind::from_file_name(&name)?;
        if name.len() <= kind.suffix().len() {
            return None;
        }
        Some(Self { name, kind })
    }

    /// The relative file name as given
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The relative name with the source suffix removed
    pub fn base_name(&self) -> &str {
        &self.name[..self.name.len() - self.kind.suffix().len()]
    }

    /// Relative output file name, mirroring the source's package directories
    pub fn output_name(&self) -> String {
        format!("{}{}", self.base_name(), CLASS_SUFFIX)
    }

    /// Output file name placed at the destination root.
    ///
    /// Only primary-language sources nested below a directory have one.
    pub fn root_output_name(&self) -> Option<String> {
        if !self.kind.is_primary() {
            return None;
        }
        let base = self.base_name();
        let idx = base.rfind(is_separator)?;
        Some(format!("{}{}", &base[idx + 1..], CLASS_SUFFIX))
    }

    /// Absolute path of this candidate under a source root
    pub fn source_path(&self, src_dir: &Path) -> PathBuf {
        src_dir.join(&self.name)
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// A stale source paired with the output file it is expected to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputMapping {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl OutputMapping {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Foo.groovy", Some(SourceKind::Groovy))]
    #[case("a/b/Bar.java", Some(SourceKind::Java))]
    #[case("README.md", None)]
    #[case("Foo.groovy.bak", None)]
    fn test_kind_from_file_name(#[case] name: &str, #[case] expected: Option<SourceKind>) {
        assert_eq!(SourceKind::from_file_name(name), expected);
    }

    #[test]
    fn test_output_name_mirrors_packages() {
        let candidate = SourceCandidate::classify("org/example/Book.groovy").unwrap();
        assert_eq!(candidate.base_name(), "org/example/Book");
        assert_eq!(candidate.output_name(), "org/example/Book.class");
    }

    #[test]
    fn test_java_output_name() {
        let candidate = SourceCandidate::classify("util/Strings.java").unwrap();
        assert_eq!(candidate.output_name(), "util/Strings.class");
        assert_eq!(candidate.root_output_name(), None);
    }

    #[test]
    fn test_root_output_name_only_for_nested_groovy() {
        let nested = SourceCandidate::classify("org/example/Book.groovy").unwrap();
        assert_eq!(nested.root_output_name().as_deref(), Some("Book.class"));

        let flat = SourceCandidate::classify("Book.groovy").unwrap();
        assert_eq!(flat.root_output_name(), None);
    }

    #[test]
    fn test_bare_suffix_is_not_a_candidate() {
        assert!(SourceCandidate::classify(".groovy").is_none());
        assert!(SourceCandidate::classify(".java").is_none());
    }
}

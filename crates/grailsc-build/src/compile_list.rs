//! Run-scoped compile list and destination ledger
use crate::source::OutputMapping;
use std::path::PathBuf;

/// Sources selected for compilation in one run, paired with their outputs.
///
/// Both sequences only grow. Every scanner call of a run appends to the same
/// `CompileRun`; the executor consumes it once.
#[derive(Debug, Default, Clone)]
pub struct CompileRun {
    compile_list: Vec<PathBuf>,
    destinations: Vec<PathBuf>,
}

impl CompileRun {
    /// Create an empty run
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of stale sources, keeping their order
    pub fn append(&mut self, sources: impl IntoIterator<Item = PathBuf>) {
        self.compile_list.extend(sources);
    }

    /// Record the expected output of a stale source
    pub fn append_output(&mut self, path: impl Into<PathBuf>) {
        self.destinations.push(path.into());
    }

    /// Sources accumulated so far
    pub fn compile_list(&self) -> &[PathBuf] {
        &self.compile_list
    }

    /// Output files accumulated so far
    pub fn destinations(&self) -> &[PathBuf] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.compile_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compile_list.is_empty()
    }

    /// Whether every selected source has a recorded output
    pub fn is_balanced(&self) -> bool {
        self.compile_list.len() == self.destinations.len()
    }

    /// Source/output pairs in selection order
    pub fn mappings(&self) -> Vec<OutputMapping> {
        self.compile_list
            .iter()
            .zip(&self.destinations)
            .map(|(src, dest)| OutputMapping::new(src, dest))
            .collect()
    }

    pub(crate) fn into_parts(self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        (self.compile_list, self.destinations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_run_is_empty() {
        let run = CompileRun::new();
        assert!(run.is_empty());
        assert!(run.is_balanced());
        assert_eq!(run.len(), 0);
    }

    #[test]
    fn test_batches_append_in_call_order() {
        let mut run = CompileRun::new();
        run.append(vec![PathBuf::from("a/One.groovy"), PathBuf::from("a/Two.groovy")]);
        run.append(vec![PathBuf::from("b/Three.java")]);

        assert_eq!(
            run.compile_list(),
            &[
                PathBuf::from("a/One.groovy"),
                PathBuf::from("a/Two.groovy"),
                PathBuf::from("b/Three.java"),
            ]
        );
    }

    #[test]
    fn test_mappings_pair_sources_with_outputs() {
        let mut run = CompileRun::new();
        run.append_output("out/One.class");
        run.append(vec![PathBuf::from("src/One.groovy")]);

        assert!(run.is_balanced());
        assert_eq!(
            run.mappings(),
            vec![OutputMapping::new("src/One.groovy", "out/One.class")]
        );
    }
}

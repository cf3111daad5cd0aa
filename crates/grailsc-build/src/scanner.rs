//! Staleness scanning of source directories against compiled outputs
//!
//! A source is stale when its modification time is strictly newer than the
//! modification time of the output it maps to. A missing output is older than
//! any source, so its source is always stale.

use crate::compile_list::CompileRun;
use crate::error::{BuildError, BuildResult};
use crate::source::SourceCandidate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

/// Scan a batch of relative file names under `src_dir`.
///
/// Every stale source is appended to the run's compile list and its resolved
/// output to the destination ledger. Returns the number of sources selected.
///
/// The run is only touched once the whole batch has been scanned, so an error
/// leaves both lists as they were. A source that vanished since the listing
/// is not selected; other filesystem errors are propagated.
pub fn scan_dir<S: AsRef<str>>(
    run: &mut CompileRun,
    src_dir: &Path,
    dest_dir: &Path,
    files: &[S],
) -> BuildResult<usize> {
    let mut sources = Vec::new();
    let mut outputs = Vec::new();

    for file in files {
        let file = file.as_ref();
        let Some(candidate) = SourceCandidate::classify(file) else {
            trace!(file, "skipping unrecognized file");
            continue;
        };

        let source = candidate.source_path(src_dir);
        let (output, output_time) = resolve_output(&candidate, dest_dir)?;
        let Some(source_time) = modified_time(&source)? else {
            debug!(source = %source.display(), "source vanished, not selected");
            continue;
        };

        if is_stale(source_time, output_time) {
            debug!(source = %source.display(), output = %output.display(), "stale");
            sources.push(source);
            outputs.push(output);
        } else {
            trace!(source = %source.display(), "up to date");
        }
    }

    let count = sources.len();
    run.append(sources);
    outputs.into_iter().for_each(|output| run.append_output(output));
    Ok(count)
}

/// Resolve the output a candidate compiles to, with its modification time.
///
/// Groovy classes nested in package directories may have been emitted at the
/// destination root; that location is used when the mirrored one is absent
/// and the root one exists.
pub fn resolve_output(
    candidate: &SourceCandidate,
    dest_dir: &Path,
) -> BuildResult<(PathBuf, Option<SystemTime>)> {
    let output = dest_dir.join(candidate.output_name());
    let output_time = modified_time(&output)?;
    if output_time.is_some() {
        return Ok((output, output_time));
    }

    if let Some(root_name) = candidate.root_output_name() {
        let root_output = dest_dir.join(root_name);
        if let Some(time) = modified_time(&root_output)? {
            return Ok((root_output, Some(time)));
        }
    }

    Ok((output, None))
}

/// Staleness test: a missing output compares older than any source
pub fn is_stale(source: SystemTime, output: Option<SystemTime>) -> bool {
    match output {
        Some(output) => source > output,
        None => true,
    }
}

/// Modification time of a file, `None` if it does not exist
pub fn modified_time(path: &Path) -> BuildResult<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(metadata) => metadata
            .modified()
            .map(Some)
            .map_err(|e| BuildError::io(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_with_mtime(path: &Path, mtime: SystemTime) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "content").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    fn dirs() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("classes");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        (temp, src, dest)
    }

    fn base_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_is_stale() {
        let t = base_time();
        assert!(is_stale(t, None));
        assert!(is_stale(t + Duration::from_secs(1), Some(t)));
        assert!(!is_stale(t, Some(t)));
        assert!(!is_stale(t, Some(t + Duration::from_secs(1))));
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let (_temp, src, dest) = dirs();
        let mut run = CompileRun::new();
        let files: [&str; 0] = [];

        assert_eq!(scan_dir(&mut run, &src, &dest, &files).unwrap(), 0);
        assert!(run.is_empty());
        assert!(run.destinations().is_empty());
    }

    #[test]
    fn test_missing_output_is_stale() {
        let (_temp, src, dest) = dirs();
        write_with_mtime(&src.join("Book.groovy"), base_time());

        let mut run = CompileRun::new();
        scan_dir(&mut run, &src, &dest, &["Book.groovy"]).unwrap();

        assert_eq!(run.compile_list(), &[src.join("Book.groovy")]);
        assert_eq!(run.destinations(), &[dest.join("Book.class")]);
    }

    #[test]
    fn test_unrecognized_files_are_skipped() {
        let (_temp, src, dest) = dirs();
        write_with_mtime(&src.join("notes.txt"), base_time());
        write_with_mtime(&src.join("Util.java"), base_time());

        let mut run = CompileRun::new();
        let count = scan_dir(&mut run, &src, &dest, &["notes.txt", "Util.java"]).unwrap();

        assert_eq!(count, 1);
        assert_eq!(run.compile_list(), &[src.join("Util.java")]);
    }

    #[test]
    fn test_vanished_source_is_not_selected() {
        let (_temp, src, dest) = dirs();
        write_with_mtime(&src.join("Book.groovy"), base_time());

        let mut run = CompileRun::new();
        let count = scan_dir(&mut run, &src, &dest, &["Book.groovy", "Ghost.groovy"]).unwrap();

        assert_eq!(count, 1);
        assert!(run.is_balanced());
        assert_eq!(run.compile_list(), &[src.join("Book.groovy")]);
        assert_eq!(run.destinations(), &[dest.join("Book.class")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_batch_leaves_run_untouched() {
        let (_temp, src, dest) = dirs();
        write_with_mtime(&src.join("Book.groovy"), base_time());
        // a regular file where a package directory is expected
        fs::write(src.join("org"), "not a directory").unwrap();

        let mut run = CompileRun::new();
        let result = scan_dir(&mut run, &src, &dest, &["Book.groovy", "org/Shelf.groovy"]);

        assert!(matches!(result, Err(BuildError::IoError { .. })));
        assert!(run.is_empty());
        assert!(run.destinations().is_empty());
        assert!(run.is_balanced());
    }

    #[test]
    fn test_resolve_output_prefers_mirrored_path() {
        let (_temp, _src, dest) = dirs();
        write_with_mtime(&dest.join("org/Book.class"), base_time());
        write_with_mtime(&dest.join("Book.class"), base_time());

        let candidate = SourceCandidate::classify("org/Book.groovy").unwrap();
        let (output, time) = resolve_output(&candidate, &dest).unwrap();

        assert_eq!(output, dest.join("org/Book.class"));
        assert_eq!(time, Some(base_time()));
    }
}

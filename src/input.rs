//! Line collection from standard input and named files.
//!
//! Sources are read in order and concatenated. A source that cannot be read
//! is reported and skipped; the rest are still read.

use crate::error::{SortContext, SortError, SortResult};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

/// Cooperative cancellation, polled at input and output boundaries only.
pub trait Cancellation: Sync {
    fn is_cancelled(&self) -> bool;

    fn check(&self) -> SortResult<()> {
        if self.is_cancelled() {
            Err(SortError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(AtomicOrdering::Relaxed)
    }
}

/// A token that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl Cancellation for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Where lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` names standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    /// Map command line operands to sources; no operands means stdin.
    pub fn from_args(args: &[String]) -> Vec<Self> {
        if args.is_empty() {
            vec![InputSource::Stdin]
        } else {
            args.iter().map(|a| Self::from_arg(a)).collect()
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "-"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A source that failed to read
#[derive(Debug)]
pub struct SourceFailure {
    pub source: InputSource,
    pub error: SortError,
}

/// Lines gathered from every readable source, plus the failures.
#[derive(Debug, Default)]
pub struct Collected {
    pub lines: Vec<String>,
    pub failures: Vec<SourceFailure>,
}

/// Split a buffer into lines. The final line need not end in a newline;
/// a trailing `\r` is dropped and invalid UTF-8 is replaced.
pub fn split_lines(data: &[u8]) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }

    let body = data.strip_suffix(b"\n").unwrap_or(data);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

/// Read every line from a reader.
pub fn read_lines<R: Read>(mut reader: R) -> SortResult<Vec<String>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(split_lines(&buffer))
}

/// Read every line of a file, memory-mapping regular files.
pub fn read_file(path: &Path) -> SortResult<Vec<String>> {
    let name = path.display().to_string();
    let file = File::open(path).with_file_context(&name)?;
    let metadata = file.metadata().with_file_context(&name)?;

    if metadata.is_dir() {
        return Err(SortError::is_directory(&name));
    }
    if !metadata.is_file() {
        // Pipes and character devices cannot be mapped.
        return read_lines(file).with_file_context(&name);
    }
    if metadata.len() == 0 {
        return Ok(Vec::new());
    }

    // SAFETY: the mapping is read-only and dropped before this function
    // returns; every line is copied out into an owned String first.
    let mmap = unsafe { Mmap::map(&file) }.with_file_context(&name)?;
    Ok(split_lines(&mmap))
}

fn read_source(source: &InputSource) -> SortResult<Vec<String>> {
    match source {
        InputSource::Stdin => read_lines(io::stdin().lock()).with_context(|| "-".to_string()),
        InputSource::File(path) => read_file(path),
    }
}

/// Read `sources` in order, concatenating their lines.
///
/// Cancellation is checked before each source and once more at the end;
/// a per-source read error is recorded in [`Collected::failures`].
pub fn collect_lines(sources: &[InputSource], cancel: &dyn Cancellation) -> SortResult<Collected> {
    let mut collected = Collected::default();

    for source in sources {
        cancel.check()?;

        match read_source(source) {
            Ok(lines) => {
                log::debug!("{source}: {} lines", lines.len());
                collected.lines.extend(lines);
            }
            Err(error) => {
                log::debug!("{source}: skipped after read failure");
                collected.failures.push(SourceFailure {
                    source: source.clone(),
                    error,
                });
            }
        }
    }

    cancel.check()?;
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_lines() {
        assert!(split_lines(b"").is_empty());
        assert_eq!(split_lines(b"a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines(b"a\r\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines(b"\n"), vec![""]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(split_lines(b"ok\n\xff\n"), vec!["ok", "\u{fffd}"]);
    }

    #[test]
    fn test_read_lines_from_reader() {
        let lines = read_lines(&b"c\na\nb\n"[..]).expect("reader");
        assert_eq!(lines, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_from_args() {
        assert_eq!(InputSource::from_args(&[]), vec![InputSource::Stdin]);
        assert_eq!(
            InputSource::from_args(&["-".to_string(), "x.txt".to_string()]),
            vec![InputSource::Stdin, InputSource::File(PathBuf::from("x.txt"))]
        );
    }

    #[test]
    fn test_collect_concatenates_and_reports_failures() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let first = temp_dir.path().join("first.txt");
        let second = temp_dir.path().join("second.txt");
        let empty = temp_dir.path().join("empty.txt");
        let missing = temp_dir.path().join("missing.txt");
        fs::write(&first, "b\na\n")?;
        fs::write(&second, "d\nc")?;
        fs::write(&empty, "")?;

        let sources = vec![
            InputSource::File(first),
            InputSource::File(missing.clone()),
            InputSource::File(empty),
            InputSource::File(second),
        ];
        let collected = collect_lines(&sources, &NeverCancelled)?;

        assert_eq!(collected.lines, vec!["b", "a", "d", "c"]);
        assert_eq!(collected.failures.len(), 1);
        assert_eq!(collected.failures[0].source, InputSource::File(missing));
        assert!(matches!(
            collected.failures[0].error,
            SortError::FileNotFound { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_directory_is_a_failure() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let err = read_file(temp_dir.path()).expect_err("directory");
        assert!(matches!(err, SortError::IsDirectory { .. }));
        Ok(())
    }

    #[test]
    fn test_cancelled_before_reading() {
        let cancel = AtomicBool::new(true);
        let result = collect_lines(&[InputSource::Stdin], &cancel);
        assert!(matches!(result, Err(SortError::Cancelled)));
    }
}

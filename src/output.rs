//! Writing ordered lines.

use crate::error::{SortContext, SortResult};
use crate::input::Cancellation;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Lines between cancellation checks while writing.
const CANCEL_CHECK_INTERVAL: usize = 1000;

/// Where sorted output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn from_option(path: Option<&str>) -> Self {
        match path {
            Some(p) => Destination::File(PathBuf::from(p)),
            None => Destination::Stdout,
        }
    }

    /// Open for writing. Files are created or truncated.
    pub fn open(&self) -> SortResult<Box<dyn Write>> {
        let writer: Box<dyn Write> = match self {
            Destination::Stdout => Box::new(io::stdout()),
            Destination::File(path) => {
                let name = path.display().to_string();
                Box::new(File::create(path).with_file_context(&name)?)
            }
        };
        Ok(writer)
    }
}

/// Write each line followed by a newline.
pub fn write_lines<W: Write>(
    writer: W,
    lines: &[String],
    cancel: &dyn Cancellation,
) -> SortResult<()> {
    let mut output = BufWriter::new(writer);

    for (i, line) in lines.iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 {
            cancel.check()?;
        }
        output.write_all(line.as_bytes())?;
        output.write_all(b"\n")?;
    }

    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortError;
    use crate::input::NeverCancelled;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_write_lines() {
        let mut buf = Vec::new();
        let lines = vec!["b".to_string(), String::new(), "a".to_string()];
        write_lines(&mut buf, &lines, &NeverCancelled).expect("write");
        assert_eq!(buf, b"b\n\na\n");
    }

    #[test]
    fn test_empty_writes_nothing() {
        let mut buf = Vec::new();
        write_lines(&mut buf, &[], &NeverCancelled).expect("write");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_cancelled_write() {
        let mut buf = Vec::new();
        let cancel = AtomicBool::new(true);
        let result = write_lines(&mut buf, &["x".to_string()], &cancel);
        assert!(matches!(result, Err(SortError::Cancelled)));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_destination_from_option() {
        assert_eq!(Destination::from_option(None), Destination::Stdout);
        assert_eq!(
            Destination::from_option(Some("out.txt")),
            Destination::File(PathBuf::from("out.txt"))
        );
    }
}

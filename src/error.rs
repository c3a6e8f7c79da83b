//! Error handling for the sort utility

use std::io;
use thiserror::Error;

/// Custom error type for sort operations
#[derive(Error, Debug)]
pub enum SortError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Permission denied: {file}")]
    PermissionDenied { file: String },

    #[error("No such file or directory: {file}")]
    FileNotFound { file: String },

    #[error("Is a directory: {file}")]
    IsDirectory { file: String },

    #[error("invalid field index: {value}")]
    InvalidField { value: String },

    #[error("Invalid field separator: {sep}")]
    InvalidFieldSeparator { sep: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl SortError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SortError::PermissionDenied { .. }
            | SortError::FileNotFound { .. }
            | SortError::IsDirectory { .. }
            | SortError::Io(_)
            | SortError::InvalidField { .. }
            | SortError::InvalidFieldSeparator { .. }
            | SortError::ParseError { .. } => crate::SORT_FAILURE,

            SortError::Cancelled => crate::EXIT_FAILURE,
        }
    }

    /// True for errors that come from a malformed configuration rather than I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SortError::InvalidField { .. }
                | SortError::InvalidFieldSeparator { .. }
                | SortError::ParseError { .. }
        )
    }

    /// Create a permission denied error
    pub fn permission_denied(file: &str) -> Self {
        SortError::PermissionDenied {
            file: file.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: &str) -> Self {
        SortError::FileNotFound {
            file: file.to_string(),
        }
    }

    /// Create an is directory error
    pub fn is_directory(file: &str) -> Self {
        SortError::IsDirectory {
            file: file.to_string(),
        }
    }

    /// Create an invalid field index error
    pub fn invalid_field(value: &str) -> Self {
        SortError::InvalidField {
            value: value.to_string(),
        }
    }

    /// Create an invalid field separator error
    pub fn invalid_field_separator(sep: &str) -> Self {
        SortError::InvalidFieldSeparator {
            sep: sep.to_string(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: &str) -> Self {
        SortError::ParseError {
            message: message.to_string(),
        }
    }
}

/// Result type for sort operations
pub type SortResult<T> = Result<T, SortError>;

/// Context trait for adding context to errors
pub trait SortContext<T> {
    fn with_context<F>(self, f: F) -> SortResult<T>
    where
        F: FnOnce() -> String;

    fn with_file_context(self, filename: &str) -> SortResult<T>;
}

fn io_with_file(io_err: io::Error, filename: &str) -> SortError {
    match io_err.kind() {
        io::ErrorKind::PermissionDenied => SortError::permission_denied(filename),
        io::ErrorKind::NotFound => SortError::file_not_found(filename),
        _ if std::path::Path::new(filename).is_dir() => SortError::is_directory(filename),
        _ => SortError::Io(io::Error::new(
            io_err.kind(),
            format!("{}: {}", filename, io_err),
        )),
    }
}

impl<T> SortContext<T> for SortResult<T> {
    fn with_context<F>(self, f: F) -> SortResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| match err {
            SortError::Io(io_err) => SortError::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", f(), io_err),
            )),
            other => other,
        })
    }

    fn with_file_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|err| match err {
            SortError::Io(io_err) => io_with_file(io_err, filename),
            other => other,
        })
    }
}

impl<T> SortContext<T> for Result<T, io::Error> {
    fn with_context<F>(self, f: F) -> SortResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|io_err| {
            SortError::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", f(), io_err),
            ))
        })
    }

    fn with_file_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|io_err| io_with_file(io_err, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(SortError::invalid_field("-1").exit_code(), crate::SORT_FAILURE);
        assert_eq!(SortError::file_not_found("x").exit_code(), crate::SORT_FAILURE);
        assert_eq!(SortError::Cancelled.exit_code(), crate::EXIT_FAILURE);
    }

    #[test]
    fn test_file_context_maps_not_found() {
        let res: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        match res.with_file_context("missing.txt") {
            Err(SortError::FileNotFound { file }) => assert_eq!(file, "missing.txt"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_config_error_classification() {
        assert!(SortError::invalid_field("abc").is_config_error());
        assert!(!SortError::Cancelled.is_config_error());
        assert_eq!(
            SortError::invalid_field("-3").to_string(),
            "invalid field index: -3"
        );
    }
}

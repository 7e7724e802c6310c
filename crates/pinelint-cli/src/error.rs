//! Error handling for the `pinelint` CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the CLI before a [`pinelint_util::Report`] can be
/// produced. Anything that reaches a report instead (parse errors, semantic
/// issues) is a `Diagnostic`, not a `CliError`.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let err = CliError::FileNotFound(PathBuf::from("missing.pine"));
        assert_eq!(err.to_string(), "file not found: missing.pine");
    }

    #[test]
    fn io_error_display_includes_path() {
        let err = CliError::Io {
            path: PathBuf::from("locked.pine"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("locked.pine"));
    }
}

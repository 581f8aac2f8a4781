//! Verification run errors.

use std::path::PathBuf;

/// Conditions that end a verification run without a result.
///
/// Per-file read failures and diagram defects are not errors: they are
/// logged or recorded in the report instead.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Documentation root is missing or not a directory.
    #[error("Docs directory not found: {}", .0.display())]
    DocsDirNotFound(PathBuf),

    /// Documentation root holds no matching files.
    #[error("No .{extension} files found in {}", .dir.display())]
    NoDocuments {
        /// Scanned directory.
        dir: PathBuf,
        /// Extension searched for, without the dot.
        extension: String,
    },

    /// Discovery pattern could not be built from the root path.
    #[error("Invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Results could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Report file could not be written.
    #[error("Failed to write report to {}: {source}", .path.display())]
    ReportWrite {
        /// Report destination.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

//! Documentation file discovery.
//!
//! Finds candidate files only; nothing is read at this stage.

use std::path::{Path, PathBuf};

use glob::MatchOptions;

use crate::error::VerifyError;

/// Reference to a documentation file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentRef {
    /// Full path to the file.
    pub path: PathBuf,
    /// Path relative to the docs root with `/` separators, used in diagram ids.
    pub display_name: String,
}

/// Discovers documentation files under a root directory.
pub(crate) struct Scanner {
    source_dir: PathBuf,
    extension: String,
    recursive: bool,
}

impl Scanner {
    /// Create a new Scanner.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root directory to scan
    /// * `extension` - File extension without the leading dot (e.g., "md")
    /// * `recursive` - Whether to descend into subdirectories
    pub fn new(source_dir: PathBuf, extension: String, recursive: bool) -> Self {
        Self {
            source_dir,
            extension,
            recursive,
        }
    }

    /// Return matching files sorted by path.
    ///
    /// Hidden files and directories are skipped.
    pub fn scan(&self) -> Result<Vec<DocumentRef>, VerifyError> {
        if !self.source_dir.is_dir() {
            return Err(VerifyError::DocsDirNotFound(self.source_dir.clone()));
        }

        let root = glob::Pattern::escape(&self.source_dir.to_string_lossy());
        let depth = if self.recursive { "**/" } else { "" };
        let pattern = format!(
            "{root}/{depth}*.{}",
            glob::Pattern::escape(&self.extension)
        );
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        let mut refs: Vec<DocumentRef> = glob::glob_with(&pattern, options)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to inspect path during discovery");
                    None
                }
            })
            .filter(|path| path.is_file())
            .map(|path| {
                let display_name = display_name(&self.source_dir, &path);
                DocumentRef { path, display_name }
            })
            .collect();
        refs.sort_by(|a, b| a.path.cmp(&b.path));

        if refs.is_empty() {
            return Err(VerifyError::NoDocuments {
                dir: self.source_dir.clone(),
                extension: self.extension.clone(),
            });
        }

        tracing::info!(
            dir = %self.source_dir.display(),
            count = refs.len(),
            "Discovered documentation files"
        );
        Ok(refs)
    }
}

/// Path of `path` relative to `root`, joined with `/`.
fn display_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

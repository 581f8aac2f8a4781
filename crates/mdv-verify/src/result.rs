//! Per-diagram results and run summaries.
//!
//! These types carry no formatting. [`ValidationResult`] is the record
//! persisted in the JSON report; [`RunSummary`] is always derived from a
//! result slice and never stored.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mdv_diagrams::{Diagram, Dialect, RenderOutcome, RenderStatus, SyntaxReport};
use serde::Serialize;

/// Outcome of checking one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub id: String,
    pub file: PathBuf,
    pub line_number: usize,
    /// Detected dialect (`null` when no header was recognized).
    #[serde(rename = "type")]
    pub dialect: Option<Dialect>,
    pub syntax_errors: Vec<String>,
    /// `true`, `false`, or `null` when the renderer was unavailable.
    pub render_test: RenderStatus,
    pub render_message: String,
}

impl ValidationResult {
    /// Combine a diagram with its syntax report and render outcome.
    #[must_use]
    pub fn new(diagram: &Diagram, syntax: SyntaxReport, render: RenderOutcome) -> Self {
        Self {
            id: diagram.id.clone(),
            file: diagram.file.clone(),
            line_number: diagram.line_number,
            dialect: syntax.dialect,
            syntax_errors: syntax.errors,
            render_test: render.status,
            render_message: render.message,
        }
    }

    /// Syntax errors plus one for a failed render.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.syntax_errors.len() + usize::from(self.render_test.is_defect())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Number of diagrams found in one documentation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub diagram_count: usize,
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Diagrams checked.
    pub total: usize,
    /// Diagrams without syntax errors.
    pub valid: usize,
    /// Syntax errors plus failed renders.
    pub error_count: usize,
    /// Distinct files with any error, sorted.
    pub files_with_errors: Vec<PathBuf>,
}

impl RunSummary {
    /// Derive the summary from `results`.
    #[must_use]
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let files_with_errors: BTreeSet<&Path> = results
            .iter()
            .filter(|r| r.has_errors())
            .map(|r| r.file.as_path())
            .collect();

        Self {
            total: results.len(),
            valid: results.iter().filter(|r| r.syntax_errors.is_empty()).count(),
            error_count: results.iter().map(ValidationResult::error_count).sum(),
            files_with_errors: files_with_errors.into_iter().map(Path::to_path_buf).collect(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }
}

//! Verification run orchestration.
//!
//! A run discovers documentation files, extracts their Mermaid blocks, and
//! checks every diagram with the syntax validator and the configured
//! [`RenderProbe`]. Results keep extraction order in both sequential and
//! parallel mode.

use std::path::PathBuf;

use mdv_diagrams::{Diagram, DisabledProbe, RenderProbe, read_diagrams, validate_syntax};
use rayon::prelude::*;

use crate::error::VerifyError;
use crate::report::write_report;
use crate::result::{FileSummary, RunSummary, ValidationResult};
use crate::scanner::Scanner;

/// Settings for one verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Documentation root.
    pub docs_dir: PathBuf,
    /// Extension of documentation files, without the dot.
    pub extension: String,
    /// Descend into subdirectories of `docs_dir`.
    pub recursive: bool,
    /// Where the JSON report is written.
    pub report_path: PathBuf,
    /// Check diagrams on the rayon thread pool.
    pub parallel: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            extension: "md".to_owned(),
            recursive: false,
            report_path: PathBuf::from("mermaid_validation_results.json"),
            parallel: false,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Diagram counts per discovered file, in discovery order.
    pub files: Vec<FileSummary>,
    /// Per-diagram results in extraction order.
    pub results: Vec<ValidationResult>,
}

impl VerificationReport {
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }

    /// True iff no diagram has syntax errors or a failed render.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| !r.has_errors())
    }
}

/// Drives a verification run.
///
/// # Example
///
/// ```ignore
/// use mdv_diagrams::MermaidCli;
/// use mdv_verify::{Verifier, VerifyConfig};
///
/// let verifier = Verifier::new(VerifyConfig::default())
///     .with_probe(Box::new(MermaidCli::default()));
/// let report = verifier.run()?;
/// std::process::exit(i32::from(!report.is_success()));
/// ```
pub struct Verifier {
    config: VerifyConfig,
    probe: Box<dyn RenderProbe>,
}

impl Verifier {
    /// Create a verifier with rendering disabled.
    #[must_use]
    pub fn new(config: VerifyConfig) -> Self {
        Self {
            config,
            probe: Box::new(DisabledProbe),
        }
    }

    /// Set the render probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn RenderProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify all diagrams and write the JSON report.
    ///
    /// Discovery errors end the run before anything is written.
    pub fn run(&self) -> Result<VerificationReport, VerifyError> {
        let report = self.verify()?;
        write_report(&self.config.report_path, &report.results)?;
        Ok(report)
    }

    /// Verify all diagrams without writing the report.
    pub fn verify(&self) -> Result<VerificationReport, VerifyError> {
        let scanner = Scanner::new(
            self.config.docs_dir.clone(),
            self.config.extension.clone(),
            self.config.recursive,
        );
        let documents = scanner.scan()?;

        let mut files = Vec::with_capacity(documents.len());
        let mut diagrams = Vec::new();
        for document in &documents {
            let found = read_diagrams(&document.path, &document.display_name);
            files.push(FileSummary {
                path: document.path.clone(),
                diagram_count: found.len(),
            });
            diagrams.extend(found);
        }
        tracing::info!(
            files = files.len(),
            diagrams = diagrams.len(),
            "Extracted diagrams"
        );

        let results = if self.config.parallel {
            diagrams.par_iter().map(|d| self.check(d)).collect()
        } else {
            diagrams.iter().map(|d| self.check(d)).collect()
        };

        Ok(VerificationReport { files, results })
    }

    fn check(&self, diagram: &Diagram) -> ValidationResult {
        let syntax = validate_syntax(&diagram.content);
        let render = self.probe.probe(&diagram.content);
        tracing::debug!(
            id = %diagram.id,
            syntax_errors = syntax.errors.len(),
            render = ?render.status,
            "Checked diagram"
        );
        ValidationResult::new(diagram, syntax, render)
    }
}

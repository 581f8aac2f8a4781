//! `mdv check` command implementation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use mdv_config::{CliSettings, Config, RenderConfig};
use mdv_diagrams::{DisabledProbe, MermaidCli, RenderProbe, RenderStatus};
use mdv_verify::{
    FileSummary, RunSummary, ValidationResult, VerificationReport, Verifier, VerifyConfig,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover mdv.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation directory to scan (overrides config).
    #[arg(short, long, env = "MDV_DOCS_DIR")]
    docs_dir: Option<PathBuf>,

    /// JSON report path (overrides config).
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Renderer command, e.g. "npx mmdc" (overrides config).
    #[arg(long, env = "MDV_RENDERER")]
    renderer: Option<String>,

    /// Per-diagram render timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip render probing.
    #[arg(long)]
    no_render: bool,

    /// Scan subdirectories of the documentation directory.
    #[arg(long)]
    recursive: bool,

    /// Check diagrams in parallel.
    #[arg(long)]
    parallel: bool,

    /// Enable verbose output (show discovery and probe logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or discovery fails, the report
    /// cannot be written, or any diagram has errors. A failed run still
    /// prints an all-zero summary.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let verify_config = VerifyConfig {
            docs_dir: config.docs_resolved.source_dir.clone(),
            extension: config.docs_resolved.extension.clone(),
            recursive: config.docs_resolved.recursive,
            report_path: config.report_resolved.path.clone(),
            parallel: config.render.parallel,
        };

        output.info(&format!("Scanning {}", verify_config.docs_dir.display()));
        if !config.render.enabled {
            output.warning("Render probing disabled");
        }

        let verifier = Verifier::new(verify_config).with_probe(render_probe(&config.render));

        let report = match verifier.run() {
            Ok(report) => report,
            Err(e) => {
                print_summary(&output, &RunSummary::default());
                return Err(e.into());
            }
        };

        print_files(&output, &report.files);
        print_findings(&output, &report);

        let summary = report.summary();
        print_summary(&output, &summary);
        output.info(&format!(
            "Report written to {}",
            verifier.config().report_path.display()
        ));

        if summary.is_success() {
            output.success("All diagrams passed");
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} error(s) in {} file(s)",
                summary.error_count,
                summary.files_with_errors.len()
            )))
        }
    }

    /// Build config overrides from flags. Unset flags leave the config as is.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.docs_dir.clone(),
            report_path: self.report.clone(),
            render_command: self.renderer.clone(),
            timeout_secs: self.timeout,
            render_enabled: self.no_render.then_some(false),
            recursive: self.recursive.then_some(true),
            parallel: self.parallel.then_some(true),
        }
    }
}

/// Select the render probe for `render`.
fn render_probe(render: &RenderConfig) -> Box<dyn RenderProbe> {
    if !render.enabled {
        return Box::new(DisabledProbe);
    }
    let probe = MermaidCli::new(&render.command).timeout(render.timeout());
    match &render.work_dir {
        Some(dir) => Box::new(probe.work_dir(dir)),
        None => Box::new(probe),
    }
}

fn print_files(output: &Output, files: &[FileSummary]) {
    output.heading(&format!("Found {} documentation file(s)", files.len()));
    for file in files {
        output.info(&file_line(file));
    }
}

fn print_findings(output: &Output, report: &VerificationReport) {
    if report.results.is_empty() {
        return;
    }
    output.heading(&format!("Checked {} diagram(s)", report.results.len()));

    for result in &report.results {
        let line = result_line(result);
        if result.has_errors() {
            output.error(&line);
            for detail in error_details(result) {
                output.detail(detail);
            }
        } else {
            output.success(&line);
        }
    }

    // One notice per distinct reason instead of one per diagram
    let skipped: BTreeSet<&str> = report
        .results
        .iter()
        .filter(|r| r.render_test == RenderStatus::Unavailable)
        .map(|r| r.render_message.as_str())
        .collect();
    for message in skipped {
        output.warning(&format!("Render test skipped: {message}"));
    }
}

fn print_summary(output: &Output, summary: &RunSummary) {
    output.separator();
    for line in summary_lines(summary) {
        output.info(&line);
    }
    output.separator();
}

fn file_line(file: &FileSummary) -> String {
    format!("  {}: {} diagram(s)", file.path.display(), file.diagram_count)
}

fn result_line(result: &ValidationResult) -> String {
    let mark = if result.has_errors() { "✗" } else { "✓" };
    let dialect = result
        .dialect
        .map_or_else(|| "unknown".to_owned(), |d| d.to_string());
    format!(
        "{mark} {} ({}:{}) [{dialect}]",
        result.id,
        result.file.display(),
        result.line_number
    )
}

/// Syntax errors followed by the render failure, if any.
fn error_details(result: &ValidationResult) -> Vec<&str> {
    let mut details: Vec<&str> = result.syntax_errors.iter().map(String::as_str).collect();
    if result.render_test.is_defect() {
        details.push(&result.render_message);
    }
    details
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Valid diagrams: {}/{}", summary.valid, summary.total),
        format!("Total errors: {}", summary.error_count),
    ];
    if summary.files_with_errors.is_empty() {
        lines.push("Files with errors: none".to_owned());
    } else {
        lines.push("Files with errors:".to_owned());
        lines.extend(
            summary
                .files_with_errors
                .iter()
                .map(|path| format!("  {}", path.display())),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mdv_diagrams::{Diagram, RenderOutcome, validate_syntax};
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CheckArgs,
    }

    fn parse(args: &[&str]) -> CheckArgs {
        TestCli::parse_from(std::iter::once("mdv").chain(args.iter().copied())).args
    }

    fn result(content: &str, render: RenderOutcome) -> ValidationResult {
        let diagram = Diagram {
            id: "guide.md_0".to_owned(),
            file: PathBuf::from("docs/guide.md"),
            content: content.to_owned(),
            line_number: 7,
        };
        ValidationResult::new(&diagram, validate_syntax(content), render)
    }

    #[test]
    fn test_cli_settings_default_leaves_config_untouched() {
        let settings = parse(&[]).cli_settings();

        assert!(settings.source_dir.is_none());
        assert!(settings.report_path.is_none());
        assert!(settings.render_command.is_none());
        assert!(settings.timeout_secs.is_none());
        assert!(settings.render_enabled.is_none());
        assert!(settings.recursive.is_none());
        assert!(settings.parallel.is_none());
    }

    #[test]
    fn test_cli_settings_from_flags() {
        let settings = parse(&[
            "--docs-dir",
            "guides",
            "--report",
            "out/report.json",
            "--renderer",
            "npx mmdc",
            "--timeout",
            "30",
            "--no-render",
            "--recursive",
            "--parallel",
        ])
        .cli_settings();

        assert_eq!(settings.source_dir, Some(PathBuf::from("guides")));
        assert_eq!(settings.report_path, Some(PathBuf::from("out/report.json")));
        assert_eq!(settings.render_command.as_deref(), Some("npx mmdc"));
        assert_eq!(settings.timeout_secs, Some(30));
        assert_eq!(settings.render_enabled, Some(false));
        assert_eq!(settings.recursive, Some(true));
        assert_eq!(settings.parallel, Some(true));
    }

    #[test]
    fn test_disabled_rendering_skips_renderer() {
        let render = RenderConfig {
            enabled: false,
            ..RenderConfig::default()
        };

        let outcome = render_probe(&render).probe("graph TD\nA-->B");
        assert_eq!(outcome.status, RenderStatus::Unavailable);
        assert_eq!(outcome.message, "Rendering disabled");
    }

    #[test]
    fn test_result_line() {
        let ok = result("graph TD\nA-->B", RenderOutcome::rendered());
        assert_eq!(result_line(&ok), "✓ guide.md_0 (docs/guide.md:7) [graph TD]");

        let bad = result("A-->B", RenderOutcome::rendered());
        assert_eq!(result_line(&bad), "✗ guide.md_0 (docs/guide.md:7) [unknown]");
    }

    #[test]
    fn test_error_details_include_failed_render() {
        let failed = result(
            "graph TD\nA[x-->B",
            RenderOutcome::failed("Rendering failed: Parse error"),
        );
        assert_eq!(
            error_details(&failed),
            vec!["Unclosed brackets: 1", "Rendering failed: Parse error"]
        );

        let skipped = result(
            "graph TD\nA[x-->B",
            RenderOutcome::unavailable("mmdc not available"),
        );
        assert_eq!(error_details(&skipped), vec!["Unclosed brackets: 1"]);
    }

    #[test]
    fn test_summary_lines() {
        let summary = RunSummary {
            total: 3,
            valid: 2,
            error_count: 2,
            files_with_errors: vec![PathBuf::from("docs/a.md"), PathBuf::from("docs/b.md")],
        };

        assert_eq!(
            summary_lines(&summary),
            vec![
                "Valid diagrams: 2/3",
                "Total errors: 2",
                "Files with errors:",
                "  docs/a.md",
                "  docs/b.md",
            ]
        );
    }

    #[test]
    fn test_summary_lines_after_discovery_failure() {
        assert_eq!(
            summary_lines(&RunSummary::default()),
            vec![
                "Valid diagrams: 0/0",
                "Total errors: 0",
                "Files with errors: none",
            ]
        );
    }

    #[test]
    fn test_file_line() {
        let file = FileSummary {
            path: PathBuf::from("docs/guide.md"),
            diagram_count: 2,
        };
        assert_eq!(file_line(&file), "  docs/guide.md: 2 diagram(s)");
    }
}

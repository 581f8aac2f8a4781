//! JSON report persistence.

use std::fs;
use std::path::Path;

use crate::error::VerifyError;
use crate::result::ValidationResult;

/// Serialize `results` as a pretty-printed JSON array.
///
/// Output depends only on `results`, so identical runs produce identical bytes.
pub fn render_report(results: &[ValidationResult]) -> Result<String, VerifyError> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Write the report to `path`, replacing any previous report.
///
/// Missing parent directories are created.
pub fn write_report(path: &Path, results: &[ValidationResult]) -> Result<(), VerifyError> {
    let content = render_report(results)?;
    let to_write_error = |source: std::io::Error| VerifyError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    fs::write(path, content).map_err(to_write_error)?;

    tracing::debug!(path = %path.display(), results = results.len(), "Report written");
    Ok(())
}

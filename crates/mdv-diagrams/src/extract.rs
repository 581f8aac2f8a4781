//! Fenced Mermaid block extraction.
//!
//! Blocks are located with a single multi-line regex over the whole file
//! text, so a closing fence always belongs to the nearest preceding
//! ```` ```mermaid ```` opener.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Opening fence with the `mermaid` tag, lazily matched body, closing fence.
///
/// Fences may be indented by up to three spaces. Trailing whitespace and
/// `\r` after either fence are tolerated.
static MERMAID_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^ {0,3}```mermaid[ \t]*\r?\n(.*?)^ {0,3}```[ \t]*\r?$").unwrap()
});

/// One fenced Mermaid block found in a documentation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    /// `{file_name}_{ordinal}`, unique within a run.
    pub id: String,
    /// Path of the owning documentation file.
    pub file: PathBuf,
    /// Block body without leading/trailing blank lines.
    pub content: String,
    /// 1-based line where the block body starts.
    pub line_number: usize,
}

/// Extract all Mermaid blocks from `text` in order of appearance.
///
/// `display_name` is the file name used to build diagram ids.
#[must_use]
pub fn extract_diagrams(file: &Path, display_name: &str, text: &str) -> Vec<Diagram> {
    MERMAID_BLOCK
        .captures_iter(text)
        .enumerate()
        .filter_map(|(index, caps)| {
            let body = caps.get(1)?;
            let line_number = text[..body.start()].matches('\n').count() + 1;
            Some(Diagram {
                id: format!("{display_name}_{index}"),
                file: file.to_path_buf(),
                content: trim_blank_lines(body.as_str()).to_owned(),
                line_number,
            })
        })
        .collect()
}

/// Read `path` and extract its Mermaid blocks.
///
/// Unreadable files (missing, permission denied, invalid UTF-8) are logged
/// and yield no diagrams.
#[must_use]
pub fn read_diagrams(path: &Path, display_name: &str) -> Vec<Diagram> {
    match std::fs::read_to_string(path) {
        Ok(text) => extract_diagrams(path, display_name, &text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read documentation file");
            Vec::new()
        }
    }
}

/// Strip whitespace-only lines from both ends, keeping the first line's indent.
fn trim_blank_lines(body: &str) -> &str {
    let body = body.trim_end();
    let start = match body.find(|c: char| !c.is_whitespace()) {
        Some(first) => body[..first].rfind('\n').map_or(0, |nl| nl + 1),
        None => body.len(),
    };
    &body[start..]
}

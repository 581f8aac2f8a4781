//! Heuristic Mermaid syntax checks.
//!
//! Four independent checks run on every diagram and their findings are
//! concatenated in a fixed order:
//!
//! 1. delimiter balance for `[]`, `{}`, `()` (plus nesting when counts balance)
//! 2. dialect header in the first three non-empty lines
//! 3. arrow tokens for graph-family dialects
//! 4. `style` statement shape
//!
//! None of the checks parse Mermaid; they catch obvious structural defects
//! and leave authoritative validation to the external renderer.

use std::sync::LazyLock;

use regex::Regex;

use crate::dialect::Dialect;

/// Delimiter pairs checked for balance, with the noun used in messages.
const DELIMITER_PAIRS: [(char, char, &str); 3] = [
    ('[', ']', "brackets"),
    ('{', '}', "braces"),
    ('(', ')', "parentheses"),
];

/// Edge tokens accepted as evidence of graph connections.
const ARROW_TOKENS: [&str; 6] = ["-->", "---", "==>", "==", "-.->", "-.-"];

/// `style <id> fill:...` at the start of a trimmed line.
static STYLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^style\s+\w+\s+fill:").unwrap());

/// Outcome of validating one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxReport {
    /// Defect descriptions in check order. Empty means valid.
    pub errors: Vec<String>,
    /// Detected dialect, if a known header was found.
    pub dialect: Option<Dialect>,
}

/// Run every heuristic check against `content`.
#[must_use]
pub fn validate_syntax(content: &str) -> SyntaxReport {
    let mut errors = check_delimiters(content);

    let dialect = Dialect::detect(content);
    if dialect.is_none() {
        errors.push("No valid diagram type found".to_owned());
    }

    if dialect.is_some_and(Dialect::is_graph_family) && !has_arrow(content) {
        errors.push("Graph diagram missing arrow connections".to_owned());
    }

    errors.extend(check_style_lines(content));

    SyntaxReport { errors, dialect }
}

/// Report per-pair count imbalances, then nesting errors if counts balance.
///
/// The nesting pass only adds findings for text whose counts are already
/// balanced, so every count-based finding is still reported unchanged.
fn check_delimiters(content: &str) -> Vec<String> {
    let mut errors = Vec::new();

    for (open, close, noun) in DELIMITER_PAIRS {
        let imbalance = count_char(content, open) - count_char(content, close);
        if imbalance != 0 {
            errors.push(format!("Unclosed {noun}: {imbalance}"));
        }
    }

    if errors.is_empty()
        && let Some(nesting_error) = find_nesting_error(content)
    {
        errors.push(nesting_error);
    }

    errors
}

fn count_char(content: &str, ch: char) -> i64 {
    let count = content.chars().filter(|&c| c == ch).count();
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Walk delimiters with a stack of expected closers.
///
/// Returns the first crossing (`[(])`) or premature close (`)(`).
fn find_nesting_error(content: &str) -> Option<String> {
    let mut expected: Vec<char> = Vec::new();

    for (line_index, line) in content.lines().enumerate() {
        let line_number = line_index + 1;
        for ch in line.chars() {
            if let Some(&(_, close, _)) = DELIMITER_PAIRS.iter().find(|(open, _, _)| *open == ch) {
                expected.push(close);
            } else if DELIMITER_PAIRS.iter().any(|(_, close, _)| *close == ch) {
                match expected.pop() {
                    Some(want) if want == ch => {}
                    Some(want) => {
                        return Some(format!(
                            "Mismatched delimiter: expected '{want}' but found '{ch}' on line {line_number}"
                        ));
                    }
                    None => {
                        return Some(format!(
                            "Unexpected closing delimiter '{ch}' on line {line_number}"
                        ));
                    }
                }
            }
        }
    }

    None
}

fn has_arrow(content: &str) -> bool {
    ARROW_TOKENS.iter().any(|token| content.contains(token))
}

fn check_style_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("style "))
        .filter(|line| !STYLE_LINE.is_match(line))
        .map(|line| format!("Invalid style syntax: {line}"))
        .collect()
}

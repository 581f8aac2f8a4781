//! Mermaid dialect detection.
//!
//! A diagram's dialect is declared by a header such as `graph TD` or
//! `sequenceDiagram` near the top of the block.

use serde::{Serialize, Serializer};

use crate::consts::HEADER_SCAN_LINES;

/// Recognized Mermaid diagram dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `graph TD` (top-down directed graph).
    GraphTopDown,
    /// `graph LR` (left-right directed graph).
    GraphLeftRight,
    /// `sequenceDiagram`.
    Sequence,
    /// `gantt`.
    Gantt,
    /// `erDiagram`.
    EntityRelationship,
    /// `flowchart`.
    Flowchart,
    /// `stateDiagram` (also matches `stateDiagram-v2`).
    State,
}

impl Dialect {
    /// All dialects in detection priority order.
    pub const ALL: [Self; 7] = [
        Self::GraphTopDown,
        Self::GraphLeftRight,
        Self::Sequence,
        Self::Gantt,
        Self::EntityRelationship,
        Self::Flowchart,
        Self::State,
    ];

    /// Header text that declares this dialect.
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Self::GraphTopDown => "graph TD",
            Self::GraphLeftRight => "graph LR",
            Self::Sequence => "sequenceDiagram",
            Self::Gantt => "gantt",
            Self::EntityRelationship => "erDiagram",
            Self::Flowchart => "flowchart",
            Self::State => "stateDiagram",
        }
    }

    /// Whether edges in this dialect are drawn with arrow tokens.
    ///
    /// Only the `graph` dialects are members. `flowchart` is deliberately
    /// left out so header-only flowcharts stay valid.
    #[must_use]
    pub fn is_graph_family(self) -> bool {
        matches!(self, Self::GraphTopDown | Self::GraphLeftRight)
    }

    /// Find the first dialect whose header occurs in `line`.
    #[must_use]
    pub fn match_line(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| line.contains(d.header()))
    }

    /// Detect the dialect from the first three non-empty lines of `content`.
    ///
    /// Lines are tried in order; within a line, dialects are tried in
    /// [`Dialect::ALL`] order. A header further down is ignored.
    #[must_use]
    pub fn detect(content: &str) -> Option<Self> {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(HEADER_SCAN_LINES)
            .find_map(Self::match_line)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.header())
    }
}

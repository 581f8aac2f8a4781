//! Mermaid diagram checks for mdv.
//!
//! This crate provides the per-diagram pieces of the verification pipeline:
//! - Extraction of fenced ```` ```mermaid ```` blocks with source locations
//! - Heuristic syntax validation and dialect detection
//! - Render probing through the Mermaid CLI behind the [`RenderProbe`] trait
//!
//! # Architecture
//!
//! - [`extract`]: `Diagram` records from Markdown text
//! - [`dialect`]: recognized diagram headers (`graph TD`, `sequenceDiagram`, ...)
//! - [`validate`]: bracket, header, arrow, and style checks
//! - [`probe`]: tri-state render outcome and the probe trait
//! - [`mermaid_cli`]: `mmdc`-backed probe with timeout and temp-file cleanup
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mdv_diagrams::{MermaidCli, RenderProbe, extract_diagrams, validate_syntax};
//!
//! let markdown = "```mermaid\ngraph TD\nA-->B\n```\n";
//! let probe = MermaidCli::default();
//! for diagram in extract_diagrams(Path::new("guide.md"), "guide.md", markdown) {
//!     let report = validate_syntax(&diagram.content);
//!     let outcome = probe.probe(&diagram.content);
//! }
//! ```

mod consts;
mod dialect;
mod extract;
mod mermaid_cli;
mod probe;
mod validate;

pub use consts::{DEFAULT_RENDERER, DEFAULT_TIMEOUT};
pub use dialect::Dialect;
pub use extract::{Diagram, extract_diagrams, read_diagrams};
pub use mermaid_cli::MermaidCli;
pub use probe::{DisabledProbe, RenderOutcome, RenderProbe, RenderStatus};
pub use validate::{SyntaxReport, validate_syntax};

//! Documentation-wide Mermaid verification for mdv.
//!
//! Ties the per-diagram checks from `mdv-diagrams` into a run over a
//! documentation tree:
//!
//! 1. discover documentation files under a root directory
//! 2. extract Mermaid blocks from each file
//! 3. validate and render-probe each diagram
//! 4. aggregate a [`RunSummary`] and persist the JSON report
//!
//! Aggregation is kept free of console formatting so results can be
//! serialized or asserted on directly.

mod error;
mod report;
mod result;
mod scanner;
mod verifier;

pub use error::VerifyError;
pub use report::{render_report, write_report};
pub use result::{FileSummary, RunSummary, ValidationResult};
pub use verifier::{VerificationReport, Verifier, VerifyConfig};

//! CLI error types.

use mdv_config::ConfigError;
use mdv_verify::VerifyError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Verify(#[from] VerifyError),

    /// The run completed but found diagram errors.
    #[error("{0}")]
    Validation(String),
}

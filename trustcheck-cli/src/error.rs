//! CLI-specific error types and exit code mapping

use trustcheck_core::error::TrustcheckError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one scenario did not pass.
    #[error("{failed} of {total} scenarios did not pass")]
    ScenariosFailed { failed: usize, total: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from trustcheck-core.
    #[error("{0}")]
    Core(#[from] TrustcheckError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | Scenario failure / command error         |
    /// | 2    | Configuration error                      |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(TrustcheckError::Config(_)) => 2,
            Self::Io(_) | Self::Core(TrustcheckError::Io(_)) => 10,
            Self::Command(_) | Self::ScenariosFailed { .. } | Self::JsonSerialize(_) | Self::Core(_) => 1,
        }
    }
}

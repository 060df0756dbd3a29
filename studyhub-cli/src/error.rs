use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Fixture could not be loaded
    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn fixture(msg: impl Into<String>) -> Self {
        Self::Fixture(msg.into())
    }
}

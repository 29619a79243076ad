use qr_sweep_core::cleanup::FailureKind;

/// Failure of a single cleanup invocation.
///
/// Both variants are terminal for the invocation; re-running is up to
/// whatever triggered it.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// The connection could not be established or authenticated.
    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// The cleanup statement failed while executing.
    #[error("Cleanup statement failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl CleanupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::ConnectionError,
            Self::Query(_) => FailureKind::QueryError,
        }
    }
}

/// Invalid or missing configuration, detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

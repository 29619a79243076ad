//! Outcome and response types for one cleanup invocation.
//!
//! An invocation either reports how many QR tokens were cleared or fails
//! with one of two kinds. Callers only ever see the uniform
//! [`InvocationResponse`]; the failure detail stays in the logs.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Response constants
// ---------------------------------------------------------------------------

/// HTTP-style status code for a successful invocation.
pub const STATUS_OK: u16 = 200;
/// HTTP-style status code for a failed invocation.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Body text returned for every failure, regardless of kind.
pub const FAILURE_MESSAGE: &str = "Failed to cleanup expired sessions";

// ---------------------------------------------------------------------------
// CleanupOutcome
// ---------------------------------------------------------------------------

/// Result of a successful cleanup statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    /// Number of `sessions` rows whose QR fields were cleared.
    pub rows_affected: u64,
}

impl CleanupOutcome {
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }

    /// Human-readable success message, as returned to the caller.
    pub fn message(&self) -> String {
        format!(
            "Successfully cleaned up {} expired QR tokens",
            self.rows_affected
        )
    }
}

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// Why an invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The connection could not be established or authenticated.
    ConnectionError,
    /// The statement failed during execution.
    QueryError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "connection_error",
            Self::QueryError => "query_error",
        }
    }
}

// ---------------------------------------------------------------------------
// InvocationResponse
// ---------------------------------------------------------------------------

/// JSON body of an invocation response.
///
/// Serializes to either `{"message": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { message: String },
    Error { error: String },
}

/// Structured result handed back to whatever triggered the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl InvocationResponse {
    /// Status 200 with the count of cleared tokens.
    pub fn success(outcome: CleanupOutcome) -> Self {
        Self {
            status_code: STATUS_OK,
            body: ResponseBody::Message {
                message: outcome.message(),
            },
        }
    }

    /// Status 500 with the fixed failure message. The failure kind is
    /// not exposed to the caller.
    pub fn failure() -> Self {
        Self {
            status_code: STATUS_INTERNAL_ERROR,
            body: ResponseBody::Error {
                error: FAILURE_MESSAGE.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

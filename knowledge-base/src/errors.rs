//! Unified error types for the crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the crate.
pub type KbResult<T> = Result<T, KbError>;

/// Top-level error for knowledge-base and document-store operations.
#[derive(Debug, Error)]
pub enum KbError {
    /// A required identifier (knowledge base, data source, bucket) is unset.
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    /// Caller-supplied metadata filter is structurally invalid.
    #[error("invalid metadata_filter: {0}")]
    InvalidFilter(String),

    /// Caller-supplied retrieval parameter is out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Non-successful HTTP status from a Bedrock Agent endpoint.
    #[error("{service} returned HTTP {status}: {snippet}")]
    HttpStatus {
        service: &'static str,
        status: StatusCode,
        snippet: String,
    },

    /// Error surfaced by an AWS SDK call (S3).
    #[error("{service} error: {message}")]
    Sdk {
        service: &'static str,
        message: String,
    },

    /// Transport failure talking to a Bedrock Agent endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request could not be signed.
    #[error("signing error: {0}")]
    Signing(String),

    /// No usable AWS credentials.
    #[error("credentials error: {0}")]
    Credentials(String),
}

impl KbError {
    /// `true` for caller mistakes (maps to HTTP 400).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, KbError::InvalidFilter(_) | KbError::InvalidRequest(_))
    }

    /// `true` when the service says the addressed resource does not exist.
    ///
    /// Bedrock reports unknown ids as `ResourceNotFoundException` (404) and
    /// malformed ids as `ValidationException` (400).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KbError::HttpStatus { status, .. }
                if *status == StatusCode::NOT_FOUND || *status == StatusCode::BAD_REQUEST
        )
    }
}

/// Cuts an upstream body down to something safe to log and return.
pub(crate) fn make_snippet(text: &str) -> String {
    text.trim().chars().take(240).collect()
}

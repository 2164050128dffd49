//! # Client Error Type
//!
//! Transport and configuration errors for lager-client.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. A non-2xx response displays as `"<status> <body>"`, verbatim - the
//!    terminal prefixes it with `Error: ` and shows it unchanged
//! 3. No retry logic here; a failure is reported once and the operator
//!    decides whether to re-invoke the action

use thiserror::Error;

/// Result type for all backend operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from talking to (or configuring) the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    ///
    /// `body` is the raw response text; the display carries the server's
    /// status and message verbatim so the operator sees exactly what the
    /// backend said (e.g. `400 Not enough stock`).
    #[error("{status} {body}")]
    Status { status: u16, body: String },

    /// The request never completed (connection refused, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A 2xx list response failed to parse as the expected shape.
    ///
    /// Only list/resolve bodies are strict; mutation acks are parsed
    /// leniently and never produce this.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL or site does not form a valid endpoint.
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// No site key configured.
    #[error("Missing site")]
    MissingSite,

    /// `LAGER_WIRE` is set to something other than `standard` or `legacy`.
    #[error("invalid wire format: {0}")]
    InvalidWireFormat(String),
}

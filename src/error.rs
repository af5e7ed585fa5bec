//! Error taxonomy shared by the auth sources and the backend API client.
//!
//! Coordinator operations never let these escape past their boundary:
//! failures are recorded into session state and observed reactively.

use thiserror::Error;

/// Errors produced by an auth readiness source.
///
/// `Clone` is required so cached token lookups can replay a failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// The identity provider returned no usable token.
    #[error("no authentication token available")]
    NoCredential,

    /// The identity provider could not be reached or answered badly.
    #[error("identity provider request failed: {0}")]
    Provider(String),
}

/// Errors produced by the backend API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `detail` comes from the backend error body when
    /// it is JSON, otherwise a per-endpoint fallback message.
    #[error("backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    /// Transport-level failure (DNS, connect, body read).
    #[error("backend request failed: {0}")]
    Transport(String),
}

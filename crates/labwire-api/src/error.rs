use thiserror::Error;

/// Top-level error type for the `labwire-api` crate.
///
/// Covers every failure mode of the automation API surface:
/// authentication, transport, API-reported failures, and decoding.
/// `labwire-core` maps these into backend-call errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Logon failed (wrong credentials, unknown domain, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An operation was attempted before `login()` succeeded.
    #[error("Not logged in -- call login() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// The server answered with `Success: false`.
    #[error("{message}")]
    Api { message: String, code: Option<i64> },

    /// Non-success HTTP status without a parseable envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient transport failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The message the backend reported, or the display form otherwise.
    pub fn backend_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

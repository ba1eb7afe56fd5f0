// ── Core error types ──
//
// User-facing errors from labwire-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<labwire_api::Error>`
// impl folds transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to automation server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Backend call errors ──────────────────────────────────────────
    /// A remote call failed; `message` is what the backend reported.
    #[error("{message}")]
    Backend { message: String, code: Option<i64> },

    // ── Notification errors ──────────────────────────────────────────
    #[error("Notification failed: {message}")]
    Notification { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The message to surface on the reservation output channel.
    pub fn operator_message(&self) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<labwire_api::Error> for CoreError {
    fn from(err: labwire_api::Error) -> Self {
        match err {
            labwire_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            labwire_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "not logged in".into(),
            },
            labwire_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Backend {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            labwire_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            labwire_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            labwire_api::Error::Api { message, code } => CoreError::Backend { message, code },
            labwire_api::Error::Http { status, message } => CoreError::Backend {
                message: format!("HTTP {status}: {message}"),
                code: None,
            },
            labwire_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_fold_into_core_variants() {
        let err = CoreError::from(labwire_api::Error::NotAuthenticated);
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));

        let err = CoreError::from(labwire_api::Error::Api {
            message: "Route sw1/p1 is already connected".into(),
            code: Some(100),
        });
        assert!(matches!(err, CoreError::Backend { code: Some(100), .. }));
        assert_eq!(err.operator_message(), "Route sw1/p1 is already connected");
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use labwire_config::ConfigError;
use labwire_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to automation server at {url}")]
    #[diagnostic(
        code(labwire::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             For self-signed certificates use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(labwire::auth_failed),
        help(
            "Verify the user name, password and domain.\n\
             Run: labwire config set-password {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(labwire::no_credentials),
        help(
            "Set username in the profile (or pass --username) and provide a password via\n\
             LABWIRE_PASSWORD, the profile's password_env, or: labwire config set-password"
        )
    )]
    NoCredentials { profile: String },

    // ── Reservations ─────────────────────────────────────────────────

    #[error("No reservation given")]
    #[diagnostic(
        code(labwire::reservation_required),
        help("Pass --reservation (-r) or set LABWIRE_RESERVATION_ID.")
    )]
    ReservationRequired,

    #[error("Reservation '{id}' not found or not active")]
    #[diagnostic(
        code(labwire::invalid_reservation),
        help("Reservation ids are GUIDs, e.g. 8cd7c1d7-b6ac-4b6e-a972-2cebb3a6a2a8")
    )]
    InvalidReservation { id: String },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("Automation server error ({code}): {message}")]
    #[diagnostic(code(labwire::api_error))]
    ApiError { code: String, message: String },

    #[error("{operation} failed for every target ({failures} error(s))")]
    #[diagnostic(
        code(labwire::operation_failed),
        help("Details were written to the reservation output; rerun with -v for more.")
    )]
    OperationFailed { operation: String, failures: usize },

    #[error("Could not send notification: {message}")]
    #[diagnostic(
        code(labwire::notification),
        help("Check the [notifications] table in your config file.")
    )]
    Notification { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(labwire::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(labwire::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(labwire::no_config),
        help(
            "Add a profile to the config file or pass --server.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(labwire::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(labwire::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(labwire::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render configuration: {0}")]
    #[diagnostic(code(labwire::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::InvalidReservation { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::ReservationRequired
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "<profile>".into(),
                message,
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Backend { message, code } => CliError::ApiError {
                code: code.map_or_else(|| "backend".into(), |c| c.to_string()),
                message,
            },

            CoreError::Notification { message } => CliError::Notification { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `aps_api::Error` variants into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use aps_api::Error as ApiError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the appliance")]
    #[diagnostic(
        code(arborctl::connection_failed),
        help(
            "Check that the appliance is running and reachable.\n\
             Use --insecure (-k) if it presents a self-signed certificate."
        )
    )]
    ConnectionFailed {
        #[source]
        source: ApiError,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(arborctl::auth_failed),
        help(
            "Verify the username and password for the appliance.\n\
             Credentials come from --username/--password, ARBOR_* environment\n\
             variables, the system keyring, or the profile file."
        )
    )]
    AuthFailed,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(arborctl::no_credentials),
        help(
            "Add username/password to the profile, or set ARBOR_USERNAME and\n\
             ARBOR_PASSWORD in the environment."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Appliance error: {message}")]
    #[diagnostic(code(arborctl::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(arborctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No appliance configured")]
    #[diagnostic(
        code(arborctl::no_config),
        help(
            "Pass --server, set ARBOR_SERVER, or create a profile.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(arborctl::config))]
    Config(Box<figment::Error>),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
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
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── aps_api::Error → CliError mapping ────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidInput { message } => Self::Validation {
                field: "ip".into(),
                reason: message,
            },

            err if err.is_auth() => Self::AuthFailed,

            err if err.is_transport() => Self::ConnectionFailed { source: err },

            err => Self::Api {
                message: err.to_string(),
            },
        }
    }
}

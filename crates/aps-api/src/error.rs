use thiserror::Error;

/// Top-level error type for the `aps-api` crate.
///
/// Every failure an action can hit maps onto one variant: bad input,
/// authentication, transport, server-reported errors, and responses the
/// classifier cannot make sense of. `arborctl` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Input validation ────────────────────────────────────────────
    /// Malformed IP/CIDR parameter or out-of-range prefix length.
    #[error("{message}")]
    InvalidInput { message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, or a call on a closed session).
    #[error("Error Connecting to server. Details: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("Error Connecting to server. Details: {0}")]
    Transport(#[from] reqwest::Error),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Appliance API ───────────────────────────────────────────────
    /// Non-2xx response with a body the classifier could interpret.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Response the classifier could not interpret: unparseable JSON,
    /// unexpected content type, or an empty body with a non-200 status.
    #[error("{message}")]
    Protocol { message: String },
}

impl Error {
    /// Returns `true` if this error indicates failed or missing
    /// authentication.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` for network-level failures (DNS, TLS, refused).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }
}

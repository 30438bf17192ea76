// ── Core error types ──
//
// User-facing errors from pairwire-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<pairwire_api::Error>` impl translates transport-layer errors
// into the provisioning taxonomy.

use ipnet::IpNet;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Provisioning taxonomy ────────────────────────────────────────
    /// A named status (or other configured vocabulary) is missing.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "No interface found on device {device}. Please create an interface before running this job."
    )]
    MissingInterface { device: String },

    /// Uniqueness violation on create, or a link endpoint already in use.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The store rejected a record for failing its integrity rules.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("No available /{leaf_prefix_len} subnet found in {pool}")]
    Exhaustion { pool: IpNet, leaf_prefix_len: u8 },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to inventory at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Inventory request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pairwire_api::Error> for CoreError {
    fn from(err: pairwire_api::Error) -> Self {
        if err.is_conflict() {
            return CoreError::Conflict {
                message: api_message(err),
            };
        }
        if err.is_validation() {
            return CoreError::Validation {
                message: api_message(err),
            };
        }

        match err {
            pairwire_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "Invalid API token".into(),
            },
            pairwire_api::Error::PermissionDenied { message }
            | pairwire_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pairwire_api::Error::Transport(ref e) => {
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
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            pairwire_api::Error::InvalidUrl(e) => CoreError::Configuration {
                message: format!("Invalid URL: {e}"),
            },
            pairwire_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            pairwire_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            pairwire_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

fn api_message(err: pairwire_api::Error) -> String {
    match err {
        pairwire_api::Error::Api { message, .. } => message,
        other => other.to_string(),
    }
}

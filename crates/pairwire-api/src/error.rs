use thiserror::Error;

/// Top-level error type for the `pairwire-api` crate.
///
/// Covers every failure mode of the inventory REST surface: authentication,
/// transport, structured API rejections, and payload decoding.
/// `pairwire-core` maps these into the provisioning error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token missing, malformed, or rejected (HTTP 401).
    #[error("Invalid API token")]
    InvalidToken,

    /// Token accepted but lacks permission for the operation (HTTP 403).
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// The token could not be encoded as a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

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
    /// Structured rejection from the inventory (4xx/5xx with a body).
    ///
    /// `message` flattens the field-error map the store returns, e.g.
    /// `name: device with this name already exists.`
    #[error("Inventory API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Phrases the store uses when a write trips a uniqueness constraint.
const UNIQUENESS_MARKERS: &[&str] = &[
    "already exists",
    "must make a unique set",
    "unique",
    "already has a cable",
    "occupied",
];

impl Error {
    /// Returns `true` if the store refused a write because it would break
    /// a uniqueness rule (duplicate name, duplicate address, endpoint
    /// already cabled).
    ///
    /// HTTP 409 always counts. HTTP 400 counts when the message carries one
    /// of the store's uniqueness phrases, since the REST layer reports model
    /// validation failures and uniqueness failures with the same status.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Api { status: 409, .. } => true,
            Self::Api {
                status: 400,
                message,
            } => {
                let lower = message.to_lowercase();
                UNIQUENESS_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }

    /// Returns `true` if the store rejected a write for failing its
    /// integrity rules (any 400 that is not a uniqueness conflict).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Api { status: 400, .. }) && !self.is_conflict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> Error {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    #[test]
    fn duplicate_name_is_conflict() {
        let err = api(400, "name: Device with this Name already exists.");
        assert!(err.is_conflict());
        assert!(!err.is_validation());
    }

    #[test]
    fn cabled_endpoint_is_conflict() {
        let err = api(400, "termination_a_id: Interface eth0 already has a cable attached (#12)");
        assert!(err.is_conflict());
    }

    #[test]
    fn http_409_is_conflict() {
        assert!(api(409, "conflict").is_conflict());
    }

    #[test]
    fn plain_bad_request_is_validation() {
        let err = api(400, "prefix: 10.0.0.1/8 is not a valid network");
        assert!(err.is_validation());
        assert!(!err.is_conflict());
    }
}

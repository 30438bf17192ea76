//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pairwire_config::ConfigError;
use pairwire_core::{Committed, CoreError, ProvisionError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const EXHAUSTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to inventory at {url}")]
    #[diagnostic(
        code(pairwire::connection_failed),
        help(
            "Check that the inventory is running and reachable.\n\
             For self-signed certificates use --insecure (-k) or set ca_cert in the profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(pairwire::timeout),
        help("Increase the timeout with --timeout or check inventory responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(pairwire::auth_failed),
        help(
            "Verify the API token and its permissions.\n\
             Run: pairwire config set-token --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(pairwire::no_credentials),
        help(
            "Store one with: pairwire config set-token --profile {profile}\n\
             Or pass --token / set PAIRWIRE_TOKEN."
        )
    )]
    NoCredentials { profile: String },

    // ── Inventory ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(pairwire::not_found),
        help("Check the name against the inventory; lookups are exact-match.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(pairwire::missing_interface),
        help("Add interfaces to the device type so new devices get them.")
    )]
    MissingInterface { message: String },

    #[error("Conflict: {message}")]
    #[diagnostic(
        code(pairwire::conflict),
        help("Another run may have taken the same record. Re-running allocates the next free block.")
    )]
    Conflict { message: String },

    #[error("No available /{leaf_prefix_len} subnet found in {pool}")]
    #[diagnostic(
        code(pairwire::exhausted),
        help("Free addresses in the pool or point allocation.pool at a larger block.")
    )]
    Exhausted { pool: String, leaf_prefix_len: u8 },

    #[error("Inventory rejected the request: {message}")]
    #[diagnostic(code(pairwire::rejected))]
    Rejected { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(pairwire::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    /// A provisioning run failed after creating records.
    #[error("Provisioning stopped after creating {count} record(s)")]
    #[diagnostic(
        code(pairwire::partial),
        help("These records were left in place and may need manual cleanup:\n{records}")
    )]
    Partial {
        count: usize,
        records: String,
        #[source]
        #[diagnostic_source]
        cause: Box<CliError>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pairwire::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(pairwire::configuration),
        help("Check the [profiles.<name>.allocation] table of your config.")
    )]
    Configuration { message: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(pairwire::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No inventory configured")]
    #[diagnostic(
        code(pairwire::no_config),
        help(
            "Pass --url and --token, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(pairwire::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render output: {0}")]
    Render(String),
}

// `#[diagnostic_source]` borrows the field as `dyn Diagnostic`.
impl std::borrow::Borrow<dyn Diagnostic> for Box<CliError> {
    fn borrow(&self) -> &(dyn Diagnostic + 'static) {
        self.as_ref()
    }
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
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Exhausted { .. } => exit_code::EXHAUSTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Partial { cause, .. } => cause.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::MissingInterface { .. } => CliError::MissingInterface {
                message: err.to_string(),
            },
            CoreError::Conflict { message } => CliError::Conflict { message },
            CoreError::Validation { message } => CliError::Rejected { message },
            CoreError::Exhaustion {
                pool,
                leaf_prefix_len,
            } => CliError::Exhausted {
                pool: pool.to_string(),
                leaf_prefix_len,
            },
            CoreError::Configuration { message } => CliError::Configuration { message },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

fn format_committed(records: &[Committed]) -> String {
    records
        .iter()
        .map(|c| format!("  {} {} ({})", c.kind, c.display, c.id))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ProvisionError> for CliError {
    fn from(err: ProvisionError) -> Self {
        let cause = CliError::from(err.source);
        if err.committed.is_empty() {
            return cause;
        }
        CliError::Partial {
            count: err.committed.len(),
            records: format_committed(&err.committed),
            cause: Box::new(cause),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Keyring(e) => CliError::Validation {
                field: "keyring".into(),
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

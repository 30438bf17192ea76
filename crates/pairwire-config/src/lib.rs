//! Configuration for the pairwire CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `pairwire_core::{InventoryConfig, AllocationConfig}`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use ipnet::IpNet;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pairwire_core::{AllocationConfig, InventoryConfig, TlsVerification};

/// Keyring service every token is stored under.
pub const KEYRING_SERVICE: &str = "pairwire";

/// Environment prefix; nested keys are separated by `__`
/// (`PAIRWIRE_PROFILES__LAB__URL`).
pub const ENV_PREFIX: &str = "PAIRWIRE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named inventory profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "csv".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named inventory profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Inventory root URL (e.g., "https://nautobot.example.net").
    pub url: String,

    /// API token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Pool, descriptions, statuses, and naming.
    #[serde(default)]
    pub allocation: AllocationSettings,
}

/// `[profiles.<name>.allocation]`. Unset keys fall back to the built-in
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AllocationSettings {
    pub pool: Option<String>,
    pub parent_description: Option<String>,
    pub leaf_description: Option<String>,
    pub active_status: Option<String>,
    pub link_status: Option<String>,
    pub name_prefix: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "pairwire", "pairwire").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pairwire");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution (without CLI flags) ────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Resolve an API token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

// ── Translation to core types ───────────────────────────────────────

/// Parse and check a pool CIDR. Host bits must be zero.
pub fn parse_pool(raw: &str) -> Result<IpNet, ConfigError> {
    let pool: IpNet = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "allocation.pool".into(),
        reason: format!("not a CIDR block: {raw}"),
    })?;
    if pool.trunc() != pool {
        return Err(ConfigError::Validation {
            field: "allocation.pool".into(),
            reason: format!("{pool} has host bits set; did you mean {}?", pool.trunc()),
        });
    }
    Ok(pool)
}

/// Build an `AllocationConfig` from a profile's `[allocation]` table.
pub fn allocation_config(settings: &AllocationSettings) -> Result<AllocationConfig, ConfigError> {
    let defaults = AllocationConfig::default();
    Ok(AllocationConfig {
        pool: match settings.pool.as_deref() {
            Some(raw) => parse_pool(raw)?,
            None => defaults.pool,
        },
        parent_description: settings
            .parent_description
            .clone()
            .unwrap_or(defaults.parent_description),
        leaf_description: settings.leaf_description.clone(),
        active_status: settings
            .active_status
            .clone()
            .unwrap_or(defaults.active_status),
        link_status: settings.link_status.clone().unwrap_or(defaults.link_status),
        name_prefix: settings.name_prefix.clone().unwrap_or(defaults.name_prefix),
    })
}

/// TLS strategy for a profile: `insecure` wins over `ca_cert`.
pub fn tls_for(profile: &Profile, default_insecure: bool) -> TlsVerification {
    if profile.insecure.unwrap_or(default_insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

pub fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build an `InventoryConfig` from a profile, no CLI flag overrides.
pub fn profile_to_inventory_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<InventoryConfig, ConfigError> {
    Ok(InventoryConfig {
        url: parse_url(&profile.url)?,
        token: resolve_token(profile, profile_name)?,
        tls: tls_for(profile, defaults.insecure),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

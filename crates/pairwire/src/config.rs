//! CLI-side config resolution: shared profiles from `pairwire-config`
//! plus the global flag overrides.
//!
//! Core never sees these types -- it receives a pre-built
//! `InventoryConfig` and `AllocationConfig`.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use pairwire_config::{Config, Defaults, Profile};
use pairwire_core::{AllocationConfig, InventoryConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use pairwire_config::{config_path, load_config, resolve_token, store_token};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything a `provision` run needs from config and flags.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub inventory: InventoryConfig,
    pub allocation: AllocationConfig,
    pub output: OutputFormat,
}

/// `--output` wins; otherwise `defaults.output` from the config file.
pub fn output_format(
    flag: Option<OutputFormat>,
    defaults: &Defaults,
) -> Result<OutputFormat, CliError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    OutputFormat::from_str(&defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "unknown output format {:?}, expected csv, table, json or yaml",
            defaults.output
        ),
    })
}

/// Translate a profile + global flags into core config.
///
/// This is the single boundary where CLI config types cross into core types.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(InventoryConfig, AllocationConfig), CliError> {
    // 1. URL (flag > env > profile)
    let url = pairwire_config::parse_url(global.url.as_deref().unwrap_or(&profile.url))?;

    // 2. Token (flag > token_env > keyring > plaintext)
    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => resolve_token(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        pairwire_config::tls_for(profile, config.defaults.insecure)
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );

    let allocation = pairwire_config::allocation_config(&profile.allocation)?;

    Ok((
        InventoryConfig {
            url,
            token,
            tls,
            timeout,
        },
        allocation,
    ))
}

/// Build core config from the config file, active profile, and flags.
///
/// Without a matching profile, `--url` and `--token` alone are enough and
/// allocation uses the built-in defaults.
pub fn build_configs(global: &GlobalOpts) -> Result<ResolvedConfig, CliError> {
    let cfg = load_config()?;
    let output = output_format(global.output, &cfg.defaults)?;
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let (inventory, allocation) = resolve_profile(profile, &profile_name, &cfg, global)?;
        return Ok(ResolvedConfig {
            inventory,
            allocation,
            output,
        });
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
        names.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = pairwire_config::parse_url(url_str)?;

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let tls = if global.insecure || cfg.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ResolvedConfig {
        inventory: InventoryConfig {
            url,
            token,
            tls,
            timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
        },
        allocation: AllocationConfig::default(),
        output,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn defaults(output: &str) -> Defaults {
        Defaults {
            output: output.into(),
            ..Defaults::default()
        }
    }

    #[test]
    fn output_flag_overrides_config_default() {
        let format = output_format(Some(OutputFormat::Table), &defaults("json")).unwrap();
        assert_eq!(format, OutputFormat::Table);
    }

    #[test]
    fn output_falls_back_to_config_default() {
        assert_eq!(output_format(None, &defaults("yaml")).unwrap(), OutputFormat::Yaml);
        assert_eq!(output_format(None, &defaults("JSON")).unwrap(), OutputFormat::Json);
        assert_eq!(output_format(None, &Defaults::default()).unwrap(), OutputFormat::Csv);
    }

    #[test]
    fn unknown_config_output_is_rejected() {
        let err = output_format(None, &defaults("xml")).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}

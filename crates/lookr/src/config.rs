//! CLI configuration: thin layer over `lookr_config`.
//!
//! Adds flag overrides (--base-url, --token, --timeout, ...) on top of the
//! resolved profile.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use lookr_core::{Credentials, ProviderConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use lookr_config::{Config, Profile, config_path, load_config, save_config};

/// Resolve the active profile name from flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Build a `ProviderConfig` from the profile plus flag overrides.
///
/// Without a matching profile the instance must come entirely from flags,
/// unless a profile was named explicitly.
pub fn provider_config(global: &GlobalOpts, config: &Config) -> Result<ProviderConfig, CliError> {
    let name = active_profile_name(global, config);

    let adhoc;
    let profile = if let Some(profile) = config.profiles.get(&name) {
        profile
    } else {
        if global.profile.is_some() {
            let mut available: Vec<_> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        let base_url = global.base_url.clone().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
        adhoc = Profile {
            base_url,
            ..Profile::default()
        };
        &adhoc
    };

    // 1. URL (flag > profile)
    let url_str = global.base_url.as_deref().unwrap_or(&profile.base_url);
    let url: url::Url = url_str.parse().map_err(|e| CliError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL {url_str:?}: {e}"),
    })?;

    // 2. Credentials (token flag > profile)
    let credentials = match global.token {
        Some(ref token) => Credentials::AccessToken(SecretString::from(token.clone())),
        None => lookr_config::resolve_credentials(profile, &name)?,
    };

    // 3. TLS
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut provider = ProviderConfig::new(url, credentials);
    provider.tls = tls;
    provider.api_version = global
        .api_version
        .clone()
        .or_else(|| profile.api_version.clone())
        .unwrap_or_else(|| config.defaults.api_version.clone());
    provider.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );
    Ok(provider)
}

//! Configuration for lookr.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext) and
//! translation to `lookr_core::ProviderConfig`. The CLI layers its flag
//! overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use lookr_core::{Credentials, ProviderConfig, TlsVerification};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "lookr";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LOOKR_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

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
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Looker instance profiles.
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
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            api_version: default_api_version(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_api_version() -> String {
    lookr_core::DEFAULT_API_VERSION.into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Looker instance.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Instance URL (e.g., "https://corp.looker.com:19999").
    pub base_url: String,

    /// Override `defaults.api_version`.
    pub api_version: Option<String>,

    /// API3 client id. When set, the client secret is resolved and used to
    /// log in; otherwise an access token is expected.
    pub client_id: Option<String>,

    /// API3 client secret (plaintext, prefer keyring or env var).
    pub client_secret: Option<String>,

    /// Environment variable holding the client secret.
    pub client_secret_env: Option<String>,

    /// Pre-issued access token (plaintext, prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable holding the access token.
    pub access_token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override `defaults.timeout` (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$LOOKR_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "lookr", "lookr").map_or_else(
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
    p.push("lookr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus `LOOKR_` env vars.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file. A missing file yields the defaults.
///
/// Nested keys come from the environment with `__` as separator, e.g.
/// `LOOKR_PROFILES__PROD__BASE_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LOOKR_").split("__"));

    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Look up one secret: named env var, then keyring, then plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    keyring_key: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    // 1. Env var named by the profile
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_key) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    plaintext.map(|s| SecretString::from(s.to_owned()))
}

/// Resolve credentials for a profile.
///
/// With `client_id` set this yields client credentials; otherwise an access
/// token.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    if let Some(ref client_id) = profile.client_id {
        let secret = resolve_secret(
            profile.client_secret_env.as_deref(),
            &format!("{profile_name}/client-secret"),
            profile.client_secret.as_deref(),
        )
        .ok_or_else(no_credentials)?;
        return Ok(Credentials::client_credentials(client_id.clone(), secret));
    }

    resolve_secret(
        profile.access_token_env.as_deref(),
        &format!("{profile_name}/access-token"),
        profile.access_token.as_deref(),
    )
    .map(Credentials::AccessToken)
    .ok_or_else(no_credentials)
}

/// Build a `ProviderConfig` from a profile, no CLI overrides.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    let url: url::Url = profile
        .base_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL {:?}: {e}", profile.base_url),
        })?;

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ProviderConfig::new(url, credentials);
    config.api_version = profile
        .api_version
        .clone()
        .unwrap_or_else(|| defaults.api_version.clone());
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

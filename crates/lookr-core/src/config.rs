// ── Runtime connection configuration ──
//
// Describes how to reach one Looker instance. Carries credentials and
// connection tuning but never touches disk; lookr-config builds it.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use lookr_api::{Credentials, DEFAULT_API_VERSION, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additional CA certificate (PEM).
    CustomCa(PathBuf),
    /// Skip verification (self-hosted instances with self-signed certs).
    DangerAcceptInvalid,
}

/// Everything needed to build a [`Provider`](crate::Provider).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Instance URL, with or without the `/api` suffix.
    pub url: Url,
    pub credentials: Credentials,
    pub api_version: String,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            api_version: DEFAULT_API_VERSION.to_owned(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}

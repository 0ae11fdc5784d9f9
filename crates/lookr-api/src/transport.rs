// HTTP transport for the Looker REST API.
//
// Performs exactly one request per `send` and hands back status, headers and
// the raw body. Interpreting non-2xx statuses is the engine's job; the only
// statuses handled here are 401/403, which become `Unauthorized`, and failed
// logins, which share the engine's error decoding.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{CachedToken, Credentials, LoginResponse};
use crate::engine::parse_error;
use crate::error::{ApiError, Error, TransportError};

// ── Request / response ──────────────────────────────────────────────

/// One HTTP exchange, relative to the API root (`…/api/`).
///
/// `path` may also be an absolute URL, as handed out by pagination links.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Undecoded server answer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Performs a single request.
///
/// Implementations must be usable from several engine calls at once; the
/// reqwest client is, and so is any in-memory transport used in tests.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

// ── Client configuration ────────────────────────────────────────────

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-hosted instances with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared configuration for building the `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: concat!("lookr/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    TransportError::Tls(format!("failed to read CA cert {}: {e}", path.display()))
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| TransportError::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| TransportError::Tls(format!("failed to build HTTP client: {e}")).into())
    }
}

// ── HTTP transport ──────────────────────────────────────────────────

/// reqwest-backed [`Transport`] with Looker token authentication.
///
/// Connections are pooled by the inner client, so one instance can be shared
/// by concurrent callers. With client credentials the access token is
/// obtained lazily and refreshed when it nears expiry.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build from a base URL, credentials, and transport config.
    ///
    /// `base_url` may be the instance root (`https://corp.looker.com:19999`)
    /// or already point at the API root (`…/api`).
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        api_version: &str,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = config.build_client()?;
        let mut transport = Self::with_client(http, base_url, credentials, api_version)?;
        transport.timeout = config.timeout;
        Ok(transport)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
        api_version: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            api_version: api_version.to_owned(),
            credentials,
            token: Mutex::new(None),
            timeout: TransportConfig::default().timeout,
        })
    }

    /// The API root every relative path is joined onto. Always ends in `/api/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        // Absolute links (pagination) replace the base entirely.
        Ok(self.base_url.join(path)?)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Exchange client credentials for a fresh access token.
    ///
    /// Called implicitly before the first request; exposed so callers can
    /// validate credentials up front.
    pub async fn login(&self) -> Result<(), Error> {
        let token = self.request_token().await?;
        *self.token.lock().await = Some(token);
        Ok(())
    }

    /// Revoke the current access token, if one was obtained via `login`.
    pub async fn logout(&self) -> Result<(), Error> {
        let Some(token) = self.token.lock().await.take() else {
            return Ok(());
        };

        let url = self.url(&format!("{}/logout", self.api_version))?;
        debug!("logging out at {url}");

        let resp = self
            .http
            .delete(url)
            .header(AUTHORIZATION, auth_header(&token.value)?)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = resp.status();
        if status.is_success() {
            trace!(%status, "logout complete");
            return Ok(());
        }

        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.classify(&e))?;
        Err(rejected("logout", status, headers, body))
    }

    async fn request_token(&self) -> Result<CachedToken, Error> {
        let Credentials::ClientCredentials {
            client_id,
            client_secret,
        } = &self.credentials
        else {
            return Err(TransportError::Unauthorized {
                status: None,
                message: "login requires client credentials".into(),
            }
            .into());
        };

        let url = self.url(&format!("{}/login", self.api_version))?;
        debug!("logging in at {url}");

        let resp = self
            .http
            .post(url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.classify(&e))?;
        if !status.is_success() {
            return Err(rejected("login", status, headers, body));
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| crate::error::DecodeError::malformed(&e, &body))?;

        debug!(expires_in = ?login.expires_in, "login successful");
        Ok(CachedToken::new(login))
    }

    async fn access_token(&self) -> Result<SecretString, Error> {
        if let Credentials::AccessToken(token) = &self.credentials {
            return Ok(token.clone());
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    // ── Exchange ─────────────────────────────────────────────────────

    async fn execute(&self, request: Request) -> Result<RawResponse, Error> {
        let url = self.url(&request.path)?;
        debug!("{} {url}", request.method);

        let token = self.access_token().await?;
        let mut builder = self
            .http
            .request(request.method, url)
            .header(AUTHORIZATION, auth_header(&token)?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.classify(&e))?;
        trace!(%status, bytes = body.len(), "response received");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Revoked or expired server-side; the next call logs in again.
            if self.credentials.requires_login() {
                self.token.lock().await.take();
            }
            return Err(TransportError::Unauthorized {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            }
            .into());
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn classify(&self, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
            .into()
        } else {
            TransportError::Network {
                message: err.to_string(),
            }
            .into()
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, Error> {
        self.execute(request).await
    }
}

/// Error for a non-2xx answer from `login` or `logout`.
///
/// 401/403 mean the credential itself was refused; anything else is
/// decoded like an API error.
fn rejected(action: &str, status: StatusCode, headers: HeaderMap, body: String) -> Error {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return TransportError::Unauthorized {
            status: Some(status.as_u16()),
            message: format!("{action} failed (HTTP {status}): {body}"),
        }
        .into();
    }

    let raw = RawResponse {
        status,
        headers,
        body,
    };
    match parse_error(&raw) {
        // A missing session endpoint is not a missing entity.
        ApiError::NotFound { message } => ApiError::Status {
            status: 404,
            message: format!("{action} endpoint not found: {message}"),
        },
        other => other,
    }
    .into()
}

fn auth_header(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("token {}", token.expose_secret())).map_err(
        |e| TransportError::Unauthorized {
            status: None,
            message: format!("invalid access token header value: {e}"),
        },
    )?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::with_client(
            reqwest::Client::new(),
            base,
            Credentials::AccessToken(SecretString::from("t")),
            "4.0",
        )
        .unwrap()
    }

    #[test]
    fn base_url_gains_api_suffix() {
        let t = transport("https://corp.looker.com:19999");
        assert_eq!(t.base_url().as_str(), "https://corp.looker.com:19999/api/");
    }

    #[test]
    fn base_url_keeps_existing_api_suffix() {
        for raw in ["https://corp.looker.com/api", "https://corp.looker.com/api/"] {
            assert_eq!(transport(raw).base_url().as_str(), "https://corp.looker.com/api/");
        }
    }

    #[test]
    fn relative_and_absolute_paths_resolve() {
        let t = transport("https://corp.looker.com");
        assert_eq!(
            t.url("4.0/themes/7").unwrap().as_str(),
            "https://corp.looker.com/api/4.0/themes/7"
        );
        assert_eq!(
            t.url("https://corp.looker.com/api/4.0/themes?page=2")
                .unwrap()
                .as_str(),
            "https://corp.looker.com/api/4.0/themes?page=2"
        );
    }
}

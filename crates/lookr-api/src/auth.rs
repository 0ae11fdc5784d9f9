// Looker API authentication
//
// API3 client credentials are exchanged for a short-lived access token at
// `POST /api/{version}/login`; the token travels as `Authorization: token …`.

use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde::Deserialize;

/// Tokens are refreshed this long before the server-side expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Credentials for authenticating with a Looker instance.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// API3 key pair, generated under Admin > Users > Edit Keys.
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
    },

    /// A pre-issued access token (CI secret, SDK session). Never refreshed.
    AccessToken(SecretString),
}

impl Credentials {
    pub fn client_credentials(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self::ClientCredentials {
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Whether the transport has to call `login` before the first request.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::ClientCredentials { .. })
    }
}

/// Body of a successful `POST /login`.
#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// An access token obtained from `login`, with its local expiry.
#[derive(Debug)]
pub(crate) struct CachedToken {
    pub value: SecretString,
    expires_at: Option<Instant>,
}

impl CachedToken {
    pub fn new(response: LoginResponse) -> Self {
        // An expiry too far out to represent is treated as none.
        let expires_at = response.expires_in.and_then(|secs| {
            Instant::now().checked_add(Duration::from_secs(secs).saturating_sub(EXPIRY_SKEW))
        });
        Self {
            value: SecretString::from(response.access_token),
            expires_at,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

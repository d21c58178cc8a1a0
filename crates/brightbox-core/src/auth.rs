//! OAuth client credentials, access tokens, and the shared token session.
//!
//! Brightbox API requests are authorized with a short-lived access token
//! obtained by exchanging API client credentials. The types here keep the
//! secret material out of logs and serialized output and track token expiry
//! for reuse across requests.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Seconds subtracted from a token lifetime before it is considered expired.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 10;

/// API client credentials used for the token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    /// API client identifier (`cli-xxxxx`)
    pub client_id: String,

    /// API client secret
    #[serde(skip_serializing)]
    pub client_secret: SecretString,
}

impl ClientCredentials {
    /// Create new API client credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Get the client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Expose the client secret for the token exchange request.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

/// An access token granted by the token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: SecretString,
    expires_at: Option<Instant>,
}

impl AccessToken {
    /// Create a token from the grant response.
    ///
    /// A token with a lifetime shorter than the expiry margin is treated as
    /// already expired. Tokens granted without a lifetime never expire.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_in: Option<u64>) -> Self {
        let expires_at = expires_in.map(|secs| {
            Instant::now() + Duration::from_secs(secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS))
        });

        Self {
            token: SecretString::from(token.into()),
            expires_at,
        }
    }

    /// Render the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("OAuth {}", self.token.expose_secret())
    }

    /// Returns true once the token lifetime (minus margin) has elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// Shared store for the current access token.
///
/// Cloned sessions observe the same token, so concurrent clients built from
/// one connection reuse a single grant.
#[derive(Debug, Clone, Default)]
pub struct TokenSession {
    current: Arc<Mutex<Option<AccessToken>>>,
}

impl TokenSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the `Authorization` header value if a usable token is stored.
    ///
    /// An expired token is discarded and `None` is returned so the caller
    /// can fetch a fresh grant.
    pub async fn authorization(&self) -> Option<String> {
        let mut current = self.current.lock().await;
        match current.as_ref() {
            Some(token) if !token.is_expired() => Some(token.authorization()),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }

    /// Store a freshly granted token.
    pub async fn store(&self, token: AccessToken) {
        *self.current.lock().await = Some(token);
    }

    /// Drop the current token, forcing the next request to re-authenticate.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }
}

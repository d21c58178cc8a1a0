//! Authenticated HTTP connection to the Brightbox API.
//!
//! [`BrightboxConnection`] owns the HTTP client, exchanges API client
//! credentials for an access token on demand, and classifies failed
//! responses into the shared error taxonomy. Service crates build their
//! operations on top of [`BrightboxConnection::request`].

use crate::auth::{AccessToken, ClientCredentials, TokenSession};
use crate::config::BrightboxConfig;
use crate::error::{Error, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("brightbox-core/", env!("CARGO_PKG_VERSION"));

/// Grant type requested during the token exchange.
const GRANT_TYPE: &str = "none";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Terminal response from the API: status code plus raw body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// HTTP status returned by the API.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Authenticated connection to a Brightbox API endpoint.
///
/// Cloning is cheap and clones share the HTTP connection pool and the
/// token session.
#[derive(Debug, Clone)]
pub struct BrightboxConnection {
    http: Client,
    api_url: Url,
    api_version: String,
    credentials: ClientCredentials,
    session: TokenSession,
}

impl BrightboxConnection {
    /// Create a connection from credentials and configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation or the HTTP
    /// client cannot be constructed.
    pub fn new(credentials: ClientCredentials, config: &BrightboxConfig) -> Result<Self> {
        config.validate()?;
        let api_url = config.parse_api_url()?;

        let http = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            api_url,
            api_version: config.api_version.clone(),
            credentials,
            session: TokenSession::new(),
        })
    }

    /// Return the API base URL.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Issue an authenticated request against a versioned API path.
    ///
    /// The path is joined under the configured version segment, so
    /// `servers` becomes `/1.0/servers`. A token is fetched first if the
    /// session does not hold a usable one.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, rejected credentials, and
    /// any response the API classifies as a failure.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let authorization = self.ensure_authorization().await?;

        debug!(%method, path, "Sending API request");

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .header("Accept", "application/json");

        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Some(error) = classify_failure(status, &body) {
            if error.is_authentication() {
                warn!(%status, "API rejected the access token, clearing session");
                self.session.invalidate().await;
            }
            return Err(error);
        }

        Ok(ApiResponse { status, body })
    }

    /// Issue an authenticated GET request.
    ///
    /// # Errors
    ///
    /// See [`BrightboxConnection::request`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, path, None).await
    }

    /// Issue an authenticated POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`BrightboxConnection::request`].
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issue an authenticated DELETE request.
    ///
    /// # Errors
    ///
    /// See [`BrightboxConnection::request`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::DELETE, path, None).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.api_url
            .join(&format!("{}/{path}", self.api_version))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }

    async fn ensure_authorization(&self) -> Result<String> {
        if let Some(header) = self.session.authorization().await {
            return Ok(header);
        }

        let token = self.fetch_token().await?;
        let header = token.authorization();
        self.session.store(token).await;
        Ok(header)
    }

    /// Exchange the client credentials for an access token.
    ///
    /// The token endpoint lives at the API root, outside the versioned
    /// prefix. Anything other than a 200 grant is a credential rejection.
    async fn fetch_token(&self) -> Result<AccessToken> {
        let url = self
            .api_url
            .join("token")
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid token endpoint: {err}")))?;

        debug!(client_id = %self.credentials.client_id(), "Requesting access token");

        let request = TokenRequest {
            client_id: self.credentials.client_id(),
            grant_type: GRANT_TYPE,
        };

        let response = self
            .http
            .post(url)
            .basic_auth(self.credentials.client_id(), Some(self.credentials.secret()))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(%status, "Token exchange rejected");
            return Err(Error::AuthenticationFailed(format!(
                "token exchange returned {status}"
            )));
        }

        let grant: TokenGrant = serde_json::from_str(&body).map_err(|_| {
            Error::AuthenticationFailed("malformed token grant response".to_string())
        })?;

        Ok(AccessToken::new(grant.access_token, grant.expires_in))
    }
}

/// Classify a completed response, returning the error for failures.
///
/// Success statuses pass through. A 400 or 401 whose body carries the
/// OAuth `invalid_client` or `unauthorized_client` code is a credential
/// rejection; every other failure keeps its status and raw body.
fn classify_failure(status: StatusCode, body: &str) -> Option<Error> {
    if status.is_success() {
        return None;
    }

    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
        if let Some(code) = oauth_error_code(body) {
            if code == "invalid_client" || code == "unauthorized_client" {
                return Some(Error::AuthenticationFailed(code));
            }
        }
    }

    Some(Error::OperationFailed {
        status,
        body: body.to_string(),
    })
}

fn oauth_error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

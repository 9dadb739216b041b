use crate::domain::{AUTH_PATH, AuthResponse, Credentials, ErrorEnvelope, api_url};
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// Upper bound for a whole request, connect included.
    pub timeout: Duration,
    pub insecure_tls: bool,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            insecure_tls: false,
        }
    }
}

/// Authenticated session: the server it belongs to plus the JWT handed out
/// by `POST /api/auth`. Only ever built with a non-empty token.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    token: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Auth("server returned an empty token".to_string()));
        }
        Ok(Self {
            base_url: base_url.into(),
            token,
        })
    }

    pub fn url(&self, endpoint: &str) -> Result<String> {
        api_url(&self.base_url, endpoint)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| Error::Auth("token contains invalid header characters".to_string()))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Raw outcome of one call: status and body text, not yet interpreted.
#[derive(Debug)]
pub struct ApiResponse {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Turns any non-2xx status into [`Error::Server`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(server_error(self.status, &self.body))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| Error::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

pub struct PortainerApi {
    client: reqwest::Client,
    base_url: String,
}

impl PortainerApi {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_tls)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            client,
            base_url: options.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/auth`
    ///
    /// Every failure mode (transport, non-2xx, malformed body, missing or
    /// empty `jwt`) is reported as [`Error::Auth`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let url = api_url(&self.base_url, AUTH_PATH)?;
        debug!(%url, username = %credentials.username, "logging in");

        let response = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(|err| Error::Auth(format!("request failed: POST {url}: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Auth(format!("failed to read login response: {err}")))?;

        if !status.is_success() {
            let reason = match server_error(status, &body) {
                Error::Server {
                    message, details, ..
                } if !details.is_empty() => format!("{status}: {message} ({details})"),
                Error::Server { message, .. } => format!("{status}: {message}"),
                other => other.to_string(),
            };
            return Err(Error::Auth(reason));
        }

        let auth: AuthResponse = serde_json::from_str(&body)
            .map_err(|err| Error::Auth(format!("invalid login response: {err}")))?;

        let session = Session::new(self.base_url.clone(), auth.jwt.unwrap_or_default())?;
        debug!("login successful");
        Ok(session)
    }

    pub(crate) async fn call(
        &self,
        session: &Session,
        method: Method,
        endpoint: &str,
    ) -> Result<ApiResponse> {
        let url = session.url(endpoint)?;
        let builder = self
            .client
            .request(method.clone(), &url)
            .headers(session.auth_headers()?);
        self.dispatch(method, url, builder).await
    }

    pub(crate) async fn call_with_body<B: Serialize + ?Sized>(
        &self,
        session: &Session,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        let url = session.url(endpoint)?;
        let builder = self
            .client
            .request(method.clone(), &url)
            .headers(session.auth_headers()?)
            .json(body);
        self.dispatch(method, url, builder).await
    }

    async fn dispatch(
        &self,
        method: Method,
        url: String,
        builder: RequestBuilder,
    ) -> Result<ApiResponse> {
        debug!(%method, %url, "sending request");

        let response = builder.send().await.map_err(|source| Error::Network {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| Error::Network {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        debug!(%method, %url, %status, "received response");
        Ok(ApiResponse { url, status, body })
    }
}

/// Decodes the `{message, details}` envelope; an undecodable body becomes the
/// message as-is.
pub fn server_error(status: StatusCode, body: &str) -> Error {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = if envelope.message.is_empty() && envelope.details.is_empty() {
        body.trim().to_string()
    } else {
        envelope.message
    };

    Error::Server {
        status: status.as_u16(),
        message,
        details: envelope.details,
    }
}

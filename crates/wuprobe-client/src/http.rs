//! HTTP client for the monitoring server

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, info, instrument};
use url::Url;

use wuprobe_api::{
    ProbeResult,
    requests::{LoginRequest, SetStateRequest},
    responses::LoginResponse,
};

use crate::error::{ClientError, Result};

/// Header carrying the login name on authenticated requests
pub const USERNAME_HEADER: &str = "X-Opsview-Username";
/// Header carrying the session token on authenticated requests
pub const TOKEN_HEADER: &str = "X-Opsview-Token";

/// Authenticated session for a single probe run
///
/// Never persisted; a new one is obtained on every invocation.
#[derive(Clone)]
pub struct Session {
    username: String,
    token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the monitoring server REST API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use wuprobe_client::HttpClient;
    ///
    /// let client = HttpClient::new("https://opsview.example.com")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new HTTP client whose requests give up after `timeout`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // `rest/...` must resolve below any path prefix the server lives under
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Build a full URL from a path relative to the server root
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// Turn a non-success status into `ClientError::Api`
    async fn check(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }
        Ok(response)
    }

    /// Log in and obtain a session token
    ///
    /// # Errors
    /// Returns an error if the request fails, the server rejects the
    /// credentials, the body is not JSON, or no token is present.
    #[instrument(skip(self, password), fields(server = %self.base_url))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let url = self.url("rest/login")?;
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        debug!("logging in");
        let response = self.client.post(url).json(&body).send().await?;
        let response = Self::check(response).await?;

        let text = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("login: {e}")))?;

        let token = login
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingToken)?;

        info!("authenticated");
        Ok(Session::new(username, token))
    }

    /// Submit a passive check result for `hostname`/`service`
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    #[instrument(skip(self, session, result), fields(status = %result.status))]
    pub async fn submit(
        &self,
        hostname: &str,
        service: &str,
        session: &Session,
        result: &ProbeResult,
    ) -> Result<()> {
        let mut url = self.url("rest/detail")?;
        url.query_pairs_mut()
            .append_pair("hostname", hostname)
            .append_pair("servicename", service);

        let body = SetStateRequest::from(result);

        debug!(%url, "submitting result");
        let response = self
            .client
            .post(url)
            .header(USERNAME_HEADER, session.username())
            .header(TOKEN_HEADER, session.token())
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:8080");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new("not a url");
        assert!(client.is_err());
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client.url("rest/login").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/rest/login");
    }

    #[test]
    fn test_url_building_keeps_prefix() {
        let client = HttpClient::new("https://monitor.example.com/opsview").unwrap();
        let url = client.url("rest/detail").unwrap();
        assert_eq!(url.as_str(), "https://monitor.example.com/opsview/rest/detail");
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session::new("admin", "s3cr3t");
        let debug = format!("{session:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cr3t"));
    }
}

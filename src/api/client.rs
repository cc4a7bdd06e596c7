//! HTTP client for the Pawport account API.
//!
//! `ApiClient` owns the reqwest client and the bearer token attached to
//! authenticated requests. The token is the process-wide auth header:
//! while it is set, every request carries it; while it is cleared, none
//! do. Only the session manager sets or clears it.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::auth::Credentials;
use crate::models::UserProfile;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Payload returned by the login and refresh endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

/// API client for the Pawport account service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach the bearer token to all subsequent requests.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Stop attaching a bearer token to subsequent requests.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// The currently attached bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `/users/register`. A 2xx response carries nothing the client
    /// needs; registration does not log the user in.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = format!("{}/users/register", self.base_url);
        debug!(url = %url, "sending registration request");

        let response = self
            .authenticated(self.client.post(&url))
            .json(credentials)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// POST `/users/login`, yielding the token and profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError> {
        let url = format!("{}/users/login", self.base_url);
        debug!(url = %url, "sending login request");

        let response = self
            .authenticated(self.client.post(&url))
            .json(credentials)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// POST `/users/logout` with the current bearer token.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = format!("{}/users/logout", self.base_url);
        debug!(url = %url, "sending logout request");

        let response = self.authenticated(self.client.post(&url)).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// GET `/users/refresh` with the current bearer token, yielding the
    /// token and the current profile.
    pub async fn refresh(&self) -> Result<AuthPayload, ApiError> {
        let url = format!("{}/users/refresh", self.base_url);
        debug!(url = %url, "sending refresh request");

        let response = self.authenticated(self.client.get(&url)).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    fn authenticated(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if the response is successful, mapping failures to the
    /// normalized error.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_stripped() {
        let client = ApiClient::new("https://api.example.com/").expect("Failed to build client");
        assert_eq!(client.base_url(), "https://api.example.com");

        let client = ApiClient::new("https://api.example.com///").expect("Failed to build client");
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_token_lifecycle() {
        let mut client = ApiClient::new("http://localhost").expect("Failed to build client");
        assert!(client.token().is_none());

        client.set_token("T1".to_string());
        assert_eq!(client.token(), Some("T1"));

        client.clear_token();
        assert!(client.token().is_none());
    }

    #[test]
    fn test_auth_payload_parses_login_response() {
        let json = r#"{"token":"abc.def.ghi","user":{"email":"u@x.com","name":"U"}}"#;
        let payload: AuthPayload = serde_json::from_str(json).expect("Failed to parse payload");
        assert_eq!(payload.token, "abc.def.ghi");
        assert_eq!(payload.user.name.as_deref(), Some("U"));
    }
}

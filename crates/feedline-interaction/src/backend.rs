//! HttpBackend - REST client for the Feedline BFF.
//!
//! Implements the core's [`AuthApi`] and [`FeedApi`] seams over `reqwest`.
//! Every non-2xx response goes through [`ApiError::from_status`] with the
//! `message` field of the error body, if there is one.
//!
//! [`AuthApi`]: feedline_core::api::AuthApi
//! [`FeedApi`]: feedline_core::api::FeedApi

use feedline_core::api::{ApiError, ApiResult};
use feedline_core::config::ClientConfig;
use feedline_core::session::TokenStore;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of the backend seams.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
    /// Source of the bearer token for authenticated calls.
    tokens: Option<Arc<dyn TokenStore>>,
}

impl HttpBackend {
    /// Creates a backend for `base_url` (e.g. `http://localhost:8084/api/v1/bff`)
    /// that sends no bearer token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tokens: None,
        }
    }

    /// Creates a backend from the client configuration, reading bearer tokens
    /// from `tokens`.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::new(config.api_base_url.clone())
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_token_store(tokens)
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches `Authorization: Bearer <accessToken>` from `tokens` to
    /// authenticated calls.
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str, authenticated: bool) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, "Backend request");

        let mut request = self.client.request(method, url).timeout(self.timeout);
        if authenticated {
            if let Some(token) = self.bearer_token().await {
                request = request.bearer_auth(token);
            }
        }
        request
    }

    async fn bearer_token(&self) -> Option<String> {
        match &self.tokens {
            Some(store) => store.access_token().await,
            None => None,
        }
    }

    /// `GET` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let request = self.request(Method::GET, path, true).await.query(query);
        let response = send(request).await?;
        decode(response).await
    }

    /// `POST` a JSON body and decode the JSON response.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B, authenticated: bool) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, path, authenticated)
            .await
            .json(body);
        let response = send(request).await?;
        decode(response).await
    }

    /// `DELETE`, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, path, true).await;
        send(request).await.map(|_| ())
    }
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = ApiError::from_status(status.as_u16(), error_message(&body));
    tracing::debug!(status = status.as_u16(), "Backend returned an error: {}", err);
    Err(err)
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::network(format!("Failed to read response body: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::network("Request timed out")
    } else if err.is_connect() {
        ApiError::network(format!("Could not connect to the server: {}", err))
    } else {
        ApiError::network(err.to_string())
    }
}

/// Extracts a human-readable message from an error body.
///
/// The BFF answers with `{"message": "..."}`; some gateways use `error`
/// instead. Plain-text bodies are passed through as-is.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => ["message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(|v| v.as_str()))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string),
        Err(_) => Some(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new("http://localhost:8084/api/v1/bff/");
        assert_eq!(backend.base_url(), "http://localhost:8084/api/v1/bff");
        assert_eq!(
            backend.url("/auth/login"),
            "http://localhost:8084/api/v1/bff/auth/login"
        );
        assert_eq!(
            backend.url("posts/3/likes"),
            "http://localhost:8084/api/v1/bff/posts/3/likes"
        );
    }

    #[test]
    fn test_error_message_from_json_body() {
        assert_eq!(
            error_message(r#"{"message":"Alias already taken","status":409}"#),
            Some("Alias already taken".to_string())
        );
        assert_eq!(
            error_message(r#"{"error":"Bad Gateway"}"#),
            Some("Bad Gateway".to_string())
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message(r#"{"status":500}"#), None);
    }

    #[test]
    fn test_error_message_from_other_bodies() {
        assert_eq!(error_message(""), None);
        assert_eq!(error_message("  \n"), None);
        assert_eq!(error_message("upstream down"), Some("upstream down".to_string()));
    }
}

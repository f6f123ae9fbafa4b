//! HTTP client abstraction.
//!
//! Service backends talk to remote APIs through the [`HttpClient`] trait so
//! tests can substitute a mock transport. The [`ReqwestClient`] implementation
//! performs a single attempt per call; retry on rate limiting lives in
//! [`crate::backoff`] where it can honor per-response `Retry-After` hints.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{Result, ServiceError};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(Bytes::from(json));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }
}

/// HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ServiceError::Parse(format!("invalid JSON response: {}", e)))
    }

    /// Get response body as UTF-8 string
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| ServiceError::Parse(format!("invalid UTF-8 response: {}", e)))
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the `Retry-After` header as a delay, if present and well-formed.
    /// Only the delta-seconds form is recognized; HTTP-date values are ignored.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, v)| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Map a non-2xx status to the corresponding [`ServiceError`].
    ///
    /// Returns `Ok(self)` for successful responses so calls compose as
    /// `client.execute(req).await?.error_for_status()?`.
    pub fn error_for_status(self) -> Result<Self> {
        match self.status {
            200..=299 => Ok(self),
            401 | 403 => Err(ServiceError::AuthenticationFailed(format!(
                "HTTP {}",
                self.status
            ))),
            404 => Err(ServiceError::RemoteNotFound(format!(
                "HTTP 404: {}",
                self.text().unwrap_or_default()
            ))),
            429 => Err(ServiceError::RateLimited {
                retry_after: self.retry_after(),
            }),
            500..=599 => Err(ServiceError::RemoteTransient(format!(
                "HTTP {}",
                self.status
            ))),
            other => Err(ServiceError::Http(format!(
                "HTTP {}: {}",
                other,
                self.text().unwrap_or_default()
            ))),
        }
    }
}

/// Async HTTP transport trait
///
/// A single attempt with no retry semantics of its own. Implementations map
/// transport failures (connect, TLS, timeout) to [`ServiceError::Http`] and
/// return every received response as-is, including error statuses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Reqwest-based HTTP client
///
/// Connection pooling and TLS come from reqwest; rustls is used so no system
/// OpenSSL is required.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("drum/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "executing HTTP request");

        let mut req = self
            .client
            .request(Self::convert_method(request.method), &request.url);
        for (key, value) in request.headers {
            req = req.header(key, value);
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ServiceError::Http(format!("request failed: {}", e)))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Http(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("https://example.com")
            .header("Accept", "application/json")
            .bearer_token("secret");

        assert_eq!(request.url, "https://example.com");
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer secret".to_string())
        );
    }

    #[test]
    fn test_retry_after_parsing() {
        let resp = response(429, &[("Retry-After", "12")]);
        assert_eq!(resp.retry_after(), Some(Duration::from_secs(12)));

        // Case-insensitive header lookup.
        let resp = response(429, &[("retry-after", "3")]);
        assert_eq!(resp.retry_after(), Some(Duration::from_secs(3)));

        // HTTP-date form is not recognized.
        let resp = response(429, &[("Retry-After", "Wed, 21 Oct 2026 07:28:00 GMT")]);
        assert_eq!(resp.retry_after(), None);

        let resp = response(429, &[]);
        assert_eq!(resp.retry_after(), None);
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(response(200, &[]).error_for_status().is_ok());
        assert!(matches!(
            response(404, &[]).error_for_status(),
            Err(ServiceError::RemoteNotFound(_))
        ));
        assert!(matches!(
            response(401, &[]).error_for_status(),
            Err(ServiceError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            response(503, &[]).error_for_status(),
            Err(ServiceError::RemoteTransient(_))
        ));

        let err = response(429, &[("Retry-After", "7")])
            .error_for_status()
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::RateLimited {
                retry_after: Some(d)
            } if d == Duration::from_secs(7)
        ));
    }
}

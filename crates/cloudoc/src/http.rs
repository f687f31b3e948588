//! HTTP transport abstraction
//!
//! Requests are plain data handed to an [`HttpClient`]; the production
//! implementation is reqwest, tests swap in a recording mock.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;

use crate::error::{Error, TransportError};

/// A prepared request, not yet authenticated
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Serializes `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> serde_json::Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        self.body = Some(bytes);
        Ok(self)
    }

    /// Sets the `Authorization: Bearer` header, replacing any previous one
    pub fn bearer_auth(&mut self, token: &str) -> Result<(), Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::InvalidRequest("Access token is not a valid header value".into()))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Response from an HTTP request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true if status is in 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Trait for sending HTTP requests
///
/// This abstraction allows easy mocking of HTTP calls in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `request` and reads the full body, giving up after `timeout`
    async fn execute(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Production HTTP client using reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new reqwest-based HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already configured reqwest client (proxies, TLS roots, ...)
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

//! HTTP transport seam
//!
//! The client only needs "perform this request, give me status and body".
//! [`ReqwestTransport`] is the production implementation; tests plug in
//! scripted transports through the same trait.
//!
//! Dropping the future returned by [`Transport::execute`] cancels the request.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

use crate::errors::{PushError, PushResult};

/// Header selecting the platform a notification is delivered to
pub const FORMAT_HEADER: &str = "ServiceBusNotification-Format";

/// Header carrying the comma-joined tag expression of a notification
pub const TAGS_HEADER: &str = "ServiceBusNotification-Tags";

/// Outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Request authorized with a SAS token
    pub fn new(method: Method, url: impl Into<String>, token: &str) -> PushResult<Self> {
        let mut request = Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        };
        let mut authorization = HeaderValue::from_str(token)
            .map_err(|e| PushError::invalid_parameter("token", e.to_string()))?;
        authorization.set_sensitive(true);
        request.headers.insert(AUTHORIZATION, authorization);
        Ok(request)
    }

    /// Attach a JSON body and its content type
    pub fn json(mut self, body: &serde_json::Value) -> PushResult<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: &str) -> PushResult<Self> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PushError::invalid_parameter(name, e.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PushError::invalid_parameter(name, e.to_string()))?;
        self.headers.insert(header, value);
        Ok(self)
    }

    /// Header value as text, for logging and assertions
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response status and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP requests on behalf of the client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request; non-2xx statuses are returned, not raised
    async fn execute(&self, request: HttpRequest) -> PushResult<HttpResponse>;
}

/// Transport backed by a pooled `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> PushResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("azure-push/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PushError::config_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> PushResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PushError::transport(method.as_str(), &url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PushError::transport(method.as_str(), &url, e))?;

        Ok(HttpResponse { status, body })
    }
}

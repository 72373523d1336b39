//! Common test utilities and helpers
//!
//! Provides an in-memory transport that answers from a script and records
//! every request, so client behaviour can be checked without a real hub.

#![allow(dead_code)]

use async_trait::async_trait;
use azure_push::transport::FORMAT_HEADER;
use azure_push::{
    Client, Configuration, HttpRequest, HttpResponse, PushError, PushResult, Transport,
};
use std::sync::{Arc, Mutex};

pub const TEST_CONNECTION_STRING: &str = "Endpoint=sb://namespace.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=secret";

type Responder = dyn Fn(&HttpRequest) -> PushResult<HttpResponse> + Send + Sync;

/// Transport answering every request through a closure
pub struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> PushResult<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `status`
    pub fn status(status: u16) -> Arc<Self> {
        Self::new(move |_| Ok(HttpResponse::new(status, "{}")))
    }

    /// Answer sends by platform format; anything unlisted gets 201
    pub fn per_platform(statuses: &[(&'static str, u16)]) -> Arc<Self> {
        let statuses = statuses.to_vec();
        Self::new(move |request| {
            let format = request.header_str(FORMAT_HEADER).unwrap_or_default();
            let status = statuses
                .iter()
                .find(|(name, _)| *name == format)
                .map(|(_, status)| *status)
                .unwrap_or(201);
            Ok(HttpResponse::new(status, format!("{format}: {status}")))
        })
    }

    /// Fail every request as if the connection were refused
    pub fn unreachable() -> Arc<Self> {
        Self::new(|request| {
            Err(PushError::transport(
                request.method.as_str(),
                request.url.clone(),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ))
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> PushResult<HttpResponse> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub fn test_config() -> Configuration {
    Configuration {
        hub_name: "hub".to_string(),
        connection_string: TEST_CONNECTION_STRING.to_string(),
        ..Default::default()
    }
}

pub fn client_with(transport: Arc<MockTransport>) -> Client {
    Client::with_transport(test_config(), transport).expect("test config is valid")
}

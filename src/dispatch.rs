//! Multi-platform notification dispatch
//!
//! A send is one POST per configured platform, each carrying that platform's
//! envelope. Outcomes are folded as follows:
//!
//! - 404/410 from a platform means nothing is registered there; it is counted
//!   and the remaining platforms are still attempted.
//! - Any other status >= 300, or a transport failure, aborts the send.
//! - If every platform reports no device, the send fails with
//!   [`PushError::NoDeviceFound`].

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::HubEndpoint;
use crate::errors::{PushError, PushResult};
use crate::notification::NotificationPayload;
use crate::platform::Platform;
use crate::transport::{HttpRequest, HttpResponse, Transport, FORMAT_HEADER, TAGS_HEADER};

/// How platform attempts are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One platform after another, in configured order
    #[default]
    Sequential,
    /// All platforms at once; the first hard failure to complete wins
    Concurrent,
}

/// Result of one platform attempt that did not fail hard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    NoDevice,
}

/// Sends a notification to every configured platform
#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn Transport>,
    endpoint: HubEndpoint,
    platforms: Vec<Platform>,
    mode: DispatchMode,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: HubEndpoint,
        platforms: Vec<Platform>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            platforms,
            mode: DispatchMode::Sequential,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Send `payload` to devices matching `tags` on every platform
    ///
    /// Empty `tags` targets every installation on the hub.
    pub async fn send(
        &self,
        token: &str,
        payload: &NotificationPayload,
        tags: &[String],
    ) -> PushResult<()> {
        if self.platforms.is_empty() {
            return Err(PushError::config("no dispatch platforms configured"));
        }

        // Every envelope is built before the first request
        let requests = self
            .platforms
            .iter()
            .map(|&platform| Ok((platform, self.build_request(token, platform, payload, tags)?)))
            .collect::<PushResult<Vec<_>>>()?;

        let no_device = match self.mode {
            DispatchMode::Sequential => self.send_sequential(requests).await?,
            DispatchMode::Concurrent => self.send_concurrent(requests).await?,
        };

        if no_device == self.platforms.len() {
            return Err(PushError::NoDeviceFound { tags: tags.to_vec() });
        }
        Ok(())
    }

    /// POST request for one platform
    pub fn build_request(
        &self,
        token: &str,
        platform: Platform,
        payload: &NotificationPayload,
        tags: &[String],
    ) -> PushResult<HttpRequest> {
        let envelope = platform.envelope(payload)?;

        HttpRequest::new(Method::POST, self.endpoint.messages_url(), token)?
            .json(&envelope)?
            .header(FORMAT_HEADER, platform.format())?
            .header(TAGS_HEADER, &tags.join(","))
    }

    async fn send_sequential(&self, requests: Vec<(Platform, HttpRequest)>) -> PushResult<usize> {
        let mut no_device = 0;
        for (platform, request) in requests {
            if attempt(self.transport.as_ref(), platform, request).await? == Delivery::NoDevice {
                no_device += 1;
            }
        }
        Ok(no_device)
    }

    /// Returning early drops the set, which aborts attempts still in flight
    async fn send_concurrent(&self, requests: Vec<(Platform, HttpRequest)>) -> PushResult<usize> {
        let mut set = JoinSet::new();
        for (platform, request) in requests {
            let transport = Arc::clone(&self.transport);
            set.spawn(async move { attempt(transport.as_ref(), platform, request).await });
        }

        let mut no_device = 0;
        while let Some(joined) = set.join_next().await {
            let delivery = joined.map_err(|e| {
                PushError::internal_with_source("notification attempt did not complete", e)
            })??;
            if delivery == Delivery::NoDevice {
                no_device += 1;
            }
        }
        Ok(no_device)
    }
}

async fn attempt(
    transport: &dyn Transport,
    platform: Platform,
    request: HttpRequest,
) -> PushResult<Delivery> {
    debug!("Sending {} notification", platform);
    let response = transport.execute(request).await?;
    classify(platform, response)
}

fn classify(platform: Platform, response: HttpResponse) -> PushResult<Delivery> {
    match response.status {
        404 | 410 => {
            debug!("No {} devices registered (status {})", platform, response.status);
            Ok(Delivery::NoDevice)
        }
        status if status >= 300 => {
            warn!("{} notification rejected with status {}", platform, status);
            Err(PushError::Platform {
                platform: platform.format().to_string(),
                status,
                body: response.body,
            })
        }
        _ => Ok(Delivery::Delivered),
    }
}

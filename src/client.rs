//! High-level Notification Hubs client
//!
//! [`Client`] owns the configuration, a shared [`TokenCache`] and the HTTP
//! transport, so callers never handle SAS tokens or hub URLs themselves.
//!
//! ```rust,no_run
//! use azure_push::{Client, Configuration, Installation, NotificationPayload};
//!
//! # #[tokio::main]
//! # async fn main() -> azure_push::PushResult<()> {
//! let config = Configuration::load("config.toml")?;
//! let client = Client::connect(config).await?;
//!
//! let installation = Installation::new("apns", "device-token").with_tag("user:42");
//! let id = client.register_device(installation).await?;
//!
//! let payload = NotificationPayload::new("Hi", "Hello").with_data("threadId", "abc123");
//! client.send_notification(&payload, &["user:42"]).await?;
//! client.delete_device(&id).await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Configuration;
use crate::dispatch::NotificationDispatcher;
use crate::errors::{PushError, PushResult};
use crate::installation::Installation;
use crate::notification::NotificationPayload;
use crate::token::{Credentials, TokenCache};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

/// Notification Hubs client
#[derive(Clone)]
pub struct Client {
    config: Configuration,
    tokens: Arc<TokenCache>,
    transport: Arc<dyn Transport>,
    dispatcher: NotificationDispatcher,
}

impl Client {
    /// Validate `config` and build a client over HTTPS
    pub fn new(config: Configuration) -> PushResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Validate `config` and build a client over the given transport
    pub fn with_transport(
        mut config: Configuration,
        transport: Arc<dyn Transport>,
    ) -> PushResult<Self> {
        config.validate()?;

        let tokens = Arc::new(TokenCache::new(Credentials::from_config(&config)));
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&transport),
            config.endpoint(),
            config.platforms.clone(),
        )
        .with_mode(config.dispatch);

        Ok(Self {
            config,
            tokens,
            transport,
            dispatcher,
        })
    }

    /// Share a token cache with other clients of the same hub
    pub fn with_token_cache(mut self, tokens: Arc<TokenCache>) -> PushResult<Self> {
        let expected = self.config.resource_uri();
        if tokens.credentials().resource_uri() != expected {
            return Err(PushError::config(format!(
                "token cache is scoped to {}, not {}",
                tokens.credentials().resource_uri(),
                expected
            )));
        }
        self.tokens = tokens;
        Ok(self)
    }

    /// Build a client and, when `connectivity_check` is set, prove the credentials work
    pub async fn connect(config: Configuration) -> PushResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::connect_with_transport(config, Arc::new(transport)).await
    }

    /// [`connect`](Self::connect) over the given transport
    pub async fn connect_with_transport(
        config: Configuration,
        transport: Arc<dyn Transport>,
    ) -> PushResult<Self> {
        let client = Self::with_transport(config, transport)?;
        if client.config.connectivity_check {
            client.validate_token().await?;
            debug!("Connectivity check passed for {}", client.config.resource_uri());
        }
        Ok(client)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Probe the hub with a random installation ID
    ///
    /// The hub answers 404 for an unknown installation when the token is
    /// accepted, so both 200 and 404 count as valid.
    pub async fn validate_token(&self) -> PushResult<()> {
        let token = self.tokens.get_token()?;
        let url = self.config.endpoint().installation_url(&Uuid::new_v4().to_string());

        let response = self
            .transport
            .execute(HttpRequest::new(Method::GET, url, &token)?)
            .await?;

        match response.status {
            200 | 404 => Ok(()),
            401 => Err(PushError::Unauthorized { body: response.body }),
            status => Err(PushError::unexpected_status("token validation", status, response.body)),
        }
    }

    /// Create or replace an installation and return its ID
    ///
    /// Tags assigned here are what [`send_notification`](Self::send_notification)
    /// targets, e.g. register with `user:123` to reach that user's devices.
    pub async fn register_device(&self, mut installation: Installation) -> PushResult<String> {
        if installation.installation_id.is_empty() {
            installation.installation_id = Uuid::new_v4().to_string();
        }
        installation.platform = self
            .config
            .resolve_platform_alias(&installation.platform)
            .to_string();
        installation.validate()?;

        let token = self.tokens.get_token()?;
        let body = serde_json::to_value(&installation)?;
        let url = self.config.endpoint().installation_url(&installation.installation_id);

        let response = self
            .transport
            .execute(HttpRequest::new(Method::PUT, url, &token)?.json(&body)?)
            .await?;

        if !response.is_success() {
            return Err(PushError::unexpected_status(
                format!("registration of installation {}", installation.installation_id),
                response.status,
                response.body,
            ));
        }

        info!(
            "Registered installation {} ({})",
            installation.installation_id, installation.platform
        );
        Ok(installation.installation_id)
    }

    /// Whether an installation is registered
    pub async fn device_exists(&self, installation_id: &str) -> PushResult<bool> {
        if installation_id.is_empty() {
            return Err(PushError::invalid_parameter("installation_id", "must not be empty"));
        }

        let token = self.tokens.get_token()?;
        let url = self.config.endpoint().installation_url(installation_id);
        let response = self
            .transport
            .execute(HttpRequest::new(Method::GET, url, &token)?)
            .await?;

        match response.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(PushError::unexpected_status(
                "installation lookup",
                status,
                response.body,
            )),
        }
    }

    /// Delete an installation; deleting one that does not exist succeeds
    pub async fn delete_device(&self, installation_id: &str) -> PushResult<()> {
        if installation_id.is_empty() {
            return Err(PushError::invalid_parameter("installation_id", "must not be empty"));
        }

        let token = self.tokens.get_token()?;
        let url = self.config.endpoint().installation_url(installation_id);
        let response = self
            .transport
            .execute(HttpRequest::new(Method::DELETE, url, &token)?)
            .await?;

        match response.status {
            200 | 204 => {
                info!("Deleted installation {}", installation_id);
                Ok(())
            }
            404 => {
                debug!("Installation {} already absent", installation_id);
                Ok(())
            }
            status => Err(PushError::unexpected_status(
                "installation delete",
                status,
                response.body,
            )),
        }
    }

    /// Send a notification to every device registered under `tags`
    ///
    /// With no tags the notification goes to every installation on the hub.
    pub async fn send_notification<S: AsRef<str>>(
        &self,
        payload: &NotificationPayload,
        tags: &[S],
    ) -> PushResult<()> {
        let tags: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        let token = self.tokens.get_token()?;
        self.dispatcher.send(&token, payload, &tags).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn config() -> Configuration {
        Configuration {
            hub_name: "hub".to_string(),
            connection_string: "Endpoint=sb://namespace.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_validates_config() {
        let client = Client::new(config()).unwrap();
        assert_eq!(client.config().namespace, "namespace");
        assert_eq!(client.dispatcher.platforms(), Platform::default_dispatch().as_slice());

        let mut bad = config();
        bad.connection_string.clear();
        assert!(matches!(Client::new(bad), Err(PushError::Config { .. })));
    }

    #[test]
    fn test_clients_can_share_tokens() {
        let first = Client::new(config()).unwrap();
        let second = Client::new(config())
            .unwrap()
            .with_token_cache(Arc::clone(first.tokens()))
            .unwrap();

        assert_eq!(first.tokens().get_token().unwrap(), second.tokens().get_token().unwrap());
    }

    #[test]
    fn test_token_cache_for_other_hub_rejected() {
        let other = Client::new(Configuration {
            hub_name: "other-hub".to_string(),
            ..config()
        })
        .unwrap();

        let result = Client::new(config())
            .unwrap()
            .with_token_cache(Arc::clone(other.tokens()));
        assert!(matches!(result, Err(PushError::Config { .. })));
    }
}

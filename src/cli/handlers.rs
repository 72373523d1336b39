//! Command handlers for all CLI operations
//!
//! Keeps CLI parsing separate from the calls into the client library.

use anyhow::{Context, Result};
use azure_push::{Client, Installation, NotificationPayload};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{CliContext, Commands};

/// Coordinates command handling with the loaded context
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their handlers
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Token => self.handle_token(),
            Commands::Validate => self.handle_validate().await,
            Commands::Register { platform, channel, id, tags } => {
                self.handle_register(platform, channel, id, tags).await
            }
            Commands::Exists { id } => self.handle_exists(&id).await,
            Commands::Delete { id } => self.handle_delete(&id).await,
            Commands::Send { title, body, data, tags } => {
                self.handle_send(title, body, data, tags).await
            }
            Commands::Config => self.handle_config(),
        }
    }

    fn client(&self) -> Result<Client> {
        Client::new(self.context.config.as_ref().clone())
            .context("Failed to create Notification Hubs client")
    }

    fn handle_token(&self) -> Result<()> {
        let client = self.client()?;
        let token = client.tokens().get_token().context("Failed to issue SAS token")?;

        println!("{token}");
        if let Some(expires_at) = client.tokens().expires_at() {
            debug!("Token expires at {}", expires_at);
        }
        Ok(())
    }

    async fn handle_validate(&self) -> Result<()> {
        self.client()?
            .validate_token()
            .await
            .context("Token validation failed")?;

        println!("Credentials accepted by hub {}", self.context.config.hub_name);
        Ok(())
    }

    async fn handle_register(
        &self,
        platform: String,
        channel: String,
        id: Option<String>,
        tags: Vec<String>,
    ) -> Result<()> {
        let mut installation = Installation::new(platform, channel);
        installation.installation_id = id.unwrap_or_default();
        installation.tags = tags;

        let id = self
            .client()?
            .register_device(installation)
            .await
            .context("Failed to register device")?;

        println!("Registered installation: {id}");
        Ok(())
    }

    async fn handle_exists(&self, id: &str) -> Result<()> {
        let exists = self
            .client()?
            .device_exists(id)
            .await
            .context("Failed to look up installation")?;

        if exists {
            println!("Installation {id} exists");
        } else {
            println!("Installation {id} not found");
        }
        Ok(())
    }

    async fn handle_delete(&self, id: &str) -> Result<()> {
        self.client()?
            .delete_device(id)
            .await
            .context("Failed to delete installation")?;

        println!("Installation {id} deleted");
        Ok(())
    }

    async fn handle_send(
        &self,
        title: String,
        body: String,
        data: Option<String>,
        tags: Vec<String>,
    ) -> Result<()> {
        let mut payload = NotificationPayload::new(title, body);
        if let Some(data) = data {
            payload.custom_data = parse_custom_data(&data)?;
        }

        if tags.is_empty() {
            warn!("No tags given: notification targets every registered device");
        }

        match self.client()?.send_notification(&payload, tags.as_slice()).await {
            Ok(()) => {
                println!("Notification sent");
                Ok(())
            }
            Err(err) if err.is_no_device_found() => {
                println!("{err}");
                Ok(())
            }
            Err(err) => Err(err).context("Failed to send notification"),
        }
    }

    fn handle_config(&self) -> Result<()> {
        let rendered = toml::to_string_pretty(&self.context.config.redacted())
            .context("Failed to serialize configuration")?;

        println!("# {}", self.context.config_path.display());
        print!("{rendered}");
        Ok(())
    }
}

/// `--data` must be a JSON object
fn parse_custom_data(data: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(data).context("--data is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--data must be a JSON object, got {}", other),
    }
}

//! Hub configuration
//!
//! Loaded from TOML and validated before a [`Client`](crate::Client) is built.
//!
//! ```toml
//! hub_name = "myhub"
//! connection_string = "Endpoint=sb://my-namespace.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=..."
//! token_validity_secs = 3600
//! ```

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::dispatch::DispatchMode;
use crate::errors::{PushError, PushResult};
use crate::platform::Platform;

/// Host suffix shared by every Notification Hubs namespace
pub const SERVICE_BUS_SUFFIX: &str = ".servicebus.windows.net";

/// REST API version sent with every request
pub const DEFAULT_API_VERSION: &str = "2020-06";

/// Notification Hub credentials and client settings
///
/// Call [`Configuration::validate`] after constructing one by hand; [`Configuration::load`]
/// does it for you.
#[derive(Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Name of the Notification Hub inside the namespace
    pub hub_name: String,

    /// Full connection string copied from the hub's access policies.
    /// When present it overrides `namespace`, `key_name` and `key_value`.
    #[serde(default)]
    pub connection_string: String,

    /// Service Bus namespace, without the `.servicebus.windows.net` suffix
    #[serde(default)]
    pub namespace: String,

    /// Shared access policy name, e.g. `DefaultFullSharedAccessSignature`
    #[serde(default)]
    pub key_name: String,

    /// Shared access policy key
    #[serde(default)]
    pub key_value: String,

    /// How long each generated SAS token stays valid
    #[serde(default = "default_token_validity_secs")]
    pub token_validity_secs: u64,

    /// Probe the hub with the first token when the client connects
    #[serde(default)]
    pub connectivity_check: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Platforms a notification is delivered to, in attempt order
    #[serde(default = "Platform::default_dispatch")]
    pub platforms: Vec<Platform>,

    /// Registration platform identifiers rewritten before reaching the hub
    #[serde(default = "default_platform_aliases")]
    pub platform_aliases: HashMap<String, String>,

    #[serde(default)]
    pub dispatch: DispatchMode,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_token_validity_secs() -> u64 {
    3600
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The hub still expects the legacy `gcm` identifier for FCM installations
fn default_platform_aliases() -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    aliases.insert("fcm".to_string(), Platform::Gcm.registration_id().to_string());
    aliases
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hub_name: String::new(),
            connection_string: String::new(),
            namespace: String::new(),
            key_name: String::new(),
            key_value: String::new(),
            token_validity_secs: default_token_validity_secs(),
            connectivity_check: false,
            timeout_secs: default_timeout_secs(),
            api_version: default_api_version(),
            platforms: Platform::default_dispatch(),
            platform_aliases: default_platform_aliases(),
            dispatch: DispatchMode::default(),
            log_level: default_log_level(),
        }
    }
}

impl Configuration {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> PushResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PushError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)
            .map_err(|e| PushError::io_with_source(path, "read config file", e))?;
        let mut config: Configuration = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.azure-push/config.toml`
    pub fn default_path() -> PushResult<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| PushError::config("Failed to get base directories"))?;
        Ok(base_dirs.home_dir().join(".azure-push").join("config.toml"))
    }

    /// Check required fields, expanding the connection string first if set
    pub fn validate(&mut self) -> PushResult<()> {
        self.apply_connection_string()?;

        if self.namespace.is_empty() {
            return Err(PushError::config("missing Azure namespace"));
        }
        if self.hub_name.is_empty() {
            return Err(PushError::config("missing Azure hub name"));
        }
        if self.key_name.is_empty() {
            return Err(PushError::config("missing Azure key name"));
        }
        if self.key_value.is_empty() {
            return Err(PushError::config("missing Azure key value"));
        }
        if self.token_validity_secs == 0 {
            return Err(PushError::config("missing token validity duration"));
        }
        if self.timeout_secs == 0 {
            return Err(PushError::config("request timeout must be at least one second"));
        }
        if self.platforms.is_empty() {
            return Err(PushError::config("at least one dispatch platform is required"));
        }
        if let Some(platform) = self.platforms.iter().find(|p| !p.is_dispatchable()) {
            return Err(PushError::config(format!(
                "platform '{}' is registration-only and cannot be used for dispatch",
                platform
            )));
        }

        Ok(())
    }

    /// Expected format:
    /// `Endpoint=sb://<namespace>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>`
    fn apply_connection_string(&mut self) -> PushResult<()> {
        if self.connection_string.is_empty() {
            return Ok(());
        }

        let parts: Vec<&str> = self.connection_string.split(';').collect();
        if parts.len() < 3 {
            return Err(PushError::config("invalid connection string format"));
        }

        let mut namespace = String::new();
        let mut key_name = String::new();
        let mut key_value = String::new();

        for part in parts {
            if let Some(endpoint) = part.strip_prefix("Endpoint=") {
                let url = Url::parse(endpoint)?;
                let host = url.host_str().unwrap_or_default();
                namespace = host.strip_suffix(SERVICE_BUS_SUFFIX).unwrap_or(host).to_string();
            } else if let Some(name) = part.strip_prefix("SharedAccessKeyName=") {
                key_name = name.to_string();
            } else if let Some(key) = part.strip_prefix("SharedAccessKey=") {
                key_value = key.to_string();
            }
        }

        if namespace.is_empty() || key_name.is_empty() || key_value.is_empty() {
            return Err(PushError::config("missing required connection string parts"));
        }

        self.namespace = namespace;
        self.key_name = key_name;
        self.key_value = key_value;
        Ok(())
    }

    /// Resource the SAS token is scoped to
    pub fn resource_uri(&self) -> String {
        format!("https://{}{}/{}", self.namespace, SERVICE_BUS_SUFFIX, self.hub_name)
    }

    pub fn endpoint(&self) -> HubEndpoint {
        HubEndpoint {
            base: self.resource_uri(),
            api_version: self.api_version.clone(),
        }
    }

    pub fn token_validity(&self) -> Duration {
        Duration::from_secs(self.token_validity_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Map a registration identifier through the configured aliases
    pub fn resolve_platform_alias<'a>(&'a self, platform: &'a str) -> &'a str {
        self.platform_aliases
            .get(platform)
            .map(String::as_str)
            .unwrap_or(platform)
    }

    /// Copy safe to print, with the key and connection string masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.key_value.is_empty() {
            copy.key_value = "********".to_string();
        }
        if !copy.connection_string.is_empty() {
            copy.connection_string = "********".to_string();
        }
        copy
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.redacted();
        f.debug_struct("Configuration")
            .field("hub_name", &shown.hub_name)
            .field("connection_string", &shown.connection_string)
            .field("namespace", &shown.namespace)
            .field("key_name", &shown.key_name)
            .field("key_value", &shown.key_value)
            .field("token_validity_secs", &shown.token_validity_secs)
            .field("connectivity_check", &shown.connectivity_check)
            .field("timeout_secs", &shown.timeout_secs)
            .field("api_version", &shown.api_version)
            .field("platforms", &shown.platforms)
            .field("platform_aliases", &shown.platform_aliases)
            .field("dispatch", &shown.dispatch)
            .field("log_level", &shown.log_level)
            .finish()
    }
}

/// REST endpoints of one hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEndpoint {
    base: String,
    api_version: String,
}

impl HubEndpoint {
    pub fn installation_url(&self, installation_id: &str) -> String {
        format!(
            "{}/installations/{}?api-version={}",
            self.base,
            urlencoding::encode(installation_id),
            self.api_version
        )
    }

    pub fn messages_url(&self) -> String {
        format!("{}/messages/?api-version={}", self.base, self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONNECTION_STRING: &str = "Endpoint=sb://my-namespace.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=c2VjcmV0a2V5PT0=";

    fn manual_config() -> Configuration {
        Configuration {
            hub_name: "myhub".to_string(),
            namespace: "my-namespace".to_string(),
            key_name: "DefaultFullSharedAccessSignature".to_string(),
            key_value: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_connection_string_overrides_fields() {
        let mut config = Configuration {
            hub_name: "myhub".to_string(),
            connection_string: CONNECTION_STRING.to_string(),
            namespace: "ignored".to_string(),
            ..Default::default()
        };
        config.validate().unwrap();

        assert_eq!(config.namespace, "my-namespace");
        assert_eq!(config.key_name, "DefaultFullSharedAccessSignature");
        assert_eq!(config.key_value, "c2VjcmV0a2V5PT0=");
    }

    #[test]
    fn test_malformed_connection_string() {
        let mut config = Configuration {
            hub_name: "myhub".to_string(),
            connection_string: "Endpoint=sb://ns.servicebus.windows.net/".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PushError::Config { .. })));

        let mut config = Configuration {
            hub_name: "myhub".to_string(),
            connection_string: "Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=;SharedAccessKey=k".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut config = manual_config();
        config.key_value.clear();
        assert!(config.validate().is_err());

        let mut config = manual_config();
        config.token_validity_secs = 0;
        assert!(config.validate().is_err());

        let mut config = manual_config();
        config.hub_name.clear();
        assert!(config.validate().is_err());

        let mut config = manual_config();
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(PushError::Config { .. })));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = Configuration {
            hub_name: "myhub".to_string(),
            connection_string: CONNECTION_STRING.to_string(),
            ..Default::default()
        };
        config.validate().unwrap();

        let rendered = format!("{:?}", config);
        assert!(rendered.contains("my-namespace"));
        assert!(rendered.contains("********"));
        assert!(!rendered.contains("c2VjcmV0a2V5PT0="));
    }

    #[test]
    fn test_registration_only_platform_rejected_for_dispatch() {
        let mut config = manual_config();
        config.platforms = vec![Platform::Apple, Platform::Wns];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_urls() {
        let config = manual_config();
        assert_eq!(config.resource_uri(), "https://my-namespace.servicebus.windows.net/myhub");

        let endpoint = config.endpoint();
        assert_eq!(
            endpoint.installation_url("device-1"),
            "https://my-namespace.servicebus.windows.net/myhub/installations/device-1?api-version=2020-06"
        );
        assert_eq!(
            endpoint.messages_url(),
            "https://my-namespace.servicebus.windows.net/myhub/messages/?api-version=2020-06"
        );
    }

    #[test]
    fn test_default_alias() {
        let config = manual_config();
        assert_eq!(config.resolve_platform_alias("fcm"), "gcm");
        assert_eq!(config.resolve_platform_alias("apns"), "apns");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            format!(
                "hub_name = \"myhub\"\nconnection_string = \"{}\"\ntoken_validity_secs = 7200\nplatforms = [\"apple\", \"fcmV1\"]\ndispatch = \"concurrent\"\n",
                CONNECTION_STRING
            ),
        )
        .unwrap();

        let config = Configuration::load(&path).unwrap();
        assert_eq!(config.namespace, "my-namespace");
        assert_eq!(config.token_validity(), Duration::from_secs(7200));
        assert_eq!(config.platforms, vec![Platform::Apple, Platform::FcmV1]);
        assert_eq!(config.dispatch, DispatchMode::Concurrent);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Configuration::load(temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(PushError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = manual_config();
        config.connection_string = CONNECTION_STRING.to_string();
        let redacted = config.redacted();
        assert_eq!(redacted.key_value, "********");
        assert_eq!(redacted.connection_string, "********");
        assert_eq!(redacted.key_name, config.key_name);
    }
}

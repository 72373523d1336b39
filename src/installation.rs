//! Device installations
//!
//! An installation is the hub's record of one device: its platform, the
//! channel the push service delivers to, and the tags notifications target.
//! Registering is create-or-replace keyed by `installation_id`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{PushError, PushResult};
use crate::platform::Platform;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    /// Caller-chosen ID, usually a device ID or UUID; generated when empty
    pub installation_id: String,

    /// Registration identifier such as `apns`, `gcm`, `FCMV1`, or a configured alias like `fcm`
    pub platform: String,

    /// APNs device token or FCM registration token
    pub push_channel: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub templates: HashMap<String, InstallationTemplate>,
}

/// Per-installation template for templated sends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallationTemplate {
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Installation {
    pub fn new(platform: impl Into<String>, push_channel: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            push_channel: push_channel.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, installation_id: impl Into<String>) -> Self {
        self.installation_id = installation_id.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check required fields; `platform` must already be alias-resolved
    pub fn validate(&self) -> PushResult<()> {
        if Platform::from_registration_id(&self.platform).is_none() {
            return Err(PushError::invalid_installation(format!(
                "invalid platform: {:?} (expected one of apns, gcm, FCMV1, baidu, wns, mpns)",
                self.platform
            )));
        }
        if self.installation_id.is_empty() {
            return Err(PushError::invalid_installation("installation ID is required"));
        }
        if self.push_channel.is_empty() {
            return Err(PushError::invalid_installation("push channel is required"));
        }
        Ok(())
    }
}

//! Push platforms known to Notification Hubs
//!
//! Each platform has two names: the identifier stored on an installation
//! (`apns`, `gcm`, `FCMV1`, ...) and the notification format sent in the
//! `ServiceBusNotification-Format` header (`apple`, `gcm`, `fcmV1`, ...).
//! Only Apple and the two Google channels can be targeted by a send; the
//! rest are accepted for registration only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::{PushError, PushResult};
use crate::notification::NotificationPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Apple,
    /// Legacy FCM, still named after Google Cloud Messaging by the hub
    Gcm,
    FcmV1,
    Baidu,
    Wns,
    Mpns,
}

/// Wire shape of a notification body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `{"aps": {"alert": ...}, ...custom}`
    Apple,
    /// `{"notification": ..., "data": custom}`
    Google,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Apple,
        Platform::Gcm,
        Platform::FcmV1,
        Platform::Baidu,
        Platform::Wns,
        Platform::Mpns,
    ];

    /// Platforms a notification goes to when nothing else is configured
    pub fn default_dispatch() -> Vec<Platform> {
        vec![Platform::Apple, Platform::Gcm, Platform::FcmV1]
    }

    /// Identifier stored on an installation
    pub fn registration_id(self) -> &'static str {
        match self {
            Platform::Apple => "apns",
            Platform::Gcm => "gcm",
            Platform::FcmV1 => "FCMV1",
            Platform::Baidu => "baidu",
            Platform::Wns => "wns",
            Platform::Mpns => "mpns",
        }
    }

    /// Value of the `ServiceBusNotification-Format` header
    pub fn format(self) -> &'static str {
        match self {
            Platform::Apple => "apple",
            Platform::Gcm => "gcm",
            Platform::FcmV1 => "fcmV1",
            Platform::Baidu => "baidu",
            Platform::Wns => "windows",
            Platform::Mpns => "windowsphone",
        }
    }

    pub fn envelope_shape(self) -> Option<EnvelopeShape> {
        match self {
            Platform::Apple => Some(EnvelopeShape::Apple),
            Platform::Gcm | Platform::FcmV1 => Some(EnvelopeShape::Google),
            Platform::Baidu | Platform::Wns | Platform::Mpns => None,
        }
    }

    pub fn is_dispatchable(self) -> bool {
        self.envelope_shape().is_some()
    }

    /// Build this platform's notification body
    pub fn envelope(self, payload: &NotificationPayload) -> PushResult<Value> {
        match self.envelope_shape() {
            Some(EnvelopeShape::Apple) => Ok(payload.apple_envelope()),
            Some(EnvelopeShape::Google) => Ok(payload.google_envelope()),
            None => Err(PushError::UnsupportedPlatform {
                platform: self.format().to_string(),
            }),
        }
    }

    /// Look up an installation platform identifier
    pub fn from_registration_id(id: &str) -> Option<Platform> {
        Self::ALL.into_iter().find(|p| p.registration_id() == id)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format())
    }
}

/// Accepts either the format name or the registration identifier
impl FromStr for Platform {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.format() == s || p.registration_id() == s)
            .ok_or_else(|| PushError::UnsupportedPlatform {
                platform: s.to_string(),
            })
    }
}

impl TryFrom<String> for Platform {
    type Error = PushError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.format().to_string()
    }
}

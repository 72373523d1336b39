//! Cross-platform notification payload and its per-platform envelopes

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Title, body and custom data delivered to every platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub custom_data: Map<String, Value>,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            custom_data: Map::new(),
        }
    }

    /// Attach one custom data entry
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    fn message(&self) -> Value {
        json!({
            "title": self.title,
            "body": self.body,
        })
    }

    /// APNs body: custom keys sit beside `aps` and win on collision
    pub fn apple_envelope(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("aps".to_string(), json!({ "alert": self.message() }));
        envelope.extend(self.custom_data.clone());
        Value::Object(envelope)
    }

    /// FCM body: custom keys nested under `data`, omitted when there are none
    pub fn google_envelope(&self) -> Value {
        let mut envelope = json!({ "notification": self.message() });
        if !self.custom_data.is_empty() {
            envelope["data"] = Value::Object(self.custom_data.clone());
        }
        envelope
    }
}

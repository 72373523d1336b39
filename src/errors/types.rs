//! Error types for the azure-push client
//!
//! This module defines every error the client can surface, grouped by the
//! part of the system that produces it: token issuance, notification
//! dispatch, installation management, transport and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the azure-push client
///
/// `NoDeviceFound` is a soft outcome: it means nothing is registered under the
/// requested tags, not that the gateway misbehaved. Use
/// [`PushError::is_no_device_found`] to tell it apart from hard failures.
#[derive(Error, Debug)]
pub enum PushError {
    // Token issuance errors
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: String,
        reason: String,
    },

    #[error("Token issuance failed: {message}")]
    Issuance {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Notification dispatch errors
    #[error("No device found for tag(s): {}", .tags.join(", "))]
    NoDeviceFound {
        tags: Vec<String>,
    },

    #[error("Failed to send {platform} notification with status {status}: {body}")]
    Platform {
        platform: String,
        status: u16,
        body: String,
    },

    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform {
        platform: String,
    },

    // Installation and hub errors
    #[error("Invalid installation: {reason}")]
    InvalidInstallation {
        reason: String,
    },

    #[error("Unauthorized: SAS token is invalid or expired: {body}")]
    Unauthorized {
        body: String,
    },

    #[error("{operation} failed with status {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    // Transport errors
    #[error("HTTP request failed: {method} {url}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
    },

    #[error("TOML parsing error: {context}")]
    TomlParsing {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // I/O and serialization errors
    #[error("File I/O error for '{path}': {operation}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("JSON serialization error: {context}")]
    JsonSerialization {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results using PushError
pub type PushResult<T> = Result<T, PushError>;

impl PushError {
    /// Create a new InvalidParameter error
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Issuance error
    pub fn issuance(message: impl Into<String>) -> Self {
        Self::Issuance {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Issuance error with source
    pub fn issuance_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Issuance {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new Config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Transport error with source
    pub fn transport(
        method: impl Into<String>,
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            method: method.into(),
            url: url.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new InvalidInstallation error
    pub fn invalid_installation(reason: impl Into<String>) -> Self {
        Self::InvalidInstallation {
            reason: reason.into(),
        }
    }

    /// Create a new UnexpectedStatus error
    pub fn unexpected_status(
        operation: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::UnexpectedStatus {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a new I/O error with source
    pub fn io_with_source(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Internal error with source
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for the soft "nothing registered under these tags" outcome
    pub fn is_no_device_found(&self) -> bool {
        matches!(self, Self::NoDeviceFound { .. })
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } | Self::Issuance { .. } => "token",
            Self::NoDeviceFound { .. }
            | Self::Platform { .. }
            | Self::UnsupportedPlatform { .. } => "dispatch",
            Self::InvalidInstallation { .. }
            | Self::Unauthorized { .. }
            | Self::UnexpectedStatus { .. } => "hub",
            Self::Transport { .. } => "network",
            Self::Config { .. }
            | Self::ConfigNotFound { .. }
            | Self::TomlParsing { .. } => "config",
            Self::Io { .. } => "io",
            Self::JsonSerialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonSerialization {
            context: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for PushError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlParsing {
            context: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<url::ParseError> for PushError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source("invalid endpoint url", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_device_found_names_tags() {
        let err = PushError::NoDeviceFound {
            tags: vec!["user:42".to_string(), "group:7".to_string()],
        };
        assert_eq!(err.to_string(), "No device found for tag(s): user:42, group:7");
        assert!(err.is_no_device_found());
        assert_eq!(err.category(), "dispatch");
    }

    #[test]
    fn test_platform_error_is_hard() {
        let err = PushError::Platform {
            platform: "apple".to_string(),
            status: 400,
            body: "bad payload".to_string(),
        };
        assert!(!err.is_no_device_found());
        assert!(err.to_string().contains("apple"));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("bad payload"));
    }

    #[test]
    fn test_error_category() {
        assert_eq!(PushError::config("x").category(), "config");
        assert_eq!(PushError::invalid_parameter("key", "empty").category(), "token");
        assert_eq!(PushError::issuance("boom").category(), "token");
        assert_eq!(PushError::unexpected_status("delete device", 500, "").category(), "hub");
    }
}

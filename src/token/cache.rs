//! Lazily refreshed SAS token cache
//!
//! One [`TokenCache`] holds the token for one credential set. Callers share it
//! behind an `Arc`; the check-and-refresh sequence runs under a mutex and the
//! lock is never held across network I/O.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::issuer;
use crate::config::Configuration;
use crate::errors::{PushError, PushResult};

/// Tokens are re-issued once they are this close to expiring
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Signing material for one hub
#[derive(Clone)]
pub struct Credentials {
    resource_uri: String,
    key_name: String,
    key: Vec<u8>,
    validity: Duration,
}

impl Credentials {
    pub fn new(
        resource_uri: impl Into<String>,
        key_name: impl Into<String>,
        key: impl Into<Vec<u8>>,
        validity: Duration,
    ) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            key_name: key_name.into(),
            key: key.into(),
            validity,
        }
    }

    /// Build credentials from a validated configuration
    pub fn from_config(config: &Configuration) -> Self {
        Self::new(
            config.resource_uri(),
            config.key_name.clone(),
            config.key_value.clone().into_bytes(),
            config.token_validity(),
        )
    }

    pub fn resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("resource_uri", &self.resource_uri)
            .field("key_name", &self.key_name)
            .field("key", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}

#[derive(Debug, Default)]
struct CachedToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn needs_refresh(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        match self.expires_at {
            Some(expires_at) if !self.value.is_empty() => now >= expires_at - margin,
            _ => true,
        }
    }
}

/// Thread-safe holder of the current SAS token
pub struct TokenCache {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    state: Mutex<CachedToken>,
}

impl TokenCache {
    /// Create an empty cache using the system clock
    pub fn new(credentials: Credentials) -> Self {
        Self::with_clock(credentials, Arc::new(SystemClock))
    }

    /// Create an empty cache reading time from `clock`
    pub fn with_clock(credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self {
            credentials,
            clock,
            state: Mutex::new(CachedToken::default()),
        }
    }

    /// Return the cached token, issuing a new one when it is missing or about to expire
    ///
    /// On issuance failure the previously cached token is left untouched.
    pub fn get_token(&self) -> PushResult<String> {
        let margin = chrono::Duration::from_std(REFRESH_MARGIN)
            .map_err(|e| PushError::issuance_with_source("refresh margin out of range", e))?;
        let validity = chrono::Duration::from_std(self.credentials.validity)
            .map_err(|e| PushError::issuance_with_source("token validity out of range", e))?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| PushError::issuance("token cache lock poisoned"))?;

        let now = self.clock.now();
        if state.needs_refresh(now, margin) {
            let value = issuer::issue_at(
                now,
                &self.credentials.resource_uri,
                &self.credentials.key_name,
                &self.credentials.key,
                self.credentials.validity,
            )?;
            let expires_at = now
                .checked_add_signed(validity)
                .ok_or_else(|| PushError::issuance("token expiry out of range"))?;

            debug!(
                "Issued SAS token for {} (expires {})",
                self.credentials.resource_uri, expires_at
            );
            *state = CachedToken {
                value,
                expires_at: Some(expires_at),
            };
        }

        Ok(state.value.clone())
    }

    /// Expiry of the cached token, `None` before the first issuance
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().ok().and_then(|state| state.expires_at)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("credentials", &self.credentials)
            .field("expires_at", &self.expires_at())
            .finish()
    }
}

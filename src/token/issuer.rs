//! SAS token construction
//!
//! The token layout must match what the Service Bus verifier recomputes:
//!
//! ```text
//! SharedAccessSignature sr=<encoded uri>&sig=<encoded signature>&se=<expiry>&skn=<key name>
//! ```
//!
//! where the signature is `base64(HMAC-SHA256(key, encoded_uri + "\n" + expiry))`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

use crate::errors::{PushError, PushResult};

type HmacSha256 = Hmac<Sha256>;

/// Scheme prefix of every token
pub const TOKEN_SCHEME: &str = "SharedAccessSignature";

/// Issue a token valid for `validity` from now
pub fn issue(
    resource_uri: &str,
    key_name: &str,
    key: &[u8],
    validity: Duration,
) -> PushResult<String> {
    issue_at(Utc::now(), resource_uri, key_name, key, validity)
}

/// Issue a token as if the current time were `now`
///
/// Deterministic for a fixed `now`, which is what [`TokenCache`](super::TokenCache)
/// relies on to keep its own expiry bookkeeping in step with `se`.
pub fn issue_at(
    now: DateTime<Utc>,
    resource_uri: &str,
    key_name: &str,
    key: &[u8],
    validity: Duration,
) -> PushResult<String> {
    if resource_uri.is_empty() {
        return Err(PushError::invalid_parameter("resource_uri", "must not be empty"));
    }
    if key_name.is_empty() {
        return Err(PushError::invalid_parameter("key_name", "must not be empty"));
    }
    if key.is_empty() {
        return Err(PushError::invalid_parameter("key", "must not be empty"));
    }

    let encoded_uri = urlencoding::encode(resource_uri);
    let expiry = expiry_at(now, validity)?;
    let signing_string = format!("{}\n{}", encoded_uri, expiry);

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| PushError::issuance(format!("invalid signing key: {}", e)))?;
    mac.update(signing_string.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "{} sr={}&sig={}&se={}&skn={}",
        TOKEN_SCHEME,
        encoded_uri,
        urlencoding::encode(&signature),
        expiry,
        key_name,
    ))
}

/// Unix expiry in whole seconds
fn expiry_at(now: DateTime<Utc>, validity: Duration) -> PushResult<i64> {
    let secs = i64::try_from(validity.as_secs())
        .map_err(|e| PushError::issuance_with_source("token validity out of range", e))?;

    now.timestamp()
        .checked_add(secs)
        .ok_or_else(|| PushError::issuance("token expiry overflows a unix timestamp"))
}

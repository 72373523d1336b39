//! Shared Access Signature tokens
//!
//! [`issuer`] computes signed tokens from credentials, [`cache`] keeps one
//! token per credential set and re-issues it shortly before it expires.

pub mod cache;
pub mod clock;
pub mod issuer;

pub use cache::{Credentials, TokenCache, REFRESH_MARGIN};
pub use clock::{Clock, SystemClock};
pub use issuer::{issue, issue_at};

//! Azure Notification Hubs client
//!
//! Registers device installations, checks and deletes them, and sends
//! cross-platform notifications. Requests are authorized with Shared Access
//! Signature tokens computed locally and cached until shortly before expiry.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod installation;
pub mod notification;
pub mod platform;
pub mod token;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::Client;
pub use config::Configuration;
pub use dispatch::{DispatchMode, NotificationDispatcher};
pub use errors::{PushError, PushResult};
pub use installation::{Installation, InstallationTemplate};
pub use notification::NotificationPayload;
pub use platform::Platform;
pub use token::{Credentials, TokenCache};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

//! Command definitions and structures for the CLI
//!
//! This module contains the clap-based argument definitions: the main CLI
//! structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "azure-push")]
#[command(about = "Azure Notification Hubs client: register devices and send push notifications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ~/.azure-push/config.toml)
    #[arg(short, long, global = true, env = "AZURE_PUSH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print a freshly issued SAS token
    Token,

    /// Check that the hub accepts our credentials
    Validate,

    /// Register (create or replace) a device installation
    Register {
        /// Platform identifier: apns, gcm, fcm, FCMV1, baidu, wns, mpns
        #[arg(short, long)]
        platform: String,

        /// Device token or FCM registration token
        #[arg(long)]
        channel: String,

        /// Installation ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Tag to attach, repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Check whether an installation exists
    Exists {
        /// Installation ID
        id: String,
    },

    /// Delete an installation
    Delete {
        /// Installation ID
        id: String,
    },

    /// Send a notification to every platform
    Send {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        /// Custom data as a JSON object
        #[arg(long)]
        data: Option<String>,

        /// Target tag, repeatable; omitting all tags targets every device
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Show the resolved configuration with secrets masked
    Config,
}

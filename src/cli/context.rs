//! CLI context holding the loaded configuration
//!
//! Centralizes configuration loading so handlers only deal with a ready
//! [`Configuration`].

use anyhow::{Context, Result};
use azure_push::Configuration;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI execution context containing shared configuration
#[derive(Clone)]
pub struct CliContext {
    pub config_path: PathBuf,
    pub verbose: bool,
    pub config: Arc<Configuration>,
}

impl CliContext {
    /// Load and validate the configuration at `config_path`, or the default location
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Configuration::default_path()?,
        };

        let config = Configuration::load(&config_path)
            .with_context(|| {
                format!("Failed to load configuration from {}", config_path.display())
            })?;

        Ok(Self {
            config_path,
            verbose,
            config: Arc::new(config),
        })
    }

    /// Initialize logging based on verbosity and configuration
    pub fn init_logging(&self) -> Result<()> {
        let log_level = if self.verbose {
            "debug"
        } else {
            self.config.log_level.as_str()
        };

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(
                        log_level
                            .parse()
                            .unwrap_or_else(|_| tracing::Level::INFO.into()),
                    ),
            )
            .init();

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Config path: {}", self.config_path.display());
        }

        Ok(())
    }
}

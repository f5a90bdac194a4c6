use anyhow::Result;

use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        tracing::debug!(
            "Configuration loaded with {} warning(s)",
            validation.warnings.len()
        );
        Ok(Self::with_config(config))
    }

    /// Create an application instance around an already-loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }
}

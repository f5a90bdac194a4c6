//! Shared application services.
//!
//! `AppServices` owns the tokio runtime that forecast requests run on and
//! the weather provider they use. The provider sits behind an `RwLock` so
//! it can be replaced after a config change and cleared on shutdown.

use std::sync::Arc;

use anyhow::Context;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use citymap_core::WeatherConfig;
use citymap_weather::WeatherProvider;

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    /// Shutdown signal broadcaster
    shutdown_tx: broadcast::Sender<()>,

    /// Weather provider
    weather_provider: RwLock<Option<Arc<WeatherProvider>>>,
}

impl AppServices {
    /// Create the services with a fresh multi-thread runtime and no
    /// weather provider.
    ///
    /// Must not be called (or dropped) from inside an async context.
    pub fn new() -> anyhow::Result<Arc<Self>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("citymap-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let (shutdown_tx, _) = broadcast::channel(16);

        Ok(Arc::new(Self {
            runtime,
            shutdown_tx,
            weather_provider: RwLock::new(None),
        }))
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Subscribe to shutdown notifications.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal application shutdown and drop the weather provider.
    /// Requests already in flight finish but new ones report
    /// "not initialized".
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");

        let _ = self.shutdown_tx.send(());
        *self.weather_provider.write() = None;

        tracing::info!("AppServices shutdown complete");
    }

    /// Get the weather provider if initialized.
    pub fn weather_provider(&self) -> Option<Arc<WeatherProvider>> {
        self.weather_provider.read().clone()
    }

    /// Set or update the weather provider.
    pub fn set_weather_provider(&self, provider: Option<Arc<WeatherProvider>>) {
        *self.weather_provider.write() = provider;
    }

    /// Create the weather provider from config. Returns false if the HTTP
    /// client could not be built.
    pub fn init_weather_provider(&self, config: &WeatherConfig) -> bool {
        match WeatherProvider::with_base_url(config.api_base_url.as_str()) {
            Ok(provider) => {
                tracing::info!("Weather provider initialized for {}", provider.base_url());
                self.set_weather_provider(Some(Arc::new(provider)));
                true
            }
            Err(e) => {
                tracing::error!("Failed to create weather provider: {}", e);
                false
            }
        }
    }
}

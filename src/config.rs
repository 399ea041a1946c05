//! Runtime settings.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional file (format picked from its extension), then `FLEETWATCH_*`
//! environment variables such as `FLEETWATCH_CACHE_TTL_MS=5000`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::AlertThresholds;
use crate::repository::{RetryPolicy, SubscriptionOptions};

/// Everything the binary can be configured with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the monitoring API.
    pub api_url: String,
    /// Bearer token sent with every request.
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Freshness window of the fleet cache.
    pub cache_ttl_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub debounce_ms: u64,
    /// Background refresh period; 0 disables it.
    pub auto_refresh_secs: u64,
    /// Width of the "upcoming" band as a percentage of each alert window.
    pub proximity_percent: f64,
    /// Re-evaluate alert states locally from hours instead of trusting the API.
    pub rederive_alerts: bool,
    pub debug: bool,
    /// Where logs go while the terminal UI owns the screen.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            api_token: None,
            request_timeout_secs: 10,
            cache_ttl_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 30_000,
            debounce_ms: 100,
            auto_refresh_secs: 300,
            proximity_percent: 10.0,
            rederive_alerts: false,
            debug: false,
            log_file: PathBuf::from("fleetwatch.log"),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("FLEETWATCH").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_ms == 0 {
            bail!("cache_ttl_ms must be greater than zero");
        }
        if !self.proximity_percent.is_finite() || self.proximity_percent < 0.0 {
            bail!(
                "proximity_percent must be a non-negative number, got {}",
                self.proximity_percent
            );
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            bail!(
                "retry_base_delay_ms ({}) exceeds retry_max_delay_ms ({})",
                self.retry_base_delay_ms,
                self.retry_max_delay_ms
            );
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    pub fn subscription_options(&self) -> SubscriptionOptions {
        SubscriptionOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            auto_refresh: (self.auto_refresh_secs > 0)
                .then(|| Duration::from_secs(self.auto_refresh_secs)),
        }
    }

    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds::new(self.proximity_percent)
    }
}

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::Validate;

use crate::services::shipping::ShippingRates;

/// Default values for configuration
const DEFAULT_ENV: &str = "development";
const DEFAULT_EVENT_CAPACITY: usize = 64;
const CONFIG_DIR: &str = "config";

/// Checkout configuration: the shipping fee table and event plumbing.
///
/// Values resolve in order: built-in defaults, then an optional
/// `config/<RUN_ENV>` file, then `CHECKOUT__`-prefixed environment
/// variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CheckoutConfig {
    #[serde(default)]
    #[validate]
    pub shipping: ShippingRates,

    /// Bounded capacity of the event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingRates::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl CheckoutConfig {
    /// Loads configuration from defaults, the optional environment file,
    /// and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
        info!(environment = %run_env, "loading checkout configuration");

        let settings = Config::builder()
            .add_source(File::from(Path::new(CONFIG_DIR).join(&run_env)).required(false))
            .add_source(Environment::with_prefix("CHECKOUT").separator("__"))
            .build()?;

        let config: CheckoutConfig = settings.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }
}

use emporia_order::CheckoutPolicy;
use serde::Deserialize;
use std::env;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub checkout: CheckoutRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// How long an untouched anonymous cart survives.
    #[serde(default = "default_cart_ttl")]
    pub cart_ttl_seconds: u64,
}

fn default_cart_ttl() -> u64 {
    7 * 24 * 60 * 60
}

/// Checkout business rules. The shipping numbers are configuration, not
/// constants baked into the order factory.
#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutRules {
    pub free_shipping_threshold: f64,
    pub standard_shipping_rate: f64,
}

impl CheckoutRules {
    pub fn policy(&self) -> CheckoutPolicy {
        match CheckoutPolicy::from_config(self.free_shipping_threshold, self.standard_shipping_rate)
        {
            Some(policy) => policy,
            None => {
                warn!(
                    threshold = self.free_shipping_threshold,
                    rate = self.standard_shipping_rate,
                    "checkout rules do not convert to decimals, using defaults"
                );
                CheckoutPolicy::default()
            }
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that shouldn't be checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of EMPORIA)
            .add_source(config::Environment::with_prefix("EMPORIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

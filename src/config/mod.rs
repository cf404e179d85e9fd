//! Configuration loading and management

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::rates::RateCache;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Complete configuration for the booking engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base currency for all stored amounts
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Static rate table served when the live feed is unavailable
    #[serde(default)]
    pub fallback_rates: HashMap<String, f64>,

    /// Seconds between rate-feed refreshes
    #[serde(default = "default_rates_refresh_secs")]
    pub rates_refresh_secs: u64,

    /// Live rate feed endpoint (requires the `live-rates` feature)
    #[serde(default)]
    pub rates_url: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_rates_refresh_secs() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            fallback_rates: HashMap::new(),
            rates_refresh_secs: default_rates_refresh_secs(),
            rates_url: None,
            server: ServerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the rate cache seeded with this configuration's fallback table
    pub fn rate_cache(&self) -> RateCache {
        RateCache::new(self.fallback_rates.clone())
            .with_refresh_interval(Duration::from_secs(self.rates_refresh_secs))
    }

    /// Create a default configuration for development and testing
    pub fn default_config() -> Self {
        Self {
            base_currency: "USD".to_string(),
            fallback_rates: HashMap::from([
                ("USD".to_string(), 1.0),
                ("EUR".to_string(), 0.92),
                ("GBP".to_string(), 0.79),
            ]),
            rates_refresh_secs: 3600,
            rates_url: None,
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default_config();

        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.fallback_rates.len(), 3);
        assert_eq!(config.rates_refresh_secs, 3600);
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let config = EngineConfig::from_yaml_str("base_currency: EUR\n").unwrap();

        assert_eq!(config.base_currency, "EUR");
        assert!(config.fallback_rates.is_empty());
        assert_eq!(config.rates_refresh_secs, 3600);
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_yaml_serialization_round_trip() {
        let config = EngineConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.base_currency, config.base_currency);
        assert_eq!(parsed.fallback_rates.len(), config.fallback_rates.len());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_currency: USD\nfallback_rates:\n  EUR: 0.9\nserver:\n  bind_addr: 127.0.0.1:8080\n"
        )
        .unwrap();

        let config = EngineConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.fallback_rates.get("EUR"), Some(&0.9));
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    }
}

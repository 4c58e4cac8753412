//! Thread-safe configuration loaded from an optional YAML file with
//! `APP__`-prefixed environment variable overrides.
//!
//! Keys use dotted paths (`server.address`); the matching environment
//! variable is `APP__SERVER__ADDRESS`. Environment values always win over
//! the file, so deployments can be configured without shipping a file at
//! all.

use std::path::Path;
use std::sync::RwLock;

use config::{Config as RawConfig, Environment, File};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration")]
    Load(#[from] config::ConfigError),

    #[error("Configuration lock was poisoned, indicating a panic in another thread")]
    LockPoisoned,
}

#[derive(Debug)]
pub struct Config {
    inner: RwLock<RawConfig>,
}

impl Config {
    /// Loads configuration from `path` (optional) overlaid with the
    /// process environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let raw = RawConfig::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(Config { inner: RwLock::new(raw) })
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::LockPoisoned)?;
        guard.get(key).map_err(ConfigError::from)
    }

    /// Convenience for optional keys with a sensible fallback.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn builder_test() -> test_utils::TestConfigBuilder {
        test_utils::TestConfigBuilder::new()
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).unwrap();
            }

            let raw = builder.build().expect("Failed to create config from test values");

            Config { inner: RwLock::new(raw) }
        }
    }
}

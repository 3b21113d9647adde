//! Configuration module for cardiorisk.
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honoured by the binaries), organized by concern: Model and Server.

mod model_config;
mod server_config;

pub use model_config::{ClassifierAlgorithm, ModelEnvConfig};
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Key -> value source; `std::env` in production, a map in tests
pub type Lookup = dyn Fn(&str) -> Option<String>;

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let model = ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?;
        let server =
            ServerEnvConfig::from_lookup(lookup).context("Failed to load server config")?;
        Ok(Self { model, server })
    }
}

pub(crate) fn parse_var<T>(lookup: &Lookup, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

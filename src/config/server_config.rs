//! HTTP server and session configuration parsed from environment variables.

use super::{parse_var, Lookup};
use anyhow::Result;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    pub session_ttl_secs: i64,
    pub session_sweep_interval_secs: u64,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            session_ttl_secs: 3600,
            session_sweep_interval_secs: 300,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var(lookup, "PORT", defaults.port)?,
            session_ttl_secs: parse_var(lookup, "SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            session_sweep_interval_secs: parse_var(
                lookup,
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session_sweep_interval_secs,
            )?,
        })
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

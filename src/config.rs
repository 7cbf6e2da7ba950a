//! HTTP server configuration parsed from environment variables.

use crate::llm::config::parse_or;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Request body limit; bounds the in-memory image for `/analyze`.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.into(), port: DEFAULT_PORT, max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES }
    }
}

impl ServerConfig {
    /// Optional:
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `PORT`: default 5000
    /// - `MAX_UPLOAD_BYTES`: default 10 MiB
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            max_upload_bytes: parse_or(lookup("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::net::TcpListener;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener, TLS and request limits.
    pub server: ServerConfig,

    /// Wrapper pool sizing.
    pub pool: PoolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080"). Ignored when `listener` is set.
    pub address: String,

    /// Path to the certificate file (PEM).
    pub tls_certfile: String,

    /// Path to the private key file (PEM).
    pub tls_keyfile: String,

    /// Largest request body read before dispatch.
    pub max_body_bytes: usize,

    /// Pre-bound listener to serve on instead of binding `address`.
    #[serde(skip)]
    pub listener: Option<Arc<TcpListener>>,
}

impl ServerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Serve on an already bound listener.
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn with_tls(mut self, certfile: impl Into<String>, keyfile: impl Into<String>) -> Self {
        self.tls_certfile = certfile.into();
        self.tls_keyfile = keyfile.into();
        self
    }

    /// TLS is used only when both the certificate and the key are given.
    pub fn tls_enabled(&self) -> bool {
        !self.tls_certfile.is_empty() && !self.tls_keyfile.is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            tls_certfile: String::new(),
            tls_keyfile: String::new(),
            max_body_bytes: 4 * 1024 * 1024,
            listener: None,
        }
    }
}

/// Wrapper pool configuration, applied to each of the five pools.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Instances built per pool at startup.
    pub prewarm: usize,

    /// Idle instances kept per pool; extra ones are dropped on release.
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            prewarm: 0,
            max_idle: 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "route_dispatch=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls_requires_both_paths() {
        let config = ServerConfig::new("127.0.0.1:0");
        assert!(!config.tls_enabled());
        assert!(!config.clone().with_tls("cert.pem", "").tls_enabled());
        assert!(!config.clone().with_tls("", "key.pem").tls_enabled());
        assert!(config.with_tls("cert.pem", "key.pem").tls_enabled());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            address = "127.0.0.1:3000"

            [pool]
            prewarm = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address, "127.0.0.1:3000");
        assert_eq!(config.server.max_body_bytes, 4 * 1024 * 1024);
        assert!(config.server.listener.is_none());
        assert_eq!(config.pool.prewarm, 4);
        assert_eq!(config.pool.max_idle, 1024);
        assert!(!config.observability.metrics_enabled);
    }
}

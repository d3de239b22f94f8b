//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body limit, pool sizes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - A half-configured TLS pair is legal (plaintext) and only logged

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server.address must not be empty")]
    EmptyAddress,

    #[error("server.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("pool.prewarm ({prewarm}) exceeds pool.max_idle ({max_idle})")]
    PrewarmExceedsIdle { prewarm: usize, max_idle: usize },

    #[error("observability.metrics_address is not a socket address: {0}")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.listener.is_none() && config.server.address.trim().is_empty() {
        errors.push(ValidationError::EmptyAddress);
    }

    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.pool.prewarm > config.pool.max_idle {
        errors.push(ValidationError::PrewarmExceedsIdle {
            prewarm: config.pool.prewarm,
            max_idle: config.pool.max_idle,
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let server = &config.server;
    if !server.tls_enabled() && (!server.tls_certfile.is_empty() || !server.tls_keyfile.is_empty()) {
        tracing::warn!(
            certfile = %server.tls_certfile,
            keyfile = %server.tls_keyfile,
            "Only one of the TLS files is configured; serving plaintext"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

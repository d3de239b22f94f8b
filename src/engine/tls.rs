//! TLS material for the server.
//!
//! TLS is all-or-nothing: it is enabled only when both a certificate and a
//! key path are configured. With either one missing the server runs in
//! plaintext.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::ServerConfig;

/// Load the rustls configuration for `config`, or `None` for plaintext.
///
/// Both files must exist when TLS is enabled.
pub async fn rustls_config(config: &ServerConfig) -> io::Result<Option<RustlsConfig>> {
    if !config.tls_enabled() {
        return Ok(None);
    }

    let cert = Path::new(&config.tls_certfile);
    let key = Path::new(&config.tls_keyfile);
    for (role, path) in [("certificate", cert), ("private key", key)] {
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("TLS {role} not found: {}", path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert, key).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_half_configured_is_plaintext() {
        let cert_only = ServerConfig {
            tls_certfile: "/missing/cert.pem".into(),
            ..ServerConfig::default()
        };
        assert!(rustls_config(&cert_only).await.unwrap().is_none());
        assert!(rustls_config(&ServerConfig::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_certificate() {
        let config = ServerConfig::default().with_tls("/missing/cert.pem", "/missing/key.pem");
        let err = rustls_config(&config).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("certificate"));
    }

    #[tokio::test]
    async fn test_missing_key_reported() {
        let cert = std::env::temp_dir().join(format!("route-dispatch-cert-{}.pem", std::process::id()));
        std::fs::write(&cert, b"not a real certificate").unwrap();

        let config = ServerConfig::default().with_tls(cert.display().to_string(), "/missing/key.pem");
        let err = rustls_config(&config).await.unwrap_err();
        std::fs::remove_file(&cert).unwrap();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("private key"));
    }
}

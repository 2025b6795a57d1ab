//! Server module for running Terraform providers
//!
//! Speaks the go-plugin handshake: Terraform starts the binary with a magic
//! cookie in the environment and reads the listen address from the first
//! line on stdout.

use crate::error::{Result, TfplugError};
use crate::grpc::ProviderService;
use crate::proto::{GrpcControllerServer, ProviderServer};
use crate::provider::Provider;
use std::path::PathBuf;
use tonic::transport::{Identity, Server, ServerTlsConfig};

const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";
const PROTOCOL_VERSION: u32 = 6;

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PEM certificate and key. Plaintext gRPC when unset.
    pub tls: Option<(PathBuf, PathBuf)>,
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Skip the magic cookie check, for running under a debugger
    pub skip_cookie_check: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tls: None,
            max_message_size: 256 << 20, // 256MB
            skip_cookie_check: false,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve over TLS with the given certificate and key
    pub fn with_tls(mut self, cert_path: PathBuf, key_path: PathBuf) -> Self {
        self.tls = Some((cert_path, key_path));
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn without_cookie_check(mut self) -> Self {
        self.skip_cookie_check = true;
        self
    }
}

/// Line Terraform parses to find the plugin: `1|6|tcp|127.0.0.1:1234|grpc`
pub fn handshake_line(addr: std::net::SocketAddr) -> String {
    format!("1|{}|tcp|{}|grpc", PROTOCOL_VERSION, addr)
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if !config.skip_cookie_check
        && std::env::var(MAGIC_COOKIE_KEY).ok().as_deref() != Some(MAGIC_COOKIE_VALUE)
    {
        return Err(TfplugError::NotLaunchedByTerraform);
    }

    let service = ProviderService::new(provider);
    let shutdown = service.shutdown_signal();
    let controller = GrpcControllerServer::new(service.controller());
    let provider_service = ProviderServer::new(service)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let mut builder = Server::builder();
    if let Some((cert_path, key_path)) = &config.tls {
        // Several crypto providers can be compiled in; pick one explicitly
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let cert = tokio::fs::read(cert_path)
            .await
            .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;
        let key = tokio::fs::read(key_path)
            .await
            .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;

        let tls_config = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));
        builder = builder.tls_config(tls_config)?;
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, tls = config.tls.is_some(), "starting provider server");
    println!("{}", handshake_line(addr));

    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);
    builder
        .add_service(controller)
        .add_service(provider_service)
        .serve_with_incoming_shutdown(incoming, async move { shutdown.notified().await })
        .await?;

    tracing::info!("provider server stopped");
    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_line_uses_protocol_six() {
        let addr: std::net::SocketAddr = "127.0.0.1:41234".parse().unwrap();
        assert_eq!(handshake_line(addr), "1|6|tcp|127.0.0.1:41234|grpc");
    }

    #[test]
    fn default_config_is_plaintext() {
        let config = ServerConfig::default();
        assert!(config.tls.is_none());
        assert_eq!(config.max_message_size, 256 << 20);
    }

    #[test]
    fn builder_sets_tls_paths() {
        let config = ServerConfig::new().with_tls("cert.pem".into(), "key.pem".into());
        let (cert, key) = config.tls.unwrap();
        assert_eq!(cert, PathBuf::from("cert.pem"));
        assert_eq!(key, PathBuf::from("key.pem"));
    }
}

use std::env;
use std::str::FromStr;
use tfplug::ServerConfig;
use zeet::ZeetProvider;

/// Terraform sets TF_LOG_PROVIDER (or TF_LOG) to one of TRACE, DEBUG, INFO,
/// WARN or ERROR. Anything else falls back to INFO.
fn log_level() -> tracing::Level {
    env::var("TF_LOG_PROVIDER")
        .or_else(|_| env::var("TF_LOG"))
        .ok()
        .and_then(|level| tracing::Level::from_str(&level).ok())
        .unwrap_or(tracing::Level::INFO)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the plugin handshake, logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(log_level())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut config = ServerConfig::default();
    if let (Ok(cert), Ok(key)) = (
        env::var("TF_PLUGIN_CERT_PATH"),
        env::var("TF_PLUGIN_KEY_PATH"),
    ) {
        config = config.with_tls(cert.into(), key.into());
    }

    tfplug::serve(ZeetProvider::new(), config).await?;

    Ok(())
}

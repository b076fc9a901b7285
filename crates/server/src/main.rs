//! osbridge broker binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use osbridge_core::config::{AppConfig, AuthConfig, ExecutorConfig};
use osbridge_server::{AppState, Authenticator, Broker, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// osbridge - Open Service Broker for PostgreSQL clusters
#[derive(Parser, Debug)]
#[command(name = "osbridged")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "OSBRIDGE_CONFIG",
        default_value = "config/broker.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("osbridge v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    osbridge_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let executor = osbridge_executor::from_config(&config.executor)
        .await
        .context("failed to initialize executor")?;
    tracing::info!(executor = executor.kind(), "Executor initialized");

    let service_id = resolve_service_id(config.broker.service_id.as_deref());
    let broker = Broker::new(executor, &service_id, config.broker.async_enabled)
        .with_debug_credentials(config.server.debug_credentials);
    if config.server.debug_credentials {
        tracing::warn!("Credential logging enabled, do not use in production");
    }

    let kube = match config.auth {
        AuthConfig::TokenReview => {
            let kubeconfig = match &config.executor {
                ExecutorConfig::Remote { kubeconfig, .. } => kubeconfig.as_deref(),
                ExecutorConfig::Mock => None,
            };
            Some(
                osbridge_executor::kube_client(kubeconfig)
                    .await
                    .context("failed to create kube client for TokenReview")?,
            )
        }
        _ => None,
    };
    let auth = Authenticator::from_config(&config.auth, kube)
        .context("failed to initialize authentication")?;

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, broker, auth);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Load configuration from the optional file and `OSBRIDGE_` env vars.
fn load_config(path: &str) -> Result<AppConfig> {
    let config_path = std::path::Path::new(path);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    // OSBRIDGE_CONFIG is just the path
    let has_env_config = std::env::vars()
        .any(|(key, _)| key.starts_with("OSBRIDGE_") && key != "OSBRIDGE_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: osbridged --config /path/to/broker.toml\n  \
             2. Environment variables: OSBRIDGE_SERVER__BIND=0.0.0.0:8443 \
             OSBRIDGE_EXECUTOR__TYPE=mock osbridged\n\n\
             See config/broker.example.toml for example configuration.\n\
             Set OSBRIDGE_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    figment
        .merge(Env::prefixed("OSBRIDGE_").split("__"))
        .extract()
        .context("failed to load configuration")
}

/// Configured service ID, or a fresh one for this process.
fn resolve_service_id(configured: Option<&str>) -> String {
    match configured {
        Some(id) => id.to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            tracing::warn!(
                service_id = %id,
                "No broker.service_id configured, generated one; it changes on restart"
            );
            id
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

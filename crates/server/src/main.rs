use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediaconv_core::{check_engines, load_config, load_config_from_env, validate_config, Config};
use mediaconv_server::api::create_router;
use mediaconv_server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when `MEDIACONV_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mediaconv v{}", VERSION);

    let config = read_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    let state = AppState::from_config(config).context("Failed to build conversion service")?;
    let config = state.config();

    state
        .service()
        .store()
        .ensure_layout()
        .await
        .with_context(|| format!("Failed to prepare storage at {:?}", config.storage.root))?;
    info!(root = %config.storage.root.display(), "Storage ready");

    // Missing engines only disable the conversions that need them
    for missing in check_engines(&config.engines).await {
        warn!("{}", missing);
    }

    info!(
        max_parallel_conversions = config.dispatcher.max_parallel_conversions,
        conversion_timeout_secs = ?config.dispatcher.conversion_timeout_secs,
        "Dispatcher configured"
    );

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let app = create_router(Arc::new(state));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Loads the file named by `MEDIACONV_CONFIG`, else `config.toml` if present,
/// else defaults plus environment overrides.
fn read_config() -> Result<Config> {
    if let Ok(path) = std::env::var("MEDIACONV_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No config file found, using defaults and environment");
        load_config_from_env().context("Failed to load config from environment")
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

//! skylog-web - personal weather lookup service
//!
//! Serves the search, result, history and export pages over HTTP and keeps
//! every lookup in a local SQLite database.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skylog_common::config::{self, TomlConfig, ROOT_FOLDER_ENV};
use skylog_common::db::init_database;
use skylog_web::services::{Geocoder, WeatherClient};
use skylog_web::{build_router, AppState, Limits};

/// Command-line arguments for skylog-web
#[derive(Parser, Debug)]
#[command(name = "skylog-web")]
#[command(about = "Personal weather lookup with saved history")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "SKYLOG_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "SKYLOG_HOST")]
    host: Option<String>,

    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "SKYLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config);

    info!(
        "Starting skylog-web v{} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    if let Some(path) = args.config.clone().or_else(config::default_config_path) {
        info!("Configuration: {}", path.display());
    }

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    info!("Root folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let db = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let geocoder = Geocoder::new(&config.geocoding).context("Failed to build geocoding client")?;
    let weather = WeatherClient::new(&config.weather).context("Failed to build weather client")?;

    let state = AppState::new(db.clone(), geocoder, weather, Limits::from_config(&config));
    let app = build_router(state);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr: SocketAddr = listener.local_addr().context("Listener has no local address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level for this service's crates
fn init_tracing(config: &TomlConfig) {
    let level = &config.logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "skylog_web={level},skylog_common={level},tower_http=info"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

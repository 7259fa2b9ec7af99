//! Querypad application binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Load configuration from TOML (with CLI/env overrides)
//! 2. Open the on-device store and build the fallback adapter
//! 3. Select the storage adapter (remote if configured, local otherwise)
//! 4. Provision the bootstrap admin token
//! 5. Start the axum REST API server

use std::path::PathBuf;

use clap::Parser;

use querypad_api::{auth, create_router, AppState};
use querypad_core::{AuthUser, QuerypadConfig};
use querypad_storage::{BackendKind, KvStore, LocalAdapter, StorageManager};

mod cli;
use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first, since the log level may come from it.
    let config_file = args.resolve_config_path();
    let mut config = QuerypadConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }

    // Tracing.
    let log_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Querypad v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // On-device store; always constructed, since it is the selection
    // fallback even when a remote backend is configured.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let store_path = data_dir.join("querypad.db");
    let kv = KvStore::open(&store_path)?;
    tracing::info!(path = %store_path.display(), "On-device store opened");

    // Adapter selection: remote wins when configured and constructible.
    let manager = StorageManager::select(Some(&config.remote), LocalAdapter::new(kv));
    match manager.backend() {
        BackendKind::Remote => tracing::info!(url = %config.remote.url, "Serving over the remote backend"),
        BackendKind::Local => tracing::info!("Serving over the on-device store"),
    }

    // Bootstrap admin token. Further tokens are provisioned by the external
    // auth provider.
    let state = AppState::new(manager);
    let token = auth::load_or_generate_token(&data_dir.join("api_token"));
    state.register_token(
        token,
        AuthUser {
            id: "admin".to_string(),
            email: "admin@localhost".to_string(),
            name: Some("Administrator".to_string()),
            is_admin: true,
        },
    );

    // === API server ===

    let port = args.resolve_port(config.general.port);
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind — is another instance running?");
            tracing::error!("Try: QUERYPAD_PORT={} cargo run -p querypad-app", port + 1);
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}

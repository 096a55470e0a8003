//! Tea Timer - A persistent tea-brewing timer daemon
//!
//! This is the main entry point for the tea-timer application.

use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::{info, warn};

use tea_timer::{
    api::create_router,
    config::Config,
    services::{chime::write_chime, check_command_available, SystemEffects},
    state::AppState,
    store::FileStore,
    tasks::{restore_timer, spawn_click_listener},
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tea_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tea-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}",
        config.host,
        config.port,
        config.data_dir.display()
    );

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    let chime_path = write_chime(store.dir()).context("Failed to write chime audio")?;
    let player = if config.no_sound { None } else { config.player_command() };
    if let Some((program, _)) = &player {
        if let Err(e) = check_command_available(program, "--version").await {
            warn!("{}; the alarm will be silent", e);
        }
    }
    let (clicks_tx, clicks_rx) = mpsc::unbounded_channel();
    let effects = SystemEffects::new(player, chime_path, !config.no_notify, clicks_tx);

    // Create application state and pick up where the last run left off
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(effects),
        Arc::new(SystemClock),
    ));
    restore_timer(&state).await;
    spawn_click_listener(Arc::clone(&state), clicks_rx);

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start, /pause, /resume, /reset, /add-time, /dismiss");
    info!("  GET  /state, /options, /badge, /events");
    info!("  POST /options/changed");
    info!("  GET  /popup, POST /popup/start, /popup/quick-add");
    info!("  GET/PUT /settings, GET /settings/defaults");
    info!("  GET  /health");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

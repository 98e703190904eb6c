//! Image Server - on-demand image resizing with a disk cache
//!
//! Serves resized images for request paths of the form
//! `/<bucket>/<size>/<quality>?/<path>.<ext>`.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imageserver::api::{create_router, AppState};
use imageserver::{spawn_cleanup_task, Config};

/// Main entry point for the image server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load server configuration from environment variables
/// 3. Load the resize policy file
/// 4. Build the pipeline with the `image`-backed engine
/// 5. Start background temp file cleanup task
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imageserver=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Image Server");

    let config = Config::from_env();
    let policy = config
        .load_policy()
        .with_context(|| format!("loading policy from {}", config.policy_file.display()))?;
    info!(
        "Policy loaded: images={}, cache={}, sizes={}, qualities={}, default_quality={}, serve_cached={}",
        policy.source_root.display(),
        policy.cache_root.display(),
        policy.allowed_sizes.len(),
        policy.allowed_qualities.len(),
        policy.default_quality,
        policy.serve_cached
    );

    let cache_root = policy.cache_root.clone();
    let state = AppState::from_policy(policy);
    info!("Pipeline initialized");

    // Start background cleanup task
    let cleanup_handle = spawn_cleanup_task(
        cache_root,
        config.cleanup_interval,
        config.temp_file_max_age,
    );
    info!("Background cleanup task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the cleanup task
    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}

// ============================================================================
// API Gateway Service
// ============================================================================
//
// Single entry point for all client requests to the Yogabrata platform.
// It handles:
// - Request routing to the four backend services
// - Advisory JWT identity decoration
// - Rate limiting (IP-based)
// - CORS for browser clients
//
// Stateless apart from in-process rate-limit counters, so it can scale
// horizontally behind a load balancer.
//
// ============================================================================

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yogabrata_gateway::config::Config;
use yogabrata_gateway::context::GatewayContext;
use yogabrata_gateway::routes::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== API Gateway Starting ===");
    info!("Port: {}", config.port);
    info!(
        "Rate limit: {} requests per {}s window",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );

    let ctx = GatewayContext::new(config)?;

    for entry in ctx.registry.entries() {
        info!(
            service = entry.upstream.name(),
            prefix = entry.upstream.prefix(),
            url = %entry.base_url,
            "Registered upstream"
        );
    }

    let app = create_router(ctx.clone());

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", ctx.config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Failed to start server")?;

    Ok(())
}

/// Resolves when the process receives SIGTERM or Ctrl-C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received. Shutting down...");
}

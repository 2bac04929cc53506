// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Router assembly and the CORS layer
// - health.rs: Health check and service listing endpoints
// - proxy.rs: Catch-all forwarding for /api/v1/*
// - fallback.rs: Not-found contracts
// - middleware.rs: Request logging, rate limiting, identity decoration
//
// ============================================================================

mod fallback;
mod health;
mod middleware;
mod proxy;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{any, get},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::GatewayContext;

/// Create the main gateway router with all routes
pub fn create_router(ctx: Arc<GatewayContext>) -> Router {
    Router::new()
        // Gateway-owned endpoints. A request with the wrong method falls
        // through to the not-found contracts instead of a bare 405
        .route(
            "/health",
            get(health::health_check).fallback(fallback::handle_unmatched),
        )
        .route(
            "/api/services",
            get(health::list_services).fallback(fallback::handle_unmatched),
        )
        // Everything under /api/v1 is owned by an upstream, resolved by
        // longest registered prefix
        .route("/api/v1/*path", any(proxy::proxy_request))
        // Unclaimed paths, including other /api/ requests
        .fallback(fallback::handle_unmatched)
        // Apply middleware (order matters - first added runs first)
        .layer(
            ServiceBuilder::new()
                // Tracing layer (outermost - runs first)
                .layer(TraceLayer::new_for_http())
                // Browser origin policy, applied before any rejection so
                // error responses carry CORS headers too
                .layer(cors_layer(&ctx.config.allowed_origins))
                // Request logging
                .layer(axum::middleware::from_fn(middleware::request_logging))
                // Per-IP throttling
                .layer(axum::middleware::from_fn_with_state(
                    ctx.clone(),
                    middleware::rate_limiting,
                ))
                // Advisory identity decoration
                .layer(axum::middleware::from_fn_with_state(
                    ctx.clone(),
                    middleware::identity_decoration,
                ))
                .into_inner(),
        )
        .with_state(ctx)
}

/// CORS layer allowing the configured browser origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            // tower-http aborts on a wildcard in an origin list, so it can
            // never reach the layer (Config::from_env rejects it up front)
            if origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin, origins must be explicit");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

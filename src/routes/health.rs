// ============================================================================
// Health and Service Listing Routes
// ============================================================================
//
// Endpoints:
// - GET /health - Gateway liveness and uptime
// - GET /api/services - Registered upstream services
//
// ============================================================================

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

use crate::context::GatewayContext;

/// GET /health
/// Reports the gateway's own state. Upstreams are never probed here.
pub async fn health_check(State(ctx): State<Arc<GatewayContext>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": ctx.started_at.elapsed().as_secs_f64(),
    }))
}

/// GET /api/services
/// Lists the registered upstreams in registration order. The reported status
/// reflects configuration, not a live probe.
pub async fn list_services(State(ctx): State<Arc<GatewayContext>>) -> impl IntoResponse {
    let services: Vec<_> = ctx
        .registry
        .entries()
        .iter()
        .map(|entry| {
            json!({
                "name": entry.upstream.name(),
                "url": entry.base_url,
                "status": "healthy",
            })
        })
        .collect();

    Json(json!({ "services": services }))
}

// ============================================================================
// Proxy Route
// ============================================================================
//
// Catch-all handler for /api/v1/*. Resolves the owning upstream by longest
// registered prefix, forwards the request unchanged apart from the prefix
// rewrite, and relays whatever comes back.
//
// ============================================================================

use axum::{
    extract::{Request, State},
    response::Response,
};
use std::sync::Arc;

use crate::context::GatewayContext;
use crate::error::{GatewayError, GatewayResult};
use crate::identity::IdentityClaim;

/// ANY /api/v1/*
pub async fn proxy_request(
    State(ctx): State<Arc<GatewayContext>>,
    request: Request,
) -> GatewayResult<Response> {
    let path = request.uri().path().to_string();

    let Some(entry) = ctx.registry.resolve(&path) else {
        return Err(GatewayError::ApiRouteMiss { path });
    };

    let subject = request
        .extensions()
        .get::<IdentityClaim>()
        .map(|claim| claim.sub.clone());

    let outcome = ctx.upstream.forward(entry, request).await?;

    tracing::debug!(
        service = entry.upstream.name(),
        status = %outcome.status,
        upstream_latency_ms = outcome.upstream_latency.as_millis(),
        subject = ?subject,
        "Relaying upstream response"
    );

    outcome.into_relay_response()
}

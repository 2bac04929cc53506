// ============================================================================
// Axum Middleware
// ============================================================================
//
// Middleware for request processing:
// - request_logging: Log all incoming requests and their outcomes
// - rate_limiting: Per-IP fixed-window throttling, applied to every route
// - identity_decoration: Advisory bearer-token verification (never rejects)
//
// ============================================================================

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{AUTHORIZATION, USER_AGENT},
    },
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::rate_limit::RateLimitDecision;
use crate::utils::extract_client_ip;

// Header names for identity propagation (Trust Boundary pattern)
const HEADER_USER_ID: &str = "x-user-id";
const HEADER_REQUEST_ID: &str = "x-request-id";

/// Request logging middleware
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = client_ip_of(&req);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        method = %method,
        path = %path,
        ip = %client_ip,
        user_agent = %user_agent,
        "Incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Rate limiting middleware
///
/// One fixed-window budget per caller IP, shared across every route the
/// gateway serves.
pub async fn rate_limiting(
    State(ctx): State<Arc<GatewayContext>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let client_ip = client_ip_of(&request);

    if let RateLimitDecision::Limited = ctx.limiter.check(&client_ip) {
        return Err(GatewayError::RateLimited { ip: client_ip });
    }

    Ok(next.run(request).await)
}

/// Identity decoration middleware
///
/// Verifies the bearer token when one is present and adds trusted headers
/// for downstream services:
/// - X-User-Id: subject from the verified claim
/// - X-Request-Id: unique request trace ID
///
/// A missing or invalid token never rejects the request; it merely leaves
/// the request anonymous. The inbound `x-user-id` is always stripped so
/// upstreams only ever see values this gateway verified.
pub async fn identity_decoration(
    State(ctx): State<Arc<GatewayContext>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.headers_mut().remove(HEADER_USER_ID);

    let request_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(HeaderName::from_static(HEADER_REQUEST_ID), value);
    }

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if let Some(claim) = ctx.identity.decode(auth_header.as_deref()) {
        if let Ok(value) = HeaderValue::from_str(&claim.sub) {
            request
                .headers_mut()
                .insert(HeaderName::from_static(HEADER_USER_ID), value);
        }

        tracing::debug!(
            subject = %claim.sub,
            request_id = %request_id,
            "Bearer token verified, identity headers added"
        );

        request.extensions_mut().insert(claim);
    }

    next.run(request).await
}

/// Best client address available: forwarding headers first, then the socket.
fn client_ip_of(request: &Request) -> String {
    let direct_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    extract_client_ip(request.headers(), direct_ip)
}

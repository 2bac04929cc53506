// ============================================================================
// Fallback Route
// ============================================================================
//
// Handles every path no explicit route claimed. Misses under /api/ get the
// API-specific contract with the list of registered services; everything
// else gets the plain not-found body.
//
// ============================================================================

use axum::http::Uri;

use crate::error::GatewayError;

pub async fn handle_unmatched(uri: Uri) -> GatewayError {
    let path = uri.path().to_string();

    if path.starts_with("/api/") {
        GatewayError::ApiRouteMiss { path }
    } else {
        GatewayError::RouteMiss { path }
    }
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use crate::registry::Upstream;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error taxonomy.
///
/// Every failure branch in the request pipeline terminates here:
/// `IntoResponse` is the single place that logs errors and renders their
/// JSON bodies, so no path can leak upstream or internal detail to a caller.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network-level failure reaching an upstream (refused, timeout, DNS).
    #[error("{} is unreachable: {source}", .upstream.display_name())]
    UpstreamUnavailable {
        upstream: Upstream,
        #[source]
        source: reqwest::Error,
    },

    /// No registered upstream owns this path under /api/.
    #[error("no API route matches {path}")]
    ApiRouteMiss { path: String },

    /// No route matches at all.
    #[error("no route matches {path}")]
    RouteMiss { path: String },

    /// Caller exhausted its per-IP budget.
    #[error("rate limit exceeded for {ip}")]
    RateLimited { ip: String },

    /// Anything unexpected. Details are logged, never sent to the caller.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::ApiRouteMiss { .. } | GatewayError::RouteMiss { .. } => {
                StatusCode::NOT_FOUND
            }
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnavailable { upstream, .. } => upstream.error_code(),
            GatewayError::ApiRouteMiss { .. } => "API_ENDPOINT_NOT_FOUND",
            GatewayError::RouteMiss { .. } => "NOT_FOUND",
            GatewayError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// User-facing message. Never includes upstream or internal error detail.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::UpstreamUnavailable { upstream, .. } => {
                format!("{} is currently unavailable", upstream.display_name())
            }
            GatewayError::ApiRouteMiss { path } => format!("API endpoint {path} not found"),
            GatewayError::RouteMiss { path } => format!("Route {path} not found"),
            GatewayError::RateLimited { .. } => {
                "Too many requests from this IP, please try again later.".to_string()
            }
            GatewayError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// Logs this error with the appropriate level and context.
    pub fn log(&self) {
        match self {
            GatewayError::UpstreamUnavailable { upstream, source } => {
                tracing::error!(
                    service = upstream.name(),
                    error = %source,
                    "Upstream request failed"
                );
            }
            GatewayError::Internal(e) => {
                tracing::error!(error = ?e, "Internal gateway error");
            }
            GatewayError::RateLimited { ip } => {
                tracing::warn!(ip = %ip, "Rate limit exceeded");
            }
            GatewayError::ApiRouteMiss { path } | GatewayError::RouteMiss { path } => {
                tracing::debug!(path = %path, "No route matched");
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let mut body = json!({
            "error": self.error_code(),
            "message": self.user_message(),
        });

        if matches!(self, GatewayError::ApiRouteMiss { .. }) {
            body["availableServices"] = json!(Upstream::ALL.map(Upstream::name));
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_miss_contract() {
        let err = GatewayError::ApiRouteMiss {
            path: "/api/unknown".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "API_ENDPOINT_NOT_FOUND");
        assert_eq!(err.user_message(), "API endpoint /api/unknown not found");
    }

    #[test]
    fn test_generic_miss_contract() {
        let err = GatewayError::RouteMiss {
            path: "/nope".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.user_message(), "Route /nope not found");
    }

    #[test]
    fn test_rate_limited_contract() {
        let err = GatewayError::RateLimited {
            ip: "1.2.3.4".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.error_code(), "RATE_LIMIT_EXCEEDED");
        assert_eq!(
            err.user_message(),
            "Too many requests from this IP, please try again later."
        );
    }

    #[test]
    fn test_internal_never_leaks_detail() {
        let err = GatewayError::Internal(anyhow::anyhow!("db password is hunter2"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.user_message(), "An unexpected error occurred");
        assert!(!err.user_message().contains("hunter2"));
    }
}

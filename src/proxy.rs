// ============================================================================
// Upstream Client
// ============================================================================
//
// HTTP client for forwarding requests to backend services.
// Handles:
// - Request forwarding (method, headers, query, body preserved byte-for-byte)
// - Response relaying
// - Upstream failure mapping
//
// ============================================================================

use std::time::{Duration, Instant};

use anyhow::Context;
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;

use crate::error::{GatewayError, GatewayResult};
use crate::registry::ServiceRegistryEntry;

/// HTTP client for forwarding requests to backend services.
pub struct UpstreamClient {
    client: reqwest::Client,
}

/// What came back from an upstream, before it is relayed to the caller.
pub struct ProxyOutcome {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub upstream_latency: Duration,
}

impl UpstreamClient {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        // Configure connection pooling and keep-alive. Redirects are relayed
        // to the caller like any other upstream response, never followed.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create upstream HTTP client")?;

        Ok(Self { client })
    }

    /// Forward a request to the upstream owned by `entry`.
    ///
    /// The registered prefix is rewritten to `/api/v1` before the request
    /// leaves the gateway; everything else about the request is preserved.
    /// Any network-level failure (connection refused, timeout, DNS) maps to
    /// `GatewayError::UpstreamUnavailable` for that upstream.
    pub async fn forward(
        &self,
        entry: &ServiceRegistryEntry,
        request: Request,
    ) -> GatewayResult<ProxyOutcome> {
        // Build target URL with the rewritten path
        let path = entry.rewrite_path(request.uri().path());
        let target_url = if let Some(query) = request.uri().query() {
            format!("{}{}?{}", entry.base_url, path, query)
        } else {
            format!("{}{}", entry.base_url, path)
        };

        let method = request.method().clone();
        let headers = request.headers().clone();

        let (_parts, body) = request.into_parts();
        let body_bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .context("Failed to read inbound request body")?;

        let mut upstream_request = self.client.request(method, &target_url);

        // Copy headers (except Host, which reqwest derives from the target)
        for (key, value) in headers.iter() {
            if key != "host" {
                upstream_request = upstream_request.header(key, value);
            }
        }

        if !body_bytes.is_empty() {
            upstream_request = upstream_request.body(body_bytes.to_vec());
        }

        let started = Instant::now();
        let response =
            upstream_request
                .send()
                .await
                .map_err(|source| GatewayError::UpstreamUnavailable {
                    upstream: entry.upstream,
                    source,
                })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        // Hop-by-hop headers describe the upstream connection, not ours.
        headers.remove(header::TRANSFER_ENCODING);
        headers.remove(header::CONNECTION);

        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::UpstreamUnavailable {
                upstream: entry.upstream,
                source,
            })?;

        Ok(ProxyOutcome {
            status,
            headers,
            body,
            upstream_latency: started.elapsed(),
        })
    }
}

impl ProxyOutcome {
    /// Convert the upstream's answer into the response relayed to the caller.
    pub fn into_relay_response(self) -> GatewayResult<Response> {
        let mut builder = Response::builder().status(self.status);

        for (key, value) in self.headers.iter() {
            builder = builder.header(key, value);
        }

        let response = builder
            .body(Body::from(self.body))
            .context("Failed to assemble relay response")?;

        Ok(response)
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::identity::IdentityDecoder;
use crate::proxy::UpstreamClient;
use crate::rate_limit::RateLimiter;
use crate::registry::ServiceRegistry;

/// Gateway context containing shared dependencies
/// This reduces parameter passing and keeps the process free of globals
pub struct GatewayContext {
    pub config: Config,
    pub registry: ServiceRegistry,
    pub identity: IdentityDecoder,
    pub limiter: RateLimiter,
    pub upstream: UpstreamClient,
    /// Process start, used for the uptime reported by /health
    pub started_at: Instant,
}

impl GatewayContext {
    /// Builds every shared component from the resolved configuration.
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let registry = ServiceRegistry::from_config(&config.upstreams);
        let identity = IdentityDecoder::new(config.jwt_secret.as_deref());
        let limiter = RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        );
        let upstream = UpstreamClient::new(config.upstreams.service_timeout_secs)?;

        if !identity.is_enabled() {
            tracing::warn!("JWT_SECRET is not set, requests will not carry a verified identity");
        }

        Ok(Arc::new(Self {
            config,
            registry,
            identity,
            limiter,
            upstream,
            started_at: Instant::now(),
        }))
    }
}

use anyhow::Result;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 8080;

// Upstream base URLs, matching the default deployment layout of the four
// services (startup on 8000, legal on 8001, business on 8002, content on 8003)
const DEFAULT_STARTUP_FORMATION_URL: &str = "http://localhost:8000";
const DEFAULT_LEGAL_COMPLIANCE_URL: &str = "http://localhost:8001";
const DEFAULT_BUSINESS_FORMATION_URL: &str = "http://localhost:8002";
const DEFAULT_CONTENT_STRATEGY_URL: &str = "http://localhost:8003";

const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 30;

// Rate limiting: one budget per caller IP, fixed window
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u64 = 1000;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 900;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_RUST_LOG: &str = "info";

// ============================================================================
// Configuration Structures
// ============================================================================

/// Base URLs of the four proxied services plus the outbound timeout.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub startup_formation_url: String,
    pub legal_compliance_url: String,
    pub content_strategy_url: String,
    pub business_formation_url: String,
    /// Timeout for a single forwarded request (seconds)
    pub service_timeout_secs: u64,
}

/// Per-IP request throttling.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Requests allowed per IP within one window
    pub max_requests: u64,
    /// Window length in seconds
    pub window_secs: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Port the gateway listens on
    pub port: u16,
    pub upstreams: UpstreamConfig,
    pub rate_limit: RateLimitConfig,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
    /// Shared secret for advisory bearer-token decoding. When unset, every
    /// request is treated as unauthenticated.
    pub jwt_secret: Option<String>,
    pub rust_log: String,
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self> {
        let service_timeout_secs = env_u64("SERVICE_TIMEOUT_SECS", DEFAULT_SERVICE_TIMEOUT_SECS);
        if service_timeout_secs == 0 {
            anyhow::bail!("SERVICE_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            startup_formation_url: env_or(
                "STARTUP_FORMATION_SERVICE_URL",
                DEFAULT_STARTUP_FORMATION_URL,
            ),
            legal_compliance_url: env_or(
                "LEGAL_COMPLIANCE_SERVICE_URL",
                DEFAULT_LEGAL_COMPLIANCE_URL,
            ),
            content_strategy_url: env_or(
                "CONTENT_STRATEGY_SERVICE_URL",
                DEFAULT_CONTENT_STRATEGY_URL,
            ),
            business_formation_url: env_or(
                "BUSINESS_FORMATION_SERVICE_URL",
                DEFAULT_BUSINESS_FORMATION_URL,
            ),
            service_timeout_secs,
        })
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self> {
        let max_requests = env_u64("RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS);
        let window_secs = env_u64("RATE_LIMIT_WINDOW_SECS", DEFAULT_RATE_LIMIT_WINDOW_SECS);

        if max_requests == 0 {
            anyhow::bail!("RATE_LIMIT_MAX_REQUESTS must be greater than zero");
        }
        if window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }

        Ok(Self {
            max_requests,
            window_secs,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            upstreams: UpstreamConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            allowed_origins: parse_allowed_origins(&env_or(
                "ALLOWED_ORIGINS",
                DEFAULT_ALLOWED_ORIGINS,
            ))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            rust_log: env_or("RUST_LOG", DEFAULT_RUST_LOG),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated origin list, dropping empty segments.
///
/// The CORS layer takes explicit origins only, so a wildcard entry is a
/// configuration error.
fn parse_allowed_origins(raw: &str) -> Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        anyhow::bail!("ALLOWED_ORIGINS must list explicit origins, \"*\" is not supported");
    }

    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_origin() {
        assert_eq!(
            parse_allowed_origins("http://localhost:3000").unwrap(),
            vec!["http://localhost:3000"]
        );
    }

    #[test]
    fn test_parse_multiple_origins_with_whitespace() {
        assert_eq!(
            parse_allowed_origins("http://localhost:3000, https://yogabrata.com ,http://localhost:3001")
                .unwrap(),
            vec![
                "http://localhost:3000",
                "https://yogabrata.com",
                "http://localhost:3001"
            ]
        );
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(
            parse_allowed_origins("http://localhost:3000,,  ,").unwrap(),
            vec!["http://localhost:3000"]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_allowed_origins("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wildcard_origin() {
        let err = parse_allowed_origins("*").unwrap_err();
        assert!(err.to_string().contains("ALLOWED_ORIGINS"));

        // A wildcard hidden in a list is rejected the same way
        assert!(parse_allowed_origins("http://localhost:3000, *").is_err());
    }
}

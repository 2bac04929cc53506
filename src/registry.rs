// ============================================================================
// Upstream Service Registry
// ============================================================================
//
// Static mapping from logical service name to base URL.
//
// Routing rules:
// - /api/v1/startup/*  → startup-formation service
// - /api/v1/legal/*    → legal-compliance service
// - /api/v1/content/*  → content-strategy service
// - /api/v1/business/* → business-formation service
//
// Every prefix rewrites to /api/v1 on the upstream side, so
// /api/v1/startup/x is forwarded as /api/v1/x.
//
// ============================================================================

use crate::config::UpstreamConfig;

/// Path prefix all rewritten paths are mounted under on the upstream side.
const REWRITE_PREFIX: &str = "/api/v1";

/// The four services this gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    StartupFormation,
    LegalCompliance,
    ContentStrategy,
    BusinessFormation,
}

impl Upstream {
    /// Registration order; also the order reported by `GET /api/services`.
    pub const ALL: [Upstream; 4] = [
        Upstream::StartupFormation,
        Upstream::LegalCompliance,
        Upstream::ContentStrategy,
        Upstream::BusinessFormation,
    ];

    /// Logical service name used in listings and `availableServices`.
    pub fn name(self) -> &'static str {
        match self {
            Upstream::StartupFormation => "startupFormation",
            Upstream::LegalCompliance => "legalCompliance",
            Upstream::ContentStrategy => "contentStrategy",
            Upstream::BusinessFormation => "businessFormation",
        }
    }

    /// Human-readable name used in synthesized error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Upstream::StartupFormation => "Startup Formation Service",
            Upstream::LegalCompliance => "Legal Compliance Service",
            Upstream::ContentStrategy => "Content Strategy Service",
            Upstream::BusinessFormation => "Business Formation Service",
        }
    }

    /// Error code reported when this upstream is unreachable.
    pub fn error_code(self) -> &'static str {
        match self {
            Upstream::StartupFormation => "STARTUP_FORMATION_ERROR",
            Upstream::LegalCompliance => "LEGAL_COMPLIANCE_ERROR",
            Upstream::ContentStrategy => "CONTENT_STRATEGY_ERROR",
            Upstream::BusinessFormation => "BUSINESS_FORMATION_ERROR",
        }
    }

    /// Gateway-facing path prefix this upstream owns.
    pub fn prefix(self) -> &'static str {
        match self {
            Upstream::StartupFormation => "/api/v1/startup",
            Upstream::LegalCompliance => "/api/v1/legal",
            Upstream::ContentStrategy => "/api/v1/content",
            Upstream::BusinessFormation => "/api/v1/business",
        }
    }

    fn base_url(self, config: &UpstreamConfig) -> String {
        match self {
            Upstream::StartupFormation => config.startup_formation_url.clone(),
            Upstream::LegalCompliance => config.legal_compliance_url.clone(),
            Upstream::ContentStrategy => config.content_strategy_url.clone(),
            Upstream::BusinessFormation => config.business_formation_url.clone(),
        }
    }
}

/// One registered upstream: the variant plus its configured base URL.
#[derive(Debug, Clone)]
pub struct ServiceRegistryEntry {
    pub upstream: Upstream,
    pub base_url: String,
}

impl ServiceRegistryEntry {
    /// Replaces the gateway-facing prefix with the upstream-facing one.
    ///
    /// `/api/v1/startup/x` becomes `/api/v1/x`; the bare prefix becomes
    /// `/api/v1`. The caller must have matched `path` against this entry.
    pub fn rewrite_path(&self, path: &str) -> String {
        let rest = path.strip_prefix(self.upstream.prefix()).unwrap_or(path);
        format!("{REWRITE_PREFIX}{rest}")
    }
}

/// Immutable table of registered upstreams, built once at startup by
/// iterating [`Upstream::ALL`] and pairing each variant with its configured
/// base URL.
pub struct ServiceRegistry {
    entries: Vec<ServiceRegistryEntry>,
}

impl ServiceRegistry {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let entries = Upstream::ALL
            .iter()
            .map(|&upstream| ServiceRegistryEntry {
                upstream,
                base_url: upstream.base_url(config),
            })
            .collect();

        Self { entries }
    }

    /// Longest-prefix match with path-segment boundaries:
    /// `/api/v1/startup` and `/api/v1/startup/x` match the startup entry,
    /// `/api/v1/startupfoo` matches nothing.
    pub fn resolve(&self, path: &str) -> Option<&ServiceRegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| prefix_matches(entry.upstream.prefix(), path))
            .max_by_key(|entry| entry.upstream.prefix().len())
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[ServiceRegistryEntry] {
        &self.entries
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

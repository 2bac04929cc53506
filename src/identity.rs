// ============================================================================
// Identity Decorator
// ============================================================================
//
// Best-effort bearer-token decoding. This is a soft gate: validation failure
// never rejects the request, it only leaves the request unauthenticated.
// Downstream services enforce their own authorization.
//
// ============================================================================

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// Decoded caller identity, attached to requests carrying a valid token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Caller subject
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Any further claims, carried through untouched
    #[serde(flatten)]
    pub raw_claims: serde_json::Map<String, serde_json::Value>,
}

/// Validates bearer credentials against the shared secret.
///
/// Every failure path yields `None`: absent header, missing `Bearer` scheme,
/// bad signature, expired token, or no secret configured at all. Only
/// malformed and rejected tokens are logged (at warn); an absent header is
/// the normal anonymous case.
pub struct IdentityDecoder {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl IdentityDecoder {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            decoding_key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Whether a shared secret is configured. When false, every request is
    /// treated as unauthenticated.
    pub fn is_enabled(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// Decodes the raw `Authorization` header value, if any.
    pub fn decode(&self, auth_header: Option<&str>) -> Option<IdentityClaim> {
        let header = auth_header?;
        let key = self.decoding_key.as_ref()?;

        let Some(token) = header.strip_prefix("Bearer ") else {
            tracing::warn!("Authorization header is not a bearer credential, continuing unauthenticated");
            return None;
        };

        match decode::<IdentityClaim>(token, key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::warn!(error = %e, "Bearer token rejected, continuing unauthenticated");
                None
            }
        }
    }
}

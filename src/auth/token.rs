//! HS256 JWT session tokens.
//!
//! The claims identify the principal; the `is_admin` flag is informational only
//! and authorization re-derives real permissions from the store.

use crate::errors::{Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or admin id for committee-only principals
    pub id: i64,
    /// Lower-cased email; the only field authorization trusts
    pub email: String,
    /// Whether the principal was an admin when the token was issued
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl Claims {
    /// Builds claims valid for `ttl` starting now.
    #[must_use]
    pub fn new(id: i64, email: String, is_admin: bool, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            email,
            is_admin,
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }
}

/// Encodes and signs `claims`.
pub fn issue(secret: &[u8], claims: &Claims) -> Result<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| Error::Token {
        message: e.to_string(),
    })
}

/// Verifies the signature and expiry of `token` at unix time `now` and returns
/// its claims.
///
/// Any malformed, tampered or expired token is reported as [`Error::Unauthorized`].
pub fn verify(secret: &[u8], token: &str, now: i64) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = jsonwebtoken::decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(secret),
        &validation,
    )
    .map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired session token"),
            ErrorKind::InvalidSignature => tracing::debug!("Rejected session token with bad signature"),
            other => tracing::debug!("Rejected session token: {:?}", other),
        }
        Error::Unauthorized
    })?
    .claims;

    if claims.exp <= now {
        return Err(Error::Unauthorized);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const SECRET: &[u8] = b"an-adequately-long-test-secret-value";

    fn claims() -> Claims {
        Claims::new(7, "alum@example.org".to_string(), false, chrono::Duration::hours(2))
    }

    #[test]
    fn test_issue_then_verify() {
        let claims = claims();
        let token = issue(SECRET, &claims).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let verified = verify(SECRET, &token, claims.iat).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue(SECRET, &claims()).unwrap();
        let result = verify(b"some-other-secret-entirely-different", &token, 0);
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let token = issue(SECRET, &claims()).unwrap();
        let mut forged = claims();
        forged.is_admin = true;
        let forged_token = issue(b"attacker-chosen-secret-of-some-length", &forged).unwrap();

        // Original header and signature around the forged payload
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged_token.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(matches!(verify(SECRET, &tampered, 0), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = claims();
        let token = issue(SECRET, &claims).unwrap();
        assert!(matches!(
            verify(SECRET, &token, claims.exp),
            Err(Error::Unauthorized)
        ));

        let mut stale = Claims::new(7, "alum@example.org".to_string(), false, chrono::Duration::hours(2));
        stale.iat -= 3 * 3600;
        stale.exp -= 3 * 3600;
        let stale_token = issue(SECRET, &stale).unwrap();
        assert!(matches!(
            verify(SECRET, &stale_token, stale.iat),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert!(matches!(verify(SECRET, token, 0), Err(Error::Unauthorized)));
        }
    }
}

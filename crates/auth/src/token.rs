//! HS256 bearer-token issue and verification.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradepost_core::UserId;

use crate::claims::{AuthClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Validates a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, TokenError>;
}

/// Wire-level claims as encoded in the JWT (numeric iat/exp, per RFC 7519).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: UserId,
    iat: i64,
    exp: i64,
}

/// HS256 token signer/validator over a shared secret.
pub struct Hs256Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256Tokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `user_id`, valid for `ttl` starting at `now`.
    pub fn issue(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<String, TokenError> {
        let claims = WireClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl JwtValidator for Hs256Tokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, TokenError> {
        // Signature check via jsonwebtoken; the time window is re-checked
        // deterministically below so tests can pin `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        let issued_at = Utc
            .timestamp_opt(data.claims.iat, 0)
            .single()
            .ok_or_else(|| TokenError::Invalid("iat out of range".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::Invalid("exp out of range".to_string()))?;

        let claims = AuthClaims {
            sub: data.claims.sub,
            issued_at,
            expires_at,
        };
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_validates_and_carries_the_user() {
        let tokens = Hs256Tokens::new(b"test-secret");
        let user_id = UserId::new();
        let now = Utc::now();

        let token = tokens.issue(user_id, now, Duration::minutes(10)).unwrap();
        let claims = tokens.validate(&token, now).unwrap();

        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = Hs256Tokens::new(b"test-secret");
        let now = Utc::now();

        let token = tokens
            .issue(UserId::new(), now - Duration::hours(2), Duration::minutes(10))
            .unwrap();

        match tokens.validate(&token, now) {
            Err(TokenError::Claims(TokenValidationError::Expired)) => {}
            other => panic!("expected expired claims, got {other:?}"),
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let tokens = Hs256Tokens::new(b"test-secret");
        let other = Hs256Tokens::new(b"other-secret");
        let now = Utc::now();

        let token = other.issue(UserId::new(), now, Duration::minutes(10)).unwrap();

        match tokens.validate(&token, now) {
            Err(TokenError::Invalid(_)) => {}
            other => panic!("expected invalid signature, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = Hs256Tokens::new(b"test-secret");
        assert!(matches!(
            tokens.validate("not.a.token", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
    }
}

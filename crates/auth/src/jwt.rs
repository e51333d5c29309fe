//! HS256 token issuance and verification.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use learnhub_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Mints signed tokens for authenticated users.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, user_id: UserId, role: Role, now: DateTime<Utc>) -> Result<String, JwtError>;
}

/// Verifies tokens presented by callers.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret HS256 signer/verifier.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Jwt {
    pub const DEFAULT_TTL_HOURS: i64 = 24 * 7;

    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(Self::DEFAULT_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn validation() -> Validation {
        // Time checks go through `validate_claims` so they honour the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);
        validation
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtIssuer for Hs256Jwt {
    fn issue(&self, user_id: UserId, role: Role, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = JwtClaims {
            sub: user_id,
            role,
            issued_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .ok_or(TokenValidationError::InvalidTimeWindow)?,
        };
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &Self::validation())?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_and_carries_identity() {
        let jwt = Hs256Jwt::new(b"test-secret");
        let user = UserId::new();
        let now = Utc::now();

        let token = jwt.issue(user, Role::Teacher, now).unwrap();
        let claims = jwt.validate(&token, now + Duration::minutes(5)).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.expires_at.timestamp(), (now + jwt.ttl()).timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = Hs256Jwt::new(b"secret-a").issue(UserId::new(), Role::Student, now).unwrap();
        let err = Hs256Jwt::new(b"secret-b").validate(&token, now).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = Hs256Jwt::new(b"s").with_ttl(Duration::minutes(1));
        let now = Utc::now();
        let token = jwt.issue(UserId::new(), Role::Student, now).unwrap();
        let err = jwt.validate(&token, now + Duration::minutes(2)).unwrap_err();
        assert!(matches!(err, JwtError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let jwt = Hs256Jwt::new(b"s").with_ttl(Duration::MAX);
        let err = jwt.issue(UserId::new(), Role::Student, Utc::now()).unwrap_err();
        assert!(matches!(err, JwtError::Claims(TokenValidationError::InvalidTimeWindow)));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = Hs256Jwt::new(b"s");
        assert!(jwt.validate("not.a.jwt", Utc::now()).is_err());
        assert!(jwt.validate("", Utc::now()).is_err());
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let jwt = Hs256Jwt::new(b"super-secret-value");
        assert!(!format!("{jwt:?}").contains("super-secret-value"));
    }
}

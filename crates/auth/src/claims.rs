use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use learnhub_core::UserId;

use crate::Role;

/// JWT claims model.
///
/// `iat`/`exp` are carried as unix seconds on the wire so any standard JWT
/// library can read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Role at the time the token was issued.
    pub role: Role,

    /// Issued-at timestamp.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            role: Role::Student,
            issued_at: Utc.timestamp_opt(iat, 0).unwrap(),
            expires_at: Utc.timestamp_opt(exp, 0).unwrap(),
        }
    }

    #[test]
    fn accepts_now_inside_window() {
        let c = claims(1_000, 2_000);
        assert_eq!(validate_claims(&c, Utc.timestamp_opt(1_500, 0).unwrap()), Ok(()));
        assert_eq!(validate_claims(&c, c.issued_at), Ok(()));
    }

    #[test]
    fn rejects_expired_at_boundary() {
        let c = claims(1_000, 2_000);
        assert_eq!(validate_claims(&c, c.expires_at), Err(TokenValidationError::Expired));
        assert_eq!(
            validate_claims(&c, c.expires_at + Duration::seconds(1)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_future_and_inverted_tokens() {
        let c = claims(1_000, 2_000);
        assert_eq!(
            validate_claims(&c, Utc.timestamp_opt(999, 0).unwrap()),
            Err(TokenValidationError::NotYetValid)
        );
        let inverted = claims(2_000, 2_000);
        assert_eq!(
            validate_claims(&inverted, Utc.timestamp_opt(2_000, 0).unwrap()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wire_format_uses_registered_claim_names() {
        let c = claims(1_000, 2_000);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["iat"], 1_000);
        assert_eq!(v["exp"], 2_000);
        assert_eq!(v["role"], "student");
        assert_eq!(v["sub"], c.sub.to_string());
    }
}

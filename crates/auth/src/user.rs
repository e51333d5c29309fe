//! User accounts.
//!
//! Registration input is validated and normalized here; the stored `User`
//! carries the password hash and is never serialized to clients directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

pub const MAX_NAME_LEN: usize = 80;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Lowercased, trimmed; unique across users.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    pub fn public(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Client-facing view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Validated registration input (password still in plaintext).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(name: &str, email: &str, password: &str, role: Role) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("invalid email format"));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
            role,
        })
    }

    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            created_at: now,
        }
    }
}

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_input_is_trimmed_and_lowercased() {
        let nu = NewUser::validate("  Alex Kim ", " Alex@Example.COM ", "secret1", Role::Student).unwrap();
        assert_eq!(nu.name, "Alex Kim");
        assert_eq!(nu.email, "alex@example.com");
        assert_eq!(nu.role, Role::Student);
    }

    #[test]
    fn rejects_blank_or_long_names() {
        assert!(NewUser::validate("   ", "a@b.co", "secret1", Role::Student).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(NewUser::validate(&long, "a@b.co", "secret1", Role::Student).is_err());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "plain", "a@", "@b.co", "a@b", "a@@b.co", "a b@c.co", "a@.co", "a@co."] {
            let err = NewUser::validate("A", email, "secret1", Role::Student).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{email} should be rejected");
        }
    }

    #[test]
    fn rejects_short_passwords() {
        let err = NewUser::validate("A", "a@b.co", "12345", Role::Teacher).unwrap_err();
        assert_eq!(err, DomainError::validation("password must be at least 6 characters"));
    }

    #[test]
    fn public_profile_omits_the_hash() {
        let user = NewUser::validate("A", "a@b.co", "secret1", Role::Teacher)
            .unwrap()
            .into_user("$argon2id$fake".to_string(), Utc::now());
        let json = serde_json::to_value(user.public()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["email"], "a@b.co");
    }
}

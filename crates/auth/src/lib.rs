//! `learnhub-auth`: authentication and authorization boundary.
//!
//! Users, roles and their permissions, JWT issuance/validation and password
//! hashing. This crate is decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtError, JwtIssuer, JwtValidator};
pub use password::{PasswordError, PasswordHasher};
pub use permissions::{Permission, role_permissions};
pub use principal::Principal;
pub use roles::Role;
pub use user::{NewUser, User, UserProfile, normalize_email};

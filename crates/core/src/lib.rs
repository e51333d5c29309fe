//! `learnhub-core`: shared domain building blocks.
//!
//! Identifiers, the domain error model and the `Entity` contract used by
//! every stored record. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AssignmentId, ClassroomId, TopicId, UserId};

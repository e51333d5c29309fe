use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "classes.create").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn new_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const TOPICS_READ: Permission = Permission::new_static("topics.read");
pub const QUIZ_SUBMIT: Permission = Permission::new_static("quiz.submit");
pub const PROGRESS_READ: Permission = Permission::new_static("progress.read");
pub const PROGRESS_WRITE: Permission = Permission::new_static("progress.write");
pub const CLASSES_READ: Permission = Permission::new_static("classes.read");
pub const CLASSES_JOIN: Permission = Permission::new_static("classes.join");
pub const CLASSES_CREATE: Permission = Permission::new_static("classes.create");
pub const CLASSES_MANAGE: Permission = Permission::new_static("classes.manage");
pub const ASSIGNMENTS_READ: Permission = Permission::new_static("assignments.read");
pub const ASSIGNMENTS_CREATE: Permission = Permission::new_static("assignments.create");
pub const ASSIGNMENTS_SUBMIT: Permission = Permission::new_static("assignments.submit");
pub const AI_USE: Permission = Permission::new_static("ai.use");
pub const AI_GENERATE_QUIZ: Permission = Permission::new_static("ai.generate_quiz");

/// Static role → permission policy.
pub fn role_permissions(role: Role) -> Vec<Permission> {
    match role {
        Role::Student => vec![
            TOPICS_READ,
            QUIZ_SUBMIT,
            PROGRESS_READ,
            PROGRESS_WRITE,
            CLASSES_READ,
            CLASSES_JOIN,
            ASSIGNMENTS_READ,
            ASSIGNMENTS_SUBMIT,
            AI_USE,
        ],
        Role::Teacher => vec![
            TOPICS_READ,
            QUIZ_SUBMIT,
            PROGRESS_READ,
            CLASSES_READ,
            CLASSES_CREATE,
            CLASSES_MANAGE,
            ASSIGNMENTS_READ,
            ASSIGNMENTS_CREATE,
            AI_USE,
            AI_GENERATE_QUIZ,
        ],
    }
}

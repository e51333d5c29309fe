use learnhub_core::UserId;

use crate::{Permission, Role, role_permissions};

/// A resolved, authenticated caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        role_permissions(self.role)
    }
}

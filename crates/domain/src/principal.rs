use crate::{Role, UserId};

/// Read-only authorization snapshot of a user: identity, status and roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    active: bool,
    roles: Vec<Role>,
}

impl Principal {
    /// Creates a principal, collapsing duplicate role memberships.
    #[must_use]
    pub fn new(user_id: UserId, active: bool, roles: Vec<Role>) -> Self {
        let mut unique_roles: Vec<Role> = Vec::with_capacity(roles.len());
        for role in roles {
            if !unique_roles.iter().any(|known| known.id() == role.id()) {
                unique_roles.push(role);
            }
        }

        Self {
            user_id,
            active,
            roles: unique_roles,
        }
    }

    /// Returns the user this principal represents.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the assigned roles.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns a copy holding one more role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        if !self.roles.iter().any(|known| known.id() == role.id()) {
            self.roles.push(role);
        }
        self
    }
}

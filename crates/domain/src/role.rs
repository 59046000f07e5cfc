use std::collections::BTreeMap;

use serde::Serialize;
use tasklane_core::{AppError, AppResult, NonEmptyString};

use crate::{Capability, CapabilitySet, RoleId};

/// Longest accepted role name.
pub const ROLE_NAME_MAX_LENGTH: usize = 100;

/// Named, user-assignable bundle of capability grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    capabilities: CapabilitySet,
}

impl Role {
    /// Creates a validated role.
    pub fn new(id: RoleId, name: impl Into<String>, capabilities: CapabilitySet) -> AppResult<Self> {
        Ok(Self {
            id,
            name: validate_role_name(name)?,
            capabilities,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the granted capabilities.
    #[must_use]
    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Returns whether this role grants the capability.
    #[must_use]
    pub fn grants(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Returns the explicit flag of every catalog capability.
    #[must_use]
    pub fn flags(&self) -> BTreeMap<Capability, bool> {
        self.capabilities.to_flags()
    }

    /// Renames the role.
    pub fn rename(&mut self, name: impl Into<String>) -> AppResult<()> {
        self.name = validate_role_name(name)?;
        Ok(())
    }

    /// Replaces every capability flag of the role.
    pub fn replace_capabilities(&mut self, capabilities: CapabilitySet) {
        self.capabilities = capabilities;
    }
}

fn validate_role_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = NonEmptyString::new(name)?;
    if name.as_str().chars().count() > ROLE_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name)
}

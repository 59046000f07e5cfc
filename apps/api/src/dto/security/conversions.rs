use tasklane_application::{AuditLogEntry, AuditLogQuery, RoleInput};
use tasklane_core::AppError;
use tasklane_domain::{Capability, CapabilitySet, Role};

use super::super::common::capability_flags;
use super::{
    AuditLogEntryResponse, AuditLogQueryParams, CapabilityResponse, RoleRequest, RoleResponse,
};

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            capabilities: capability_flags(value.flags()),
        }
    }
}

impl TryFrom<RoleRequest> for RoleInput {
    type Error = AppError;

    fn try_from(value: RoleRequest) -> Result<Self, Self::Error> {
        let flags = value
            .capabilities
            .iter()
            .map(|(name, granted)| {
                Capability::parse(name).map(|capability| (capability, *granted))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: value.name,
            capabilities: CapabilitySet::from_flags(flags),
        })
    }
}

impl From<Capability> for CapabilityResponse {
    fn from(value: Capability) -> Self {
        Self {
            name: value.as_str().to_owned(),
            permission_name: value.permission_name(),
            description: value.description().to_owned(),
        }
    }
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            subject: value.subject,
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}

impl From<AuditLogQueryParams> for AuditLogQuery {
    fn from(value: AuditLogQueryParams) -> Self {
        let defaults = Self::default();
        Self {
            limit: value.limit.unwrap_or(defaults.limit),
            offset: value.offset.unwrap_or(defaults.offset),
            action: value.action.filter(|action| !action.trim().is_empty()),
            subject: value.subject.filter(|subject| !subject.trim().is_empty()),
        }
    }
}

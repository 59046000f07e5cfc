//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod capability;
mod capability_set;
mod identifiers;
pub mod permission_registry;
mod principal;
mod project;
mod role;
mod security;
mod task;
pub mod task_policy;
mod user;

pub use capability::{Capability, PERMISSION_NAME_PREFIX, UnknownCapability};
pub use capability_set::CapabilitySet;
pub use identifiers::{ProjectId, RoleId, TaskId, UserId};
pub use permission_registry::{AccessDecision, DenyReason};
pub use principal::Principal;
pub use project::Project;
pub use role::{ROLE_NAME_MAX_LENGTH, Role};
pub use security::AuditAction;
pub use task::{Task, TaskStatus};
pub use task_policy::{TaskAction, TaskTarget};
pub use user::{EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, validate_password};

//! Effective capability resolution for principals.
//!
//! A principal's effective capabilities are the OR-combination of the grants
//! of every role it holds. All functions here are pure over the supplied
//! snapshot.

use std::collections::BTreeMap;

use crate::{Capability, CapabilitySet, Principal, UnknownCapability};

/// Outcome of a single-capability authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The principal holds the capability.
    Granted,
    /// The principal may not proceed.
    Denied(DenyReason),
}

impl AccessDecision {
    /// Returns whether access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Why an authorization check denied access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The account is deactivated.
    Inactive,
    /// No role of the principal grants the capability.
    MissingCapability(Capability),
    /// The requested name is outside the catalog.
    UnknownCapability(UnknownCapability),
}

/// Returns the fixed capability catalog in catalog order.
#[must_use]
pub fn catalog() -> &'static [Capability] {
    Capability::all()
}

/// Folds the grants of every role the principal holds.
#[must_use]
pub fn effective_capabilities(principal: &Principal) -> CapabilitySet {
    principal
        .roles()
        .iter()
        .fold(CapabilitySet::empty(), |granted, role| {
            granted | role.capabilities()
        })
}

/// Resolves one boolean per catalog capability for the principal.
///
/// The map always holds every catalog key; a principal without roles
/// resolves to all `false`.
#[must_use]
pub fn resolve(principal: &Principal) -> BTreeMap<Capability, bool> {
    let mut resolved: BTreeMap<Capability, bool> = catalog()
        .iter()
        .map(|capability| (*capability, false))
        .collect();

    for role in principal.roles() {
        for (capability, granted) in resolved.iter_mut() {
            if !*granted && role.grants(*capability) {
                *granted = true;
            }
        }
    }

    resolved
}

/// Returns whether the principal holds the capability.
#[must_use]
pub fn has_capability(principal: &Principal, capability: Capability) -> bool {
    principal
        .roles()
        .iter()
        .any(|role| role.grants(capability))
}

/// Looks up a capability by name.
///
/// Fails with [`UnknownCapability`] when the name is outside the catalog.
pub fn has(principal: &Principal, capability_name: &str) -> Result<bool, UnknownCapability> {
    let capability = Capability::parse(capability_name)?;
    Ok(resolve(principal)
        .get(&capability)
        .copied()
        .unwrap_or(false))
}

/// Single-capability gate used for users, roles, projects and logs.
///
/// Inactive principals are denied before the capability is looked up, and
/// unknown names deny instead of failing.
#[must_use]
pub fn authorize(principal: &Principal, capability_name: &str) -> AccessDecision {
    if !principal.is_active() {
        return AccessDecision::Denied(DenyReason::Inactive);
    }

    match Capability::parse(capability_name) {
        Ok(capability) if has_capability(principal, capability) => AccessDecision::Granted,
        Ok(capability) => AccessDecision::Denied(DenyReason::MissingCapability(capability)),
        Err(error) => AccessDecision::Denied(DenyReason::UnknownCapability(error)),
    }
}

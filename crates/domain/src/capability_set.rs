use std::collections::BTreeMap;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::Capability;

/// Fixed-size set of granted capabilities, one bit per catalog entry.
///
/// Every catalog capability has a defined value: a cleared bit reads as
/// not granted. Decoding goes through [`CapabilitySet::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// Returns a set with no capability granted.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a set granting the whole catalog.
    #[must_use]
    pub fn all() -> Self {
        Capability::all().iter().copied().collect()
    }

    /// Restores a set from its bit representation, dropping unknown bits.
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::all().0)
    }

    /// Returns the bit representation.
    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Returns whether the capability is granted.
    #[must_use]
    pub fn contains(self, capability: Capability) -> bool {
        self.0 & bit(capability) != 0
    }

    /// Grants or clears one capability.
    pub fn set(&mut self, capability: Capability, granted: bool) {
        if granted {
            self.0 |= bit(capability);
        } else {
            self.0 &= !bit(capability);
        }
    }

    /// Grants one capability.
    pub fn insert(&mut self, capability: Capability) {
        self.set(capability, true);
    }

    /// Returns a copy with the capability granted.
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    /// Returns the union of both sets.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns whether no capability is granted.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates granted capabilities in catalog order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(move |capability| self.contains(*capability))
    }

    /// Returns one boolean per catalog entry.
    #[must_use]
    pub fn to_flags(self) -> BTreeMap<Capability, bool> {
        Capability::all()
            .iter()
            .map(|capability| (*capability, self.contains(*capability)))
            .collect()
    }

    /// Builds a set from explicit per-capability flags.
    ///
    /// Capabilities missing from `flags` read as not granted.
    #[must_use]
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = (Capability, bool)>,
    {
        let mut set = Self::empty();
        for (capability, granted) in flags {
            set.set(capability, granted);
        }
        set
    }
}

impl From<u16> for CapabilitySet {
    fn from(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}

impl From<CapabilitySet> for u16 {
    fn from(set: CapabilitySet) -> Self {
        set.0
    }
}

fn bit(capability: Capability) -> u16 {
    1 << capability.index()
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        let mut set = Self::empty();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl BitOr for CapabilitySet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for CapabilitySet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

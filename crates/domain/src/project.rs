use std::collections::BTreeSet;

use serde::Serialize;
use tasklane_core::{AppResult, NonEmptyString};

use crate::{ProjectId, UserId};

/// Project grouping tasks under a set of team leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: ProjectId,
    name: NonEmptyString,
    description: Option<String>,
    created_by: UserId,
    team_lead_ids: BTreeSet<UserId>,
}

impl Project {
    /// Creates a new project; the creator becomes its first team lead.
    pub fn new(
        id: ProjectId,
        name: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
    ) -> AppResult<Self> {
        Self::from_parts(id, name, description, created_by, [created_by])
    }

    /// Restores a project from persisted parts without touching team leads.
    pub fn from_parts(
        id: ProjectId,
        name: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
        team_lead_ids: impl IntoIterator<Item = UserId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description: normalize_description(description),
            created_by,
            team_lead_ids: team_lead_ids.into_iter().collect(),
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creator.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the team lead set.
    #[must_use]
    pub fn team_lead_ids(&self) -> &BTreeSet<UserId> {
        &self.team_lead_ids
    }

    /// Returns whether the user created the project.
    #[must_use]
    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.created_by == user_id
    }

    /// Returns whether the user is a team lead.
    #[must_use]
    pub fn is_team_lead(&self, user_id: UserId) -> bool {
        self.team_lead_ids.contains(&user_id)
    }

    /// Adds a team lead, returning `false` when already present.
    pub fn add_team_lead(&mut self, user_id: UserId) -> bool {
        self.team_lead_ids.insert(user_id)
    }

    /// Removes a team lead, returning `false` when absent.
    pub fn remove_team_lead(&mut self, user_id: UserId) -> bool {
        self.team_lead_ids.remove(&user_id)
    }

    /// Updates name and description.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<()> {
        self.name = NonEmptyString::new(name)?;
        self.description = normalize_description(description);
        Ok(())
    }
}

pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

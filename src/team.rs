//! Team editing: composing the crew from the available roster.
//!
//! Edits happen on a [`TeamDraft`] and only reach the session when saved.
//! A team always has exactly one foreman, and the foreman cannot be removed.

use crate::model::{MemberId, Role, TeamMember};

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("the foreman cannot be removed from the team: {0}")]
    ForemanRemoval(MemberId),

    #[error("team has no foreman")]
    MissingForeman,

    #[error("team already has a foreman; cannot add {0}")]
    DuplicateForeman(MemberId),

    #[error("member not in available roster: {0}")]
    NotInRoster(MemberId),

    #[error("member not on team: {0}")]
    NotOnTeam(MemberId),

    #[error("vehicle not available: {0}")]
    UnknownVehicle(String),

    #[error("the team cannot be changed while the shift is open")]
    ShiftOpen,
}

pub type Result<T> = core::result::Result<T, TeamError>;

/// Checks that exactly one member is foreman.
pub fn validate(members: &[TeamMember]) -> Result<()> {
    let mut foremen = members.iter().filter(|m| m.role == Role::Foreman);
    match (foremen.next(), foremen.next()) {
        (None, _) => Err(TeamError::MissingForeman),
        (Some(_), Some(second)) => Err(TeamError::DuplicateForeman(second.id.clone())),
        (Some(_), None) => Ok(()),
    }
}

/// A team being edited, backed by the roster members can be picked from.
#[derive(Debug, Clone)]
pub struct TeamDraft<'a> {
    roster: &'a [TeamMember],
    members: Vec<TeamMember>,
}

impl<'a> TeamDraft<'a> {
    #[must_use]
    pub fn new(current: &[TeamMember], roster: &'a [TeamMember]) -> Self {
        Self {
            roster,
            members: current.to_vec(),
        }
    }

    #[must_use]
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    fn contains(&self, id: &MemberId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// Adds a roster member. Returns `false` if they were already on the team.
    pub fn add(&mut self, id: &MemberId) -> Result<bool> {
        if self.contains(id) {
            return Ok(false);
        }
        let member = self
            .roster
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| TeamError::NotInRoster(id.clone()))?;
        if member.role == Role::Foreman && self.members.iter().any(|m| m.role == Role::Foreman) {
            return Err(TeamError::DuplicateForeman(id.clone()));
        }
        self.members.push(member.clone());
        Ok(true)
    }

    pub fn remove(&mut self, id: &MemberId) -> Result<()> {
        let index = self
            .members
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| TeamError::NotOnTeam(id.clone()))?;
        if self.members[index].role == Role::Foreman {
            return Err(TeamError::ForemanRemoval(id.clone()));
        }
        self.members.remove(index);
        Ok(())
    }

    /// Roster members not yet on the team whose name (case-insensitive)
    /// or document contains `query`.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&'a TeamMember> {
        let needle = query.to_lowercase();
        self.roster
            .iter()
            .filter(|m| !self.contains(&m.id))
            .filter(|m| m.name.to_lowercase().contains(&needle) || m.document.contains(query))
            .collect()
    }

    /// Validates and returns the edited team.
    pub fn finish(self) -> Result<Vec<TeamMember>> {
        validate(&self.members)?;
        Ok(self.members)
    }
}

//! Session coordinator: one logged-in user's shift state.
//!
//! A [`Session`] is built at login from a [`Catalog`] and dropped at
//! logout. It owns the team, the checklists, the shift, the works and the
//! sync indicator, and is the only place these are wired together.

use std::path::Path;
use std::sync::Arc;

use jiff::Timestamp;

use crate::catalog::Catalog;
use crate::checklist::{self, ChecklistError, ChecklistSet, ChecklistTemplates};
use crate::config::{Config, Theme};
use crate::model::{
    Answer, Checklist, ChecklistRef, Coordinate, MemberId, PointData, PointId, PointStatus,
    TeamMember, User, Vehicle, Work, WorkId,
};
use crate::photo::{self, PhotoError};
use crate::shift::{self, FlowEntry, Shift, ShiftError, Transition};
use crate::sync::{SyncIndicator, SyncStatus};
use crate::team::{self, TeamDraft, TeamError};
use crate::works::{DataView, WorkError, WorkStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("user {0} is not in the roster")]
    UnknownUser(MemberId),

    #[error(transparent)]
    Checklist(#[from] ChecklistError),

    #[error(transparent)]
    Shift(#[from] ShiftError),

    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Work(#[from] WorkError),

    #[error(transparent)]
    Photo(#[from] PhotoError),
}

pub type Result<T> = core::result::Result<T, SessionError>;

/// Where the user is in the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    OpenShift,
    AprChecklist,
    IndividualChecklist(MemberId),
    Works,
    WorkDetail(WorkId),
    Schedule,
    TeamEdit,
    Profile,
}

#[derive(Debug)]
pub struct Session {
    user: User,
    roster: Vec<TeamMember>,
    team: Vec<TeamMember>,
    vehicles: Vec<Vehicle>,
    vehicle: Option<Vehicle>,
    works: WorkStore,
    templates: ChecklistTemplates,
    checklists: Option<ChecklistSet>,
    shift: Shift,
    sync: SyncIndicator,
    view: View,
    theme: Theme,
}

impl Session {
    /// Starts a session for the catalog's user. The shift starts closed
    /// and no checklists exist until the checklist flow is entered.
    pub fn login(catalog: Catalog, config: &Config) -> Result<Self> {
        let member = catalog
            .member(&catalog.user)
            .ok_or_else(|| SessionError::UnknownUser(catalog.user.clone()))?;
        let user = User {
            id: member.id.clone(),
            name: member.name.clone(),
            role: member.role,
        };
        let team = catalog.initial_team();
        let vehicle = catalog.initial_vehicle().cloned();
        let Catalog {
            roster,
            vehicles,
            works,
            checklists,
            ..
        } = catalog;
        let works = WorkStore::new(works)?;

        tracing::info!(
            user = %user.id,
            team = team.len(),
            works = works.works().len(),
            "logged in"
        );
        Ok(Self {
            user,
            roster,
            team,
            vehicles,
            vehicle,
            works,
            templates: checklists,
            checklists: None,
            shift: Shift::default(),
            sync: SyncIndicator::new(config.sync_delay()),
            view: View::Home,
            theme: config.theme,
        })
    }

    /// Ends the session. All in-memory state is dropped.
    pub fn logout(self) {
        tracing::info!(user = %self.user.id, shift_open = self.shift.is_open(), "logged out");
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// The work being looked at, if any.
    #[must_use]
    pub fn selected_work(&self) -> Option<&Arc<Work>> {
        match &self.view {
            View::WorkDetail(id) => self.works.work(id),
            _ => None,
        }
    }

    /// The member whose checklist is being looked at, if any.
    #[must_use]
    pub fn selected_member(&self) -> Option<&MemberId> {
        match &self.view {
            View::IndividualChecklist(id) => Some(id),
            _ => None,
        }
    }

    /// Moves to `view`.
    ///
    /// Opening the shift screen while closed enters the checklist flow.
    /// Targets that do not resolve leave the current view in place.
    pub fn navigate(&mut self, view: View) -> Result<Option<FlowEntry>> {
        match &view {
            View::WorkDetail(id) if self.works.work(id).is_none() => {
                return Err(WorkError::WorkNotFound(id.clone()).into());
            }
            View::IndividualChecklist(id) if !self.team.iter().any(|m| &m.id == id) => {
                return Err(TeamError::NotOnTeam(id.clone()).into());
            }
            _ => {}
        }
        let entry = if view == View::OpenShift && !self.shift.is_open() {
            Some(self.enter_checklist_flow()?)
        } else {
            None
        };
        tracing::debug!(?view, "navigated");
        self.view = view;
        Ok(entry)
    }

    // Team

    #[must_use]
    pub fn team(&self) -> &[TeamMember] {
        &self.team
    }

    #[must_use]
    pub fn roster(&self) -> &[TeamMember] {
        &self.roster
    }

    /// Starts editing a copy of the current team.
    #[must_use]
    pub fn team_draft(&self) -> TeamDraft<'_> {
        TeamDraft::new(&self.team, &self.roster)
    }

    /// Replaces the team. Refused while the shift is open.
    pub fn save_team(&mut self, members: Vec<TeamMember>) -> Result<()> {
        if self.shift.is_open() {
            return Err(TeamError::ShiftOpen.into());
        }
        if let Some(stranger) = members
            .iter()
            .find(|m| !self.roster.iter().any(|r| r.id == m.id))
        {
            return Err(TeamError::NotInRoster(stranger.id.clone()).into());
        }
        team::validate(&members)?;
        tracing::info!(members = members.len(), "team saved");
        self.team = members;
        Ok(())
    }

    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[must_use]
    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    /// Assigns a vehicle from the available ones. Refused while the shift is open.
    pub fn select_vehicle(&mut self, id: &str) -> Result<()> {
        if self.shift.is_open() {
            return Err(TeamError::ShiftOpen.into());
        }
        let vehicle = self
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| TeamError::UnknownVehicle(id.to_string()))?;
        tracing::info!(vehicle = %vehicle.id, plate = %vehicle.plate, "vehicle selected");
        self.vehicle = Some(vehicle.clone());
        Ok(())
    }

    // Checklists

    #[must_use]
    pub fn checklists(&self) -> Option<&ChecklistSet> {
        self.checklists.as_ref()
    }

    #[must_use]
    pub fn checklist(&self, target: &ChecklistRef) -> Option<&Checklist> {
        self.checklists.as_ref()?.get(target)
    }

    /// Prepares checklists for the current team without discarding answers.
    pub fn enter_checklist_flow(&mut self) -> Result<FlowEntry> {
        let entry = self
            .shift
            .enter_checklist_flow(&mut self.checklists, &self.templates, &self.team)?;
        match &entry {
            FlowEntry::ColdStart => {
                tracing::info!(members = self.team.len(), "checklists instantiated");
            }
            FlowEntry::Resumed { added } if !added.is_empty() => {
                tracing::info!(added = added.len(), "checklists added for new members");
            }
            FlowEntry::Resumed { .. } | FlowEntry::ShiftOpen => {}
        }
        Ok(entry)
    }

    /// Discards every checklist and answer and starts over from the templates.
    pub fn reinitialize_checklists(&mut self) -> Result<()> {
        self.checklists = Some(ChecklistSet::instantiate(&self.templates, &self.team)?);
        tracing::info!(members = self.team.len(), "checklists reinitialized");
        Ok(())
    }

    fn checklists_mut(&mut self, target: &ChecklistRef) -> Result<&mut ChecklistSet> {
        self.checklists
            .as_mut()
            .ok_or_else(|| ChecklistError::ChecklistNotFound(target.clone()).into())
    }

    /// Records or clears one answer.
    pub fn set_answer(
        &mut self,
        target: &ChecklistRef,
        category_id: &str,
        item_id: &str,
        answer: Option<Answer>,
    ) -> Result<()> {
        self.checklists_mut(target)?
            .set_answer(target, category_id, item_id, answer)?;
        tracing::debug!(checklist = %target, category = category_id, item = item_id, "answer set");
        Ok(())
    }

    /// Stores a photo read from `path` as the item's answer, replacing any
    /// earlier capture.
    pub fn capture_photo(
        &mut self,
        target: &ChecklistRef,
        category_id: &str,
        item_id: &str,
        path: &Path,
    ) -> Result<()> {
        // Resolve first so a bad target does not cost a file read.
        self.checklists_mut(target)?;
        let payload = photo::capture(path)?;
        self.set_answer(target, category_id, item_id, Some(Answer::Photo(payload)))
    }

    /// Submits a checklist. Every item must be answered.
    pub fn complete_checklist(&mut self, target: &ChecklistRef) -> Result<()> {
        let set = self.checklists_mut(target)?;
        let checklist = set
            .get(target)
            .ok_or_else(|| ChecklistError::ChecklistNotFound(target.clone()))?;
        if !checklist::is_complete(checklist) {
            return Err(ChecklistError::Incomplete {
                checklist: target.clone(),
                pending: checklist.pending_items(),
            }
            .into());
        }
        set.complete(target)?;
        tracing::info!(checklist = %target, "checklist completed");
        Ok(())
    }

    /// Checklists still blocking the shift from opening.
    #[must_use]
    pub fn pending_checklists(&self) -> Vec<ChecklistRef> {
        shift::pending_checklists(self.checklists.as_ref(), &self.team)
    }

    // Shift

    #[must_use]
    pub fn shift(&self) -> &Shift {
        &self.shift
    }

    pub fn open_shift(&mut self, now: Timestamp) -> Result<Transition> {
        Ok(self
            .shift
            .open(self.checklists.as_mut(), &self.team, now)?)
    }

    /// Closes the shift. Checklist answers stay readable until the next
    /// checklist flow or logout.
    pub fn close_shift(&mut self) -> Transition {
        self.shift.close()
    }

    // Works

    #[must_use]
    pub fn works(&self) -> &WorkStore {
        &self.works
    }

    pub fn add_point(&mut self, work_id: &WorkId, coordinate: Coordinate) -> Result<PointId> {
        Ok(self.works.add_point(work_id, coordinate)?)
    }

    pub fn remove_point(&mut self, work_id: &WorkId, point_id: &PointId) -> Result<()> {
        Ok(self.works.remove_point(work_id, point_id)?)
    }

    pub fn update_executed_data(
        &mut self,
        work_id: &WorkId,
        point_id: &PointId,
        data: PointData,
    ) -> Result<PointStatus> {
        Ok(self
            .works
            .update_point_data(work_id, point_id, DataView::Execution, data)?)
    }

    // Connectivity

    pub fn set_online(&mut self, online: bool) {
        self.sync.set_online(online);
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.sync.is_online()
    }

    /// Starts a manual sync. Returns `false` when offline.
    pub fn force_sync(&mut self, now: Timestamp) -> bool {
        self.sync.force_sync(now)
    }

    pub fn sync_status(&mut self, now: Timestamp) -> SyncStatus {
        self.sync.poll(now)
    }
}

//! Shift state machine: closed until every checklist is submitted.
//!
//! Opening requires the APR checklist and the individual checklist of every
//! current team member to be flagged completed with every item answered.
//! A member without a checklist blocks opening. Each set of checklists opens
//! at most one shift. Closing always succeeds and leaves checklist answers
//! in place until the next cycle starts.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::checklist::{self, ChecklistSet, ChecklistTemplates};
use crate::model::{ChecklistRef, MemberId, TeamMember};

#[derive(Debug, thiserror::Error)]
pub enum ShiftError {
    #[error("cannot open shift: {} checklist(s) pending ({})", .pending.len(), PendingList(.pending))]
    ChecklistsPending { pending: Vec<ChecklistRef> },
}

pub type Result<T> = core::result::Result<T, ShiftError>;

struct PendingList<'a>(&'a [ChecklistRef]);

impl fmt::Display for PendingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, target) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{target}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ShiftStatus {
    Closed,
    Open { opened_at: Timestamp },
}

/// Whether a transition request changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

/// What entering the pre-shift checklist flow did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEntry {
    /// No checklists existed; all were instantiated.
    ColdStart,

    /// Checklists already existed. Members listed here had none and got one.
    Resumed { added: Vec<MemberId> },

    /// The shift is open; checklists are not touched.
    ShiftOpen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    status: ShiftStatus,
}

impl Default for Shift {
    fn default() -> Self {
        Self {
            status: ShiftStatus::Closed,
        }
    }
}

impl Shift {
    #[must_use]
    pub fn status(&self) -> ShiftStatus {
        self.status
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.status, ShiftStatus::Open { .. })
    }

    /// Prepares checklists for opening.
    ///
    /// Instantiates the whole set when none exists or the existing one has
    /// already opened a shift. On re-entry within a cycle the existing answers
    /// are kept and only members lacking a checklist get one.
    pub fn enter_checklist_flow(
        &self,
        checklists: &mut Option<ChecklistSet>,
        templates: &ChecklistTemplates,
        team: &[TeamMember],
    ) -> checklist::Result<FlowEntry> {
        if self.is_open() {
            return Ok(FlowEntry::ShiftOpen);
        }
        match checklists {
            Some(set) if !set.is_consumed() => {
                let added = set.ensure_members(templates, team)?;
                Ok(FlowEntry::Resumed { added })
            }
            _ => {
                *checklists = Some(ChecklistSet::instantiate(templates, team)?);
                Ok(FlowEntry::ColdStart)
            }
        }
    }

    /// Opens the shift if every checklist is submitted, consuming the set.
    ///
    /// Opening an already open shift is a no-op.
    pub fn open(
        &mut self,
        checklists: Option<&mut ChecklistSet>,
        team: &[TeamMember],
        now: Timestamp,
    ) -> Result<Transition> {
        if self.is_open() {
            return Ok(Transition::Unchanged);
        }
        let pending = pending_checklists(checklists.as_deref(), team);
        if !pending.is_empty() {
            tracing::warn!(pending = pending.len(), "shift open blocked by checklists");
            return Err(ShiftError::ChecklistsPending { pending });
        }
        if let Some(set) = checklists {
            set.mark_consumed();
        }
        self.status = ShiftStatus::Open { opened_at: now };
        tracing::info!(members = team.len(), "shift opened");
        Ok(Transition::Changed)
    }

    pub fn close(&mut self) -> Transition {
        if !self.is_open() {
            return Transition::Unchanged;
        }
        self.status = ShiftStatus::Closed;
        tracing::info!("shift closed");
        Transition::Changed
    }
}

/// Checklists that still block opening, APR first, then members in team order.
///
/// Every checklist of a consumed set is pending.
#[must_use]
pub fn pending_checklists(
    checklists: Option<&ChecklistSet>,
    team: &[TeamMember],
) -> Vec<ChecklistRef> {
    let targets = std::iter::once(ChecklistRef::Apr)
        .chain(team.iter().map(|m| ChecklistRef::Member(m.id.clone())));
    match checklists {
        Some(set) if !set.is_consumed() => targets.filter(|t| !set.is_submitted(t)).collect(),
        _ => targets.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::model::{Answer, Category, Checklist, ChecklistItem, ItemKind, Role};

    fn template(id: &str, title: &str) -> Checklist {
        Checklist {
            id: id.into(),
            title: title.into(),
            completed: false,
            categories: vec![Category {
                id: "c1".into(),
                title: "General".into(),
                items: vec![ChecklistItem {
                    id: "i1".into(),
                    question: "Ready?".into(),
                    kind: ItemKind::Text,
                    answer: None,
                }],
            }],
        }
    }

    fn sample_templates() -> ChecklistTemplates {
        let mut individual = BTreeMap::new();
        individual.insert(Role::Lineworker, template("lineworker", "Lineworker"));
        ChecklistTemplates {
            apr: template("apr", "APR"),
            individual,
            default_role: Role::Lineworker,
        }
    }

    fn member(id: &str, role: Role) -> TeamMember {
        TeamMember {
            id: MemberId::from(id),
            name: format!("Member {id}"),
            document: id.into(),
            role,
        }
    }

    fn sample_team() -> Vec<TeamMember> {
        vec![member("u1", Role::Foreman), member("u2", Role::Lineworker)]
    }

    fn submit(set: &mut ChecklistSet, target: &ChecklistRef) {
        set.set_answer(target, "c1", "i1", Some(Answer::Text("yes".into())))
            .unwrap();
        set.complete(target).unwrap();
    }

    fn submitted_set(team: &[TeamMember]) -> ChecklistSet {
        let mut set = ChecklistSet::instantiate(&sample_templates(), team).unwrap();
        submit(&mut set, &ChecklistRef::Apr);
        for m in team {
            submit(&mut set, &ChecklistRef::Member(m.id.clone()));
        }
        set
    }

    #[test]
    fn cannot_open_without_checklists() {
        let mut shift = Shift::default();
        let err = shift.open(None, &sample_team(), Timestamp::now()).unwrap_err();
        let ShiftError::ChecklistsPending { pending } = err;
        assert_eq!(pending.len(), 3);
        assert!(!shift.is_open());
    }

    #[test]
    fn cannot_open_with_one_incomplete_member() {
        let team = sample_team();
        let mut set = ChecklistSet::instantiate(&sample_templates(), &team).unwrap();
        submit(&mut set, &ChecklistRef::Apr);
        submit(&mut set, &ChecklistRef::Member(MemberId::from("u1")));

        let mut shift = Shift::default();
        let err = shift.open(Some(&mut set), &team, Timestamp::now()).unwrap_err();
        let ShiftError::ChecklistsPending { pending } = err;
        assert_eq!(pending, vec![ChecklistRef::Member(MemberId::from("u2"))]);
        assert_eq!(shift.status(), ShiftStatus::Closed);
    }

    #[test]
    fn cannot_open_with_incomplete_apr() {
        let team = sample_team();
        let mut set = submitted_set(&team);
        set.apr.completed = false;

        let mut shift = Shift::default();
        assert!(shift.open(Some(&mut set), &team, Timestamp::now()).is_err());
    }

    #[test]
    fn member_added_after_instantiation_blocks_opening() {
        let mut team = sample_team();
        let mut set = submitted_set(&team);
        team.push(member("u3", Role::Driver));

        let mut shift = Shift::default();
        let err = shift.open(Some(&mut set), &team, Timestamp::now()).unwrap_err();
        let ShiftError::ChecklistsPending { pending } = err;
        assert_eq!(pending, vec![ChecklistRef::Member(MemberId::from("u3"))]);
    }

    #[test]
    fn opens_when_all_submitted_and_second_open_is_noop() {
        let team = sample_team();
        let mut set = submitted_set(&team);
        let mut shift = Shift::default();

        let first = shift.open(Some(&mut set), &team, Timestamp::now()).unwrap();
        let opened = shift.status();
        let second = shift.open(Some(&mut set), &team, Timestamp::now()).unwrap();

        assert_eq!(first, Transition::Changed);
        assert_eq!(second, Transition::Unchanged);
        assert_eq!(shift.status(), opened);
    }

    #[test]
    fn close_is_unconditional_and_idempotent() {
        let team = sample_team();
        let mut set = submitted_set(&team);
        let mut shift = Shift::default();
        shift.open(Some(&mut set), &team, Timestamp::now()).unwrap();

        assert_eq!(shift.close(), Transition::Changed);
        assert_eq!(shift.close(), Transition::Unchanged);
        assert!(!shift.is_open());
    }

    #[test]
    fn flow_cold_starts_once_then_resumes() {
        let templates = sample_templates();
        let team = sample_team();
        let shift = Shift::default();
        let mut slot = None;

        let first = shift
            .enter_checklist_flow(&mut slot, &templates, &team)
            .unwrap();
        assert_eq!(first, FlowEntry::ColdStart);

        let set = slot.as_mut().unwrap();
        set.set_answer(&ChecklistRef::Apr, "c1", "i1", Some(Answer::Text("x".into())))
            .unwrap();

        let second = shift
            .enter_checklist_flow(&mut slot, &templates, &team)
            .unwrap();
        assert_eq!(second, FlowEntry::Resumed { added: Vec::new() });
        assert!(checklist::is_complete(&slot.as_ref().unwrap().apr));
    }

    #[test]
    fn flow_is_skipped_while_open() {
        let team = sample_team();
        let mut set = submitted_set(&team);
        let mut shift = Shift::default();
        shift.open(Some(&mut set), &team, Timestamp::now()).unwrap();

        let mut slot = None;
        let entry = shift
            .enter_checklist_flow(&mut slot, &sample_templates(), &team)
            .unwrap();
        assert_eq!(entry, FlowEntry::ShiftOpen);
        assert!(slot.is_none());
    }

    #[test]
    fn opened_set_is_consumed_for_the_next_cycle() {
        let templates = sample_templates();
        let team = sample_team();
        let mut shift = Shift::default();
        let mut slot = Some(submitted_set(&team));

        shift.open(slot.as_mut(), &team, Timestamp::now()).unwrap();
        shift.close();
        let set = slot.as_ref().unwrap();
        assert!(set.is_consumed());
        assert!(set.is_submitted(&ChecklistRef::Apr));
        assert_eq!(pending_checklists(slot.as_ref(), &team).len(), 3);
        assert!(shift.open(slot.as_mut(), &team, Timestamp::now()).is_err());

        let entry = shift
            .enter_checklist_flow(&mut slot, &templates, &team)
            .unwrap();
        assert_eq!(entry, FlowEntry::ColdStart);
        let fresh = slot.as_ref().unwrap();
        assert!(!fresh.is_consumed());
        assert!(!fresh.apr.completed);
    }

    #[test]
    fn pending_error_lists_targets() {
        let err = ShiftError::ChecklistsPending {
            pending: vec![ChecklistRef::Apr, ChecklistRef::Member(MemberId::from("u2"))],
        };
        assert_eq!(
            err.to_string(),
            "cannot open shift: 2 checklist(s) pending (apr, u2)"
        );
    }
}

//! Checklist engine: instantiating checklists from templates, recording
//! answers, and deciding completeness.
//!
//! A session holds one [`ChecklistSet`]: the shared APR checklist plus one
//! individual checklist per team member. Every checklist in the set is an
//! independent clone of its template, so answering one never touches the
//! template or any other member's copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Answer, Checklist, ChecklistRef, MemberId, Role, TeamMember};

#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    #[error("checklist not found: {0}")]
    ChecklistNotFound(ChecklistRef),

    #[error("category not found: {category} (in checklist {checklist})")]
    CategoryNotFound {
        checklist: ChecklistRef,
        category: String,
    },

    #[error("item not found: {item} (in category {category} of checklist {checklist})")]
    ItemNotFound {
        checklist: ChecklistRef,
        category: String,
        item: String,
    },

    #[error("no checklist template for role {0} and no default template")]
    MissingTemplate(Role),

    #[error("checklist {checklist} has {pending} unanswered item(s)")]
    Incomplete {
        checklist: ChecklistRef,
        pending: usize,
    },
}

pub type Result<T> = core::result::Result<T, ChecklistError>;

/// Templates every session instantiates its checklists from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChecklistTemplates {
    /// The shared pre-shift vehicle and safety checklist.
    pub apr: Checklist,

    /// Individual checklists keyed by role.
    pub individual: BTreeMap<Role, Checklist>,

    /// Role whose template is used when a member's role has none.
    pub default_role: Role,
}

impl ChecklistTemplates {
    /// The template for `role`, falling back to the default role's template.
    #[must_use]
    pub fn template_for(&self, role: Role) -> Option<&Checklist> {
        self.individual
            .get(&role)
            .or_else(|| self.individual.get(&self.default_role))
    }

    /// A fresh individual checklist for one member.
    ///
    /// The id becomes the member id and the title gains the member's first name.
    pub fn instantiate_for(&self, member: &TeamMember) -> Result<Checklist> {
        let template = self
            .template_for(member.role)
            .ok_or(ChecklistError::MissingTemplate(member.role))?;
        let mut checklist = template.clone();
        checklist.id = member.id.to_string();
        checklist.title = format!("{} - {}", template.title, member.first_name());
        Ok(checklist)
    }
}

/// The checklists of one shift cycle.
///
/// A set that has opened a shift is consumed: its answers stay readable,
/// but it no longer gates a later opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistSet {
    pub apr: Checklist,
    pub individual: BTreeMap<MemberId, Checklist>,
    #[serde(default)]
    consumed: bool,
}

impl ChecklistSet {
    /// Clones the APR template and one individual template per member.
    pub fn instantiate(templates: &ChecklistTemplates, team: &[TeamMember]) -> Result<Self> {
        let mut individual = BTreeMap::new();
        for member in team {
            individual.insert(member.id.clone(), templates.instantiate_for(member)?);
        }
        Ok(Self {
            apr: templates.apr.clone(),
            individual,
            consumed: false,
        })
    }

    /// Whether this set has already been used to open a shift.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub(crate) fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    /// Adds checklists for members that do not have one yet.
    ///
    /// Existing checklists, and their answers, are left alone.
    /// Returns the members that received a new checklist.
    pub fn ensure_members(
        &mut self,
        templates: &ChecklistTemplates,
        team: &[TeamMember],
    ) -> Result<Vec<MemberId>> {
        let mut added = Vec::new();
        for member in team {
            if self.individual.contains_key(&member.id) {
                continue;
            }
            let checklist = templates.instantiate_for(member)?;
            self.individual.insert(member.id.clone(), checklist);
            added.push(member.id.clone());
        }
        Ok(added)
    }

    #[must_use]
    pub fn get(&self, target: &ChecklistRef) -> Option<&Checklist> {
        match target {
            ChecklistRef::Apr => Some(&self.apr),
            ChecklistRef::Member(id) => self.individual.get(id),
        }
    }

    fn get_mut(&mut self, target: &ChecklistRef) -> Result<&mut Checklist> {
        match target {
            ChecklistRef::Apr => Ok(&mut self.apr),
            ChecklistRef::Member(id) => self
                .individual
                .get_mut(id)
                .ok_or_else(|| ChecklistError::ChecklistNotFound(target.clone())),
        }
    }

    /// Replaces one item's answer. `None` clears it and withdraws the
    /// checklist's completion flag.
    ///
    /// Nothing changes when the checklist, category or item does not resolve.
    pub fn set_answer(
        &mut self,
        target: &ChecklistRef,
        category_id: &str,
        item_id: &str,
        answer: Option<Answer>,
    ) -> Result<()> {
        let checklist = self.get_mut(target)?;
        let category = checklist
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| ChecklistError::CategoryNotFound {
                checklist: target.clone(),
                category: category_id.to_string(),
            })?;
        let item = category
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| ChecklistError::ItemNotFound {
                checklist: target.clone(),
                category: category_id.to_string(),
                item: item_id.to_string(),
            })?;
        let cleared = answer.is_none();
        item.answer = answer;
        if cleared {
            checklist.completed = false;
        }
        Ok(())
    }

    /// Sets the completion flag without looking at the answers.
    ///
    /// Callers check [`is_complete`] first.
    pub fn complete(&mut self, target: &ChecklistRef) -> Result<()> {
        self.get_mut(target)?.completed = true;
        Ok(())
    }

    /// Whether `target` exists, is flagged completed, and has every item answered.
    #[must_use]
    pub fn is_submitted(&self, target: &ChecklistRef) -> bool {
        self.get(target)
            .is_some_and(|c| c.completed && is_complete(c))
    }
}

/// True iff no item in any category is unanswered.
#[must_use]
pub fn is_complete(checklist: &Checklist) -> bool {
    checklist.items().all(|item| item.answer.is_some())
}

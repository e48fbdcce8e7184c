//! The catalog: roster, vehicles, works and checklist templates a session
//! starts from.
//!
//! The catalog is opaque configuration data. A sample ships with the binary;
//! a JSON file with the same shape can replace it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checklist::ChecklistTemplates;
use crate::model::{MemberId, TeamMember, Vehicle, Work};
use crate::team;

const BUILTIN: &str = include_str!("../data/catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Invalid(String),
}

pub type Result<T> = core::result::Result<T, CatalogError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    /// Roster id of the user who logs in.
    pub user: MemberId,

    /// Everyone who can be put on a team.
    pub roster: Vec<TeamMember>,

    /// Roster ids of the initial team.
    pub team: Vec<MemberId>,

    pub vehicles: Vec<Vehicle>,

    /// Id of the initially assigned vehicle.
    #[serde(default)]
    pub vehicle: Option<String>,

    pub works: Vec<Work>,
    pub checklists: ChecklistTemplates,
}

impl Catalog {
    /// The sample catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    /// Loads and validates a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), works = catalog.works.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The roster member with the given id.
    #[must_use]
    pub fn member(&self, id: &MemberId) -> Option<&TeamMember> {
        self.roster.iter().find(|m| &m.id == id)
    }

    /// The initial team, resolved against the roster.
    #[must_use]
    pub fn initial_team(&self) -> Vec<TeamMember> {
        self.team
            .iter()
            .filter_map(|id| self.member(id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn initial_vehicle(&self) -> Option<&Vehicle> {
        let id = self.vehicle.as_ref()?;
        self.vehicles.iter().find(|v| &v.id == id)
    }

    fn validate(&self) -> Result<()> {
        let mut members = HashSet::new();
        for member in &self.roster {
            if !members.insert(&member.id) {
                return invalid(format!("duplicate roster member {}", member.id));
            }
        }
        if self.member(&self.user).is_none() {
            return invalid(format!("user {} is not in the roster", self.user));
        }
        if let Some(id) = self.team.iter().find(|id| self.member(id).is_none()) {
            return invalid(format!("team member {id} is not in the roster"));
        }
        team::validate(&self.initial_team())
            .map_err(|e| CatalogError::Invalid(format!("initial team: {e}")))?;
        if let Some(id) = &self.vehicle
            && !self.vehicles.iter().any(|v| &v.id == id)
        {
            return invalid(format!("vehicle {id} is not available"));
        }
        if !self
            .checklists
            .individual
            .contains_key(&self.checklists.default_role)
        {
            return invalid(format!(
                "no individual template for default role {}",
                self.checklists.default_role
            ));
        }
        let mut works = HashSet::new();
        for work in &self.works {
            if !works.insert(&work.id) {
                return invalid(format!("duplicate work {}", work.id));
            }
            let mut ids = HashSet::new();
            let mut numbers = HashSet::new();
            for point in &work.points {
                if !ids.insert(&point.id) {
                    return invalid(format!("duplicate point {} in work {}", point.id, work.id));
                }
                if !numbers.insert(point.number) {
                    return invalid(format!(
                        "duplicate point number {} in work {}",
                        point.number, work.id
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid<T>(message: String) -> Result<T> {
    Err(CatalogError::Invalid(message))
}

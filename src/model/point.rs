//! Project points and the five facets of point data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::PointId;

/// A point on the network design: usually a pole position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPoint {
    pub id: PointId,

    /// Sequential number, unique within its work.
    pub number: u32,

    pub coordinate: Coordinate,
    pub status: PointStatus,

    /// The design. Read-only in the field.
    #[serde(default)]
    pub budgeted_data: PointData,

    /// What was actually installed or observed.
    #[serde(default)]
    pub executed_data: PointData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Where a point stands relative to its design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointStatus {
    /// Added in the field; never part of the design.
    New,

    /// Designed, not yet executed.
    Budgeted,

    /// Executed as designed.
    Executed,

    /// Executed with divergence from the design. Nothing assigns this yet.
    Modified,
}

impl PointStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Budgeted => "budgeted",
            Self::Executed => "executed",
            Self::Modified => "modified",
        }
    }
}

/// A snapshot of everything recorded about a point.
///
/// Each facet is independent and absent until recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointData {
    pub pole: Option<Pole>,
    pub grounding: Option<Grounding>,
    pub arrestor: Option<Arrestor>,
    pub equipment: Vec<Equipment>,
    pub pruning: Option<Pruning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pole {
    /// Pole ground identifier stamped on the pole.
    pub ground_id: String,

    /// Height and load rating, e.g. `12/300`.
    pub height_load: String,

    pub structure: Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub kind: StructureKind,
    pub variation: StructureVariation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureKind {
    N1,
    N3,
    U3,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureVariation {
    TwoPhase,
    ThreePhase,
    TwoToThreePhaseTransition,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grounding {
    pub present: bool,
    pub kind: Option<GroundingKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroundingKind {
    Internal,
    External,
}

/// Lightning arrestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrestor {
    pub present: bool,
    pub phases: Option<ArrestorPhases>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrestorPhases {
    TwoPhase,
    ThreePhase,
}

/// One installed equipment instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub kind: EquipmentKind,
    pub plate: String,
    pub company_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuse_link: Option<String>,
    /// Power and phases, e.g. `15kVA single-phase`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentKind {
    KnifeSwitch,
    FuseCutout,
    Transformer,
}

/// Vegetation pruning around the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pruning {
    pub performed: bool,
    pub severity: Option<PruningSeverity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PruningSeverity {
    Light,
    Medium,
    Heavy,
}

/// One of the five facets of [`PointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Pole,
    Grounding,
    Arrestor,
    Equipment,
    Pruning,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Self::Pole,
        Self::Grounding,
        Self::Arrestor,
        Self::Equipment,
        Self::Pruning,
    ];
}

/// What kind of visit a [`PointData`] snapshot records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    Empty,

    /// Only pruning was performed.
    Pruning,

    /// Pole, grounding, arrestor or equipment recorded.
    Hardware,

    /// Both pruning and hardware. The editing surface never produces this,
    /// but stored data may carry it.
    Mixed,
}

impl PointData {
    /// Whether this snapshot counts as execution for status derivation:
    /// pruning performed, a pole ground id recorded, or any equipment.
    #[must_use]
    pub fn has_execution(&self) -> bool {
        self.pruning.is_some_and(|p| p.performed)
            || self.pole.as_ref().is_some_and(|p| !p.ground_id.is_empty())
            || !self.equipment.is_empty()
    }

    fn pruning_performed(&self) -> bool {
        self.pruning.is_some_and(|p| p.performed)
    }

    fn has_hardware(&self) -> bool {
        self.pole.is_some()
            || self.grounding.is_some()
            || self.arrestor.is_some()
            || !self.equipment.is_empty()
    }

    #[must_use]
    pub fn observation_kind(&self) -> ObservationKind {
        match (self.pruning_performed(), self.has_hardware()) {
            (false, false) => ObservationKind::Empty,
            (true, false) => ObservationKind::Pruning,
            (false, true) => ObservationKind::Hardware,
            (true, true) => ObservationKind::Mixed,
        }
    }

    /// Whether a facet may be edited given what is already recorded.
    ///
    /// A pruning visit locks the hardware facets; any hardware locks pruning.
    #[must_use]
    pub fn facet_available(&self, facet: Facet) -> bool {
        match facet {
            Facet::Pruning => !self.has_hardware(),
            Facet::Pole | Facet::Grounding | Facet::Arrestor | Facet::Equipment => {
                !self.pruning_performed()
            }
        }
    }
}

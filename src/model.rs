//! Core data model for linecrew.
//!
//! These types describe what a field crew works with during a shift:
//! team members and vehicles, safety checklists, and works made of
//! project points with budgeted and executed data.

mod checklist;
mod ids;
mod point;
mod team;
mod work;

pub use checklist::{Answer, Category, Checklist, ChecklistItem, ItemKind, PhotoPayload};
pub use ids::{ChecklistRef, ExtensionId, MemberId, PointId, WorkId};
pub use point::{
    Arrestor, ArrestorPhases, Coordinate, Equipment, EquipmentKind, Facet, Grounding,
    GroundingKind, ObservationKind, Pole, PointData, PointStatus, ProjectPoint, Pruning,
    PruningSeverity, Structure, StructureKind, StructureVariation,
};
pub use team::{Role, TeamMember, User, Vehicle};
pub use work::{ExtensionStatus, NetworkExtension, Voltage, Work, WorkPriority, WorkStatus};

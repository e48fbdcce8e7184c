//! Work orders: points on the network design and the extensions between them.

use std::sync::Arc;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{ExtensionId, PointId, PointStatus, ProjectPoint, WorkId};

/// A work order assigned to the crew.
///
/// Points are shared through `Arc` so that a snapshot of the work can be
/// rebuilt around one changed point while every other point keeps its
/// identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: WorkId,
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub scheduled_date: Date,
    pub status: WorkStatus,
    pub priority: WorkPriority,

    /// Percentage of design points executed. Derived; see [`Work::compute_progress`].
    #[serde(default)]
    pub progress: u8,

    #[serde(default)]
    pub points: Vec<Arc<ProjectPoint>>,

    #[serde(default)]
    pub extensions: Vec<NetworkExtension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    InProgress,
    Programmed,
    Paused,
    Completed,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 4] = [
        Self::InProgress,
        Self::Programmed,
        Self::Paused,
        Self::Completed,
    ];

    /// Position in the works list: active work first, finished work last.
    #[must_use]
    pub fn sort_rank(self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Programmed => 1,
            Self::Paused => 2,
            Self::Completed => 3,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Programmed => "programmed",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl WorkPriority {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A cable run between two points of the same work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkExtension {
    pub id: ExtensionId,

    /// May dangle once its point is removed.
    pub from_point_id: PointId,

    /// May dangle once its point is removed.
    pub to_point_id: PointId,

    pub cable_type: String,

    /// Length in meters.
    pub length: f64,

    pub status: ExtensionStatus,
    pub voltage: Voltage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtensionStatus {
    Budgeted,
    Executed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Voltage {
    High,
    Low,
}

impl Work {
    #[must_use]
    pub fn point(&self, id: &PointId) -> Option<&ProjectPoint> {
        self.points.iter().find(|p| &p.id == id).map(AsRef::as_ref)
    }

    /// The number a newly added point receives: one past the highest, or 1.
    /// `None` once the highest number is `u32::MAX`.
    #[must_use]
    pub fn next_point_number(&self) -> Option<u32> {
        match self.points.iter().map(|p| p.number).max() {
            Some(n) => n.checked_add(1),
            None => Some(1),
        }
    }

    /// Percentage of design points (anything not added in the field) that
    /// have been executed, rounded down. Zero when there are none.
    #[must_use]
    pub fn compute_progress(&self) -> u8 {
        let designed = self
            .points
            .iter()
            .filter(|p| p.status != PointStatus::New)
            .count();
        if designed == 0 {
            return 0;
        }
        let done = self
            .points
            .iter()
            .filter(|p| matches!(p.status, PointStatus::Executed | PointStatus::Modified))
            .count();
        u8::try_from(done * 100 / designed).unwrap_or(100)
    }

    /// Extensions whose endpoints both resolve, paired with those endpoints.
    ///
    /// Extensions left dangling by a removed point are skipped.
    pub fn drawable_extensions(
        &self,
    ) -> impl Iterator<Item = (&NetworkExtension, &ProjectPoint, &ProjectPoint)> {
        self.extensions.iter().filter_map(|ext| {
            let from = self.point(&ext.from_point_id)?;
            let to = self.point(&ext.to_point_id)?;
            Some((ext, from, to))
        })
    }

    /// Extensions referencing at least one point that no longer exists.
    pub fn dangling_extensions(&self) -> impl Iterator<Item = &NetworkExtension> {
        self.extensions.iter().filter(|ext| {
            self.point(&ext.from_point_id).is_none() || self.point(&ext.to_point_id).is_none()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Coordinate, PointData};

    fn point(id: &str, number: u32, status: PointStatus) -> Arc<ProjectPoint> {
        Arc::new(ProjectPoint {
            id: PointId::from(id),
            number,
            coordinate: Coordinate {
                lat: -7.88,
                lng: -40.08,
            },
            status,
            budgeted_data: PointData::default(),
            executed_data: PointData::default(),
        })
    }

    fn extension(id: &str, from: &str, to: &str) -> NetworkExtension {
        NetworkExtension {
            id: ExtensionId::from(id),
            from_point_id: PointId::from(from),
            to_point_id: PointId::from(to),
            cable_type: "35mm".into(),
            length: 50.0,
            status: ExtensionStatus::Budgeted,
            voltage: Voltage::High,
        }
    }

    fn sample_work(points: Vec<Arc<ProjectPoint>>) -> Work {
        Work {
            id: WorkId::from("work1"),
            code: "WO-001".into(),
            name: "Downtown expansion".into(),
            address: "Main Ave".into(),
            city: "Ouricuri".into(),
            scheduled_date: Date::constant(2026, 10, 16),
            status: WorkStatus::InProgress,
            priority: WorkPriority::High,
            progress: 0,
            points,
            extensions: Vec::new(),
        }
    }

    #[test]
    fn next_number_skips_past_gaps() {
        let work = sample_work(vec![
            point("a", 1, PointStatus::Budgeted),
            point("b", 2, PointStatus::Budgeted),
            point("c", 4, PointStatus::Budgeted),
        ]);
        assert_eq!(work.next_point_number(), Some(5));
    }

    #[test]
    fn next_number_on_empty_work_is_one() {
        assert_eq!(sample_work(Vec::new()).next_point_number(), Some(1));
    }

    #[test]
    fn no_next_number_after_max() {
        let work = sample_work(vec![point("a", u32::MAX, PointStatus::Budgeted)]);
        assert_eq!(work.next_point_number(), None);
    }

    #[test]
    fn progress_ignores_field_added_points() {
        let work = sample_work(vec![
            point("a", 1, PointStatus::Executed),
            point("b", 2, PointStatus::Budgeted),
            point("c", 3, PointStatus::Budgeted),
            point("d", 4, PointStatus::New),
        ]);
        assert_eq!(work.compute_progress(), 33);
    }

    #[test]
    fn progress_without_design_points_is_zero() {
        let work = sample_work(vec![point("a", 1, PointStatus::New)]);
        assert_eq!(work.compute_progress(), 0);
    }

    #[test]
    fn dangling_extensions_are_not_drawable() {
        let mut work = sample_work(vec![
            point("a", 1, PointStatus::Budgeted),
            point("b", 2, PointStatus::Budgeted),
        ]);
        work.extensions = vec![extension("e1", "a", "b"), extension("e2", "b", "gone")];

        let drawable: Vec<_> = work.drawable_extensions().map(|(e, _, _)| e.id.clone()).collect();
        assert_eq!(drawable, vec![ExtensionId::from("e1")]);

        let dangling: Vec<_> = work.dangling_extensions().map(|e| e.id.clone()).collect();
        assert_eq!(dangling, vec![ExtensionId::from("e2")]);
    }
}

//! Work point store: the crew's works and the points recorded against them.
//!
//! Works are held as immutable `Arc` snapshots. A mutation clones the one
//! affected work, applies the change to the clone, and swaps the new
//! snapshot in. Every other work, and every untouched point inside the
//! changed work, keeps its identity, so observers can detect change with
//! [`Arc::ptr_eq`].

use std::sync::Arc;

use jiff::civil::Date;

use crate::model::{
    Coordinate, PointData, PointId, PointStatus, ProjectPoint, Work, WorkId, WorkStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    #[error("work not found: {0}")]
    WorkNotFound(WorkId),

    #[error("point not found: {point} (in work {work})")]
    PointNotFound { work: WorkId, point: PointId },

    #[error("duplicate work id: {0}")]
    DuplicateWork(WorkId),

    #[error("budgeted data is read-only: {point} (in work {work})")]
    BudgetedReadOnly { work: WorkId, point: PointId },

    #[error("no point numbers left in work {0}")]
    PointNumbersExhausted(WorkId),
}

pub type Result<T> = core::result::Result<T, WorkError>;

/// Owns every work in the session.
#[derive(Debug, Clone, Default)]
pub struct WorkStore {
    works: Vec<Arc<Work>>,
}

impl WorkStore {
    /// Builds a store, deriving each work's progress.
    pub fn new(works: Vec<Work>) -> Result<Self> {
        let mut store = Self::default();
        for mut work in works {
            if store.index_of(&work.id).is_ok() {
                return Err(WorkError::DuplicateWork(work.id));
            }
            work.progress = work.compute_progress();
            store.works.push(Arc::new(work));
        }
        Ok(store)
    }

    /// Current snapshots, in load order.
    #[must_use]
    pub fn works(&self) -> &[Arc<Work>] {
        &self.works
    }

    #[must_use]
    pub fn work(&self, id: &WorkId) -> Option<&Arc<Work>> {
        self.works.iter().find(|w| &w.id == id)
    }

    fn index_of(&self, id: &WorkId) -> Result<usize> {
        self.works
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| WorkError::WorkNotFound(id.clone()))
    }

    /// Applies `recipe` to a copy of one work and publishes the copy.
    ///
    /// If the recipe fails the published snapshot is left as it was.
    fn produce<T>(
        &mut self,
        work_id: &WorkId,
        recipe: impl FnOnce(&mut Work) -> Result<T>,
    ) -> Result<T> {
        let index = self.index_of(work_id)?;
        let mut draft = Work::clone(&self.works[index]);
        let output = recipe(&mut draft)?;
        draft.progress = draft.compute_progress();
        self.works[index] = Arc::new(draft);
        Ok(output)
    }

    /// Appends a field-added point numbered one past the highest existing number.
    pub fn add_point(&mut self, work_id: &WorkId, coordinate: Coordinate) -> Result<PointId> {
        self.produce(work_id, |work| {
            let number = work
                .next_point_number()
                .ok_or_else(|| WorkError::PointNumbersExhausted(work.id.clone()))?;
            let point = ProjectPoint {
                id: PointId::generate(),
                number,
                coordinate,
                status: PointStatus::New,
                budgeted_data: PointData::default(),
                executed_data: PointData::default(),
            };
            let id = point.id.clone();
            tracing::info!(work = %work.id, point = %id, number = point.number, "point added");
            work.points.push(Arc::new(point));
            Ok(id)
        })
    }

    /// Removes a point. Extensions referencing it are kept and will dangle.
    pub fn remove_point(&mut self, work_id: &WorkId, point_id: &PointId) -> Result<()> {
        self.produce(work_id, |work| {
            let index = point_index(work, point_id)?;
            let removed = work.points.remove(index);
            let dangling = work.dangling_extensions().count();
            tracing::info!(
                work = %work.id,
                point = %removed.id,
                dangling_extensions = dangling,
                "point removed"
            );
            Ok(())
        })
    }

    /// Replaces a point's executed data wholesale and re-derives its status.
    ///
    /// Returns the point's new status.
    pub fn update_executed_data(
        &mut self,
        work_id: &WorkId,
        point_id: &PointId,
        data: PointData,
    ) -> Result<PointStatus> {
        self.produce(work_id, |work| {
            let index = point_index(work, point_id)?;
            let mut point = ProjectPoint::clone(&work.points[index]);
            let previous = point.status;
            point.status = derive_status(previous, &data);
            point.executed_data = data;
            tracing::info!(
                work = %work.id,
                point = %point.id,
                from = previous.label(),
                to = point.status.label(),
                "executed data updated"
            );
            let status = point.status;
            work.points[index] = Arc::new(point);
            Ok(status)
        })
    }

    /// One of a point's two data snapshots.
    pub fn point_data(
        &self,
        work_id: &WorkId,
        point_id: &PointId,
        view: DataView,
    ) -> Result<&PointData> {
        let work = self
            .work(work_id)
            .ok_or_else(|| WorkError::WorkNotFound(work_id.clone()))?;
        let point = &work.points[point_index(work, point_id)?];
        Ok(match view {
            DataView::Budgeted => &point.budgeted_data,
            DataView::Execution => &point.executed_data,
        })
    }

    /// Writes through `view`. Only the execution view is editable.
    pub fn update_point_data(
        &mut self,
        work_id: &WorkId,
        point_id: &PointId,
        view: DataView,
        data: PointData,
    ) -> Result<PointStatus> {
        match view {
            DataView::Execution => self.update_executed_data(work_id, point_id, data),
            DataView::Budgeted => Err(WorkError::BudgetedReadOnly {
                work: work_id.clone(),
                point: point_id.clone(),
            }),
        }
    }

    /// Works matching `query`, ordered by status rank and otherwise in load order.
    #[must_use]
    pub fn search(&self, query: &WorkQuery) -> Vec<Arc<Work>> {
        let mut found: Vec<Arc<Work>> = self
            .works
            .iter()
            .filter(|w| query.matches(w))
            .cloned()
            .collect();
        found.sort_by_key(|w| w.status.sort_rank());
        found
    }

    #[must_use]
    pub fn count_by_status(&self, status: WorkStatus) -> usize {
        self.works.iter().filter(|w| w.status == status).count()
    }

    /// Works scheduled on the given day.
    #[must_use]
    pub fn scheduled_on(&self, date: Date) -> Vec<Arc<Work>> {
        self.works
            .iter()
            .filter(|w| w.scheduled_date == date)
            .cloned()
            .collect()
    }
}

fn point_index(work: &Work, point_id: &PointId) -> Result<usize> {
    work.points
        .iter()
        .position(|p| &p.id == point_id)
        .ok_or_else(|| WorkError::PointNotFound {
            work: work.id.clone(),
            point: point_id.clone(),
        })
}

/// The status a point takes after its executed data becomes `data`.
///
/// A budgeted point with execution becomes executed. A field-added point
/// stays new however much is recorded on it. Data without execution leaves
/// the status alone. Nothing here produces `Modified`.
#[must_use]
pub fn derive_status(current: PointStatus, data: &PointData) -> PointStatus {
    if !data.has_execution() {
        return current;
    }
    match current {
        PointStatus::New => PointStatus::New,
        PointStatus::Budgeted | PointStatus::Executed | PointStatus::Modified => {
            PointStatus::Executed
        }
    }
}

/// Which of a point's snapshots is being looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataView {
    /// The planned configuration. Read-only in the field.
    Budgeted,
    Execution,
}

impl DataView {
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Execution)
    }
}

/// Free-text search plus an optional status filter.
#[derive(Debug, Clone, Default)]
pub struct WorkQuery {
    /// Case-insensitive substring of name, code or address. Empty matches all.
    pub text: String,
    pub status: Option<WorkStatus>,
}

impl WorkQuery {
    #[must_use]
    pub fn matches(&self, work: &Work) -> bool {
        let needle = self.text.to_lowercase();
        let text_matches = [&work.name, &work.code, &work.address]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        let status_matches = self.status.is_none_or(|s| s == work.status);
        text_matches && status_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{
        Equipment, EquipmentKind, ExtensionId, ExtensionStatus, NetworkExtension, Pole, Pruning,
        Structure, StructureKind, StructureVariation, Voltage, WorkPriority,
    };

    fn point(id: &str, number: u32, status: PointStatus) -> Arc<ProjectPoint> {
        Arc::new(ProjectPoint {
            id: PointId::from(id),
            number,
            coordinate: Coordinate {
                lat: -7.8819,
                lng: -40.0835,
            },
            status,
            budgeted_data: PointData::default(),
            executed_data: PointData::default(),
        })
    }

    fn sample_work(id: &str, status: WorkStatus, points: Vec<Arc<ProjectPoint>>) -> Work {
        Work {
            id: WorkId::from(id),
            code: format!("WO-{id}"),
            name: format!("Network expansion {id}"),
            address: "Main Ave".into(),
            city: "Ouricuri".into(),
            scheduled_date: Date::constant(2026, 10, 16),
            status,
            priority: WorkPriority::Medium,
            progress: 0,
            points,
            extensions: Vec::new(),
        }
    }

    fn sample_store() -> WorkStore {
        let mut work1 = sample_work(
            "work1",
            WorkStatus::InProgress,
            vec![
                point("pt1", 1, PointStatus::Executed),
                point("pt2", 2, PointStatus::Budgeted),
                point("pt4", 4, PointStatus::New),
            ],
        );
        work1.extensions = vec![NetworkExtension {
            id: ExtensionId::from("ext1"),
            from_point_id: PointId::from("pt1"),
            to_point_id: PointId::from("pt2"),
            cable_type: "35mm".into(),
            length: 50.0,
            status: ExtensionStatus::Executed,
            voltage: Voltage::High,
        }];
        let work2 = sample_work("work2", WorkStatus::Programmed, Vec::new());
        WorkStore::new(vec![work1, work2]).unwrap()
    }

    fn equipment_data() -> PointData {
        PointData {
            equipment: vec![Equipment {
                id: "eq1".into(),
                kind: EquipmentKind::Transformer,
                plate: "TR-001".into(),
                company_code: "C-002".into(),
                fuse_link: Some("15K".into()),
                rating: Some("30kVA three-phase".into()),
                quantity: 1,
            }],
            ..PointData::default()
        }
    }

    fn work1(store: &WorkStore) -> &Arc<Work> {
        store.work(&WorkId::from("work1")).unwrap()
    }

    #[test]
    fn new_store_derives_progress() {
        let store = sample_store();
        assert_eq!(work1(&store).progress, 50);
    }

    #[test]
    fn duplicate_work_ids_are_rejected() {
        let a = sample_work("w", WorkStatus::Paused, Vec::new());
        let b = sample_work("w", WorkStatus::Paused, Vec::new());
        assert!(matches!(
            WorkStore::new(vec![a, b]),
            Err(WorkError::DuplicateWork(_))
        ));
    }

    #[test]
    fn add_point_takes_next_number_after_max() {
        let mut store = sample_store();
        let id = store
            .add_point(&WorkId::from("work1"), Coordinate { lat: 1.0, lng: 2.0 })
            .unwrap();

        let work = work1(&store);
        let added = work.point(&id).unwrap();
        assert_eq!(added.number, 5);
        assert_eq!(added.status, PointStatus::New);
        assert_eq!(added.executed_data, PointData::default());
        assert_eq!(added.budgeted_data, PointData::default());
        assert_eq!(work.points.last().unwrap().id, id);
    }

    #[test]
    fn add_point_on_empty_work_is_number_one() {
        let mut store = sample_store();
        let id = store
            .add_point(&WorkId::from("work2"), Coordinate { lat: 0.0, lng: 0.0 })
            .unwrap();
        let work = store.work(&WorkId::from("work2")).unwrap();
        assert_eq!(work.point(&id).unwrap().number, 1);
    }

    #[test]
    fn add_point_to_unknown_work_changes_nothing() {
        let mut store = sample_store();
        let before: Vec<_> = store.works().to_vec();

        let err = store
            .add_point(&WorkId::from("nope"), Coordinate { lat: 0.0, lng: 0.0 })
            .unwrap_err();

        assert!(matches!(err, WorkError::WorkNotFound(_)));
        for (old, new) in before.iter().zip(store.works()) {
            assert!(Arc::ptr_eq(old, new));
        }
    }

    #[test]
    fn add_point_past_max_number_is_refused() {
        let work = sample_work(
            "full",
            WorkStatus::InProgress,
            vec![point("last", u32::MAX, PointStatus::Budgeted)],
        );
        let mut store = WorkStore::new(vec![work]).unwrap();
        let id = WorkId::from("full");
        let before = Arc::clone(store.work(&id).unwrap());

        let err = store
            .add_point(&id, Coordinate { lat: 0.0, lng: 0.0 })
            .unwrap_err();

        assert!(matches!(err, WorkError::PointNumbersExhausted(ref w) if *w == id));
        let after = store.work(&id).unwrap();
        assert!(Arc::ptr_eq(&before, after));
        assert_eq!(after.points.len(), 1);
    }

    #[test]
    fn budgeted_point_with_equipment_becomes_executed() {
        let mut store = sample_store();
        let status = store
            .update_executed_data(&WorkId::from("work1"), &PointId::from("pt2"), equipment_data())
            .unwrap();

        assert_eq!(status, PointStatus::Executed);
        let work = work1(&store);
        assert_eq!(work.point(&PointId::from("pt2")).unwrap().executed_data, equipment_data());
        assert_eq!(work.progress, 100);
    }

    #[test]
    fn new_point_with_data_stays_new() {
        let mut store = sample_store();
        let status = store
            .update_executed_data(&WorkId::from("work1"), &PointId::from("pt4"), equipment_data())
            .unwrap();
        assert_eq!(status, PointStatus::New);
    }

    #[test]
    fn data_without_execution_keeps_status() {
        let mut store = sample_store();
        let data = PointData {
            pole: Some(Pole {
                ground_id: String::new(),
                height_load: "12/300".into(),
                structure: Structure {
                    kind: StructureKind::U3,
                    variation: StructureVariation::NotApplicable,
                },
            }),
            ..PointData::default()
        };
        let status = store
            .update_executed_data(&WorkId::from("work1"), &PointId::from("pt2"), data.clone())
            .unwrap();

        assert_eq!(status, PointStatus::Budgeted);
        // The data is still replaced.
        assert_eq!(
            work1(&store).point(&PointId::from("pt2")).unwrap().executed_data,
            data
        );
    }

    #[test]
    fn derive_status_never_produces_modified() {
        let pruned = PointData {
            pruning: Some(Pruning {
                performed: true,
                severity: None,
            }),
            ..PointData::default()
        };
        assert_eq!(derive_status(PointStatus::Modified, &pruned), PointStatus::Executed);
        assert_eq!(derive_status(PointStatus::Executed, &pruned), PointStatus::Executed);
        assert_eq!(
            derive_status(PointStatus::Modified, &PointData::default()),
            PointStatus::Modified
        );
    }

    #[test]
    fn update_keeps_identity_of_unrelated_works_and_points() {
        let mut store = sample_store();
        let before: Vec<_> = store.works().to_vec();

        store
            .update_executed_data(&WorkId::from("work1"), &PointId::from("pt2"), equipment_data())
            .unwrap();

        let after = store.works();
        assert!(!Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[1], &after[1]));
        // Sibling points are shared between snapshots; the edited one is not.
        assert!(Arc::ptr_eq(&before[0].points[0], &after[0].points[0]));
        assert!(!Arc::ptr_eq(&before[0].points[1], &after[0].points[1]));
        // The old snapshot is untouched.
        assert_eq!(before[0].points[1].status, PointStatus::Budgeted);
    }

    #[test]
    fn unknown_point_leaves_snapshot_in_place() {
        let mut store = sample_store();
        let before = Arc::clone(work1(&store));

        let err = store
            .update_executed_data(&WorkId::from("work1"), &PointId::from("ghost"), equipment_data())
            .unwrap_err();
        assert!(matches!(err, WorkError::PointNotFound { .. }));
        assert!(matches!(
            store.remove_point(&WorkId::from("work1"), &PointId::from("ghost")),
            Err(WorkError::PointNotFound { .. })
        ));
        assert!(Arc::ptr_eq(&before, work1(&store)));
    }

    #[test]
    fn remove_point_leaves_dangling_extension() {
        let mut store = sample_store();
        store
            .remove_point(&WorkId::from("work1"), &PointId::from("pt2"))
            .unwrap();

        let work = work1(&store);
        assert!(work.point(&PointId::from("pt2")).is_none());
        assert_eq!(work.extensions.len(), 1);
        assert_eq!(work.extensions[0].to_point_id, PointId::from("pt2"));
        assert_eq!(work.drawable_extensions().count(), 0);
    }

    #[test]
    fn budgeted_view_is_read_only() {
        let mut store = sample_store();
        let before = Arc::clone(work1(&store));

        let err = store
            .update_point_data(
                &WorkId::from("work1"),
                &PointId::from("pt2"),
                DataView::Budgeted,
                equipment_data(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkError::BudgetedReadOnly { .. }));
        assert!(Arc::ptr_eq(&before, work1(&store)));
        assert!(!DataView::Budgeted.is_editable());

        store
            .update_point_data(
                &WorkId::from("work1"),
                &PointId::from("pt2"),
                DataView::Execution,
                equipment_data(),
            )
            .unwrap();
        let executed = store
            .point_data(&WorkId::from("work1"), &PointId::from("pt2"), DataView::Execution)
            .unwrap();
        assert_eq!(executed, &equipment_data());
        let budgeted = store
            .point_data(&WorkId::from("work1"), &PointId::from("pt2"), DataView::Budgeted)
            .unwrap();
        assert_eq!(budgeted, &PointData::default());
    }

    #[test]
    fn search_filters_and_orders_by_status() {
        let store = WorkStore::new(vec![
            sample_work("a", WorkStatus::Completed, Vec::new()),
            sample_work("b", WorkStatus::Programmed, Vec::new()),
            sample_work("c", WorkStatus::InProgress, Vec::new()),
        ])
        .unwrap();

        let all = store.search(&WorkQuery::default());
        let ids: Vec<_> = all.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let by_code = store.search(&WorkQuery {
            text: "wo-B".into(),
            status: None,
        });
        assert_eq!(by_code.len(), 1);

        let programmed = store.search(&WorkQuery {
            text: String::new(),
            status: Some(WorkStatus::Programmed),
        });
        assert_eq!(programmed.len(), 1);
        assert_eq!(store.count_by_status(WorkStatus::InProgress), 1);
    }

    #[test]
    fn schedule_matches_civil_date() {
        let mut later = sample_work("later", WorkStatus::Programmed, Vec::new());
        later.scheduled_date = Date::constant(2026, 10, 17);
        let store =
            WorkStore::new(vec![sample_work("today", WorkStatus::Programmed, Vec::new()), later])
                .unwrap();

        let today = store.scheduled_on(Date::constant(2026, 10, 16));
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, WorkId::from("today"));
    }
}

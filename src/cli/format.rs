//! Output formatting for shell display.

use std::fmt::Write as _;

use crate::checklist::{self, ChecklistSet};
use crate::model::{
    Checklist, ChecklistRef, Facet, ObservationKind, PointData, ProjectPoint, TeamMember, Work,
    WorkStatus,
};
use crate::shift::ShiftStatus;
use crate::works::WorkStore;

pub(super) fn format_member(member: &TeamMember) -> String {
    format!(
        "{}  {} ({}) [{}]",
        member.id, member.name, member.document, member.role
    )
}

pub(super) fn format_shift(status: ShiftStatus) -> String {
    match status {
        ShiftStatus::Closed => "closed".to_string(),
        ShiftStatus::Open { opened_at } => format!("open since {opened_at}"),
    }
}

/// One line per checklist: APR first, then the team in order.
pub(super) fn format_checklist_overview(set: &ChecklistSet, team: &[TeamMember]) -> String {
    let targets = std::iter::once(ChecklistRef::Apr)
        .chain(team.iter().map(|m| ChecklistRef::Member(m.id.clone())));
    let mut out = String::new();
    for target in targets {
        let line = match set.get(&target) {
            Some(c) => format!("{target}  {}  {}", c.title, checklist_state(set, &target, c)),
            None => format!("{target}  (no checklist)"),
        };
        let _ = writeln!(out, "{line}");
    }
    out
}

fn checklist_state(set: &ChecklistSet, target: &ChecklistRef, checklist: &Checklist) -> String {
    if set.is_submitted(target) {
        return "submitted".to_string();
    }
    let total = checklist.items().count();
    let answered = total - checklist.pending_items();
    format!("{answered}/{total} answered")
}

pub(super) fn format_checklist(checklist: &Checklist) -> String {
    let mut out = checklist.title.clone();
    if checklist.completed {
        out.push_str(" [completed]");
    }
    out.push('\n');
    for category in &checklist.categories {
        let _ = writeln!(out, "  {} {}", category.id, category.title);
        for item in &category.items {
            let answer = item
                .answer
                .as_ref()
                .map_or_else(|| "-".to_string(), |a| a.summary());
            let _ = writeln!(out, "    {} {}  {answer}", item.id, item.question);
        }
    }
    if !checklist::is_complete(checklist) {
        let _ = writeln!(out, "  {} item(s) unanswered", checklist.pending_items());
    }
    out
}

pub(super) fn format_work_line(work: &Work) -> String {
    format!(
        "{}  {}  {} [{}, {}] {}%  {}",
        work.id,
        work.code,
        work.name,
        work.status.label(),
        work.priority.label(),
        work.progress,
        work.scheduled_date
    )
}

pub(super) fn format_work(work: &Work) -> String {
    let mut out = format_work_line(work);
    let _ = writeln!(out, "\n  {}, {}", work.address, work.city);
    for point in &work.points {
        let _ = writeln!(out, "  {}", format_point(point));
    }
    for (ext, from, to) in work.drawable_extensions() {
        let _ = writeln!(
            out,
            "  {}  #{} -> #{}  {} {}m {:?}/{:?}",
            ext.id, from.number, to.number, ext.cable_type, ext.length, ext.voltage, ext.status
        );
    }
    let dangling = work.dangling_extensions().count();
    if dangling > 0 {
        let _ = writeln!(out, "  {dangling} extension(s) reference removed points");
    }
    out
}

pub(super) fn format_point(point: &ProjectPoint) -> String {
    let mut line = format!(
        "#{} {}  {}  {}  budgeted: {}  executed: {}",
        point.number,
        point.id,
        point.status.label(),
        point.coordinate,
        format_facets(&point.budgeted_data),
        format_facets(&point.executed_data),
    );
    let locked: Vec<_> = Facet::ALL
        .into_iter()
        .filter(|f| !point.executed_data.facet_available(*f))
        .map(facet_name)
        .collect();
    if point.executed_data.observation_kind() == ObservationKind::Mixed {
        line.push_str("  (pruning and hardware both recorded)");
    } else if !locked.is_empty() {
        let _ = write!(line, "  (locked: {})", locked.join(", "));
    }
    line
}

pub(super) fn format_status_counts(store: &WorkStore) -> String {
    let counts: Vec<_> = WorkStatus::ALL
        .into_iter()
        .map(|s| format!("{}: {}", s.label(), store.count_by_status(s)))
        .collect();
    format!("{}\n", counts.join(", "))
}

/// The facets recorded in `data`, or `-` when empty.
pub(super) fn format_facets(data: &PointData) -> String {
    let mut present = Vec::new();
    if data.pole.is_some() {
        present.push("pole".to_string());
    }
    if data.grounding.as_ref().is_some_and(|g| g.present) {
        present.push("grounding".to_string());
    }
    if data.arrestor.as_ref().is_some_and(|a| a.present) {
        present.push("arrestor".to_string());
    }
    if !data.equipment.is_empty() {
        present.push(format!("equipment x{}", data.equipment.len()));
    }
    if data.pruning.is_some_and(|p| p.performed) {
        present.push("pruning".to_string());
    }
    if present.is_empty() {
        return "-".to_string();
    }
    present.join(", ")
}

fn facet_name(facet: Facet) -> &'static str {
    match facet {
        Facet::Pole => "pole",
        Facet::Grounding => "grounding",
        Facet::Arrestor => "arrestor",
        Facet::Equipment => "equipment",
        Facet::Pruning => "pruning",
    }
}

pub(super) fn format_pending(pending: &[ChecklistRef]) -> String {
    if pending.is_empty() {
        return "none".to_string();
    }
    pending
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Coordinate, Equipment, EquipmentKind, PointId, PointStatus, Pruning};

    fn sample_point(executed_data: PointData) -> ProjectPoint {
        ProjectPoint {
            id: PointId::from("pt9"),
            number: 9,
            coordinate: Coordinate {
                lat: -7.5,
                lng: -40.25,
            },
            status: PointStatus::Budgeted,
            budgeted_data: PointData::default(),
            executed_data,
        }
    }

    #[test]
    fn empty_data_shows_dash() {
        assert_eq!(format_facets(&PointData::default()), "-");
    }

    #[test]
    fn pruning_locks_hardware_facets() {
        let point = sample_point(PointData {
            pruning: Some(Pruning {
                performed: true,
                severity: None,
            }),
            ..PointData::default()
        });
        let line = format_point(&point);
        assert!(line.starts_with("#9 pt9  budgeted"), "{line}");
        assert!(line.contains("executed: pruning"), "{line}");
        assert!(
            line.ends_with("(locked: pole, grounding, arrestor, equipment)"),
            "{line}"
        );
    }

    #[test]
    fn mixed_data_is_flagged() {
        let point = sample_point(PointData {
            pruning: Some(Pruning {
                performed: true,
                severity: None,
            }),
            equipment: vec![Equipment {
                id: "eq1".into(),
                kind: EquipmentKind::KnifeSwitch,
                plate: "KS-1".into(),
                company_code: "C-1".into(),
                fuse_link: None,
                rating: None,
                quantity: 1,
            }],
            ..PointData::default()
        });
        let line = format_point(&point);
        assert!(line.contains("executed: equipment x1, pruning"), "{line}");
        assert!(line.ends_with("(pruning and hardware both recorded)"), "{line}");
    }

    #[test]
    fn pending_list_is_comma_separated() {
        assert_eq!(format_pending(&[]), "none");
        assert_eq!(
            format_pending(&[ChecklistRef::Apr, "user2".parse().unwrap()]),
            "apr, user2"
        );
    }
}

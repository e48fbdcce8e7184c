//! The interactive shell: one command per line against one session.

use std::io::BufRead;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jiff::{Timestamp, Zoned, civil::Date};

use crate::model::{
    Answer, ChecklistRef, Coordinate, MemberId, PointData, PointId, WorkId, WorkStatus,
};
use crate::session::{Session, View};
use crate::shift::{FlowEntry, Transition};
use crate::works::{DataView, WorkQuery};

use super::format::{
    format_checklist, format_checklist_overview, format_member, format_pending, format_point,
    format_shift, format_status_counts, format_work, format_work_line,
};

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// List the current team.
    Team,

    /// Add roster members to the team.
    TeamAdd { members: Vec<String> },

    /// Remove a member from the team. The foreman stays.
    TeamRemove { member: String },

    /// Search the roster by name or document.
    TeamSearch { query: String },

    /// Show the vehicle, or assign one by id.
    Vehicle { id: Option<String> },

    /// Checklist overview.
    Checklists,

    /// Show one checklist: `apr` or a member id.
    ShowChecklist { checklist: String },

    /// Answer an item.
    Answer {
        checklist: String,
        category: String,
        item: String,
        value: String,
    },

    /// Clear an item's answer.
    ClearAnswer {
        checklist: String,
        category: String,
        item: String,
    },

    /// Answer a photo item from an image file.
    Photo {
        checklist: String,
        category: String,
        item: String,
        path: PathBuf,
    },

    /// Submit a fully answered checklist.
    Complete { checklist: String },

    /// Discard all answers and start the checklists over.
    ReinitChecklists,

    OpenShift,
    CloseShift,

    /// List works, optionally filtered.
    Works {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Matches name, code or address.
        query: Option<String>,
    },

    /// Works scheduled on a date (default: today).
    Schedule { date: Option<Date> },

    /// Show a work with its points and extensions.
    Work { id: String },

    /// Add a point to a work.
    #[command(allow_negative_numbers = true)]
    AddPoint { work: String, lat: f64, lng: f64 },

    RemovePoint { work: String, point: String },

    /// Print one snapshot of a point's data as JSON.
    ShowPoint {
        work: String,
        point: String,

        /// Show the design instead of what was executed.
        #[arg(long)]
        budgeted: bool,
    },

    /// Replace a point's executed data with a JSON document.
    ExecutePoint {
        work: String,
        point: String,
        data: String,
    },

    Online,
    Offline,

    /// Force a sync.
    Sync,

    /// Session summary.
    Status,

    /// Navigate to a view.
    Go {
        #[arg(value_enum)]
        view: ViewArg,

        /// Member id for `checklist`, work id for `work`.
        id: Option<String>,
    },

    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

/// CLI-facing work status, mapped to the domain `WorkStatus`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    InProgress,
    Programmed,
    Paused,
    Completed,
}

impl StatusArg {
    fn to_domain(self) -> WorkStatus {
        match self {
            Self::InProgress => WorkStatus::InProgress,
            Self::Programmed => WorkStatus::Programmed,
            Self::Paused => WorkStatus::Paused,
            Self::Completed => WorkStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewArg {
    Home,
    OpenShift,
    Apr,
    Checklist,
    Works,
    Work,
    Schedule,
    TeamEdit,
    Profile,
}

/// What the shell does after a line.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Outcome {
    Continue(String),
    Quit,
}

/// Reads lines until EOF or `quit`. Failed commands are reported and the
/// loop carries on.
pub(super) fn cmd_shell(session: &mut Session, input: impl BufRead) -> Result<(), String> {
    for line in input.lines() {
        let line = line.map_err(|e| format!("failed to read input: {e}"))?;
        match run_line(session, &line) {
            Ok(Outcome::Continue(output)) => print!("{output}"),
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

/// Parses and executes one line.
pub(super) fn run_line(session: &mut Session, line: &str) -> Result<Outcome, String> {
    let args = split_args(line)?;
    if args.is_empty() {
        return Ok(Outcome::Continue(String::new()));
    }
    let command = match ShellLine::try_parse_from(&args) {
        Ok(parsed) => parsed.command,
        // Help output arrives as an "error" from clap.
        Err(e) if !e.use_stderr() => return Ok(Outcome::Continue(e.to_string())),
        Err(e) => return Err(e.to_string().trim_end().to_string()),
    };
    execute(session, command).map(|out| match out {
        Some(text) => Outcome::Continue(text),
        None => Outcome::Quit,
    })
}

fn execute(session: &mut Session, command: ShellCommand) -> Result<Option<String>, String> {
    let output = match command {
        ShellCommand::Team => lines(session.team().iter().map(format_member)),
        ShellCommand::TeamAdd { members } => {
            let mut draft = session.team_draft();
            let mut added = 0;
            for id in &members {
                if draft.add(&MemberId::new(id)).map_err(|e| e.to_string())? {
                    added += 1;
                }
            }
            let team = draft.finish().map_err(|e| e.to_string())?;
            session.save_team(team).map_err(|e| e.to_string())?;
            format!("{added} member(s) added\n")
        }
        ShellCommand::TeamRemove { member } => {
            let mut draft = session.team_draft();
            draft
                .remove(&MemberId::new(&member))
                .map_err(|e| e.to_string())?;
            let team = draft.finish().map_err(|e| e.to_string())?;
            session.save_team(team).map_err(|e| e.to_string())?;
            format!("removed {member}\n")
        }
        ShellCommand::TeamSearch { query } => {
            let draft = session.team_draft();
            let found = draft.search(&query);
            if found.is_empty() {
                "no matches\n".to_string()
            } else {
                lines(found.into_iter().map(format_member))
            }
        }
        ShellCommand::Vehicle { id: Some(id) } => {
            session.select_vehicle(&id).map_err(|e| e.to_string())?;
            format!("vehicle {id} assigned\n")
        }
        ShellCommand::Vehicle { id: None } => match session.vehicle() {
            Some(v) => format!("{}  {} ({})\n", v.id, v.plate, v.model),
            None => "no vehicle assigned\n".to_string(),
        },
        ShellCommand::Checklists => match session.checklists() {
            Some(set) => format_checklist_overview(set, session.team()),
            None => "no checklists yet; run `go open-shift`\n".to_string(),
        },
        ShellCommand::ShowChecklist { checklist } => {
            let target = parse_target(&checklist);
            let found = session
                .checklist(&target)
                .ok_or_else(|| format!("checklist not found: {target}"))?;
            format_checklist(found)
        }
        ShellCommand::Answer {
            checklist,
            category,
            item,
            value,
        } => {
            let target = parse_target(&checklist);
            session
                .set_answer(&target, &category, &item, Some(Answer::Text(value)))
                .map_err(|e| e.to_string())?;
            String::new()
        }
        ShellCommand::ClearAnswer {
            checklist,
            category,
            item,
        } => {
            let target = parse_target(&checklist);
            session
                .set_answer(&target, &category, &item, None)
                .map_err(|e| e.to_string())?;
            String::new()
        }
        ShellCommand::Photo {
            checklist,
            category,
            item,
            path,
        } => {
            let target = parse_target(&checklist);
            session
                .capture_photo(&target, &category, &item, &path)
                .map_err(|e| e.to_string())?;
            format!("photo stored for {target} {category}/{item}\n")
        }
        ShellCommand::Complete { checklist } => {
            let target = parse_target(&checklist);
            session
                .complete_checklist(&target)
                .map_err(|e| e.to_string())?;
            format!("checklist {target} completed\n")
        }
        ShellCommand::ReinitChecklists => {
            session
                .reinitialize_checklists()
                .map_err(|e| e.to_string())?;
            "checklists reinitialized\n".to_string()
        }
        ShellCommand::OpenShift => {
            match session
                .open_shift(Timestamp::now())
                .map_err(|e| e.to_string())?
            {
                Transition::Changed => "shift opened\n".to_string(),
                Transition::Unchanged => "shift already open\n".to_string(),
            }
        }
        ShellCommand::CloseShift => match session.close_shift() {
            Transition::Changed => "shift closed\n".to_string(),
            Transition::Unchanged => "shift already closed\n".to_string(),
        },
        ShellCommand::Works { status, query } => {
            let query = WorkQuery {
                text: query.unwrap_or_default(),
                status: status.map(StatusArg::to_domain),
            };
            let found = session.works().search(&query);
            let mut out = if found.is_empty() {
                "no works\n".to_string()
            } else {
                lines(found.iter().map(|w| format_work_line(w)))
            };
            if query.text.is_empty() && query.status.is_none() {
                out.push_str(&format_status_counts(session.works()));
            }
            out
        }
        ShellCommand::Schedule { date } => {
            let date = date.unwrap_or_else(|| Zoned::now().date());
            let found = session.works().scheduled_on(date);
            if found.is_empty() {
                format!("nothing scheduled on {date}\n")
            } else {
                lines(found.iter().map(|w| format_work_line(w)))
            }
        }
        ShellCommand::Work { id } => {
            let work = session
                .works()
                .work(&WorkId::new(&id))
                .ok_or_else(|| format!("work not found: {id}"))?;
            format_work(work)
        }
        ShellCommand::AddPoint { work, lat, lng } => {
            let work = WorkId::new(work);
            let id = session
                .add_point(&work, Coordinate { lat, lng })
                .map_err(|e| e.to_string())?;
            let point = session
                .works()
                .work(&work)
                .and_then(|w| w.point(&id))
                .map(format_point)
                .unwrap_or_default();
            format!("{point}\n")
        }
        ShellCommand::RemovePoint { work, point } => {
            session
                .remove_point(&WorkId::new(work), &PointId::new(&point))
                .map_err(|e| e.to_string())?;
            format!("removed {point}\n")
        }
        ShellCommand::ShowPoint {
            work,
            point,
            budgeted,
        } => {
            let view = if budgeted {
                DataView::Budgeted
            } else {
                DataView::Execution
            };
            let data = session
                .works()
                .point_data(&WorkId::new(work), &PointId::new(point), view)
                .map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(data)
                .map_err(|e| format!("failed to serialize point data: {e}"))?;
            let access = if view.is_editable() {
                "editable"
            } else {
                "read-only"
            };
            format!("{json}\n({access})\n")
        }
        ShellCommand::ExecutePoint { work, point, data } => {
            let data: PointData =
                serde_json::from_str(&data).map_err(|e| format!("invalid point data: {e}"))?;
            let status = session
                .update_executed_data(&WorkId::new(work), &PointId::new(&point), data)
                .map_err(|e| e.to_string())?;
            format!("{point} is {}\n", status.label())
        }
        ShellCommand::Online => {
            session.set_online(true);
            "online\n".to_string()
        }
        ShellCommand::Offline => {
            session.set_online(false);
            "offline\n".to_string()
        }
        ShellCommand::Sync => {
            if session.force_sync(Timestamp::now()) {
                "syncing\n".to_string()
            } else {
                "offline; sync unavailable\n".to_string()
            }
        }
        ShellCommand::Status => status(session),
        ShellCommand::Go { view, id } => {
            let view = to_view(view, id)?;
            let entry = session.navigate(view).map_err(|e| e.to_string())?;
            match entry {
                Some(FlowEntry::ColdStart) => "checklists created\n".to_string(),
                Some(FlowEntry::Resumed { added }) if !added.is_empty() => {
                    format!("checklists added for {} new member(s)\n", added.len())
                }
                _ => String::new(),
            }
        }
        ShellCommand::Quit => return Ok(None),
    };
    Ok(Some(output))
}

fn status(session: &mut Session) -> String {
    let sync = session.sync_status(Timestamp::now());
    let vehicle = session
        .vehicle()
        .map_or_else(|| "none".to_string(), |v| v.plate.clone());
    format!(
        "user: {} ({})\nteam: {} member(s)\nvehicle: {vehicle}\nshift: {}\npending checklists: {}\nconnection: {}\nsync: {}\nview: {:?}\ntheme: {:?}\n",
        session.user().name,
        session.user().role,
        session.team().len(),
        format_shift(session.shift().status()),
        format_pending(&session.pending_checklists()),
        if session.is_online() { "online" } else { "offline" },
        sync.label(),
        session.view(),
        session.theme(),
    )
}

fn to_view(view: ViewArg, id: Option<String>) -> Result<View, String> {
    let require = |what: &str| id.clone().ok_or_else(|| format!("`go` needs a {what} id"));
    Ok(match view {
        ViewArg::Home => View::Home,
        ViewArg::OpenShift => View::OpenShift,
        ViewArg::Apr => View::AprChecklist,
        ViewArg::Checklist => View::IndividualChecklist(MemberId::new(require("member")?)),
        ViewArg::Works => View::Works,
        ViewArg::Work => View::WorkDetail(WorkId::new(require("work")?)),
        ViewArg::Schedule => View::Schedule,
        ViewArg::TeamEdit => View::TeamEdit,
        ViewArg::Profile => View::Profile,
    })
}

fn parse_target(s: &str) -> ChecklistRef {
    match s.parse() {
        Ok(target) => target,
        Err(never) => match never {},
    }
}

fn lines(items: impl Iterator<Item = String>) -> String {
    items.map(|line| line + "\n").collect()
}

/// Splits a line on whitespace, honoring single and double quotes.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote = None;
    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unterminated quote".to_string());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

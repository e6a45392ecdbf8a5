//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{Cli, Command, GroupCommand, ListCommand, TaskCommand};
use crate::paths;
use crate::tasks::{
    self, dates, BucketView, Category, ListId, ListStatus, LoadReport, TaskBoard, TaskId,
    TaskRemoval,
};
use crate::traits::{Clock, SlotStore};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a parsed command line against the board in its data directory.
pub fn run(cli: Cli) -> CliOutput {
    let Cli { data_dir, json, command } = cli;
    if matches!(command, Command::Version) {
        return run_version();
    }

    let data_dir = match paths::resolve_data_dir(data_dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => return error_output(e.to_string()),
    };
    let (mut board, report) = match tasks::open_in(&data_dir) {
        Ok(opened) => opened,
        Err(e) => return error_output(format!("Error opening board: {e}")),
    };

    let mut output = execute(&mut board, command, json);
    output.stderr.splice(0..0, load_warnings(&report));
    output
}

/// Run one command against an open board.
///
/// A write the board could not complete is retried before returning; if it
/// still fails, the command reports the failure.
pub fn execute<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    command: Command,
    json: bool,
) -> CliOutput {
    let output = match command {
        Command::Group(cmd) => run_group_cmd(board, cmd, json),
        Command::List(cmd) => run_list_cmd(board, cmd, json),
        Command::Task(cmd) => run_task_cmd(board, cmd, json),
        Command::Show => run_show(board, json),
        Command::Reset { yes } => run_reset(board, yes, json),
        Command::Version => run_version(),
    };

    if let Err(e) = board.flush() {
        return error_output(format!("Error saving board: {e}"));
    }
    output
}

fn run_version() -> CliOutput {
    success_output(format!("daybook v{}", crate::VERSION))
}

fn load_warnings(report: &LoadReport) -> Vec<String> {
    if let Some(reason) = &report.reset {
        return vec![format!("Warning: the stored board was corrupt and has been cleared ({reason})")];
    }

    let mut warnings = Vec::new();
    if !report.decode_failures.is_empty() {
        warnings.push(format!(
            "Warning: could not read {}; using empty defaults",
            report.decode_failures.join(", ")
        ));
    }
    if !report.coerced_task_lists.is_empty() {
        warnings.push(format!(
            "Warning: emptied malformed task lists: {}",
            report.coerced_task_lists.join(", ")
        ));
    }
    if report.repaired_tasks > 0 {
        warnings.push(format!("Warning: repaired {} malformed tasks", report.repaired_tasks));
    }
    if report.dropped_tasks > 0 {
        warnings.push(format!("Warning: discarded {} tasks without an id", report.dropped_tasks));
    }
    if report.reconciled > 0 {
        warnings.push(format!("Repaired {} inconsistencies in the stored board", report.reconciled));
    }
    warnings
}

/// Resolve a date argument to the `D/M/YYYY` key form.
fn resolve_date<S: SlotStore, C: Clock>(
    board: &TaskBoard<S, C>,
    raw: &str,
) -> Result<String, String> {
    if raw.trim().eq_ignore_ascii_case("today") {
        return Ok(board.today());
    }
    dates::parse_date(raw).map(dates::format_date).map_err(|e| e.to_string())
}

fn expanded_word(expanded: bool) -> &'static str {
    if expanded {
        "expanded"
    } else {
        "collapsed"
    }
}

// === Group Commands ===

fn run_group_cmd<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    cmd: GroupCommand,
    json: bool,
) -> CliOutput {
    match cmd {
        GroupCommand::Add => {
            let id = board.create_group();
            let date = board.snapshot().groups.first().map(|g| g.date.clone()).unwrap_or_default();
            respond(json, &json!({ "group": id, "date": date }), format!("Created task group for {date}"))
        }
        GroupCommand::Delete { date } => {
            let date = match resolve_date(board, &date) {
                Ok(d) => d,
                Err(e) => return error_output(e),
            };
            if board.delete_group(&date) {
                respond(json, &json!({ "deleted": date }), format!("Deleted task group {date}"))
            } else {
                error_output(format!("No task group on {date}"))
            }
        }
        GroupCommand::Toggle { date } => {
            let date = match resolve_date(board, &date) {
                Ok(d) => d,
                Err(e) => return error_output(e),
            };
            match board.toggle_group(&date) {
                Some(expanded) => respond(
                    json,
                    &json!({ "date": date, "expanded": expanded }),
                    format!("Group {date} {}", expanded_word(expanded)),
                ),
                None => error_output(format!("No task group on {date}")),
            }
        }
        GroupCommand::ToggleLists { date } => {
            let date = match resolve_date(board, &date) {
                Ok(d) => d,
                Err(e) => return error_output(e),
            };
            match board.toggle_group_lists(&date) {
                Some(expanded) => respond(
                    json,
                    &json!({ "date": date, "expanded": expanded }),
                    format!("All lists on {date} {}", expanded_word(expanded)),
                ),
                None => error_output(format!("No lists on {date}")),
            }
        }
    }
}

// === List Commands ===

fn run_list_cmd<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    cmd: ListCommand,
    json: bool,
) -> CliOutput {
    match cmd {
        ListCommand::Add { date } => {
            let date = match resolve_date(board, date.as_deref().unwrap_or("today")) {
                Ok(d) => d,
                Err(e) => return error_output(e),
            };
            match board.create_list(&date) {
                Some(list) => respond(
                    json,
                    &json!({ "list": list, "date": date }),
                    format!("Created list {list} on {date}"),
                ),
                None => error_output(format!(
                    "No task group on {date}; create one with `daybook group add`"
                )),
            }
        }
        ListCommand::Category { list, category } => {
            let category: Category = match category.parse() {
                Ok(c) => c,
                Err(e) => return error_output(format!("{e}")),
            };
            if board.update_list_category(list, category) {
                respond(
                    json,
                    &json!({ "list": list, "category": category }),
                    format!("List {list} is now {category}"),
                )
            } else {
                list_not_found(list)
            }
        }
        ListCommand::Toggle { list } => match board.toggle_list(list) {
            Some(expanded) => respond(
                json,
                &json!({ "list": list, "expanded": expanded }),
                format!("List {list} {}", expanded_word(expanded)),
            ),
            None => list_not_found(list),
        },
        ListCommand::ToggleTasks { list } => match board.toggle_list_tasks(list) {
            Some(expanded) => respond(
                json,
                &json!({ "list": list, "tasks_expanded": expanded }),
                format!("Tasks of list {list} {}", if expanded { "shown" } else { "hidden" }),
            ),
            None => list_not_found(list),
        },
    }
}

// === Task Commands ===

fn run_task_cmd<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    cmd: TaskCommand,
    json: bool,
) -> CliOutput {
    match cmd {
        TaskCommand::Add { list } => match board.create_task(list) {
            Some(task) => respond(
                json,
                &json!({ "list": list, "task": task }),
                format!("Created task {task} in list {list}"),
            ),
            None => list_not_found(list),
        },
        TaskCommand::Edit { list, task, text } => {
            if !board.update_task_content(list, task, &text) {
                return task_not_found(list, task);
            }
            let content = board.snapshot().task(list, task).map(|t| t.content.clone());
            respond(
                json,
                &json!({ "list": list, "task": task, "content": content }),
                format!("Updated task {task}"),
            )
        }
        TaskCommand::Check { list, task } => set_checked(board, list, task, true, json),
        TaskCommand::Uncheck { list, task } => set_checked(board, list, task, false, json),
        TaskCommand::Due { list, task, date } => {
            let due = match date.as_deref().map(dates::parse_due_date).transpose() {
                Ok(due) => due,
                Err(e) => return error_output(e.to_string()),
            };
            if !board.update_task_due_date(list, task, due) {
                return task_not_found(list, task);
            }
            let due = due.map(dates::format_date);
            let message = due.as_ref().map_or_else(
                || format!("Cleared due date of task {task}"),
                |d| format!("Task {task} is due {d}"),
            );
            respond(json, &json!({ "list": list, "task": task, "due": due }), message)
        }
        TaskCommand::Delete { list, task } => match board.delete_task(list, task) {
            Some(removal) => {
                let message = match removal {
                    TaskRemoval::TaskOnly => format!("Deleted task {task}"),
                    TaskRemoval::ListPruned => {
                        format!("Deleted task {task} and its now empty list {list}")
                    }
                    TaskRemoval::GroupPruned => {
                        format!("Deleted task {task}, its now empty list {list}, and the list's group")
                    }
                };
                respond(
                    json,
                    &json!({ "list": list, "task": task, "removed": format!("{removal:?}") }),
                    message,
                )
            }
            None => task_not_found(list, task),
        },
    }
}

fn set_checked<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    list: ListId,
    task: TaskId,
    checked: bool,
    json: bool,
) -> CliOutput {
    if !board.update_task_checked(list, task, checked) {
        return task_not_found(list, task);
    }

    let snapshot = board.snapshot();
    let incomplete = snapshot.incomplete_counts.get(&list).copied().unwrap_or(0);
    let total = snapshot.tasks.get(&list).map_or(0, Vec::len);
    let status = ListStatus::from_counts(incomplete, total);

    let mut message = format!("{} task {task}", if checked { "Checked" } else { "Unchecked" });
    if let Some(line) = status.message() {
        let _ = write!(message, ". {line}");
    }
    respond(
        json,
        &json!({ "list": list, "task": task, "checked": checked, "incomplete": incomplete }),
        message,
    )
}

// === Board Commands ===

fn run_show<S: SlotStore, C: Clock>(board: &TaskBoard<S, C>, json: bool) -> CliOutput {
    let view = board.view();
    if json {
        return json_output(&view);
    }
    if view.is_empty() {
        return success_output(
            "No task groups yet. Start one with `daybook group add`.".to_string(),
        );
    }
    success_output(render_board(&view))
}

fn run_reset<S: SlotStore, C: Clock>(
    board: &mut TaskBoard<S, C>,
    yes: bool,
    json: bool,
) -> CliOutput {
    if !yes {
        return error_output("Refusing to delete the whole board without --yes".to_string());
    }
    match board.reset() {
        Ok(()) => respond(json, &json!({ "reset": true }), "Board cleared".to_string()),
        Err(e) => error_output(format!("Error resetting board: {e}")),
    }
}

/// Render the board view as indented text.
fn render_board(view: &[BucketView<'_>]) -> String {
    let mut out = String::new();
    for bucket in view {
        if !bucket.expanded {
            let _ = writeln!(out, "▸ {} ({} lists)", bucket.date, bucket.lists.len());
            continue;
        }
        let _ = writeln!(out, "▾ {}", bucket.date);

        for list in &bucket.lists {
            let marker = if list.expanded { '▾' } else { '▸' };
            let _ = write!(out, "    {marker} [{}] {}", list.id, list.category);
            if let Some(status) = list.status.message() {
                let _ = write!(out, " - {status}");
            }
            out.push('\n');
            if !list.expanded {
                continue;
            }
            if !list.tasks_expanded {
                let _ = writeln!(out, "        ({} tasks hidden)", list.tasks.len());
                continue;
            }

            for entry in &list.tasks {
                let task = entry.task;
                let check = if task.checked { 'x' } else { ' ' };
                let _ = write!(out, "        [{check}] {}  {}  {}", task.id, task.time, task.content);
                if task.has_due_date() {
                    let _ = write!(out, "  (due {})", task.due_date);
                }
                if entry.edited_after_group {
                    let _ = write!(out, "  (edited {})", task.last_edited_date);
                }
                out.push('\n');
            }
        }
    }
    out.trim_end().to_string()
}

// === Helper Functions ===

fn respond(json: bool, value: &serde_json::Value, message: String) -> CliOutput {
    if json {
        json_output(value)
    } else {
        success_output(message)
    }
}

fn list_not_found(list: ListId) -> CliOutput {
    error_output(format!("List not found: {list}"))
}

fn task_not_found(list: ListId, task: TaskId) -> CliOutput {
    error_output(format!("Task not found: {task} in list {list}"))
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}

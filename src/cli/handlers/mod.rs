use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{read_config, resolve_data_dir, store_path};
use crate::io::logging::init_stderr_logging;
use crate::io::recovery::{prune_recovery, read_recovery_entries, recovery_log_path};
use crate::model::{AppConfig, Filter};
use crate::ops::list_ops::{ListController, Outcome};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Default number of recovery entries shown
const RECOVERY_LIMIT: usize = 10;

/// Everything a subcommand needs: where the data lives and how it is configured
struct Context {
    data_dir: PathBuf,
    config: AppConfig,
    json: bool,
}

impl Context {
    /// Open the task list under `filter`. A store that cannot be opened
    /// leaves an unsynced list whose failure `finish` reports.
    fn open(&self, filter: Filter) -> ListController {
        ListController::open(&store_path(&self.data_dir, &self.config), filter)
    }

    /// Open the task list, failing with the store's error when it cannot be
    /// opened. The failure is still written to the recovery log.
    fn open_synced(&self, filter: Filter) -> Result<ListController, Box<dyn std::error::Error>> {
        let mut list = self.open(filter);
        if list.is_synced() {
            return Ok(list);
        }
        let failures = list.record_diagnostics(&self.data_dir);
        match failures.into_iter().next() {
            Some(failure) => Err(failure.to_string().into()),
            None => Err("task store is not open".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    init_stderr_logging();
    let data_dir = resolve_data_dir(cli.dir.as_deref())
        .map_err(|e| format!("cannot resolve data directory: {}", e))?;
    let config = read_config(&data_dir)?;
    let ctx = Context {
        data_dir,
        config,
        json: cli.json,
    };

    match cli.command {
        None => Err("no subcommand given (run `td` without arguments for the TUI)".into()),
        Some(cmd) => match cmd {
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Done(args) => cmd_set_completed(&ctx, args.id, true),
            Commands::Undo(args) => cmd_set_completed(&ctx, args.id, false),
            Commands::Rename(args) => cmd_rename(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),
            Commands::Clear => cmd_clear(&ctx),
            Commands::Recovery(args) => cmd_recovery(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Full-list index of the task with store id `id`
fn find_task(list: &ListController, id: i64) -> Result<usize, String> {
    list.position_of(id)
        .ok_or_else(|| format!("task not found: {}", id))
}

/// Record diagnostics, print failures as warnings, and close the store.
/// Any failure makes the command fail.
fn finish(ctx: &Context, mut list: ListController) -> CmdResult {
    let failures = list.record_diagnostics(&ctx.data_dir);
    for failure in &failures {
        eprintln!("warning: {}", failure);
    }
    list.close()?;
    match failures.len() {
        0 => Ok(()),
        1 => Err("1 change was not saved; see `td recovery`".into()),
        n => Err(format!("{} changes were not saved; see `td recovery`", n).into()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let list = ctx.open_synced(args.filter.unwrap_or(Filter::All))?;
    if ctx.json {
        print_json(&list_to_json(&list))?;
    } else {
        for line in format_listing(&list) {
            println!("{}", line);
        }
    }
    finish(ctx, list)
}

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let mut list = ctx.open(Filter::All);
    if list.add(&args.name) == Outcome::Rejected {
        finish(ctx, list)?;
        return Err("task name cannot be empty".into());
    }
    let Some(item) = list.items().last() else {
        return Err("task was not added".into());
    };
    if ctx.json {
        print_json(&task_to_json(&item.task))?;
    } else {
        match item.task.id {
            Some(id) => println!("{}", id),
            None => println!("{}", format_task_line(&item.task)),
        }
    }
    finish(ctx, list)
}

fn cmd_set_completed(ctx: &Context, id: i64, completed: bool) -> CmdResult {
    let mut list = ctx.open_synced(Filter::All)?;
    let index = find_task(&list, id)?;
    list.toggle_completion(index, completed);
    print_task(ctx, &list, index)?;
    finish(ctx, list)
}

fn cmd_rename(ctx: &Context, args: RenameArgs) -> CmdResult {
    let mut list = ctx.open_synced(Filter::All)?;
    let index = find_task(&list, args.id)?;
    if list.rename(index, &args.name) == Outcome::Rejected {
        finish(ctx, list)?;
        return Err("task name cannot be empty".into());
    }
    print_task(ctx, &list, index)?;
    finish(ctx, list)
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut list = ctx.open_synced(Filter::All)?;
    let index = find_task(&list, args.id)?;
    let task = list.items()[index].task.clone();
    list.delete(index);
    if ctx.json {
        print_json(&task_to_json(&task))?;
    } else {
        println!("deleted {}", format_task_line(&task));
    }
    finish(ctx, list)
}

fn cmd_clear(ctx: &Context) -> CmdResult {
    let mut list = ctx.open_synced(Filter::All)?;
    let cleared = list.clear_completed();
    if ctx.json {
        print_json(&ClearJson { cleared })?;
    } else {
        match cleared {
            1 => println!("cleared 1 completed task"),
            n => println!("cleared {} completed tasks", n),
        }
    }
    finish(ctx, list)
}

fn print_task(ctx: &Context, list: &ListController, index: usize) -> CmdResult {
    let task = &list.items()[index].task;
    if ctx.json {
        print_json(&task_to_json(task))
    } else {
        println!("{}", format_task_line(task));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(ctx: &Context, args: RecoveryCmd) -> CmdResult {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery_log_path(&ctx.data_dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => cmd_recovery_prune(ctx, prune),
        None => cmd_recovery_show(ctx, args.limit.unwrap_or(RECOVERY_LIMIT)),
    }
}

fn cmd_recovery_show(ctx: &Context, limit: usize) -> CmdResult {
    let entries = read_recovery_entries(&ctx.data_dir, Some(limit));
    if ctx.json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        return print_json(&values);
    }
    if entries.is_empty() {
        println!("no recovery entries");
        return Ok(());
    }
    for entry in &entries {
        print!("{}", entry.to_display_markdown());
    }
    Ok(())
}

fn cmd_recovery_prune(ctx: &Context, args: RecoveryPruneArgs) -> CmdResult {
    let before = args.before.as_deref().map(parse_timestamp).transpose()?;
    let removed = prune_recovery(&ctx.data_dir, before, args.all)?;
    if ctx.json {
        print_json(&serde_json::json!({ "pruned": removed }))
    } else {
        println!("pruned {} entries from {}", removed, display_path(&ctx.data_dir));
        Ok(())
    }
}

/// RFC 3339 timestamp, or a plain date taken as midnight UTC
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}' (expected RFC 3339 or YYYY-MM-DD)", s))
}

fn display_path(data_dir: &Path) -> String {
    recovery_log_path(data_dir).display().to_string()
}

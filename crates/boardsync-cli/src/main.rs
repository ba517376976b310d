//! boardsync - inspect the board drag store and the list-view cache

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use boardsync_core::app::cache_keys::{self, TimesheetScope};
use boardsync_core::domain::{Board, Priority, Project, ProjectStatus, Task};
use boardsync_core::impls::{FileKeyValueStore, InMemoryTaskService, RecordingNotifier};
use boardsync_core::ports::{IdGenerator, SystemClock, TaskService, UlidGenerator};
use boardsync_core::{BoardConfig, CacheConfig, CachedView, KanbanBoard, SwrCache};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "boardsync",
    version,
    about = "Optimistic Kanban moves and stale-while-revalidate caching",
    long_about = "Drives the dashboard's client-side board state against an in-memory\n\
                  task service, and inspects the persisted list-view cache.\n\
                  \n\
                  Examples:\n\
                    boardsync demo                    # two drags, both accepted\n\
                    boardsync demo --fail-moves 1     # second drag rolled back\n\
                    boardsync cache list              # keys with the list view they feed\n\
                    boardsync cache timesheets --start 2024-05-01 --end 2024-05-31\n\
                  \n\
                  Environment Variables:\n\
                    BOARDSYNC_STORE                   # cache file (default: ./boardsync-cache.json)\n\
                    BOARDSYNC_CACHE_NAMESPACE         # key prefix (default: indosense_cache_)\n\
                    RUST_LOG                          # log filter (default: info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file backing the persistent cache
    #[arg(long, env = "BOARDSYNC_STORE", default_value = "boardsync-cache.json")]
    store: PathBuf,

    /// Prefix for every cache key
    #[arg(long, env = "BOARDSYNC_CACHE_NAMESPACE", default_value = CacheConfig::DEFAULT_NAMESPACE)]
    namespace: String,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a project, drag tasks between columns, print the result
    Demo {
        /// Make the next N move requests fail
        #[arg(long, default_value = "0")]
        fail_moves: usize,
        /// Print columns as JSON
        #[arg(long)]
        json: bool,
        /// Delay every service call by this many milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,
    },
    /// Inspect or clear the persistent cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cached payload for a key
    Get { key: String },
    /// Report whether a key is stale, and its age
    Stale { key: String },
    /// List logical keys under the namespace
    List,
    /// Report the cached timesheet list for one filter combination
    Timesheets {
        #[arg(long, value_enum, default_value = "mine")]
        scope: Scope,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Status filter (omit for all)
        #[arg(long)]
        status: Option<String>,
    },
    /// Remove one key
    Clear { key: String },
    /// Remove every key under the namespace
    ClearAll,
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    Mine,
    All,
}

impl From<Scope> for TimesheetScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Mine => TimesheetScope::Mine,
            Scope::All => TimesheetScope::All,
        }
    }
}

#[derive(Serialize)]
struct ColumnView {
    board: String,
    tasks: Vec<TaskView>,
}

#[derive(Serialize)]
struct TaskView {
    title: String,
    priority: Priority,
    position: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CacheConfig::default().with_namespace(cli.namespace.clone());
    let cache = SwrCache::with_config(FileKeyValueStore::new(&cli.store), SystemClock, config);

    match cli.command {
        Command::Demo {
            fail_moves,
            json,
            latency_ms,
        } => run_demo(&cache, fail_moves, json, Duration::from_millis(latency_ms)).await,
        Command::Cache { action } => run_cache(&cache, action),
    }
}

type FileCache = SwrCache<FileKeyValueStore, SystemClock>;

/// Seed a three-column project into the in-memory service.
async fn seed(service: &InMemoryTaskService) -> Project {
    let ids = UlidGenerator::new(SystemClock);
    let project_id = ids.project_id();
    let boards: Vec<Board> = [("Todo", "#94a3b8"), ("In Progress", "#3b82f6"), ("Done", "#22c55e")]
        .into_iter()
        .enumerate()
        .map(|(i, (name, color))| Board {
            id: ids.board_id(),
            project_id,
            name: name.to_string(),
            position: i as i32,
            color: color.to_string(),
        })
        .collect();
    let project = Project {
        id: project_id,
        name: "Warehouse sensors".to_string(),
        description: Some("Install and calibrate the cold-room sensors".to_string()),
        start_date: chrono::Utc::now().date_naive(),
        end_date: None,
        status: ProjectStatus::Active,
        members: vec![],
        boards: boards.clone(),
    };
    service.insert_project(project.clone()).await;

    let todo = boards[0].id;
    let seeded = [
        ("Mount brackets", Priority::High),
        ("Run cabling", Priority::Medium),
        ("Flash firmware", Priority::Urgent),
    ];
    for (i, (title, priority)) in seeded.into_iter().enumerate() {
        let task = Task::new(ids.task_id(), todo, title, i as i32).with_priority(priority);
        service.insert_task(task).await;
    }
    project
}

fn columns_of<S: TaskService>(kanban: &KanbanBoard<S>) -> Vec<ColumnView> {
    kanban
        .columns()
        .into_iter()
        .map(|column| ColumnView {
            board: column.board.name.clone(),
            tasks: column
                .tasks
                .iter()
                .map(|t| TaskView {
                    title: t.title.clone(),
                    priority: t.priority,
                    position: t.position,
                })
                .collect(),
        })
        .collect()
}

fn print_columns(columns: &[ColumnView], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(columns)?);
        return Ok(());
    }
    for column in columns {
        println!("[{}] ({})", column.board, column.tasks.len());
        for task in &column.tasks {
            println!("  - {} ({}, pos {})", task.title, task.priority, task.position);
        }
    }
    Ok(())
}

async fn run_demo(cache: &FileCache, fail_moves: usize, json: bool, latency: Duration) -> Result<()> {
    let service = Arc::new(if latency.is_zero() {
        InMemoryTaskService::new()
    } else {
        InMemoryTaskService::with_latency(latency)
    });
    let project = seed(&service).await;
    let notifier = RecordingNotifier::new();

    let mut kanban = KanbanBoard::new(service.clone(), BoardConfig::default());
    kanban
        .load_project(project.id)
        .await
        .context("loading seeded project")?;

    // the Todo column goes through the list-view cache like any other list page
    let todo_board = project.boards_in_order()[0].id;
    let mut todo_view = CachedView::<Vec<Task>>::new(cache_keys::board_tasks(todo_board));
    todo_view
        .mount(cache, || service.fetch_board_tasks(todo_board))
        .await;
    if let Some(tasks) = todo_view.data() {
        tracing::info!(cached_tasks = tasks.len(), key = todo_view.key(), "todo list view ready");
    }

    let columns = project.boards_in_order();
    let (doing, done) = (columns[1].id, columns[2].id);
    let todo_tasks: Vec<_> = kanban
        .store()
        .board_tasks(todo_board)
        .iter()
        .map(|t| t.id)
        .collect();
    let [first, second, ..] = *todo_tasks.as_slice() else {
        bail!("seeded project has fewer than two tasks");
    };

    println!("== loaded");
    print_columns(&columns_of(&kanban), json)?;

    if let Some(active) = kanban.begin_drag(first) {
        tracing::info!(task = %active.title, "drag started");
    }
    let outcome = kanban.drop_on(first, doing, &notifier).await;
    println!("== drag 1 -> In Progress: {outcome:?}");

    service.fail_next_moves(fail_moves);
    kanban.begin_drag(second);
    let outcome = kanban.drop_on(second, done, &notifier).await;
    println!("== drag 2 -> Done: {outcome:?}");

    print_columns(&columns_of(&kanban), json)?;
    for notice in notifier.notices() {
        println!("notice: {notice}");
    }
    Ok(())
}

fn print_staleness(cache: &FileCache, key: &str) {
    let stale = cache.is_stale(key);
    match cache.age(key) {
        Some(age) => println!("{key}: stale={stale} age={}s", age.num_seconds()),
        None => println!("{key}: stale={stale} (no entry)"),
    }
}

fn run_cache(cache: &FileCache, action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Get { key } => match cache.get::<serde_json::Value>(&key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("(miss) {key}"),
        },
        CacheAction::Stale { key } => print_staleness(cache, &key),
        CacheAction::List => {
            let mut keys = cache.keys();
            keys.sort();
            for key in keys {
                match cache_keys::view_of(&key) {
                    Some(view) => println!("{key}  [{view}]"),
                    None => println!("{key}"),
                }
            }
        }
        CacheAction::Timesheets {
            scope,
            start,
            end,
            status,
        } => {
            if end < start {
                bail!("--end {end} is before --start {start}");
            }
            let key = cache_keys::timesheets(scope.into(), start, end, status.as_deref());
            print_staleness(cache, &key);
            if let Some(rows) = cache.get::<Vec<serde_json::Value>>(&key) {
                println!("{} cached rows", rows.len());
            }
        }
        CacheAction::Clear { key } => cache.clear(&key),
        CacheAction::ClearAll => cache.clear_all(),
    }
    Ok(())
}


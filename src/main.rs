//! hobbes CLI - front-end asset pipeline
//!
//! Usage: hobbes [COMMAND]
//!
//! Commands:
//!   watch    Start the dev server and rebuild on change (default)
//!   build    One-shot build of every category
//!   fonts | images | markup | styles | scripts
//!            One-shot build of a single category
//!   lint     Run the style and script lint gates
//!   clean    Full cleanse of the output tree
//!   docs     Generate stylesheet documentation
//!   tasks    Print the registered task graph

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use hobbes::alert::Alerter;
use hobbes::config::Config;
use hobbes::graph::TaskGraph;
use hobbes::paths::PathTable;
use hobbes::pipeline::{run_task, RunEvent, TaskContext};
use hobbes::server::{BrowserSyncServer, DevServer, NullServer};
use hobbes::watcher::{watch, WatchEvent, WatchOptions};

/// hobbes - front-end asset pipeline
#[derive(Parser, Debug)]
#[command(name = "hobbes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to hobbes.toml (default: ./hobbes.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the dev server and rebuild on change
    Watch,

    /// One-shot build of every category
    Build,

    /// Publish fonts
    Fonts,

    /// Optimize and publish images
    Images,

    /// Publish markup
    Markup,

    /// Compile, prefix, and minify stylesheets
    Styles,

    /// Bundle and minify scripts
    Scripts,

    /// Run the style and script lint gates
    Lint,

    /// Full cleanse of the output tree
    Clean,

    /// Generate stylesheet documentation
    Docs,

    /// Print the registered task graph
    Tasks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `default` is an alias for `watch`.
    let command = cli.command.unwrap_or(Commands::Watch);

    match command {
        Commands::Watch => cmd_watch(cli.config.as_deref(), cli.json),
        Commands::Build => cmd_task("build:all", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Fonts => cmd_task("fonts", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Images => cmd_task("images", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Markup => cmd_task("markup", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Styles => cmd_task("styles", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Scripts => cmd_task("scripts", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Lint => cmd_task("lint", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Clean => cmd_task("clean:all", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Docs => cmd_task("docs", cli.config.as_deref(), cli.json, cli.verbose),
        Commands::Tasks => cmd_tasks(cli.config.as_deref(), cli.json),
    }
}

/// Load config and paths for the current project root.
fn load_project(config_path: Option<&Path>) -> Result<(Config, PathTable, PathBuf)> {
    let project_root = std::env::current_dir()?;
    let config = match config_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&project_root)?,
    };
    let paths = PathTable::new(&config.site)?;
    Ok((config, paths, project_root))
}

/// One-shot task runner: any failure surfaces the diagnostic and exits
/// non-zero (there is no supervising loop to keep alive).
fn cmd_task(name: &str, config_path: Option<&Path>, json: bool, verbose: u8) -> Result<()> {
    let (config, paths, project_root) = load_project(config_path)?;
    let ctx = TaskContext::new(&config, &paths, &project_root);
    let graph = TaskGraph::standard()?;

    if !json {
        println!("🔨 hobbes {name}");
    }

    let summary = run_task(&graph, name, &ctx, &|event| {
        if json {
            println!("{}", event.to_json());
        } else if let RunEvent::TaskComplete {
            task,
            written,
            removed,
        } = &event
        {
            println!("  ✓ {task} ({written} written, {removed} removed)");
        }
    })?;

    if json {
        let output = serde_json::json!({
            "event": "run_complete",
            "task": name,
            "tasks_run": summary.tasks_run.len(),
            "written": summary.written.len(),
            "removed": summary.removed.len(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "\n✓ {} tasks, {} files written, {} removed",
            summary.tasks_run.len(),
            summary.written.len(),
            summary.removed.len()
        );
        if verbose > 0 {
            for path in &summary.written {
                println!("  + {}", path.display());
            }
            for path in &summary.removed {
                println!("  - {}", path.display());
            }
        }
    }

    Ok(())
}

fn cmd_watch(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (config, paths, project_root) = load_project(config_path)?;
    let ctx = TaskContext::new(&config, &paths, &project_root);
    let graph = TaskGraph::standard()?;
    let alerter = Alerter::new(config.tools.notifier.clone());
    let options = WatchOptions::from_config(&config);

    let mut server: Box<dyn DevServer> = if config.server.enabled {
        Box::new(BrowserSyncServer::new(
            config.server.clone(),
            config.tools.clone(),
        ))
    } else {
        Box::new(NullServer::default())
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    if !json {
        println!("👀 hobbes watch");
        println!("Press Ctrl+C to stop\n");
    }

    watch(
        &options,
        &graph,
        &ctx,
        server.as_mut(),
        &alerter,
        running,
        |event| {
            if json {
                println!("{}", event.to_json());
            } else {
                print_watch_event(&event);
            }
            // Watch runs until killed; flush so piped consumers (CI, tests)
            // see events as they happen rather than on buffer boundaries.
            let _ = std::io::Write::flush(&mut std::io::stdout());
        },
    )?;

    Ok(())
}

fn print_watch_event(event: &WatchEvent) {
    match event {
        WatchEvent::WatchStarted { source } => {
            println!("📂 Watching: {source}");
        }
        WatchEvent::ServerStarted { proxy } => {
            println!("🌐 Dev server proxying {proxy}");
        }
        WatchEvent::FileChanged { category, path } => {
            println!("📝 {category}: {path}");
        }
        WatchEvent::BuildStarted { task } => {
            println!("🔄 {task}...");
        }
        WatchEvent::BuildComplete {
            task,
            written,
            removed,
        } => {
            println!("✓ {task}: {written} written, {removed} removed");
        }
        WatchEvent::BuildFailed { task, message } => {
            eprintln!("✗ {task}: {message}");
        }
        WatchEvent::Reload { category, full } => {
            if *full {
                println!("↻ reload ({category})");
            } else {
                println!("↻ inject ({category})");
            }
        }
        WatchEvent::Error { message } => {
            eprintln!("✗ {message}");
        }
        WatchEvent::Shutdown => {
            println!("\n👋 Shutting down...");
        }
    }
}

fn cmd_tasks(config_path: Option<&Path>, json: bool) -> Result<()> {
    // Config is loaded for parity (a broken file should fail here too), but
    // the registry itself is static.
    let _ = load_project(config_path)?;
    let graph = TaskGraph::standard()?;

    for task in graph.all_tasks()? {
        if json {
            let output = serde_json::json!({
                "event": "task",
                "name": task.name,
                "deps": task.deps,
            });
            println!("{}", serde_json::to_string(&output)?);
        } else if task.deps.is_empty() {
            println!("{}", task.name);
        } else {
            println!("{}  ← {}", task.name, task.deps.join(", "));
        }
    }

    Ok(())
}

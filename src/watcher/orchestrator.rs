//! Watch supervisor
//!
//! A single dispatch loop: file events from `notify` are classified against
//! the path table, filtered by content hash to drop no-op writes, debounced
//! per category, and each ready category runs its task chain to completion
//! before the loop continues. Task failures go through the error handler;
//! the loop itself only exits when the running flag drops.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::alert::Alerter;
use crate::error::PipelineResult;
use crate::fs::{hash_content, walk_files};
use crate::graph::TaskGraph;
use crate::paths::AssetCategory;
use crate::pipeline::{run_task, TaskContext};
use crate::server::{DevServer, ReloadKind};

use super::event::{DebounceState, WatchEvent, WatchOptions};

/// Poll interval for the event channel
const POLL_MS: u64 = 50;

/// Drain window for the spurious events notify emits right after a watcher
/// is registered
const STARTUP_COOLDOWN_MS: u64 = 500;

/// Run the watch supervisor until `running` drops.
///
/// idle → active happens here: the dev server starts, the watcher is
/// installed on the source root, and the dispatch loop takes over. There is
/// no active → idle transition; external termination ends the process.
pub fn watch(
    options: &WatchOptions,
    graph: &TaskGraph,
    ctx: &TaskContext<'_>,
    server: &mut dyn DevServer,
    alerter: &Alerter,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> PipelineResult<()> {
    let source_root = ctx.absolute(ctx.paths.source_root());

    event_callback(WatchEvent::WatchStarted {
        source: source_root.display().to_string(),
    });

    server.start()?;
    event_callback(WatchEvent::ServerStarted {
        proxy: ctx.config.server.proxy.clone(),
    });

    // Seed content hashes so pre-existing files don't read as changes.
    let mut content_hashes: HashMap<PathBuf, String> = HashMap::new();
    for file in walk_files(&source_root)? {
        if let Ok(content) = std::fs::read(&file) {
            content_hashes.insert(file, hash_content(&content));
        }
    }

    if options.initial_build {
        run_bound_task(graph, "build:all", None, ctx, server, alerter, &event_callback);
    }

    // Set up the file watcher.
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        NotifyConfig::default(),
    )
    .map_err(|e| std::io::Error::other(e.to_string()))?;

    watcher
        .watch(&source_root, RecursiveMode::Recursive)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    // Startup cooldown: notify sometimes reports existing files right after
    // the watcher is registered.
    let cooldown_end = Instant::now() + Duration::from_millis(STARTUP_COOLDOWN_MS);
    while Instant::now() < cooldown_end {
        let _ = rx.recv_timeout(Duration::from_millis(POLL_MS));
    }

    let mut state = DebounceState::new();

    while running.load(Ordering::SeqCst) {
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(POLL_MS)) {
            // Canonicalize so event paths match the hash tracker even when
            // the project root sits behind a symlink.
            let path = path.canonicalize().unwrap_or(path);
            if let Some(category) = classify_change(ctx, &path, &mut content_hashes) {
                state.add_change(category, path);
            }
        }

        for category in state.ready(options.debounce) {
            let changes = state.take(category);
            for path in &changes {
                event_callback(WatchEvent::FileChanged {
                    category: category.name().to_string(),
                    path: path.display().to_string(),
                });
            }
            run_bound_task(
                graph,
                category.name(),
                Some(category),
                ctx,
                server,
                alerter,
                &event_callback,
            );
        }
    }

    server.shutdown();
    event_callback(WatchEvent::Shutdown);
    Ok(())
}

/// Map a raw file event to a category, dropping directory events, paths
/// outside every input glob, and writes that did not change content.
fn classify_change(
    ctx: &TaskContext<'_>,
    path: &Path,
    content_hashes: &mut HashMap<PathBuf, String>,
) -> Option<AssetCategory> {
    if path.is_dir() {
        return None;
    }
    let category = ctx.paths.classify(ctx.project_root, path)?;

    match std::fs::read(path) {
        Ok(content) => {
            let new_hash = hash_content(&content);
            if content_hashes.get(path) == Some(&new_hash) {
                return None;
            }
            content_hashes.insert(path.to_path_buf(), new_hash);
        }
        // Deleted (or unreadable) files still count as changes.
        Err(_) => {
            content_hashes.remove(path);
        }
    }

    Some(category)
}

/// Run one task chain inside the supervisor: failures are alerted and
/// reported, never propagated - the loop must survive them.
fn run_bound_task(
    graph: &TaskGraph,
    task: &str,
    category: Option<AssetCategory>,
    ctx: &TaskContext<'_>,
    server: &mut dyn DevServer,
    alerter: &Alerter,
    event_callback: &impl Fn(WatchEvent),
) {
    event_callback(WatchEvent::BuildStarted {
        task: task.to_string(),
    });

    match run_task(graph, task, ctx, &|_| {}) {
        Ok(summary) => {
            event_callback(WatchEvent::BuildComplete {
                task: task.to_string(),
                written: summary.written.len(),
                removed: summary.removed.len(),
            });
            if let Some(category) = category {
                match server.changed(category, &summary.written) {
                    Ok(()) => event_callback(WatchEvent::Reload {
                        category: category.name().to_string(),
                        full: ReloadKind::for_category(category) == ReloadKind::Full,
                    }),
                    Err(e) => event_callback(WatchEvent::Error {
                        message: format!("reload failed: {e}"),
                    }),
                }
            }
        }
        Err(e) => {
            alerter.task_failed(task, &e.to_string());
            event_callback(WatchEvent::BuildFailed {
                task: task.to_string(),
                message: e.to_string(),
            });
        }
    }
}

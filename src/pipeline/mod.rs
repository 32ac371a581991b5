//! Task execution
//!
//! `run_task` resolves a task name against the graph, runs the transitive
//! dependency chain in topological order, and stops at the first failure.
//! Failure *policy* lives with the caller: one-shot invocations propagate
//! the error to the process boundary, the watch supervisor routes it to the
//! error handler and keeps going.

pub mod build;
pub mod clean;
pub mod docs;
pub mod lint;
pub mod transform;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::PipelineResult;
use crate::graph::{TaskAction, TaskGraph};
use crate::paths::PathTable;

pub use build::BuildReport;
pub use clean::CleanReport;

/// Everything a task action needs, passed by reference.
pub struct TaskContext<'a> {
    pub config: &'a Config,
    pub paths: &'a PathTable,
    pub project_root: &'a Path,
}

impl<'a> TaskContext<'a> {
    pub fn new(config: &'a Config, paths: &'a PathTable, project_root: &'a Path) -> Self {
        Self {
            config,
            paths,
            project_root,
        }
    }

    /// Resolve a table-relative path against the project root.
    pub fn absolute(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.project_root.join(relative)
        }
    }
}

/// Progress events emitted while running a task chain.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    TaskStarted { task: String },
    TaskComplete { task: String, written: usize, removed: usize },
}

impl RunEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Aggregate result of a task-chain run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Tasks executed, in order
    pub tasks_run: Vec<String>,
    /// Files written by build tasks
    pub written: Vec<PathBuf>,
    /// Paths removed by cleanup tasks
    pub removed: Vec<PathBuf>,
}

/// Run `name` and its transitive dependencies in topological order.
///
/// Returns at the first failing action; everything already completed stays
/// completed (cleanup before a failing build is deliberate, not rolled
/// back).
pub fn run_task(
    graph: &TaskGraph,
    name: &str,
    ctx: &TaskContext<'_>,
    on_event: &impl Fn(RunEvent),
) -> PipelineResult<RunSummary> {
    let order = graph.execution_order(name)?;
    let mut summary = RunSummary::default();

    for spec in order {
        on_event(RunEvent::TaskStarted {
            task: spec.name.clone(),
        });

        let mut written = 0;
        let mut removed = 0;
        match spec.action {
            TaskAction::Clean(category) => {
                let report = clean::clean_category(ctx, category)?;
                removed = report.removed.len();
                summary.removed.extend(report.removed);
            }
            TaskAction::CleanAll => {
                let report = clean::clean_all(ctx)?;
                removed = report.removed.len();
                summary.removed.extend(report.removed);
            }
            TaskAction::Build(category) => {
                let report = build::build_category(ctx, category)?;
                written = report.written.len();
                summary.written.extend(report.written);
            }
            TaskAction::Lint(kind) => {
                lint::run_lint(ctx, kind)?;
            }
            TaskAction::Docs => {
                let report = docs::generate(ctx)?;
                written = report.len();
                summary.written.extend(report);
            }
            TaskAction::Group => {}
        }

        on_event(RunEvent::TaskComplete {
            task: spec.name.clone(),
            written,
            removed,
        });
        summary.tasks_run.push(spec.name.clone());
    }

    Ok(summary)
}

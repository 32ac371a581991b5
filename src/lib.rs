//! hobbes - front-end asset pipeline
//!
//! Compiles stylesheets, bundles scripts, optimizes images, copies markup
//! and fonts, lints sources, and runs a live-reload development loop. The
//! heavy lifting is delegated to external tools; what lives here is the
//! task dependency graph and the rebuild orchestration around it.

pub mod alert;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod paths;
pub mod pipeline;
pub mod server;
pub mod tools;
pub mod watcher;

// Re-exports for convenience
pub use alert::Alerter;
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use graph::{LintKind, TaskAction, TaskGraph, TaskSpec};
pub use paths::{AssetCategory, PathTable};
pub use pipeline::{run_task, RunEvent, RunSummary, TaskContext};
pub use server::{BrowserSyncServer, DevServer, NullServer, ReloadKind};
pub use tools::{run_tool, Substitutions, ToolCommand};
pub use watcher::{watch, WatchEvent, WatchOptions};

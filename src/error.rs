//! Error types for hobbes
//!
//! Uses `thiserror` for library errors; the binary boundary wraps these in
//! `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Path table construction failed (e.g. two categories share an output)
    #[error("invalid path table: {message}")]
    PathTable { message: String },

    /// Task name not present in the registry
    #[error("unknown task '{name}'")]
    UnknownTask { name: String },

    /// Two tasks registered under the same name
    #[error("duplicate task '{name}'")]
    DuplicateTask { name: String },

    /// A task declares a dependency that does not exist
    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    /// The dependency relation is not acyclic
    #[error("dependency cycle detected at task '{task}'")]
    DependencyCycle { task: String },

    /// External tool binary not found on PATH
    #[error("external tool '{program}' not found - is it installed?")]
    ToolMissing { program: String },

    /// External tool ran but exited unsuccessfully
    #[error("'{program}' failed with status {status}: {output}")]
    ToolFailed {
        program: String,
        status: i32,
        output: String,
    },

    /// Lint engine reported error-severity findings
    #[error("lint '{tool}' reported findings:\n{output}")]
    LintFindings { tool: String, output: String },

    /// Image decode/encode failure
    #[error("image processing failed for {path}: {message}")]
    Image { path: PathBuf, message: String },

    /// Stylesheet post-processing failure
    #[error("css processing failed for {file}: {message}")]
    Css { file: PathBuf, message: String },

    /// Invalid glob pattern in configuration
    #[error("invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    /// Output path escapes the project output root
    #[error("path '{path}' escapes output root '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },
}

//! Lint tasks
//!
//! Pure gates: expand the category's source set minus the configured
//! exclusion globs, hand the file list to the external lint engine, and
//! fail on error-severity findings (a non-zero linter exit). No artifact
//! is produced.

use std::path::PathBuf;

use glob::Pattern;

use crate::error::{PipelineError, PipelineResult};
use crate::fs::walk_files;
use crate::graph::LintKind;
use crate::paths::AssetCategory;
use crate::tools::{run_tool, Substitutions};

use super::TaskContext;

/// Run one lint gate.
pub fn run_lint(ctx: &TaskContext<'_>, kind: LintKind) -> PipelineResult<()> {
    let (category, tool, excludes) = match kind {
        LintKind::Styles => (
            AssetCategory::Styles,
            &ctx.config.tools.style_lint,
            &ctx.config.lint.style_exclude,
        ),
        LintKind::Scripts => (
            AssetCategory::Scripts,
            &ctx.config.tools.script_lint,
            &ctx.config.lint.script_exclude,
        ),
    };

    let files = lint_file_set(ctx, category, excludes)?;
    if files.is_empty() {
        return Ok(());
    }

    let args: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    match run_tool(tool, &Substitutions::new(), &args) {
        Ok(_) => Ok(()),
        Err(PipelineError::ToolFailed {
            program, output, ..
        }) => Err(PipelineError::LintFindings {
            tool: program,
            output,
        }),
        Err(e) => Err(e),
    }
}

/// The category's source files matching its input glob, minus exclusions.
/// Paths are returned relative to the project root.
pub fn lint_file_set(
    ctx: &TaskContext<'_>,
    category: AssetCategory,
    excludes: &[String],
) -> PipelineResult<Vec<PathBuf>> {
    let exclude_patterns = compile_patterns(excludes)?;
    let cat_paths = ctx.paths.category(category);
    let source_dir = ctx.absolute(&cat_paths.source_dir);

    let mut files = Vec::new();
    for file in walk_files(&source_dir)? {
        let relative = file
            .strip_prefix(ctx.project_root)
            .unwrap_or(&file)
            .to_path_buf();
        if !cat_paths.input_glob.matches_path(&relative) {
            continue;
        }
        if exclude_patterns.iter().any(|p| p.matches_path(&relative)) {
            continue;
        }
        files.push(relative);
    }
    Ok(files)
}

fn compile_patterns(globs: &[String]) -> PipelineResult<Vec<Pattern>> {
    globs
        .iter()
        .map(|g| {
            Pattern::new(g).map_err(|e| PipelineError::Glob {
                pattern: g.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

//! Build tasks
//!
//! One transform-and-publish operation per category. The cleanup
//! precondition is enforced by the task graph, never re-checked here.

use std::path::{Component, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::paths::AssetCategory;

use super::transform;
use super::TaskContext;

/// Result of a build run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Files written, in deterministic order
    pub written: Vec<PathBuf>,
}

/// Transform and publish one category.
pub fn build_category(
    ctx: &TaskContext<'_>,
    category: AssetCategory,
) -> PipelineResult<BuildReport> {
    let cat_paths = ctx.paths.category(category);
    let source_dir = ctx.absolute(&cat_paths.source_dir);
    let output_dir = ctx.absolute(&cat_paths.output_dir);

    let written = match category {
        AssetCategory::Fonts | AssetCategory::Markup => {
            transform::copy_tree(&source_dir, &output_dir)?
        }
        AssetCategory::Images => {
            transform::optimize_images(&source_dir, &output_dir, &ctx.config.images)?
        }
        AssetCategory::Styles => transform::compile_styles(
            &source_dir,
            &output_dir,
            &ctx.config.tools.style_compiler,
            &ctx.config.css,
        )?,
        AssetCategory::Scripts => {
            let bundle_name = &ctx.config.scripts.bundle_name;
            ensure_bare_file_name(bundle_name, &output_dir)?;
            transform::bundle_scripts(
                &ctx.absolute(&ctx.config.scripts.entry),
                &output_dir.join(bundle_name),
                &ctx.config.tools.script_bundler,
            )?
        }
    };

    Ok(BuildReport { written })
}

/// A configured bundle name must stay inside the scripts output directory.
fn ensure_bare_file_name(name: &str, output_dir: &std::path::Path) -> PipelineResult<()> {
    let path = std::path::Path::new(name);
    let mut components = path.components();
    let simple = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !simple {
        return Err(PipelineError::PathEscape {
            path: path.to_path_buf(),
            root: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

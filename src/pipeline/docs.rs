//! Stylesheet documentation task
//!
//! Delegates to the configured docs generator (sassdoc by default), writing
//! under the assets namespace. Outside the build dependency chain.

use std::path::PathBuf;

use crate::error::PipelineResult;
use crate::paths::AssetCategory;
use crate::tools::{run_tool, Substitutions};

use super::TaskContext;

/// Generate stylesheet documentation. Returns the destination directory
/// when the generator ran, empty when there is nothing to document.
pub fn generate(ctx: &TaskContext<'_>) -> PipelineResult<Vec<PathBuf>> {
    let source_dir = ctx.absolute(&ctx.paths.category(AssetCategory::Styles).source_dir);
    if !source_dir.exists() {
        return Ok(Vec::new());
    }

    let dest = ctx.absolute(&ctx.paths.assets_root().join("sassdoc"));
    std::fs::create_dir_all(&dest)?;

    let subst = Substitutions::new().indir(&source_dir).outdir(&dest);
    run_tool(&ctx.config.tools.docs, &subst, &[])?;

    Ok(vec![dest])
}

//! Cleanup tasks
//!
//! Each category deletes only its own generated output. Markup cleanup
//! clears the output root but must spare the assets subtree it shares a
//! parent with; styles and scripts remove their named artifacts rather than
//! sweeping the directory. All cleanups are idempotent no-ops when nothing
//! matches.

use std::path::PathBuf;

use crate::error::PipelineResult;
use crate::fs::{clear_dir_excluding, remove_file_if_exists};
use crate::paths::AssetCategory;

use super::TaskContext;

/// Result of a cleanup run.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    /// Paths removed (for directories, the directory root)
    pub removed: Vec<PathBuf>,
}

/// Delete a category's generated output.
pub fn clean_category(
    ctx: &TaskContext<'_>,
    category: AssetCategory,
) -> PipelineResult<CleanReport> {
    let output_dir = ctx.absolute(&ctx.paths.category(category).output_dir);
    let mut report = CleanReport::default();

    match category {
        AssetCategory::Styles => {
            // Generated artifacts are `<stem>.css` / `<stem>.min.css`; the
            // stylesheets directory holds nothing else that is ours.
            for stale in generated_css(&output_dir)? {
                if remove_file_if_exists(&stale)? {
                    report.removed.push(stale);
                }
            }
        }
        AssetCategory::Scripts => {
            let path = output_dir.join(&ctx.config.scripts.bundle_name);
            if remove_file_if_exists(&path)? {
                report.removed.push(path);
            }
        }
        AssetCategory::Markup => {
            // The assets tree lives under the markup output root; it belongs
            // to the other categories and must survive a markup cleanse.
            report.removed =
                clear_dir_excluding(&output_dir, &["assets".to_string()])?;
        }
        AssetCategory::Fonts | AssetCategory::Images => {
            report.removed = clear_dir_excluding(&output_dir, &[])?;
        }
    }

    Ok(report)
}

/// Full cleanse of the output tree.
pub fn clean_all(ctx: &TaskContext<'_>) -> PipelineResult<CleanReport> {
    let output_root = ctx.absolute(ctx.paths.output_root());
    Ok(CleanReport {
        removed: clear_dir_excluding(&output_root, &[])?,
    })
}

fn generated_css(output_dir: &std::path::Path) -> PipelineResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !output_dir.exists() {
        return Ok(found);
    }
    for entry in std::fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".css") {
            found.push(entry.path());
        }
    }
    Ok(found)
}

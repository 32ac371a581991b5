//! Typed path table for asset categories
//!
//! Replaces ad-hoc string concatenation of source/destination paths with a
//! table keyed by a closed category enum, built once at startup and passed
//! by reference to every component that needs it.

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::{PipelineError, PipelineResult};

/// Asset category - a closed, compile-time-known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Fonts,
    Images,
    Markup,
    Styles,
    Scripts,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Fonts,
        AssetCategory::Images,
        AssetCategory::Markup,
        AssetCategory::Styles,
        AssetCategory::Scripts,
    ];

    /// Stable lowercase name; doubles as the build task name.
    pub fn name(self) -> &'static str {
        match self {
            AssetCategory::Fonts => "fonts",
            AssetCategory::Images => "images",
            AssetCategory::Markup => "markup",
            AssetCategory::Styles => "styles",
            AssetCategory::Scripts => "scripts",
        }
    }

    /// Name of the category's cleanup task.
    pub fn clean_task(self) -> &'static str {
        match self {
            AssetCategory::Fonts => "clean:fonts",
            AssetCategory::Images => "clean:images",
            AssetCategory::Markup => "clean:markup",
            AssetCategory::Styles => "clean:styles",
            AssetCategory::Scripts => "clean:scripts",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Paths for one category: where its sources live and where output goes.
#[derive(Debug, Clone)]
pub struct CategoryPaths {
    /// Glob matching this category's inputs, relative to the project root
    pub input_glob: Pattern,
    /// Directory the inputs live under, relative to the project root
    pub source_dir: PathBuf,
    /// Destination directory, relative to the project root
    pub output_dir: PathBuf,
}

/// Static mapping from category to input glob and output directory.
///
/// Constructed once from [`SiteConfig`]; lookups are pure and infallible.
#[derive(Debug, Clone)]
pub struct PathTable {
    source_root: PathBuf,
    output_root: PathBuf,
    assets_root: PathBuf,
    fonts: CategoryPaths,
    images: CategoryPaths,
    markup: CategoryPaths,
    styles: CategoryPaths,
    scripts: CategoryPaths,
}

impl PathTable {
    /// Build the table for a site. Fails if the configuration maps two
    /// categories to the same output directory.
    pub fn new(site: &SiteConfig) -> PipelineResult<Self> {
        let src = &site.source_root;
        let out = &site.output_root;
        let assets = out.join("assets").join(&site.name);

        let fonts = CategoryPaths {
            input_glob: compile_glob(&format!("{}/fonts/**", src.display()))?,
            source_dir: src.join("fonts"),
            output_dir: assets.join("fonts"),
        };
        let images = CategoryPaths {
            input_glob: compile_glob(&format!("{}/images/**", src.display()))?,
            source_dir: src.join("images"),
            output_dir: assets.join("images"),
        };
        let markup = CategoryPaths {
            input_glob: compile_glob(&format!("{}/html/**", src.display()))?,
            source_dir: src.join("html"),
            output_dir: out.clone(),
        };
        let styles = CategoryPaths {
            input_glob: compile_glob(&format!("{}/scss/**/*.scss", src.display()))?,
            source_dir: src.join("scss"),
            output_dir: assets.join("stylesheets"),
        };
        let scripts = CategoryPaths {
            input_glob: compile_glob(&format!("{}/javascript/**/*.js", src.display()))?,
            source_dir: src.join("javascript"),
            output_dir: assets.join("javascript"),
        };

        let table = Self {
            source_root: src.clone(),
            output_root: out.clone(),
            assets_root: assets,
            fonts,
            images,
            markup,
            styles,
            scripts,
        };
        table.validate_disjoint()?;
        Ok(table)
    }

    fn validate_disjoint(&self) -> PipelineResult<()> {
        let dirs: Vec<(&str, &Path)> = AssetCategory::ALL
            .iter()
            .map(|&c| (c.name(), self.category(c).output_dir.as_path()))
            .collect();
        ensure_disjoint(&dirs)
    }

    /// Pure lookup: paths for a category.
    pub fn category(&self, category: AssetCategory) -> &CategoryPaths {
        match category {
            AssetCategory::Fonts => &self.fonts,
            AssetCategory::Images => &self.images,
            AssetCategory::Markup => &self.markup,
            AssetCategory::Styles => &self.styles,
            AssetCategory::Scripts => &self.scripts,
        }
    }

    /// Root of the source tree, relative to the project root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Root of the output tree, relative to the project root.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The `assets/<sitename>` namespace under the output root.
    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// Map a changed path to the category whose input glob matches it.
    ///
    /// `path` may be absolute; it is matched relative to `project_root`.
    /// Categories are disjoint by construction, so at most one matches.
    pub fn classify(&self, project_root: &Path, path: &Path) -> Option<AssetCategory> {
        let relative = path.strip_prefix(project_root).unwrap_or(path);
        AssetCategory::ALL
            .into_iter()
            .find(|&c| self.category(c).input_glob.matches_path(relative))
    }
}

/// No two categories may publish into the same directory.
fn ensure_disjoint(dirs: &[(&str, &Path)]) -> PipelineResult<()> {
    for (i, (name_a, dir_a)) in dirs.iter().enumerate() {
        for (name_b, dir_b) in dirs.iter().skip(i + 1) {
            if dir_a == dir_b {
                return Err(PipelineError::PathTable {
                    message: format!(
                        "categories '{name_a}' and '{name_b}' share output directory '{}'",
                        dir_a.display()
                    ),
                });
            }
        }
    }
    Ok(())
}

fn compile_glob(pattern: &str) -> PipelineResult<Pattern> {
    Pattern::new(pattern).map_err(|e| PipelineError::Glob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn table() -> PathTable {
        PathTable::new(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn output_dirs_follow_site_namespace() {
        let mut site = SiteConfig::default();
        site.name = "onbase".to_string();
        let table = PathTable::new(&site).unwrap();

        assert_eq!(
            table.category(AssetCategory::Styles).output_dir,
            PathBuf::from("public/assets/onbase/stylesheets")
        );
        assert_eq!(
            table.category(AssetCategory::Markup).output_dir,
            PathBuf::from("public")
        );
    }

    #[test]
    fn classify_styles_change() {
        let root = Path::new("/project");
        let table = table();
        assert_eq!(
            table.classify(root, Path::new("/project/src/scss/x.scss")),
            Some(AssetCategory::Styles)
        );
        assert_eq!(
            table.classify(root, Path::new("/project/src/scss/base/_mixins.scss")),
            Some(AssetCategory::Styles)
        );
    }

    #[test]
    fn classify_is_exclusive_per_path() {
        let root = Path::new("/project");
        let table = table();

        let cases = [
            ("src/fonts/display/heading.woff2", AssetCategory::Fonts),
            ("src/images/logo.png", AssetCategory::Images),
            ("src/html/index.html", AssetCategory::Markup),
            ("src/scss/style.scss", AssetCategory::Styles),
            ("src/javascript/app.js", AssetCategory::Scripts),
        ];
        for (path, expected) in cases {
            let matched: Vec<_> = AssetCategory::ALL
                .into_iter()
                .filter(|&c| {
                    table
                        .category(c)
                        .input_glob
                        .matches_path(Path::new(path))
                })
                .collect();
            assert_eq!(matched, vec![expected], "path {path}");
            assert_eq!(table.classify(root, &root.join(path)), Some(expected));
        }
    }

    #[test]
    fn classify_ignores_unrelated_paths() {
        let root = Path::new("/project");
        let table = table();
        assert_eq!(table.classify(root, Path::new("/project/README.md")), None);
        assert_eq!(
            table.classify(root, Path::new("/project/src/scss/notes.txt")),
            None
        );
        assert_eq!(
            table.classify(root, Path::new("/project/public/assets/site/fonts/a.woff")),
            None
        );
    }

    #[test]
    fn shared_output_dirs_rejected() {
        let shared = Path::new("public/assets/site/js");
        let err = ensure_disjoint(&[
            ("scripts", shared),
            ("fonts", Path::new("public/assets/site/fonts")),
            ("images", shared),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("share output directory"));

        assert!(ensure_disjoint(&[
            ("scripts", Path::new("a")),
            ("fonts", Path::new("b")),
        ])
        .is_ok());
    }

    #[test]
    fn category_names_are_task_names() {
        assert_eq!(AssetCategory::Styles.name(), "styles");
        assert_eq!(AssetCategory::Styles.clean_task(), "clean:styles");
        assert_eq!(AssetCategory::Styles.to_string(), "styles");
    }
}

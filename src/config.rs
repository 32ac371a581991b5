//! Configuration for hobbes
//!
//! Loaded from `hobbes.toml` at the project root. Every key has a default,
//! so an empty (or absent) file yields a working pipeline for the standard
//! `src/` → `public/` layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::tools::ToolCommand;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub css: CssConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PipelineError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `hobbes.toml` from the project root, falling back to defaults
    /// when the file is absent. A present-but-invalid file is an error.
    pub fn load_or_default(project_root: &Path) -> PipelineResult<Self> {
        let path = project_root.join("hobbes.toml");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Site identity and tree roots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Namespace under `public/assets/` for non-markup output
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Source tree root
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Output tree root
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            source_root: default_source_root(),
            output_root: default_output_root(),
        }
    }
}

fn default_site_name() -> String {
    "site".to_string()
}

fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("public")
}

/// Dev-server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Start the dev server in watch mode (disable for headless CI runs)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host the dev server proxies
    #[serde(default = "default_proxy")]
    pub proxy: String,

    /// Port the dev server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Quiet period before a burst of file events triggers a rebuild
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proxy: default_proxy(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_proxy() -> String {
    "localhost:8080".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_debounce_ms() -> u64 {
    1000
}

/// External tool commands
///
/// Each entry is a program plus argument template; see [`crate::tools`] for
/// the placeholder contract. Overriding an entry swaps the collaborator
/// without touching the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Sass compiler: `{input}` entry stylesheet, `{output}` compiled css
    #[serde(default = "default_style_compiler")]
    pub style_compiler: ToolCommand,

    /// Script bundler: `{input}` entry module, `{output}` bundle path
    #[serde(default = "default_script_bundler")]
    pub script_bundler: ToolCommand,

    /// Style linter; the file set is appended after the template
    #[serde(default = "default_style_lint")]
    pub style_lint: ToolCommand,

    /// Script linter; the file set is appended after the template
    #[serde(default = "default_script_lint")]
    pub script_lint: ToolCommand,

    /// Stylesheet documentation generator: `{indir}` source, `{outdir}` dest
    #[serde(default = "default_docs")]
    pub docs: ToolCommand,

    /// Long-running dev server: `{proxy}`, `{port}`
    #[serde(default = "default_dev_server")]
    pub dev_server: ToolCommand,

    /// Short-lived reload trigger against the running dev server: `{port}`
    #[serde(default = "default_reload")]
    pub reload: ToolCommand,

    /// Desktop notifier; receives title and message as trailing arguments
    #[serde(default = "default_notifier")]
    pub notifier: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            style_compiler: default_style_compiler(),
            script_bundler: default_script_bundler(),
            style_lint: default_style_lint(),
            script_lint: default_script_lint(),
            docs: default_docs(),
            dev_server: default_dev_server(),
            reload: default_reload(),
            notifier: default_notifier(),
        }
    }
}

fn default_style_compiler() -> ToolCommand {
    ToolCommand::new("sass", &["--no-source-map", "{input}", "{output}"])
}

fn default_script_bundler() -> ToolCommand {
    ToolCommand::new(
        "esbuild",
        &["{input}", "--bundle", "--minify", "--outfile={output}"],
    )
}

fn default_style_lint() -> ToolCommand {
    ToolCommand::new("stylelint", &[])
}

fn default_script_lint() -> ToolCommand {
    ToolCommand::new("eslint", &[])
}

fn default_docs() -> ToolCommand {
    ToolCommand::new("sassdoc", &["{indir}", "--dest", "{outdir}"])
}

fn default_dev_server() -> ToolCommand {
    ToolCommand::new(
        "browser-sync",
        &[
            "start",
            "--proxy",
            "{proxy}",
            "--port",
            "{port}",
            "--no-open",
            "--no-ui",
        ],
    )
}

fn default_reload() -> ToolCommand {
    ToolCommand::new("browser-sync", &["reload", "--port", "{port}"])
}

#[cfg(target_os = "macos")]
fn default_notifier() -> ToolCommand {
    ToolCommand::new("osascript", &["-e"])
}

#[cfg(not(target_os = "macos"))]
fn default_notifier() -> ToolCommand {
    ToolCommand::new("notify-send", &[])
}

/// Lint exclusion lists (vendor/generated/third-party sources)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Globs excluded from style linting, relative to the project root
    #[serde(default = "default_style_exclude")]
    pub style_exclude: Vec<String>,

    /// Globs excluded from script linting, relative to the project root
    #[serde(default = "default_script_exclude")]
    pub script_exclude: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            style_exclude: default_style_exclude(),
            script_exclude: default_script_exclude(),
        }
    }
}

fn default_style_exclude() -> Vec<String> {
    vec![
        "src/scss/bootstrap/**".to_string(),
        "src/scss/_bootstrap*.scss".to_string(),
    ]
}

fn default_script_exclude() -> Vec<String> {
    vec![
        "src/javascript/bootstrap/**".to_string(),
        "src/javascript/bootstrap*.js".to_string(),
        "src/javascript/vendor/**".to_string(),
    ]
}

/// Browser targets for vendor prefixing, by minimum major version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssConfig {
    #[serde(default = "default_chrome")]
    pub chrome: Option<u32>,
    #[serde(default = "default_firefox")]
    pub firefox: Option<u32>,
    #[serde(default = "default_safari")]
    pub safari: Option<u32>,
    #[serde(default = "default_edge")]
    pub edge: Option<u32>,
    #[serde(default)]
    pub ios_saf: Option<u32>,
    #[serde(default)]
    pub android: Option<u32>,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            chrome: default_chrome(),
            firefox: default_firefox(),
            safari: default_safari(),
            edge: default_edge(),
            ios_saf: None,
            android: None,
        }
    }
}

fn default_chrome() -> Option<u32> {
    Some(109)
}

fn default_firefox() -> Option<u32> {
    Some(115)
}

fn default_safari() -> Option<u32> {
    Some(15)
}

fn default_edge() -> Option<u32> {
    Some(109)
}

/// Image recompression settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// JPEG re-encode quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    85
}

/// Script bundling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Bundle entry point, relative to the project root
    #[serde(default = "default_script_entry")]
    pub entry: PathBuf,

    /// Name of the emitted bundle
    #[serde(default = "default_bundle_name")]
    pub bundle_name: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            entry: default_script_entry(),
            bundle_name: default_bundle_name(),
        }
    }
}

fn default_script_entry() -> PathBuf {
    PathBuf::from("src/javascript/app.js")
}

fn default_bundle_name() -> String {
    "bundle.js".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_has_standard_layout() {
        let config = Config::default();
        assert_eq!(config.site.name, "site");
        assert_eq!(config.site.source_root, PathBuf::from("src"));
        assert_eq!(config.site.output_root, PathBuf::from("public"));
        assert_eq!(config.server.debounce_ms, 1000);
        assert!(config.server.enabled);
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scripts.bundle_name, "bundle.js");
        assert_eq!(config.tools.style_compiler.program, "sass");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[site]
name = "onbase"

[server]
debounce_ms = 200

[tools.style_compiler]
program = "dart-sass"
args = ["{input}", "{output}"]
"#,
        )
        .unwrap();
        assert_eq!(config.site.name, "onbase");
        assert_eq!(config.server.debounce_ms, 200);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.tools.style_compiler.program, "dart-sass");
        assert_eq!(config.tools.script_bundler.program, "esbuild");
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.site.name, "site");
    }

    #[test]
    fn load_or_default_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hobbes.toml"), "site = nonsense").unwrap();
        let err = Config::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn lint_excludes_cover_vendor_trees() {
        let config = Config::default();
        assert!(config
            .lint
            .script_exclude
            .iter()
            .any(|g| g.contains("vendor")));
    }
}

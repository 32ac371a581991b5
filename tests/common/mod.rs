//! Common test utilities for hobbes CLI tests.
//!
//! Provides `Project` - an isolated project fixture in a temp directory
//! with a standard source tree and a config that swaps every external
//! collaborator for a hermetic stub.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tempfile::TempDir;

/// Result of running the hobbes CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Config used by default in tests: dev server off, short debounce, and
/// stand-in tools (`cp` for the compiler/bundler, `true` for linters and
/// the notifier) so no real front-end toolchain is required.
pub const STUB_CONFIG: &str = r#"
[site]
name = "testsite"

[server]
enabled = false
debounce_ms = 200

[tools.style_compiler]
program = "cp"
args = ["{input}", "{output}"]

[tools.script_bundler]
program = "cp"
args = ["{input}", "{output}"]

[tools.style_lint]
program = "true"

[tools.script_lint]
program = "true"

[tools.notifier]
program = "true"
"#;

/// Isolated project fixture.
pub struct Project {
    root: TempDir,
}

impl Project {
    /// Empty project with the stub config and no sources.
    pub fn bare() -> Self {
        let root = TempDir::new().unwrap();
        let project = Self { root };
        project.write("hobbes.toml", STUB_CONFIG);
        project
    }

    /// Project with a small source file in every category.
    pub fn with_sources() -> Self {
        let project = Self::bare();
        project.write("src/fonts/body.woff2", "font-bytes");
        project.write("src/images/logo.svg", "<svg/>");
        project.write("src/html/index.html", "<html><body></body></html>");
        project.write("src/html/pages/about.html", "<p>about</p>");
        project.write("src/scss/style.scss", "body { color: #ff0000; }");
        project.write("src/scss/_mixins.scss", "@mixin hidden {}");
        project.write("src/javascript/app.js", "console.log('app');");
        project
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write a file under the project root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn read_bytes(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Run the hobbes CLI in this project and wait for it.
    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_hobbes"))
            .args(args)
            .current_dir(self.root.path())
            .output()
            .expect("failed to run hobbes");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Spawn a long-running hobbes command (watch tests), stdout piped.
    pub fn spawn(&self, args: &[&str]) -> Child {
        Command::new(env!("CARGO_BIN_EXE_hobbes"))
            .args(args)
            .current_dir(self.root.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn hobbes")
    }
}

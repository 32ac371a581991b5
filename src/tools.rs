//! External tool invocation
//!
//! Every non-trivial transform (Sass compilation, script bundling, linting,
//! docs generation, the dev server, the desktop notifier) is an external
//! collaborator. This module is the single narrow contract for invoking
//! them: a configured program plus an argument template with placeholder
//! substitution.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// A configured external command: program name plus argument template.
///
/// Template arguments may contain `{input}`, `{output}`, `{outdir}`,
/// `{indir}`, `{proxy}` and `{port}` placeholders, replaced at invocation
/// time. Unknown placeholders are left verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Placeholder values substituted into a [`ToolCommand`] argument template.
#[derive(Debug, Clone, Default)]
pub struct Substitutions {
    pairs: Vec<(&'static str, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.pairs.push(("{input}", path.display().to_string()));
        self
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.pairs.push(("{output}", path.display().to_string()));
        self
    }

    pub fn outdir(mut self, path: &Path) -> Self {
        self.pairs.push(("{outdir}", path.display().to_string()));
        self
    }

    pub fn indir(mut self, path: &Path) -> Self {
        self.pairs.push(("{indir}", path.display().to_string()));
        self
    }

    pub fn proxy(mut self, value: &str) -> Self {
        self.pairs.push(("{proxy}", value.to_string()));
        self
    }

    pub fn port(mut self, value: u16) -> Self {
        self.pairs.push(("{port}", value.to_string()));
        self
    }

    fn apply(&self, arg: &str) -> String {
        let mut out = arg.to_string();
        for (key, value) in &self.pairs {
            out = out.replace(key, value);
        }
        out
    }

    /// Expand the full argument template.
    pub fn expand(&self, template: &[String]) -> Vec<String> {
        template.iter().map(|a| self.apply(a)).collect()
    }
}

/// Captured output of a completed tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Combine stdout and stderr for diagnostics, trimmed.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        if !self.stdout.trim().is_empty() {
            out.push_str(self.stdout.trim());
        }
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(self.stderr.trim());
        }
        out
    }
}

/// Run a tool to completion, capturing output.
///
/// Extra arguments (e.g. a lint file set) are appended after the expanded
/// template. A missing binary maps to `ToolMissing`; a non-zero exit maps
/// to `ToolFailed` carrying the combined output.
pub fn run_tool(
    tool: &ToolCommand,
    subst: &Substitutions,
    extra_args: &[String],
) -> PipelineResult<ToolOutput> {
    let args = subst.expand(&tool.args);

    let output = Command::new(&tool.program)
        .args(&args)
        .args(extra_args)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::ToolMissing {
                program: tool.program.clone(),
            },
            _ => PipelineError::Io(e),
        })?;

    let out = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !output.status.success() {
        return Err(PipelineError::ToolFailed {
            program: tool.program.clone(),
            status: output.status.code().unwrap_or(-1),
            output: out.combined(),
        });
    }

    Ok(out)
}

/// Spawn a tool without waiting (used for the dev-server child process).
pub fn spawn_tool(
    tool: &ToolCommand,
    subst: &Substitutions,
) -> PipelineResult<std::process::Child> {
    let args = subst.expand(&tool.args);
    Command::new(&tool.program)
        .args(&args)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::ToolMissing {
                program: tool.program.clone(),
            },
            _ => PipelineError::Io(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn substitutions_expand_placeholders() {
        let tool = ToolCommand::new("sass", &["--no-source-map", "{input}", "{output}"]);
        let subst = Substitutions::new()
            .input(&PathBuf::from("src/scss/style.scss"))
            .output(&PathBuf::from("out/style.css"));

        let args = subst.expand(&tool.args);
        assert_eq!(
            args,
            vec!["--no-source-map", "src/scss/style.scss", "out/style.css"]
        );
    }

    #[test]
    fn substitutions_leave_unknown_placeholders() {
        let subst = Substitutions::new().port(3000);
        let args = subst.expand(&["{port}".to_string(), "{mystery}".to_string()]);
        assert_eq!(args, vec!["3000", "{mystery}"]);
    }

    #[test]
    fn run_tool_missing_binary() {
        let tool = ToolCommand::new("hobbes-no-such-binary-xyzzy", &[]);
        let err = run_tool(&tool, &Substitutions::new(), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::ToolMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_maps_failure_status() {
        let tool = ToolCommand::new("sh", &["-c", "echo broken >&2; exit 3"]);
        let err = run_tool(&tool, &Substitutions::new(), &[]).unwrap_err();
        match err {
            PipelineError::ToolFailed {
                program,
                status,
                output,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(status, 3);
                assert!(output.contains("broken"));
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn run_tool_captures_stdout() {
        let tool = ToolCommand::new("sh", &["-c", "echo hello"]);
        let out = run_tool(&tool, &Substitutions::new(), &[]).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }
}

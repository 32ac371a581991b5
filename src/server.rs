//! Dev-server contract
//!
//! The live-reload server is an external collaborator (browser-sync by
//! default), managed as a child process. Stylesheet changes are injected
//! via the reload trigger's `--files` form; everything else forces a full
//! reload.

use std::path::PathBuf;
use std::process::Child;

use crate::config::{ServerConfig, ToolsConfig};
use crate::error::PipelineResult;
use crate::paths::AssetCategory;
use crate::tools::{run_tool, spawn_tool, Substitutions};

/// How the dev server should react to a category's rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Swap changed stylesheets in place, no page reload
    Inject,
    /// Full page reload
    Full,
}

impl ReloadKind {
    pub fn for_category(category: AssetCategory) -> Self {
        match category {
            AssetCategory::Styles => ReloadKind::Inject,
            _ => ReloadKind::Full,
        }
    }
}

/// Narrow contract between the orchestrator and the live-reload server.
pub trait DevServer {
    /// idle → active: bring the server up against the configured proxy.
    fn start(&mut self) -> PipelineResult<()>;

    /// Tell the server a category's output changed.
    fn changed(&mut self, category: AssetCategory, written: &[PathBuf]) -> PipelineResult<()>;

    /// Tear the server down (process exit path).
    fn shutdown(&mut self);
}

/// browser-sync driven as a child process plus short-lived reload triggers.
pub struct BrowserSyncServer {
    server: ServerConfig,
    tools: ToolsConfig,
    child: Option<Child>,
}

impl BrowserSyncServer {
    pub fn new(server: ServerConfig, tools: ToolsConfig) -> Self {
        Self {
            server,
            tools,
            child: None,
        }
    }

    fn subst(&self) -> Substitutions {
        Substitutions::new()
            .proxy(&self.server.proxy)
            .port(self.server.port)
    }
}

impl DevServer for BrowserSyncServer {
    fn start(&mut self) -> PipelineResult<()> {
        let child = spawn_tool(&self.tools.dev_server, &self.subst())?;
        self.child = Some(child);
        Ok(())
    }

    fn changed(&mut self, category: AssetCategory, written: &[PathBuf]) -> PipelineResult<()> {
        let mut extra = Vec::new();
        if ReloadKind::for_category(category) == ReloadKind::Inject && !written.is_empty() {
            extra.push("--files".to_string());
            extra.push(
                written
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        run_tool(&self.tools.reload, &self.subst(), &extra)?;
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for BrowserSyncServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Stand-in for one-shot builds, disabled-server watch runs, and tests.
#[derive(Debug, Default)]
pub struct NullServer {
    pub changes: Vec<(AssetCategory, usize)>,
}

impl DevServer for NullServer {
    fn start(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn changed(&mut self, category: AssetCategory, written: &[PathBuf]) -> PipelineResult<()> {
        self.changes.push((category, written.len()));
        Ok(())
    }

    fn shutdown(&mut self) {}
}

//! Failure alerts
//!
//! The single chokepoint for watch-mode failures: push a desktop
//! notification through the configured notifier command and ring the
//! terminal bell. Everything here is best-effort - an unavailable notifier
//! must never take the watch loop down with it.

use std::io::Write;

use is_terminal::IsTerminal;

use crate::tools::ToolCommand;

/// Fixed title template for failure notifications.
const TITLE: &str = "hobbes: task failed";

/// Emits failure notifications without ever failing itself.
#[derive(Debug, Clone)]
pub struct Alerter {
    notifier: ToolCommand,
}

impl Alerter {
    pub fn new(notifier: ToolCommand) -> Self {
        Self { notifier }
    }

    /// Notify the user that a task failed. Invoked from the watch
    /// supervisor only; one-shot runs surface errors on stderr instead.
    pub fn task_failed(&self, task: &str, message: &str) {
        let summary = format!("{task}: {message}");
        self.notify(&summary);
        bell();
    }

    fn notify(&self, message: &str) {
        // First line only - notification daemons truncate anyway.
        let message = message.lines().next().unwrap_or(message);
        let _ = std::process::Command::new(&self.notifier.program)
            .args(&self.notifier.args)
            .arg(TITLE)
            .arg(message)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
    }
}

/// Audible alert; suppressed when stderr is not a terminal.
fn bell() {
    let mut stderr = std::io::stderr();
    if stderr.is_terminal() {
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

//! E2E tests for `hobbes watch`
//!
//! The watch process is spawned with the dev server disabled and killed
//! after a scripted sequence of file edits; assertions run over the NDJSON
//! event stream. Sleeps are generous relative to the 200ms test debounce.

mod common;

use std::thread;
use std::time::Duration;

use common::Project;

/// Startup slack: initial build + watcher registration + cooldown.
const STARTUP: Duration = Duration::from_millis(2000);
/// Slack for one debounced rebuild to land.
const REBUILD: Duration = Duration::from_millis(1500);

fn finish(mut child: std::process::Child) -> String {
    let _ = child.kill();
    let output = child.wait_with_output().expect("failed to collect output");
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn count_events(output: &str, needle: &str) -> usize {
    output.lines().filter(|l| l.contains(needle)).count()
}

#[test]
fn watch_starts_and_runs_initial_build() {
    let project = Project::with_sources();
    let child = project.spawn(&["watch", "--json"]);

    thread::sleep(STARTUP);
    let output = finish(child);

    assert!(
        output.contains("\"event\":\"watch_started\""),
        "missing watch_started: {output}"
    );
    assert!(
        output.contains("\"event\":\"server_started\""),
        "missing server_started: {output}"
    );
    assert!(
        output.contains("\"event\":\"build_complete\"") && output.contains("build:all"),
        "missing initial build: {output}"
    );
    assert!(project.exists("public/index.html"));
}

#[test]
fn style_change_triggers_exactly_one_styles_run() {
    let project = Project::with_sources();
    let child = project.spawn(&["watch", "--json"]);
    thread::sleep(STARTUP);

    // Two rapid writes inside one debounce window.
    project.write("src/scss/style.scss", "body { color: #00ff00; }");
    thread::sleep(Duration::from_millis(50));
    project.write("src/scss/style.scss", "body { color: #0000ff; }");

    thread::sleep(REBUILD);
    let output = finish(child);

    assert_eq!(
        count_events(&output, "\"event\":\"build_complete\",\"task\":\"styles\""),
        1,
        "expected exactly one styles run: {output}"
    );
    // No other category was triggered by the scss change.
    assert_eq!(
        count_events(&output, "\"event\":\"build_complete\",\"task\":\"scripts\""),
        0,
        "scripts must not rebuild on an scss change: {output}"
    );
    assert_eq!(
        count_events(&output, "\"event\":\"build_complete\",\"task\":\"fonts\""),
        0
    );
    assert!(
        output.contains("\"event\":\"reload\",\"category\":\"styles\",\"full\":false"),
        "styles rebuild should inject, not reload: {output}"
    );
}

#[test]
fn watch_survives_task_failure_and_keeps_dispatching() {
    let project = Project::with_sources();
    // Break the style compiler before starting; fonts stay healthy.
    project.write(
        "hobbes.toml",
        &common::STUB_CONFIG.replace(
            "[tools.style_compiler]\nprogram = \"cp\"\nargs = [\"{input}\", \"{output}\"]",
            "[tools.style_compiler]\nprogram = \"false\"",
        ),
    );

    let mut child = project.spawn(&["watch", "--json"]);
    thread::sleep(STARTUP);

    // Trigger the failing category.
    project.write("src/scss/style.scss", "body { color: rebeccapurple; }");
    thread::sleep(REBUILD);

    // The supervisor must still be alive and dispatching other categories.
    assert!(
        child.try_wait().expect("try_wait failed").is_none(),
        "watch process exited after a task failure"
    );

    project.write("src/fonts/extra.woff2", "more-font-bytes");
    thread::sleep(REBUILD);

    let output = finish(child);

    assert!(
        output.contains("\"event\":\"build_failed\",\"task\":\"styles\""),
        "missing build_failed for styles: {output}"
    );
    assert_eq!(
        count_events(&output, "\"event\":\"build_complete\",\"task\":\"fonts\""),
        1,
        "fonts must still build after a styles failure: {output}"
    );
    assert!(project.exists("public/assets/testsite/fonts/extra.woff2"));
}

#[test]
fn noop_rewrite_does_not_trigger_a_rebuild() {
    let project = Project::with_sources();
    let child = project.spawn(&["watch", "--json"]);
    thread::sleep(STARTUP);

    // Identical content: the content-hash filter should drop it.
    project.write("src/scss/style.scss", "body { color: #ff0000; }");
    thread::sleep(REBUILD);

    let output = finish(child);
    assert_eq!(
        count_events(&output, "\"event\":\"build_complete\",\"task\":\"styles\""),
        0,
        "unchanged content must not rebuild: {output}"
    );
}

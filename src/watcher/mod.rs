//! Watch mode
//!
//! Maps file-system change events to category task chains:
//! - per-category debouncing (configurable quiet period)
//! - content-hash filtering of no-op writes
//! - serialized dispatch (runs for one category never overlap)
//! - failures routed through the error handler; the loop survives them
//! - NDJSON event output for CI

mod event;
mod orchestrator;

pub use event::{DebounceState, WatchEvent, WatchOptions};
pub use orchestrator::watch;

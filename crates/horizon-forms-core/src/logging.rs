//! Logging facilities for Horizon Forms.
//!
//! Horizon Forms uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in the
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_forms::form=debug,horizon_forms::dependency=trace")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_forms::signal";
    /// Field builder registry.
    pub const MAPPER: &str = "horizon_forms::mapper";
    /// Form construction and commit.
    pub const FORM: &str = "horizon_forms::form";
    /// Input part state transitions.
    pub const PART: &str = "horizon_forms::part";
    /// Dependency wiring and callback execution.
    pub const DEPENDENCY: &str = "horizon_forms::dependency";
    /// Localization lookups.
    pub const LOCALIZATION: &str = "horizon_forms::localization";
    /// Performance spans.
    pub const PERF: &str = "horizon_forms::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time form construction and commit.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}

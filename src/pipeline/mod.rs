//! Pipeline orchestration for API checks.
//!
//! Shared load → build → report logic used by the CLI command handlers.

mod build_stage;
mod load;
mod output;
mod report_stage;

pub use build_stage::{run_builds, BuildRun};
pub use load::{load_profile, load_source_index};
pub use output::{should_use_color, write_output, OutputTarget};
pub use report_stage::output_report;

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse a snapshot file
    #[error("Load failed for {path}: {source}")]
    LoadFailed {
        path: String,
        source: anyhow::Error,
    },

    /// A component build failed
    #[error("Build of {component} failed: {source}")]
    BuildFailed {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no error problems (or no `--fail-on-error`)
    pub const SUCCESS: i32 = 0;
    /// Error problems were reported
    pub const PROBLEMS_FOUND: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs. Each returns the exit code the
//! process should end with.

mod check;
mod filters;

pub use check::{run_check, CheckConfig, CheckPaths};
pub use filters::{run_filters, FiltersFormat};

//! **API compatibility analysis for versioned Java components.**
//!
//! `api-tools` compares the API of components in a workspace against the
//! same components in a baseline and reports what a consumer of the API
//! would notice:
//!
//! - **Compatibility**: binary-incompatible changes such as removed methods
//!   or types, narrowed visibility or new abstract methods on interfaces.
//! - **Usage**: references into other components that ignore their
//!   `@noreference`, `@noextend`, `@noimplement` or `@noinstantiate`
//!   restrictions.
//! - **Version numbering**: component versions that do not reflect breakage
//!   (major) or additions (minor).
//! - **Since tags**: added API elements without a `@since` tag, with a
//!   malformed one, or with one newer than the component.
//!
//! Known problems can be accepted per component through an `.api_filters`
//! document.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: versions, type structures, components, profiles and
//!   problem records. Profiles load from JSON snapshots.
//! - **[`reference`]**: reference kinds, resolution of references against a
//!   profile and the illegal API use scan.
//! - **[`filter`]**: the lazily loaded [`FilterStore`] of accepted problems.
//! - **[`delta`]**: the delta tree produced by comparing two versions of a
//!   component and the binary compatibility rules.
//! - **[`builder`]**: the [`ApiBuilder`] that runs full and incremental
//!   builds, validates since tags and applies the version policy.
//! - **[`reports`]**: summary, JSON and SARIF renderings of a build.
//! - **[`config`]**: `.api-tools.yaml` configuration of severities and build toggles.
//!
//! ## Getting Started
//!
//! ```no_run
//! use api_tools::builder::{ApiBuilder, BuildKind, BuildRequest, ProblemStore};
//! use api_tools::config::AppConfig;
//! use api_tools::pipeline::load_profile;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let baseline = load_profile(Path::new("baseline.json"), true)?;
//!     let workspace = load_profile(Path::new("workspace.json"), true)?;
//!
//!     let config = AppConfig::default();
//!     let builder = ApiBuilder::new(Box::new(config.severities.clone()))
//!         .with_options(config.build.options());
//!     let store = ProblemStore::new();
//!     let request = BuildRequest {
//!         workspace: &workspace,
//!         baseline: Some(&baseline),
//!         component_id: "org.example.core",
//!     };
//!     let outcome = builder.build(&request, &BuildKind::Full, &store)?;
//!
//!     println!("{} problems, breakage: {}", store.len(), outcome.breakage);
//!     Ok(())
//! }
//! ```

#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::similar_names
)]

pub mod builder;
pub mod cli;
pub mod config;
pub mod delta;
pub mod error;
pub mod filter;
pub mod model;
pub mod pipeline;
pub mod reference;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use builder::{
    ApiBuilder, BuildKind, BuildOptions, BuildOutcome, BuildRequest, ProblemSink, ProblemStore,
    ResourceDelta,
};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, ConfigPreset, Validatable};
pub use error::{ApiToolsError, ErrorContext, Result};
pub use filter::{ApiProblemFilter, FilterStore};
pub use model::{Component, ProblemRecord, Profile, Severity, TypeStructure, Version};
pub use reference::{ApiUseAnalyzer, Reference};
pub use reports::{ReportFormat, ReportGenerator};

//! Configuration module for api-tools.
//!
//! This module provides a unified configuration system with:
//! - Problem severities per category, preference key and component
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading, discovery and CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use api_tools::config::{AppConfig, ConfigPreset};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Strict);
//!
//! let config = AppConfig::builder()
//!     .severity("CLASS_REMOVED_METHOD", Severity::Warning)
//!     .parallel_compare(true)
//!     .build();
//!
//! use api_tools::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.api-tools.yaml` file in your project root or `~/.config/api-tools/`:
//!
//! ```yaml
//! severities:
//!   usage: error
//!   overrides:
//!     CLASS_REMOVED_METHOD: warning
//! build:
//!   parallel_compare: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_CONFIG_FILE};
pub use types::{AppConfig, AppConfigBuilder, BuildConfig, OutputConfig, SeverityConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// The schema documents every option of `.api-tools.yaml` for editor
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

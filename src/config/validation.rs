//! Configuration validation for api-tools.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, BuildConfig, OutputConfig, SeverityConfig};
use std::collections::BTreeMap;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.severities.validate());
        errors.extend(self.build.validate());
        errors.extend(self.output.validate());
        errors
    }
}

/// Preference keys are upper snake case, e.g. `CLASS_REMOVED_METHOD`.
fn is_preference_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn check_keys<'a>(
    field: &str,
    keys: impl IntoIterator<Item = &'a String>,
    errors: &mut Vec<ConfigError>,
) {
    for key in keys {
        if !is_preference_key(key) {
            errors.push(ConfigError {
                field: field.to_string(),
                message: format!("Invalid preference key '{key}'. Keys are upper snake case"),
            });
        }
    }
}

impl Validatable for SeverityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_keys("severities.overrides", self.overrides.keys(), &mut errors);

        for (component, keys) in &self.projects {
            if component.trim().is_empty() {
                errors.push(ConfigError {
                    field: "severities.projects".to_string(),
                    message: "Component id must not be empty".to_string(),
                });
            }
            check_keys(
                &format!("severities.projects.{component}"),
                BTreeMap::keys(keys),
                &mut errors,
            );
        }
        errors
    }
}

impl Validatable for BuildConfig {
    fn validate(&self) -> Vec<ConfigError> {
        // Boolean toggles only
        Vec::new()
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(parent) = self.file.as_deref().and_then(std::path::Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                errors.push(ConfigError {
                    field: "output.file".to_string(),
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }

        errors
    }
}

//! Configuration types for api-tools.
//!
//! Provides structured configuration for problem severities, build toggles
//! and report output.

use crate::builder::{
    BuildOptions, PreferenceResolver, INCOMPATIBLE_API_COMPONENT_VERSION,
    INVALID_SINCE_TAG_VERSION, MALFORMED_SINCE_TAG, MISSING_SINCE_TAG, RESTRICTION_PREFIX,
};
use crate::model::{ProblemCategory, Severity};
use crate::reports::ReportFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over the file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Problem severities
    pub severities: SeverityConfig,
    /// Build toggles
    pub build: BuildConfig,
    /// Output configuration (format, file, quiet)
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the default severity of a problem category.
    pub fn category_severity(mut self, category: ProblemCategory, severity: Severity) -> Self {
        match category {
            ProblemCategory::Compatibility => self.config.severities.compatibility = severity,
            ProblemCategory::Usage => self.config.severities.usage = severity,
            ProblemCategory::VersionNumbering => self.config.severities.version_numbering = severity,
            ProblemCategory::SinceTag => {
                self.config.severities.missing_since_tag = severity;
                self.config.severities.malformed_since_tag = severity;
                self.config.severities.invalid_since_tag_version = severity;
            }
        }
        self
    }

    /// Override the severity of one preference key.
    pub fn severity(mut self, key: impl Into<String>, severity: Severity) -> Self {
        self.config.severities.overrides.insert(key.into(), severity);
        self
    }

    /// Override the severity of one preference key for one component.
    pub fn component_severity(
        mut self,
        component_id: impl Into<String>,
        key: impl Into<String>,
        severity: Severity,
    ) -> Self {
        self.config
            .severities
            .projects
            .entry(component_id.into())
            .or_default()
            .insert(key.into(), severity);
        self
    }

    /// Compare changed types in parallel.
    pub const fn parallel_compare(mut self, enabled: bool) -> Self {
        self.config.build.parallel_compare = enabled;
        self
    }

    /// Scan for illegal API use.
    pub const fn check_api_usage(mut self, enabled: bool) -> Self {
        self.config.build.check_api_usage = enabled;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.output.quiet = quiet;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Severity Configuration
// ============================================================================

/// Severities of reported problems.
///
/// A preference key is resolved in order: the component's own overrides,
/// the global overrides, then the default of the key's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeverityConfig {
    /// Incompatible API changes
    pub compatibility: Severity,
    /// Illegal use of restricted API
    pub usage: Severity,
    /// Component versions that do not follow the version policy
    pub version_numbering: Severity,
    /// Added elements without a since tag
    pub missing_since_tag: Severity,
    /// Since tags that are not `major.minor`
    pub malformed_since_tag: Severity,
    /// Since tags newer than the component
    pub invalid_since_tag_version: Severity,
    /// Per preference key overrides (e.g. `CLASS_REMOVED_METHOD: ignore`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, Severity>,
    /// Per component overrides, keyed by component id then preference key
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub projects: BTreeMap<String, BTreeMap<String, Severity>>,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            compatibility: Severity::Error,
            usage: Severity::Warning,
            version_numbering: Severity::Error,
            missing_since_tag: Severity::Warning,
            malformed_since_tag: Severity::Warning,
            invalid_since_tag_version: Severity::Warning,
            overrides: BTreeMap::new(),
            projects: BTreeMap::new(),
        }
    }
}

impl SeverityConfig {
    /// Same severity for every category.
    #[must_use]
    pub fn uniform(severity: Severity) -> Self {
        Self {
            compatibility: severity,
            usage: severity,
            version_numbering: severity,
            missing_since_tag: severity,
            malformed_since_tag: severity,
            invalid_since_tag_version: severity,
            overrides: BTreeMap::new(),
            projects: BTreeMap::new(),
        }
    }

    /// Category default for a preference key.
    #[must_use]
    pub fn category_default(&self, key: &str) -> Severity {
        match key {
            INCOMPATIBLE_API_COMPONENT_VERSION => self.version_numbering,
            MISSING_SINCE_TAG => self.missing_since_tag,
            MALFORMED_SINCE_TAG => self.malformed_since_tag,
            INVALID_SINCE_TAG_VERSION => self.invalid_since_tag_version,
            _ if key.starts_with(RESTRICTION_PREFIX) => self.usage,
            _ => self.compatibility,
        }
    }
}

impl PreferenceResolver for SeverityConfig {
    fn severity_for(&self, key: &str, unit: &str) -> Severity {
        self.projects
            .get(unit)
            .and_then(|keys| keys.get(key))
            .or_else(|| self.overrides.get(key))
            .copied()
            .unwrap_or_else(|| self.category_default(key))
    }
}

// ============================================================================
// Build Configuration
// ============================================================================

/// Build toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BuildConfig {
    /// Compare the changed types of an incremental build in parallel
    pub parallel_compare: bool,
    /// Scan for illegal use of restricted API
    pub check_api_usage: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel_compare: false,
            check_api_usage: true,
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub const fn options(&self) -> BuildOptions {
        BuildOptions {
            parallel_compare: self.parallel_compare,
            check_api_usage: self.check_api_usage,
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Output-related configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Suppress non-essential output
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_resolution_order() {
        let config = AppConfig::builder()
            .severity("CLASS_REMOVED_METHOD", Severity::Ignore)
            .component_severity("core", "CLASS_REMOVED_METHOD", Severity::Warning)
            .build();
        let severities = &config.severities;
        assert_eq!(severities.severity_for("CLASS_REMOVED_METHOD", "core"), Severity::Warning);
        assert_eq!(severities.severity_for("CLASS_REMOVED_METHOD", "ui"), Severity::Ignore);
        assert_eq!(severities.severity_for("CLASS_REMOVED_FIELD", "ui"), Severity::Error);
    }

    #[test]
    fn test_category_defaults() {
        let severities = SeverityConfig::default();
        assert_eq!(severities.category_default("RESTRICTION_NOEXTEND"), Severity::Warning);
        assert_eq!(
            severities.category_default(INCOMPATIBLE_API_COMPONENT_VERSION),
            Severity::Error
        );
        assert_eq!(severities.category_default(MISSING_SINCE_TAG), Severity::Warning);
        assert_eq!(severities.category_default("INTERFACE_ADDED_METHOD"), Severity::Error);
    }

    #[test]
    fn test_builder_category_severity() {
        let config = AppConfig::builder()
            .category_severity(ProblemCategory::SinceTag, Severity::Ignore)
            .parallel_compare(true)
            .build();
        assert_eq!(config.severities.malformed_since_tag, Severity::Ignore);
        assert!(config.build.options().parallel_compare);
        assert!(config.build.options().check_api_usage);
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = "severities:\n  usage: error\n  overrides:\n    CLASS_REMOVED_METHOD: ignore\nbuild:\n  parallel_compare: true\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.severities.usage, Severity::Error);
        assert_eq!(config.severities.compatibility, Severity::Error);
        assert_eq!(
            config.severities.overrides.get("CLASS_REMOVED_METHOD"),
            Some(&Severity::Ignore)
        );
        assert!(config.build.parallel_compare);
        assert!(config.build.check_api_usage);
    }
}

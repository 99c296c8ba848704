//! Default configurations and presets for api-tools.
//!
//! Provides named presets for common use cases and default values.

use super::types::{AppConfig, BuildConfig, OutputConfig, SeverityConfig};
use crate::model::Severity;
use crate::reports::ReportFormat;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Breakage and version problems are errors, the rest warnings
    Default,
    /// Every problem is an error
    Strict,
    /// Only breakage and version problems are reported, as warnings
    Lenient,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "strict" | "ci" => Some(Self::Strict),
            "lenient" | "permissive" => Some(Self::Lenient),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Errors for API breakage and version numbering, warnings otherwise",
            Self::Strict => "Every problem is an error and reports are machine readable",
            Self::Lenient => "Warnings for breakage and version numbering only",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Strict, Self::Lenient]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Strict => Self::strict_preset(),
            ConfigPreset::Lenient => Self::lenient_preset(),
        }
    }

    /// Strict preset for release pipelines.
    ///
    /// - Every problem is an error
    /// - SARIF output
    #[must_use]
    pub fn strict_preset() -> Self {
        Self {
            severities: SeverityConfig::uniform(Severity::Error),
            build: BuildConfig::default(),
            output: OutputConfig {
                format: ReportFormat::Sarif,
                file: None,
                quiet: true,
            },
        }
    }

    /// Lenient preset for components still settling their API.
    ///
    /// - Breakage and version problems are warnings
    /// - Usage and since-tag checks are off
    #[must_use]
    pub fn lenient_preset() -> Self {
        Self {
            severities: SeverityConfig {
                compatibility: Severity::Warning,
                usage: Severity::Ignore,
                version_numbering: Severity::Warning,
                missing_since_tag: Severity::Ignore,
                malformed_since_tag: Severity::Ignore,
                invalid_since_tag_version: Severity::Ignore,
                ..SeverityConfig::default()
            },
            build: BuildConfig {
                parallel_compare: false,
                check_api_usage: false,
            },
            output: OutputConfig::default(),
        }
    }
}

// ============================================================================
// Default Value Constants
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = ".api-tools.yaml";

// ============================================================================
// Tests
// ============================================================================

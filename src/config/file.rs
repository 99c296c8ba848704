//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{AppConfig, SeverityConfig};
use crate::reports::ReportFormat;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".api-tools.yaml",
    ".api-tools.yml",
    "api-tools.yaml",
    "api-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/api-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    let cwd = std::env::current_dir().ok();
    cwd.as_deref()
        .and_then(find_config_in_dir)
        .or_else(|| find_git_root().and_then(|root| find_config_in_dir(&root)))
        .or_else(|| dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("api-tools"))))
        .or_else(|| dirs::home_dir().and_then(|home| find_config_in_dir(&home)))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults are taken from `other`.
    pub fn merge(&mut self, other: &Self) {
        let defaults = SeverityConfig::default();
        let ours = &mut self.severities;
        let theirs = &other.severities;
        if theirs.compatibility != defaults.compatibility {
            ours.compatibility = theirs.compatibility;
        }
        if theirs.usage != defaults.usage {
            ours.usage = theirs.usage;
        }
        if theirs.version_numbering != defaults.version_numbering {
            ours.version_numbering = theirs.version_numbering;
        }
        if theirs.missing_since_tag != defaults.missing_since_tag {
            ours.missing_since_tag = theirs.missing_since_tag;
        }
        if theirs.malformed_since_tag != defaults.malformed_since_tag {
            ours.malformed_since_tag = theirs.malformed_since_tag;
        }
        if theirs.invalid_since_tag_version != defaults.invalid_since_tag_version {
            ours.invalid_since_tag_version = theirs.invalid_since_tag_version;
        }
        ours.overrides
            .extend(theirs.overrides.iter().map(|(k, v)| (k.clone(), *v)));
        for (component, keys) in &theirs.projects {
            ours.projects
                .entry(component.clone())
                .or_default()
                .extend(keys.iter().map(|(k, v)| (k.clone(), *v)));
        }

        // Build toggles
        if other.build.parallel_compare {
            self.build.parallel_compare = true;
        }
        if !other.build.check_api_usage {
            self.build.check_api_usage = false;
        }

        // Output config - only override if explicitly set
        if other.output.format != ReportFormat::default() {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.quiet {
            self.output.quiet = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# API Tools Configuration
# Place this file at .api-tools.yaml in your project root or ~/.config/api-tools/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# API Tools Configuration File
# ============================
#
# Place it at:
#   - .api-tools.yaml in your project root
#   - ~/.config/api-tools/api-tools.yaml for global config
#
# Severities are one of: ignore, warning, error

# Problem severities
severities:
  # Incompatible API changes against the baseline
  compatibility: error
  # Illegal use of @noreference/@noextend/@noimplement/@noinstantiate API
  usage: warning
  # Component versions that do not reflect the API changes
  version_numbering: error
  # Added elements without @since
  missing_since_tag: warning
  # @since values that are not major.minor
  malformed_since_tag: warning
  # @since values newer than the component version
  invalid_since_tag_version: warning

  # Per preference key overrides
  overrides:
    CLASS_REMOVED_METHOD: error
    RESTRICTION_NOREFERENCE: ignore

  # Per component overrides
  projects:
    org.example.internal:
      API_COMPONENT_REMOVED_TYPE: warning

# Build toggles
build:
  # Compare the changed types of an incremental build in parallel
  parallel_compare: false
  # Scan for illegal use of restricted API
  check_api_usage: true

# Output settings
output:
  # Output format: summary, json, sarif
  format: summary
  # Output file (omit for stdout)
  # file: api-problems.sarif
  quiet: false
"
    .to_string()
}

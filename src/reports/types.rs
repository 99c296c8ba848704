//! Report type definitions.

use crate::builder::BuildOutcome;
use crate::model::{ProblemCategory, ProblemRecord, Severity};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Brief summary output
    #[default]
    Summary,
    /// Structured JSON output
    Json,
    /// SARIF 2.1.0 for CI/CD
    Sarif,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Json => write!(f, "json"),
            Self::Sarif => write!(f, "sarif"),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title for the report
    pub title: Option<String>,
    /// Only report problems at or above this severity
    pub min_severity: Option<Severity>,
    /// Additional metadata to include
    pub metadata: ReportMetadata,
}

impl ReportConfig {
    /// Check whether a problem passes the severity threshold.
    #[must_use]
    pub fn includes(&self, problem: &ProblemRecord) -> bool {
        self.min_severity
            .map_or(true, |min| problem.severity >= min)
    }
}

/// Where the build inputs came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Workspace profile path
    pub workspace_path: Option<String>,
    /// Baseline profile path
    pub baseline_path: Option<String>,
}

/// Everything a report is generated from.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport<'a> {
    pub outcomes: &'a [BuildOutcome],
    pub problems: &'a [ProblemRecord],
}

impl<'a> BuildReport<'a> {
    #[must_use]
    pub const fn new(outcomes: &'a [BuildOutcome], problems: &'a [ProblemRecord]) -> Self {
        Self { outcomes, problems }
    }

    /// Problems passing the configured threshold.
    #[must_use]
    pub fn visible(&self, config: &ReportConfig) -> Vec<&'a ProblemRecord> {
        self.problems.iter().filter(|p| config.includes(p)).collect()
    }

    /// Count visible problems per severity, as `(errors, warnings)`.
    #[must_use]
    pub fn counts(&self, config: &ReportConfig) -> (usize, usize) {
        self.visible(config).iter().fold((0, 0), |(e, w), p| match p.severity {
            Severity::Error => (e + 1, w),
            Severity::Warning => (e, w + 1),
            Severity::Ignore => (e, w),
        })
    }

    /// Count visible problems of one category.
    #[must_use]
    pub fn category_count(&self, config: &ReportConfig, category: ProblemCategory) -> usize {
        self.visible(config)
            .iter()
            .filter(|p| p.category == category)
            .count()
    }
}

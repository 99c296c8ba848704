//! Report generation for build results.
//!
//! This module provides several output formats for API problems:
//! - Summary: Compact shell-friendly output
//! - JSON: Structured data for programmatic integration
//! - SARIF: CI/CD code scanning dashboards

mod json;
mod sarif;
mod summary;
mod types;

pub use json::JsonReporter;
pub use sarif::SarifReporter;
pub use summary::SummaryReporter;
pub use types::{BuildReport, ReportConfig, ReportFormat, ReportMetadata};

use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report from build results
    fn generate_build_report(
        &self,
        report: &BuildReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_build_report(
        &self,
        report: &BuildReport<'_>,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let text = self.generate_build_report(report, config)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Sarif => Box::new(SarifReporter::new()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::builder::{BuildMode, BuildOutcome};
    use crate::model::{
        pack_problem_id, MarkerKind, ProblemCategory, ProblemRecord, Severity, SourceRange,
    };
    use std::time::Duration;

    pub fn outcome() -> BuildOutcome {
        BuildOutcome {
            component_id: "org.example.core".to_string(),
            mode: BuildMode::Full,
            compared_types: 3,
            has_reference: true,
            breakage: true,
            additions: false,
            emitted: 2,
            cancelled: false,
            elapsed: Duration::from_millis(12),
        }
    }

    pub fn problems() -> Vec<ProblemRecord> {
        vec![
            ProblemRecord::new(
                pack_problem_id(ProblemCategory::Compatibility, 4, 9, 0),
                ProblemCategory::Compatibility,
                "org.example.core",
                "The method org.example.Api.run() has been removed",
            )
            .with_severity(Severity::Error)
            .with_resource(Some("src/org/example/Api.java".to_string()))
            .with_type_name("org.example.Api")
            .with_preference_key("CLASS_REMOVED_METHOD")
            .with_range(Some(SourceRange {
                offset: 10,
                length: 4,
                line: Some(7),
            })),
            ProblemRecord::new(
                pack_problem_id(ProblemCategory::VersionNumbering, 1, 0, 1),
                ProblemCategory::VersionNumbering,
                "org.example.core",
                "The major version should be incremented in version 1.2.0",
            )
            .with_severity(Severity::Warning)
            .with_resource(Some("META-INF/MANIFEST.MF".to_string()))
            .with_preference_key("INCOMPATIBLE_API_COMPONENT_VERSION")
            .with_marker(MarkerKind::MajorVersionChange)
            .with_suggested_version("2.0.0"),
        ]
    }
}

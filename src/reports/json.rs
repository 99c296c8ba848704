//! JSON report generator.

use super::{BuildReport, ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::builder::BuildOutcome;
use crate::model::ProblemRecord;
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_build_report(
        &self,
        report: &BuildReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let (errors, warnings) = report.counts(config);
        let json = JsonBuildReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: "api-tools".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                generated_at: Utc::now().to_rfc3339(),
                title: config.title.clone(),
                workspace: config.metadata.workspace_path.clone(),
                baseline: config.metadata.baseline_path.clone(),
            },
            summary: JsonSummary {
                components: report.outcomes.len(),
                errors,
                warnings,
            },
            builds: report.outcomes,
            problems: report.visible(config),
        };

        let text = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        }
        .map_err(|e| ReportError::SerializationError(e.to_string()))?;

        Ok(text)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[derive(Serialize)]
struct JsonBuildReport<'a> {
    metadata: JsonReportMetadata,
    summary: JsonSummary,
    builds: &'a [BuildOutcome],
    problems: Vec<&'a ProblemRecord>,
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workspace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline: Option<String>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonSummary {
    components: usize,
    errors: usize,
    warnings: usize,
}

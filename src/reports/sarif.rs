//! SARIF 2.1.0 report generator for CI/CD integration.

use super::{BuildReport, ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{ProblemCategory, ProblemRecord, Severity};
use serde::Serialize;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF report generator
pub struct SarifReporter {
    /// Attach offset/length regions when known
    include_regions: bool,
}

impl SarifReporter {
    /// Create a new SARIF reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_regions: true,
        }
    }

    /// Set whether to include source regions
    #[must_use]
    pub const fn include_regions(mut self, include: bool) -> Self {
        self.include_regions = include;
        self
    }

    fn result(&self, problem: &ProblemRecord) -> SarifResult {
        let locations = problem
            .resource
            .as_ref()
            .map(|uri| SarifLocation {
                physical_location: Some(SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation { uri: uri.clone() },
                    region: problem
                        .range
                        .filter(|_| self.include_regions)
                        .map(|range| SarifRegion {
                            char_offset: range.offset,
                            char_length: range.length,
                            start_line: range.line,
                        }),
                }),
            })
            .into_iter()
            .collect();

        SarifResult {
            rule_id: rule_id(problem.category).to_string(),
            level: severity_to_level(problem.severity),
            message: SarifMessage {
                text: problem.message.clone(),
            },
            locations,
            properties: SarifProperties {
                problem_id: problem.id,
                component: problem.component_id.clone(),
                preference_key: problem.preference_key.clone(),
                suggested_version: problem.suggested_version.clone(),
            },
        }
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SarifReporter {
    fn generate_build_report(
        &self,
        report: &BuildReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let results = report
            .visible(config)
            .into_iter()
            .map(|p| self.result(p))
            .collect();

        let sarif = SarifReport {
            schema: SARIF_SCHEMA.to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "api-tools".to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        rules: get_sarif_rules(),
                    },
                },
                results,
            }],
        };

        serde_json::to_string_pretty(&sarif)
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Sarif
    }
}

const fn rule_id(category: ProblemCategory) -> &'static str {
    match category {
        ProblemCategory::Compatibility => "API-TOOLS-001",
        ProblemCategory::Usage => "API-TOOLS-002",
        ProblemCategory::VersionNumbering => "API-TOOLS-003",
        ProblemCategory::SinceTag => "API-TOOLS-004",
    }
}

const fn severity_to_level(severity: Severity) -> SarifLevel {
    match severity {
        Severity::Error => SarifLevel::Error,
        Severity::Warning => SarifLevel::Warning,
        Severity::Ignore => SarifLevel::Note,
    }
}

fn get_sarif_rules() -> Vec<SarifRule> {
    let rule = |category: ProblemCategory, name: &str, text: &str, level| SarifRule {
        id: rule_id(category).to_string(),
        name: name.to_string(),
        short_description: SarifMessage {
            text: text.to_string(),
        },
        default_configuration: SarifConfiguration { level },
    };
    vec![
        rule(
            ProblemCategory::Compatibility,
            "IncompatibleApiChange",
            "API change breaks binary compatibility with the baseline",
            SarifLevel::Error,
        ),
        rule(
            ProblemCategory::Usage,
            "IllegalApiUse",
            "Reference to API restricted by its declaring component",
            SarifLevel::Warning,
        ),
        rule(
            ProblemCategory::VersionNumbering,
            "VersionNumbering",
            "Component version does not reflect its API changes",
            SarifLevel::Error,
        ),
        rule(
            ProblemCategory::SinceTag,
            "SinceTag",
            "Added API element has a missing or wrong @since tag",
            SarifLevel::Warning,
        ),
    ]
}

// SARIF structures

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifConfiguration {
    level: SarifLevel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: SarifLevel,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    properties: SarifProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifProperties {
    problem_id: u32,
    component: String,
    preference_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_version: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: Option<SarifPhysicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    char_offset: usize,
    char_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_line: Option<u32>,
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum SarifLevel {
    Note,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support;

    #[test]
    fn test_sarif_results() {
        let outcomes = vec![test_support::outcome()];
        let problems = test_support::problems();
        let text = SarifReporter::new()
            .generate_build_report(&BuildReport::new(&outcomes, &problems), &ReportConfig::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["version"], "2.1.0");
        let run = &value["runs"][0];
        assert_eq!(run["tool"]["driver"]["rules"].as_array().unwrap().len(), 4);
        let first = &run["results"][0];
        assert_eq!(first["ruleId"], "API-TOOLS-001");
        assert_eq!(first["level"], "error");
        let region = &first["locations"][0]["physicalLocation"]["region"];
        assert_eq!(region["charOffset"], 10);
        assert_eq!(region["startLine"], 7);
        assert_eq!(run["results"][1]["properties"]["suggestedVersion"], "2.0.0");
    }

    #[test]
    fn test_regions_can_be_omitted() {
        let problems = test_support::problems();
        let text = SarifReporter::new()
            .include_regions(false)
            .generate_build_report(&BuildReport::new(&[], &problems), &ReportConfig::default())
            .unwrap();
        assert!(!text.contains("charOffset"));
    }
}

//! Summary report generator for shell output.
//!
//! Provides a compact, human-readable summary for terminal usage.

use super::{BuildReport, ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::builder::BuildMode;
use crate::model::{ProblemCategory, Severity};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_build_report(
        &self,
        report: &BuildReport<'_>,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        let title = config.title.as_deref().unwrap_or("API Tools Summary");
        lines.push(self.color(title, "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));

        for outcome in report.outcomes {
            let mode = match outcome.mode {
                BuildMode::Full => "full",
                BuildMode::Incremental => "incremental",
            };
            let mut flags = Vec::new();
            if outcome.breakage {
                flags.push(self.color("breakage", "red"));
            }
            if outcome.additions {
                flags.push(self.color("additions", "green"));
            }
            if !outcome.has_reference {
                flags.push(self.color("no baseline", "dim"));
            }
            if outcome.cancelled {
                flags.push(self.color("cancelled", "yellow"));
            }
            lines.push(format!(
                "{}  {} ({mode}, {} types, {} ms){}",
                self.color("Component:", "cyan"),
                outcome.component_id,
                outcome.compared_types,
                outcome.elapsed.as_millis(),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                }
            ));
        }

        lines.push(String::new());
        lines.push(self.color("Problems:", "bold"));
        let (errors, warnings) = report.counts(config);
        if errors == 0 && warnings == 0 {
            lines.push(format!("  {}", self.color("none", "green")));
        } else {
            for category in [
                ProblemCategory::Compatibility,
                ProblemCategory::Usage,
                ProblemCategory::VersionNumbering,
                ProblemCategory::SinceTag,
            ] {
                let count = report.category_count(config, category);
                if count > 0 {
                    lines.push(format!("  {count} {}", category.label()));
                }
            }
            lines.push(format!(
                "  {} / {}",
                self.color(&format!("{errors} errors"), "red"),
                self.color(&format!("{warnings} warnings"), "yellow")
            ));
        }

        let visible = report.visible(config);
        if !visible.is_empty() {
            lines.push(String::new());
            for problem in visible {
                let level = match problem.severity {
                    Severity::Error => self.color("error", "red"),
                    Severity::Warning => self.color("warning", "yellow"),
                    Severity::Ignore => self.color("info", "dim"),
                };
                let location = match (&problem.resource, problem.range.and_then(|r| r.line)) {
                    (Some(resource), Some(line)) => format!("{resource}:{line}"),
                    (Some(resource), None) => resource.clone(),
                    (None, _) => problem.component_id.clone(),
                };
                lines.push(format!("{level} {}: {}", self.color(&location, "dim"), problem.message));
            }
        }

        lines.push(String::new());
        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

//! Report output stage.

use super::{should_use_color, write_output, BuildRun, OutputTarget, PipelineError};
use crate::config::OutputConfig;
use crate::reports::{create_reporter_with_options, BuildReport, ReportConfig};
use anyhow::Result;

/// Render a build run in the configured format and write it out.
pub fn output_report(
    output: &OutputConfig,
    run: &BuildRun,
    report_config: &ReportConfig,
    no_color: bool,
) -> Result<()> {
    let target = OutputTarget::from_option(output.file.clone());
    let reporter = create_reporter_with_options(output.format, should_use_color(no_color, &target));
    let text = reporter
        .generate_build_report(&BuildReport::new(&run.outcomes, &run.problems), report_config)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&text, &target, output.quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportFormat;

    #[test]
    fn test_output_json_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.json");
        let output = OutputConfig {
            format: ReportFormat::Json,
            file: Some(file.clone()),
            quiet: true,
        };
        output_report(&output, &BuildRun::default(), &ReportConfig::default(), true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(value["summary"]["errors"], 0);
    }
}

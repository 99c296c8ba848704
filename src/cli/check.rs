//! Check command handler.
//!
//! Implements the `check` subcommand: build components of a workspace
//! profile against a baseline and report the problems found.

use crate::builder::{ApiBuilder, BuildKind, ResourceDelta};
use crate::config::{AppConfig, Validatable};
use crate::pipeline::{exit_codes, load_profile, load_source_index, output_report, run_builds};
use crate::reports::{ReportConfig, ReportMetadata};
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Input snapshots of a check.
#[derive(Debug, Clone)]
pub struct CheckPaths {
    pub workspace: PathBuf,
    pub baseline: PathBuf,
    /// Source index used to place problems and read since tags
    pub sources: Option<PathBuf>,
}

/// Everything the `check` command needs.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub paths: CheckPaths,
    /// Components to build; all workspace components when empty
    pub components: Vec<String>,
    /// Changed class files; a non-empty list makes the build incremental
    pub changed: Vec<PathBuf>,
    pub app: AppConfig,
    pub fail_on_error: bool,
    pub no_color: bool,
}

impl CheckConfig {
    fn build_kind(&self) -> BuildKind {
        if self.changed.is_empty() {
            BuildKind::Full
        } else {
            BuildKind::Incremental(Some(ResourceDelta::from_files(self.changed.iter().cloned())))
        }
    }
}

/// Run the check command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_check(config: CheckConfig) -> Result<i32> {
    let errors = config.app.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration: {}", messages.join("; "));
    }
    let quiet = config.app.output.quiet;

    let baseline = load_profile(&config.paths.baseline, quiet)?;
    let workspace = load_profile(&config.paths.workspace, quiet)?;

    let mut builder =
        ApiBuilder::new(Box::new(config.app.severities.clone())).with_options(config.app.build.options());
    if let Some(path) = &config.paths.sources {
        builder = builder.with_sources(Box::new(load_source_index(path)?));
    }

    let run = run_builds(
        &builder,
        &workspace,
        Some(&baseline),
        &config.components,
        &config.build_kind(),
    )?;

    let report_config = ReportConfig {
        title: None,
        min_severity: None,
        metadata: ReportMetadata {
            workspace_path: Some(config.paths.workspace.display().to_string()),
            baseline_path: Some(config.paths.baseline.display().to_string()),
        },
    };
    output_report(&config.app.output, &run, &report_config, config.no_color)?;

    Ok(if config.fail_on_error && run.has_errors() {
        exit_codes::PROBLEMS_FOUND
    } else {
        exit_codes::SUCCESS
    })
}

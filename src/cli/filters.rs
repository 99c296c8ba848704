//! Filters command handler.
//!
//! Implements the `filters` subcommand: list the accepted problems of a
//! component archive or project folder.

use crate::filter::FilterStore;
use crate::pipeline::{exit_codes, write_output, OutputTarget};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Listing format of the `filters` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FiltersFormat {
    #[default]
    Text,
    Json,
}

/// Component id used when none is given: the archive stem or folder name.
fn default_component_id(location: &Path) -> Option<String> {
    let name = if location.is_file() {
        location.file_stem()
    } else {
        location.file_name()
    }?;
    Some(name.to_string_lossy().into_owned())
}

/// Run the filters command
#[allow(clippy::needless_pass_by_value)]
pub fn run_filters(
    location: PathBuf,
    component_id: Option<String>,
    format: FiltersFormat,
    output_file: Option<PathBuf>,
) -> Result<i32> {
    if !location.exists() {
        bail!("Component location not found: {}", location.display());
    }
    let Some(component_id) = component_id.or_else(|| default_component_id(&location)) else {
        bail!("Cannot derive a component id from {}", location.display());
    };

    let store = FilterStore::new(component_id.as_str(), Some(location));
    let filters = store.filters();
    tracing::debug!("{} filters for {component_id}", filters.len());

    let content = match format {
        FiltersFormat::Json => serde_json::to_string_pretty(&filters)?,
        FiltersFormat::Text => {
            let mut out = String::new();
            for filter in &filters {
                write!(
                    out,
                    "{} {} [{}]",
                    filter.key(),
                    filter.problem.id,
                    filter.problem.arguments.join(", ")
                )?;
                if let Some(comment) = &filter.comment {
                    write!(out, " # {comment}")?;
                }
                out.push('\n');
            }
            writeln!(out, "{} filters for {component_id}", filters.len())?;
            out
        }
    };

    write_output(content.trim_end(), &OutputTarget::from_option(output_file), true)?;
    Ok(exit_codes::SUCCESS)
}

//! Snapshot loading.
//!
//! Profiles and source indexes are read from JSON snapshots. Relative
//! component locations are resolved against the snapshot's directory so
//! filter documents are found wherever the snapshot is invoked from.

use super::PipelineError;
use crate::builder::SourceIndex;
use crate::model::{Profile, ProfileSnapshot};
use anyhow::{Context, Result};
use std::path::Path;

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))
}

fn load_failed(path: &Path, source: anyhow::Error) -> anyhow::Error {
    PipelineError::LoadFailed {
        path: path.display().to_string(),
        source,
    }
    .into()
}

/// Load a profile snapshot.
pub fn load_profile(path: &Path, quiet: bool) -> Result<Profile> {
    if !quiet {
        tracing::info!("Loading profile: {}", path.display());
    }

    let mut snapshot: ProfileSnapshot = read(path)
        .and_then(|json| serde_json::from_str(&json).map_err(anyhow::Error::from))
        .map_err(|e| load_failed(path, e))?;

    if let Some(base) = path.parent() {
        for component in &mut snapshot.components {
            if let Some(location) = component.location.as_mut().filter(|l| l.is_relative()) {
                *location = base.join(&*location);
            }
        }
    }

    let profile = Profile::from(snapshot);
    if !quiet {
        tracing::info!(
            "Loaded profile {} with {} components",
            profile.name(),
            profile.components().count()
        );
    }
    Ok(profile)
}

/// Load a source index snapshot.
pub fn load_source_index(path: &Path) -> Result<SourceIndex> {
    read(path)
        .and_then(|json| serde_json::from_str(&json).map_err(anyhow::Error::from))
        .map_err(|e| load_failed(path, e))
}

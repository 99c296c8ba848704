//! Build stage: runs the builder over the requested components.

use super::PipelineError;
use crate::builder::{ApiBuilder, BuildKind, BuildOutcome, BuildRequest, ProblemStore};
use crate::model::{ProblemRecord, Profile};
use anyhow::Result;

/// Outcomes and problems of one CLI invocation.
#[derive(Debug, Default)]
pub struct BuildRun {
    pub outcomes: Vec<BuildOutcome>,
    pub problems: Vec<ProblemRecord>,
}

impl BuildRun {
    /// Whether any reported problem is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(ProblemRecord::is_error)
    }
}

/// Build each component of `component_ids`, or every workspace component
/// when none are given.
pub fn run_builds(
    builder: &ApiBuilder,
    workspace: &Profile,
    baseline: Option<&Profile>,
    component_ids: &[String],
    kind: &BuildKind,
) -> Result<BuildRun> {
    let ids: Vec<String> = if component_ids.is_empty() {
        workspace.components().map(|c| c.id().to_string()).collect()
    } else {
        component_ids.to_vec()
    };

    let store = ProblemStore::new();
    let mut outcomes = Vec::with_capacity(ids.len());
    for id in &ids {
        let request = BuildRequest {
            workspace,
            baseline,
            component_id: id,
        };
        let outcome = builder
            .build(&request, kind, &store)
            .map_err(|e| PipelineError::BuildFailed {
                component: id.clone(),
                source: e.into(),
            })?;
        tracing::info!(
            "{}: {} problems in {} ms",
            outcome.component_id,
            outcome.emitted,
            outcome.elapsed.as_millis()
        );
        outcomes.push(outcome);
    }

    Ok(BuildRun {
        outcomes,
        problems: store.all(),
    })
}

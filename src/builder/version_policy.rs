//! Component version policy.
//!
//! Breaking changes require a new major version; additions require a new
//! minor version within the same major. The policy is evaluated once per
//! compared component, from the bits accumulated while classifying deltas.

use super::classify::PassAccumulator;
use crate::model::{MarkerKind, Version};
use tracing::warn;

/// Outcome of the policy check for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionVerdict {
    /// Nothing to report, stale version problems may go
    Satisfied,
    /// The version must be raised to at least `suggested`
    Violation {
        marker: MarkerKind,
        suggested: Version,
    },
}

/// Evaluate the policy.
///
/// `None` when the pass saw neither breakage nor additions, or when the
/// suggested version cannot be represented.
#[must_use]
pub fn evaluate(reference: &Version, component: &Version, pass: PassAccumulator) -> Option<VersionVerdict> {
    if pass.breakage {
        if component.major > reference.major {
            return Some(VersionVerdict::Satisfied);
        }
        let Some(next) = reference.next_major() else {
            warn!("skipping version check: no major version after {reference}");
            return None;
        };
        return Some(VersionVerdict::Violation {
            marker: MarkerKind::MajorVersionChange,
            suggested: next.with_qualifier(component.qualifier.clone()),
        });
    }
    if !pass.additions {
        return None;
    }

    let major = if component.major != reference.major {
        reference.major
    } else if component.minor <= reference.minor {
        component.major
    } else {
        return Some(VersionVerdict::Satisfied);
    };
    let Some(minor) = component.minor.checked_add(1) else {
        warn!("skipping version check: no minor version after {component}");
        return None;
    };
    let suggested = Version::new(major, minor, 0);
    Some(VersionVerdict::Violation {
        marker: MarkerKind::MinorVersionChange,
        suggested: suggested.with_qualifier(component.qualifier.clone()),
    })
}

/// Message of a version-numbering problem.
#[must_use]
pub fn violation_message(marker: MarkerKind, reference: &Version, component: &Version) -> String {
    match marker {
        MarkerKind::MajorVersionChange => format!(
            "The major version should be incremented in version {component}, since API breakage occurred since version {reference}"
        ),
        _ => format!(
            "The minor version should be incremented in version {component}, since new APIs have been added since version {reference}"
        ),
    }
}

/// What to do with the version problems already recorded for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMerge {
    /// Leave the recorded problems untouched
    Keep,
    /// Record the new problem
    Emit,
    /// Drop the recorded problems, then record the new one
    Replace,
}

/// Merge a wanted marker with the recorded ones.
///
/// A major marker wins over a minor one. While compatibility problems are
/// still live a recorded major marker also wins over a wanted minor one.
#[must_use]
pub fn merge_markers(existing: &[MarkerKind], wanted: MarkerKind, has_compatibility_problems: bool) -> MarkerMerge {
    if existing.is_empty() {
        return MarkerMerge::Emit;
    }
    if existing.len() == 1 && existing[0] == wanted {
        return MarkerMerge::Keep;
    }
    let has_major = existing.contains(&MarkerKind::MajorVersionChange);
    match wanted {
        MarkerKind::MajorVersionChange => MarkerMerge::Replace,
        _ if has_major && has_compatibility_problems => MarkerMerge::Keep,
        _ => MarkerMerge::Replace,
    }
}

/// Whether recorded version problems should go once the policy is satisfied.
#[must_use]
pub const fn should_clear_version_problems(has_compatibility_problems: bool) -> bool {
    !has_compatibility_problems
}

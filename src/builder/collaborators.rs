//! Seams between the build orchestrator and its surroundings.
//!
//! The orchestrator never touches source files or a problem view directly:
//! it asks a [`SourceLocator`] where declarations live, resolves severities
//! through a [`PreferenceResolver`] and hands every problem to a
//! [`ProblemSink`].

use crate::model::{ProblemRecord, ProblemSelector, Severity, SourceRange};
use serde::{Deserialize, Serialize};

// ============================================================================
// Preference keys
// ============================================================================

/// Severity of a component version that does not follow the version policy.
pub const INCOMPATIBLE_API_COMPONENT_VERSION: &str = "INCOMPATIBLE_API_COMPONENT_VERSION";
/// Severity of an added element without a since tag.
pub const MISSING_SINCE_TAG: &str = "MISSING_SINCE_TAG";
/// Severity of a since tag with more than two version fragments.
pub const MALFORMED_SINCE_TAG: &str = "MALFORMED_SINCE_TAG";
/// Severity of a since tag newer than the component.
pub const INVALID_SINCE_TAG_VERSION: &str = "INVALID_SINCE_TAG_VERSION";

/// Prefix shared by the usage preference keys.
pub const RESTRICTION_PREFIX: &str = "RESTRICTION_";

/// Resource problems are attached to when they belong to the component itself.
pub const MANIFEST_RESOURCE: &str = "META-INF/MANIFEST.MF";

// ============================================================================
// Documentation comments
// ============================================================================

/// Comment block found in front of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocComment {
    /// Nothing in front of the declaration
    #[default]
    Missing,
    /// A line or block comment that is not documentation
    Plain,
    /// Documentation, with the raw value of its since tag if it has one
    Doc {
        #[serde(default)]
        since: Option<String>,
    },
}

impl DocComment {
    #[must_use]
    pub fn doc(since: impl Into<String>) -> Self {
        Self::Doc {
            since: Some(since.into()),
        }
    }

    /// The since tag value, if any.
    #[must_use]
    pub fn since(&self) -> Option<&str> {
        match self {
            Self::Doc { since } => since.as_deref(),
            Self::Missing | Self::Plain => None,
        }
    }
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Maps types and members to their source declarations.
pub trait SourceLocator: Send + Sync {
    /// Workspace-relative source file declaring `type_name`.
    fn source_file(&self, type_name: &str) -> Option<String>;

    /// Range of the declaration name of `member` in `type_name`, or of the
    /// type itself when `member` is `None`.
    fn member_range(&self, type_name: &str, member: Option<&str>) -> Option<SourceRange>;

    /// Comment attached to the declaration starting at `offset`.
    fn comment_at(&self, source_file: &str, offset: usize) -> DocComment;
}

/// Resolves problem severities from user preferences.
pub trait PreferenceResolver: Send + Sync {
    /// Severity configured for `key` in the scope of `unit` (a component id).
    fn severity_for(&self, key: &str, unit: &str) -> Severity;
}

/// Receives problems produced by a build.
pub trait ProblemSink: Send + Sync {
    /// Record a problem, replacing any problem with the same key.
    fn emit(&self, problem: ProblemRecord);

    /// Remove every problem matched by `selector`.
    fn clear(&self, selector: &ProblemSelector);

    /// Problems matched by `selector`, in emission order.
    fn problems(&self, selector: &ProblemSelector) -> Vec<ProblemRecord>;
}

/// Every problem at the configured default severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPreferences(pub Severity);

impl PreferenceResolver for UniformPreferences {
    fn severity_for(&self, _key: &str, _unit: &str) -> Severity {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_comment_since() {
        assert_eq!(DocComment::doc("1.2").since(), Some("1.2"));
        assert_eq!(DocComment::Plain.since(), None);
        assert_eq!(DocComment::Doc { since: None }.since(), None);
    }

    #[test]
    fn test_doc_comment_serde() {
        let parsed: DocComment = serde_json::from_str(r#"{"kind":"doc","since":"3.1"}"#).unwrap();
        assert_eq!(parsed, DocComment::doc("3.1"));
        let plain: DocComment = serde_json::from_str(r#"{"kind":"plain"}"#).unwrap();
        assert_eq!(plain, DocComment::Plain);
    }

    #[test]
    fn test_uniform_preferences() {
        let prefs = UniformPreferences(Severity::Error);
        assert_eq!(prefs.severity_for(MISSING_SINCE_TAG, "core"), Severity::Error);
    }
}

//! Problem records emitted by a build.

use crate::utils::stable_key;
use enumset::{EnumSet, EnumSetType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity resolved from the preference lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ignore,
    #[default]
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn is_ignore(self) -> bool {
        matches!(self, Self::Ignore)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Broad problem family, stored in the top bits of a problem id.
#[derive(EnumSetType, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    Compatibility,
    Usage,
    VersionNumbering,
    SinceTag,
}

impl ProblemCategory {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Compatibility => 1,
            Self::Usage => 2,
            Self::VersionNumbering => 3,
            Self::SinceTag => 4,
        }
    }

    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Compatibility),
            2 => Some(Self::Usage),
            3 => Some(Self::VersionNumbering),
            4 => Some(Self::SinceTag),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compatibility => "compatibility",
            Self::Usage => "usage",
            Self::VersionNumbering => "version numbering",
            Self::SinceTag => "since tag",
        }
    }
}

/// Sub-kind for version-numbering and since-tag problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    MajorVersionChange,
    MinorVersionChange,
    SinceTagMissing,
    SinceTagMalformed,
    SinceTagInvalid,
}

impl MarkerKind {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::MajorVersionChange => 1,
            Self::MinorVersionChange => 2,
            Self::SinceTagMissing => 3,
            Self::SinceTagMalformed => 4,
            Self::SinceTagInvalid => 5,
        }
    }
}

/// Pack a problem id: `category << 28 | element << 20 | kind << 12 | flags`.
#[must_use]
pub const fn pack_problem_id(category: ProblemCategory, element: u32, kind: u32, flags: u32) -> u32 {
    (category.code() << 28) | ((element & 0xFF) << 20) | ((kind & 0xFF) << 12) | (flags & 0xFFF)
}

/// Category encoded in a packed problem id.
#[must_use]
pub const fn category_of(id: u32) -> Option<ProblemCategory> {
    ProblemCategory::from_code(id >> 28)
}

/// Position of a problem in its source resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One emitted problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub id: u32,
    pub category: ProblemCategory,
    pub severity: Severity,
    pub component_id: String,
    /// Source resource the problem is attached to (`None` for the component itself)
    pub resource: Option<String>,
    pub type_name: Option<String>,
    pub arguments: Vec<String>,
    pub message: String,
    pub preference_key: String,
    pub range: Option<SourceRange>,
    pub marker: Option<MarkerKind>,
    pub suggested_version: Option<String>,
}

impl ProblemRecord {
    pub fn new(
        id: u32,
        category: ProblemCategory,
        component_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            severity: Severity::Warning,
            component_id: component_id.into(),
            resource: None,
            type_name: None,
            arguments: Vec::new(),
            message: message.into(),
            preference_key: String::new(),
            range: None,
            marker: None,
            suggested_version: None,
        }
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: Option<String>) -> Self {
        self.resource = resource;
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn with_preference_key(mut self, key: impl Into<String>) -> Self {
        self.preference_key = key.into();
        self
    }

    #[must_use]
    pub const fn with_range(mut self, range: Option<SourceRange>) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub const fn with_marker(mut self, marker: MarkerKind) -> Self {
        self.marker = Some(marker);
        self
    }

    #[must_use]
    pub fn with_suggested_version(mut self, version: impl Into<String>) -> Self {
        self.suggested_version = Some(version.into());
        self
    }

    /// Stable identity across builds, used for idempotent replacement.
    #[must_use]
    pub fn key(&self) -> String {
        let id = self.id.to_string();
        let parts = [
            id.as_str(),
            self.component_id.as_str(),
            self.resource.as_deref().unwrap_or(""),
            self.type_name.as_deref().unwrap_or(""),
        ];
        stable_key(parts.into_iter().chain(self.arguments.iter().map(String::as_str)))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Selects problems to clear or query in a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSelector {
    pub component_id: String,
    /// `None` matches every resource of the component
    pub resource: Option<String>,
    /// `None` matches every type
    pub type_name: Option<String>,
    pub categories: EnumSet<ProblemCategory>,
}

impl ProblemSelector {
    /// Every problem of a component.
    pub fn component(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            resource: None,
            type_name: None,
            categories: EnumSet::all(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: EnumSet<ProblemCategory>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn matches(&self, problem: &ProblemRecord) -> bool {
        problem.component_id == self.component_id
            && self.categories.contains(problem.category)
            && self
                .resource
                .as_ref()
                .map_or(true, |r| problem.resource.as_deref() == Some(r.as_str()))
            && self
                .type_name
                .as_ref()
                .map_or(true, |t| problem.type_name.as_deref() == Some(t.as_str()))
    }
}

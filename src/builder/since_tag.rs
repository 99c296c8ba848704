//! Since tag validation.
//!
//! Every element added to the API has to say, in its documentation, the
//! component version that introduced it. Only `major.minor` is allowed and
//! the value may not be newer than the component itself.

use super::collaborators::DocComment;
use crate::model::{MarkerKind, Severity, Version};
use crate::utils::{compare_versions, fragment_count};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static SINCE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<plugin>.+?)\s+)?(?P<version>\d+(?:\.[0-9A-Za-z_-]+)*)$")
        .expect("static regex")
});

/// Value of a since tag: a version, optionally prefixed with a plugin name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinceTagVersion {
    plugin: Option<String>,
    version: String,
}

impl SinceTagVersion {
    /// Split a raw tag value. `None` if it holds no version.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let caps = SINCE_VALUE.captures(value.trim())?;
        Some(Self {
            plugin: caps.name("plugin").map(|m| m.as_str().to_string()),
            version: caps.name("version")?.as_str().to_string(),
        })
    }

    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn fragment_count(&self) -> usize {
        fragment_count(&self.version)
    }

    /// Whether the version is newer than `component`, qualifier ignored.
    #[must_use]
    pub fn exceeds(&self, component: &Version) -> bool {
        let numeric = format!("{}.{}.{}", component.major, component.minor, component.micro);
        compare_versions(&self.version, &numeric) == Ordering::Greater
    }
}

impl fmt::Display for SinceTagVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plugin {
            Some(plugin) => write!(f, "{plugin} {}", self.version),
            None => f.write_str(&self.version),
        }
    }
}

/// Problem found on a since tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinceTagFinding {
    Missing { suggested: String },
    Malformed { value: String, suggested: String },
    Invalid { value: String, suggested: String },
}

impl SinceTagFinding {
    #[must_use]
    pub const fn marker(&self) -> MarkerKind {
        match self {
            Self::Missing { .. } => MarkerKind::SinceTagMissing,
            Self::Malformed { .. } => MarkerKind::SinceTagMalformed,
            Self::Invalid { .. } => MarkerKind::SinceTagInvalid,
        }
    }

    #[must_use]
    pub fn suggested(&self) -> &str {
        match self {
            Self::Missing { suggested }
            | Self::Malformed { suggested, .. }
            | Self::Invalid { suggested, .. } => suggested,
        }
    }

    /// The offending tag value, if there is one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Missing { .. } => None,
            Self::Malformed { value, .. } | Self::Invalid { value, .. } => Some(value),
        }
    }

    /// Message for an element labelled `subject`.
    #[must_use]
    pub fn message(&self, subject: &str, component: &Version) -> String {
        match self {
            Self::Missing { .. } => format!("Missing @since tag on {subject}"),
            Self::Malformed { value, .. } => {
                format!("Invalid @since {value} tag on {subject}; expected major.minor")
            }
            Self::Invalid { value, .. } => format!(
                "Invalid @since {value} tag on {subject}; it is newer than the component version {component}"
            ),
        }
    }
}

/// Severities of the three since-tag problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinceTagSeverities {
    pub missing: Severity,
    pub malformed: Severity,
    pub invalid: Severity,
}

impl SinceTagSeverities {
    /// When every check is ignored the comment lookup can be skipped.
    #[must_use]
    pub const fn all_ignored(&self) -> bool {
        self.missing.is_ignore() && self.malformed.is_ignore() && self.invalid.is_ignore()
    }

    #[must_use]
    pub const fn for_marker(&self, marker: MarkerKind) -> Severity {
        match marker {
            MarkerKind::SinceTagMalformed => self.malformed,
            MarkerKind::SinceTagInvalid => self.invalid,
            _ => self.missing,
        }
    }
}

/// Check the comment of an added element against the component version.
#[must_use]
pub fn check_since_tag(comment: &DocComment, component: &Version) -> Option<SinceTagFinding> {
    let Some(value) = comment.since() else {
        return Some(SinceTagFinding::Missing {
            suggested: component.major_minor(),
        });
    };

    let Some(tag) = SinceTagVersion::parse(value) else {
        return Some(SinceTagFinding::Malformed {
            value: value.to_string(),
            suggested: component.major_minor(),
        });
    };
    let suggested = match tag.plugin() {
        Some(plugin) => format!("{plugin} {}", component.major_minor()),
        None => component.major_minor(),
    };

    if tag.fragment_count() > 2 {
        Some(SinceTagFinding::Malformed {
            value: value.to_string(),
            suggested,
        })
    } else if tag.exceeds(component) {
        Some(SinceTagFinding::Invalid {
            value: value.to_string(),
            suggested,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_with_plugin() {
        let tag = SinceTagVersion::parse("org.example.core 3.4").unwrap();
        assert_eq!(tag.plugin(), Some("org.example.core"));
        assert_eq!(tag.version(), "3.4");
        assert_eq!(tag.to_string(), "org.example.core 3.4");

        let plain = SinceTagVersion::parse("1.0").unwrap();
        assert_eq!(plain.plugin(), None);
        assert!(SinceTagVersion::parse("soon").is_none());
    }

    #[test]
    fn test_missing() {
        let finding = check_since_tag(&DocComment::Missing, &v("1.4.0")).unwrap();
        assert_eq!(finding.marker(), MarkerKind::SinceTagMissing);
        assert_eq!(finding.suggested(), "1.4");
        // A plain comment or documentation without the tag does not count
        assert!(check_since_tag(&DocComment::Plain, &v("1.4.0")).is_some());
        assert!(check_since_tag(&DocComment::Doc { since: None }, &v("1.4.0")).is_some());
    }

    #[test]
    fn test_malformed() {
        let finding = check_since_tag(&DocComment::doc("1.4.0.extra"), &v("1.4.0")).unwrap();
        assert_eq!(finding.marker(), MarkerKind::SinceTagMalformed);
        assert_eq!(finding.value(), Some("1.4.0.extra"));

        let prefixed = check_since_tag(&DocComment::doc("core 1.4.0"), &v("1.4.0")).unwrap();
        assert_eq!(prefixed.suggested(), "core 1.4");

        let garbage = check_since_tag(&DocComment::doc("next release"), &v("1.4.0")).unwrap();
        assert_eq!(garbage.marker(), MarkerKind::SinceTagMalformed);
    }

    #[test]
    fn test_exceeds_component_version() {
        let finding = check_since_tag(&DocComment::doc("1.5"), &v("1.4.0")).unwrap();
        assert_eq!(finding.marker(), MarkerKind::SinceTagInvalid);
        assert_eq!(finding.suggested(), "1.4");
        assert!(finding.message("a.B#run()V", &v("1.4.0")).contains("1.4.0"));
    }

    #[test]
    fn test_valid_tags() {
        assert_eq!(check_since_tag(&DocComment::doc("1.4"), &v("1.4.0.v2024")), None);
        assert_eq!(check_since_tag(&DocComment::doc("1.2"), &v("1.4.0")), None);
        assert_eq!(check_since_tag(&DocComment::doc("core 1.0"), &v("1.4.0")), None);
    }

    #[test]
    fn test_severities() {
        let all = SinceTagSeverities {
            missing: Severity::Ignore,
            malformed: Severity::Ignore,
            invalid: Severity::Ignore,
        };
        assert!(all.all_ignored());
        let some = SinceTagSeverities {
            invalid: Severity::Error,
            ..all
        };
        assert!(!some.all_ignored());
        assert_eq!(some.for_marker(MarkerKind::SinceTagInvalid), Severity::Error);
    }
}

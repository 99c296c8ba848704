//! Component version numbers.
//!
//! Component versions follow the `major.minor.micro.qualifier` scheme used by
//! bundle manifests: numeric parts default to `0` when absent and the
//! qualifier is an arbitrary token compared as a string.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised for strings that are not `major[.minor[.micro[.qualifier]]]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{value}': {reason}")]
pub struct VersionParseError {
    pub value: String,
    pub reason: String,
}

impl VersionParseError {
    fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A component version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl Version {
    #[must_use]
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Set the qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Parse a version string.
    pub fn parse(value: &str) -> Result<Self, VersionParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::new(value, "empty version"));
        }

        let mut parts = trimmed.splitn(4, '.');
        let mut numeric = [0u32; 3];
        for (idx, slot) in numeric.iter_mut().enumerate() {
            match parts.next() {
                Some(part) => {
                    *slot = part.parse().map_err(|_| {
                        VersionParseError::new(value, format!("segment {} is not numeric", idx + 1))
                    })?;
                }
                None => break,
            }
        }

        let qualifier = parts.next().unwrap_or_default();
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(VersionParseError::new(value, "invalid qualifier"));
        }

        Ok(Self {
            major: numeric[0],
            minor: numeric[1],
            micro: numeric[2],
            qualifier: qualifier.to_string(),
        })
    }

    /// The `major.minor` form used for since-tag suggestions.
    #[must_use]
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Next breaking version: `major + 1`, minor and micro reset.
    ///
    /// `None` when the major part is already at its maximum.
    #[must_use]
    pub fn next_major(&self) -> Option<Self> {
        Some(Self {
            major: self.major.checked_add(1)?,
            minor: 0,
            micro: 0,
            qualifier: self.qualifier.clone(),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.micro.cmp(&other.micro))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let v = Version::parse("3.4.1.v20080101").expect("valid version");
        assert_eq!((v.major, v.minor, v.micro), (3, 4, 1));
        assert_eq!(v.qualifier, "v20080101");
        assert_eq!(v.to_string(), "3.4.1.v20080101");
    }

    #[test]
    fn test_parse_defaults_missing_segments() {
        let v = Version::parse("2").expect("valid version");
        assert_eq!(v, Version::new(2, 0, 0));
        assert_eq!(Version::parse("1.5").unwrap().to_string(), "1.5.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("one.two").is_err());
        assert!(Version::parse("1.x.0").is_err());
        assert!(Version::parse("1.0.0.bad qualifier").is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Version::new(1, 2, 0) < Version::new(1, 10, 0));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
        assert!(Version::new(1, 0, 0).with_qualifier("b") > Version::new(1, 0, 0).with_qualifier("a"));
    }

    #[test]
    fn test_next_major_keeps_qualifier() {
        let v = Version::new(1, 2, 1).with_qualifier("qualifier");
        assert_eq!(v.next_major().unwrap().to_string(), "2.0.0.qualifier");
        assert!(Version::new(u32::MAX, 0, 0).next_major().is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let v: Version = serde_json::from_str("\"1.4.0\"").expect("deserialize");
        assert_eq!(v, Version::new(1, 4, 0));
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.4.0\"");
    }
}

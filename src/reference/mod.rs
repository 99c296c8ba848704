//! Use-site references and their resolution.
//!
//! A [`Reference`] is an edge from a member of one component to a named
//! type, field or method. Resolution walks the target hierarchy the way the
//! virtual machine dispatches, and is computed at most once per reference.
//! [`ApiUseAnalyzer`] resolves the use-sites of a component and reports the
//! ones that violate API restrictions of another component.

mod resolve;
mod usage;

pub use resolve::{Reference, ReferenceTarget, ResolvedMember};
pub use usage::{ApiUseAnalyzer, IllegalApiUse};

use crate::model::Restriction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a use-site refers to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Extends,
    Implements,
    Instantiate,
    Override,
    VirtualMethod,
    StaticMethod,
    SpecialMethod,
    InterfaceMethod,
    GetField,
    PutField,
    GetStatic,
    PutStatic,
}

/// Element a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Type,
    Field,
    Method,
}

impl ReferenceKind {
    #[must_use]
    pub const fn element(self) -> ElementKind {
        match self {
            Self::Extends | Self::Implements | Self::Instantiate => ElementKind::Type,
            Self::GetField | Self::PutField | Self::GetStatic | Self::PutStatic => {
                ElementKind::Field
            }
            Self::Override
            | Self::VirtualMethod
            | Self::StaticMethod
            | Self::SpecialMethod
            | Self::InterfaceMethod => ElementKind::Method,
        }
    }

    /// Whether method lookup follows superinterfaces instead of the superclass.
    #[must_use]
    pub const fn is_interface_dispatch(self) -> bool {
        matches!(self, Self::InterfaceMethod)
    }

    /// Restriction a reference of this kind violates.
    #[must_use]
    pub const fn violated_restriction(self) -> Restriction {
        match self {
            Self::Extends | Self::Override => Restriction::NoExtend,
            Self::Implements => Restriction::NoImplement,
            Self::Instantiate => Restriction::NoInstantiate,
            _ => Restriction::NoReference,
        }
    }

    /// Preference key used to look up the severity of an illegal use.
    #[must_use]
    pub const fn preference_key(self) -> &'static str {
        match self.violated_restriction() {
            Restriction::NoExtend => "RESTRICTION_NOEXTEND",
            Restriction::NoImplement => "RESTRICTION_NOIMPLEMENT",
            Restriction::NoInstantiate => "RESTRICTION_NOINSTANTIATE",
            Restriction::NoReference => "RESTRICTION_NOREFERENCE",
        }
    }

    /// Small stable code used in packed problem ids.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Extends => 1,
            Self::Implements => 2,
            Self::Instantiate => 3,
            Self::Override => 4,
            Self::VirtualMethod => 5,
            Self::StaticMethod => 6,
            Self::SpecialMethod => 7,
            Self::InterfaceMethod => 8,
            Self::GetField => 9,
            Self::PutField => 10,
            Self::GetStatic => 11,
            Self::PutStatic => 12,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Instantiate => "instantiates",
            Self::Override => "overrides",
            Self::VirtualMethod | Self::StaticMethod | Self::SpecialMethod | Self::InterfaceMethod => {
                "calls"
            }
            Self::GetField | Self::GetStatic => "reads",
            Self::PutField | Self::PutStatic => "writes",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_elements() {
        assert_eq!(ReferenceKind::Extends.element(), ElementKind::Type);
        assert_eq!(ReferenceKind::GetStatic.element(), ElementKind::Field);
        assert_eq!(ReferenceKind::Override.element(), ElementKind::Method);
        assert!(ReferenceKind::InterfaceMethod.is_interface_dispatch());
        assert!(!ReferenceKind::VirtualMethod.is_interface_dispatch());
    }

    #[test]
    fn test_restriction_mapping() {
        assert_eq!(ReferenceKind::Override.violated_restriction(), Restriction::NoExtend);
        assert_eq!(ReferenceKind::Implements.preference_key(), "RESTRICTION_NOIMPLEMENT");
        assert_eq!(ReferenceKind::PutField.preference_key(), "RESTRICTION_NOREFERENCE");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ReferenceKind::InterfaceMethod).unwrap();
        assert_eq!(json, "\"interface_method\"");
    }
}

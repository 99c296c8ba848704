//! Structural deltas between two versions of a component.
//!
//! A [`Delta`] tree is produced by a [`Comparator`] for one component or one
//! type. The builder only consumes the leaves, in depth-first order, through
//! [`Delta::flatten`].

mod comparator;
mod compat;

pub use comparator::{Comparator, StructuralComparator};
pub use compat::{CompatibilityClassifier, DefaultCompatibilityClassifier};

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// Element a delta is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaElement {
    Component,
    Class,
    Interface,
    Enum,
    Annotation,
}

impl DeltaElement {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Component => 1,
            Self::Class => 2,
            Self::Interface => 3,
            Self::Enum => 4,
            Self::Annotation => 5,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Component => "API_COMPONENT",
            Self::Class => "CLASS",
            Self::Interface => "INTERFACE",
            Self::Enum => "ENUM",
            Self::Annotation => "ANNOTATION",
        }
    }

    #[must_use]
    pub const fn is_interface(self) -> bool {
        matches!(self, Self::Interface | Self::Annotation)
    }
}

impl From<crate::model::TypeKind> for DeltaElement {
    fn from(kind: crate::model::TypeKind) -> Self {
        use crate::model::TypeKind;
        match kind {
            TypeKind::Class => Self::Class,
            TypeKind::Interface => Self::Interface,
            TypeKind::Enum => Self::Enum,
            TypeKind::Annotation => Self::Annotation,
        }
    }
}

/// What happened to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    Added,
    Removed,
    Changed,
    /// Member added to a type clients may not extend
    AddedExtendRestriction,
    /// Member added to an interface clients may not implement
    AddedImplementRestriction,
    /// Abstract member added to a type clients may extend
    AddedNotExtendRestriction,
    /// Member added to an interface clients may implement
    AddedNotImplementRestriction,
    /// Static member added to a type clients may extend
    AddedNotExtendRestrictionStatic,
}

impl DeltaKind {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Added => 1,
            Self::Removed => 2,
            Self::Changed => 3,
            Self::AddedExtendRestriction => 4,
            Self::AddedImplementRestriction => 5,
            Self::AddedNotExtendRestriction => 6,
            Self::AddedNotImplementRestriction => 7,
            Self::AddedNotExtendRestrictionStatic => 8,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
            Self::Changed => "CHANGED",
            Self::AddedExtendRestriction => "ADDED_EXTEND_RESTRICTION",
            Self::AddedImplementRestriction => "ADDED_IMPLEMENT_RESTRICTION",
            Self::AddedNotExtendRestriction => "ADDED_NOT_EXTEND_RESTRICTION",
            Self::AddedNotImplementRestriction => "ADDED_NOT_IMPLEMENT_RESTRICTION",
            Self::AddedNotExtendRestrictionStatic => "ADDED_NOT_EXTEND_RESTRICTION_STATIC",
        }
    }

    /// Whether the delta introduces a new element.
    #[must_use]
    pub const fn is_addition(self) -> bool {
        !matches!(self, Self::Removed | Self::Changed)
    }
}

/// Sub-case of a delta: which part of the element changed.
#[derive(EnumSetType, Debug, Hash, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum DeltaFlag {
    Type,
    Field,
    Method,
    Constructor,
    Superclass,
    Superinterface,
    Restrictions,
    DecreaseAccess,
    IncreaseAccess,
    TypeKind,
    FieldType,
}

impl DeltaFlag {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Type => "TYPE",
            Self::Field => "FIELD",
            Self::Method => "METHOD",
            Self::Constructor => "CONSTRUCTOR",
            Self::Superclass => "SUPERCLASS",
            Self::Superinterface => "SUPERINTERFACE",
            Self::Restrictions => "RESTRICTIONS",
            Self::DecreaseAccess => "DECREASE_ACCESS",
            Self::IncreaseAccess => "INCREASE_ACCESS",
            Self::TypeKind => "TYPE_KIND",
            Self::FieldType => "FIELD_TYPE",
        }
    }
}

/// One structural difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub element: DeltaElement,
    pub kind: DeltaKind,
    #[serde(default)]
    pub flags: EnumSet<DeltaFlag>,
    /// Type the delta belongs to (`None` for component level nodes)
    #[serde(default)]
    pub type_name: Option<String>,
    /// Member key (`name(signature)` for methods, the name for fields)
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub children: Vec<Delta>,
}

impl Delta {
    pub fn new(element: DeltaElement, kind: DeltaKind, flags: impl Into<EnumSet<DeltaFlag>>) -> Self {
        Self {
            element,
            kind,
            flags: flags.into(),
            type_name: None,
            member: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Delta>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf deltas in depth-first order of discovery.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Delta> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(delta) = stack.pop() {
            if delta.is_leaf() {
                leaves.push(delta);
            } else {
                stack.extend(delta.children.iter().rev());
            }
        }
        leaves
    }

    /// Whether this delta adds an element (type, field, method) that
    /// carries its own documentation.
    #[must_use]
    pub fn adds_documented_element(&self) -> bool {
        self.kind.is_addition()
            && self.flags.iter().any(|f| {
                matches!(
                    f,
                    DeltaFlag::Type | DeltaFlag::Field | DeltaFlag::Method | DeltaFlag::Constructor
                )
            })
    }

    /// Preference key used to resolve the severity of an incompatible delta.
    #[must_use]
    pub fn preference_key(&self) -> String {
        let mut key = format!("{}_{}", self.element.key(), self.kind.key());
        for flag in self.flags {
            key.push('_');
            key.push_str(flag.key());
        }
        key
    }

    /// Message arguments identifying the delta for filter matching.
    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        self.type_name
            .iter()
            .chain(self.member.iter())
            .cloned()
            .collect()
    }

    /// Human readable description.
    #[must_use]
    pub fn message(&self) -> String {
        let subject = match (&self.type_name, &self.member) {
            (Some(ty), Some(member)) => format!("{ty}#{member}"),
            (Some(ty), None) => ty.clone(),
            (None, Some(member)) => member.clone(),
            (None, None) => "component".to_string(),
        };
        let what = self
            .flags
            .iter()
            .map(|f| f.key().to_lowercase().replace('_', " "))
            .collect::<Vec<_>>()
            .join(", ");
        let verb = match self.kind {
            DeltaKind::Added
            | DeltaKind::AddedExtendRestriction
            | DeltaKind::AddedImplementRestriction => "added",
            DeltaKind::AddedNotExtendRestriction | DeltaKind::AddedNotExtendRestrictionStatic => {
                "added to an extendable type"
            }
            DeltaKind::AddedNotImplementRestriction => "added to an implementable interface",
            DeltaKind::Removed => "removed",
            DeltaKind::Changed => "changed",
        };
        if what.is_empty() {
            format!("{subject} {verb}")
        } else {
            format!("{subject}: {what} {verb}")
        }
    }

    /// Bits of the flag set, as stored in packed problem ids.
    #[must_use]
    pub fn flag_bits(&self) -> u32 {
        self.flags.as_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: DeltaKind, member: &str) -> Delta {
        Delta::new(DeltaElement::Class, kind, DeltaFlag::Method)
            .with_type_name("a.B")
            .with_member(member)
    }

    #[test]
    fn test_flatten_depth_first() {
        let tree = Delta::new(DeltaElement::Component, DeltaKind::Changed, EnumSet::empty())
            .with_children(vec![
                Delta::new(DeltaElement::Class, DeltaKind::Changed, EnumSet::empty())
                    .with_children(vec![leaf(DeltaKind::Added, "one()V"), leaf(DeltaKind::Removed, "two()V")]),
                leaf(DeltaKind::Added, "three()V"),
            ]);
        let members: Vec<_> = tree
            .flatten()
            .iter()
            .map(|d| d.member.clone().unwrap())
            .collect();
        assert_eq!(members, vec!["one()V", "two()V", "three()V"]);
    }

    #[test]
    fn test_flatten_single_leaf() {
        let single = leaf(DeltaKind::Added, "x()V");
        assert_eq!(single.flatten().len(), 1);
    }

    #[test]
    fn test_preference_key() {
        let d = leaf(DeltaKind::Removed, "run()V");
        assert_eq!(d.preference_key(), "CLASS_REMOVED_METHOD");
        let c = Delta::new(DeltaElement::Component, DeltaKind::Removed, DeltaFlag::Type);
        assert_eq!(c.preference_key(), "API_COMPONENT_REMOVED_TYPE");
    }

    #[test]
    fn test_arguments_and_message() {
        let d = leaf(DeltaKind::Removed, "run()V");
        assert_eq!(d.arguments(), vec!["a.B", "run()V"]);
        assert_eq!(d.message(), "a.B#run()V: method removed");
    }

    #[test]
    fn test_documented_additions() {
        assert!(leaf(DeltaKind::Added, "x()V").adds_documented_element());
        assert!(!leaf(DeltaKind::Removed, "x()V").adds_documented_element());
        let iface = Delta::new(DeltaElement::Class, DeltaKind::Added, DeltaFlag::Superinterface);
        assert!(!iface.adds_documented_element());
    }
}

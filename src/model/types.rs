//! Type structures: the class-level view of a component's API.
//!
//! A [`TypeStructure`] is immutable once loaded. It records the declared
//! hierarchy (superclass, superinterfaces in declaration order), the members,
//! the API restrictions carried by the type, and the use-sites found while
//! scanning its byte code.

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// Kind of a type structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    #[must_use]
    pub const fn is_interface(self) -> bool {
        matches!(self, Self::Interface | Self::Annotation)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
        }
    }
}

/// Declared visibility of a type or member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Package,
    Protected,
    #[default]
    Public,
}

impl Visibility {
    /// Whether the element is part of the visible API surface.
    #[must_use]
    pub const fn is_api(self) -> bool {
        matches!(self, Self::Public | Self::Protected)
    }
}

/// API restrictions declared through documentation tags.
#[derive(EnumSetType, Debug, Hash, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "kebab-case")]
pub enum Restriction {
    NoExtend,
    NoImplement,
    NoInstantiate,
    NoReference,
}

impl Restriction {
    /// Documentation tag declaring the restriction.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::NoExtend => "@noextend",
            Self::NoImplement => "@noimplement",
            Self::NoInstantiate => "@noinstantiate",
            Self::NoReference => "@noreference",
        }
    }
}

pub type Restrictions = EnumSet<Restriction>;

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub descriptor: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub restrictions: Restrictions,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            visibility: Visibility::Public,
            restrictions: EnumSet::empty(),
        }
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// A declared method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub signature: String,
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub restrictions: Restrictions,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            synthetic: false,
            is_static: false,
            is_abstract: false,
            visibility: Visibility::Public,
            restrictions: EnumSet::empty(),
        }
    }

    /// Mark the method as compiler generated.
    #[must_use]
    pub const fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    #[must_use]
    pub const fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub const fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    /// `name(signature)` key used to match methods across versions.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.signature)
    }
}

/// A use-site recorded while scanning a type's byte code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseSite {
    /// Member of the scanned type containing the use (`None` for the type itself)
    #[serde(default)]
    pub source_member: Option<String>,
    pub kind: crate::reference::ReferenceKind,
    pub target_type: String,
    #[serde(default)]
    pub target_member: Option<String>,
    #[serde(default)]
    pub target_signature: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

/// Structural description of a class, interface, enum or annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStructure {
    /// Fully qualified, dot separated name (`a.b.Outer$Inner`)
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub restrictions: Restrictions,
    /// Source file the type was compiled from, relative to the project
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub uses: Vec<UseSite>,
}

impl TypeStructure {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            restrictions: EnumSet::empty(),
            source_file: None,
            uses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_use(mut self, site: UseSite) -> Self {
        self.uses.push(site);
        self
    }

    /// Exact `(name, signature)` lookup among declared methods.
    #[must_use]
    pub fn method(&self, name: &str, signature: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.signature == signature)
    }

    /// Declared field lookup; inherited fields are not considered.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Package part of the qualified name (empty for the default package).
    #[must_use]
    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    /// Simple name without package qualification.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Package part of a dotted qualified name.
#[must_use]
pub fn package_of(qualified_name: &str) -> &str {
    qualified_name
        .rfind('.')
        .map_or("", |idx| &qualified_name[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup() {
        let ty = TypeStructure::new("a.b.C", TypeKind::Class)
            .with_method(MethodInfo::new("run", "()V"))
            .with_field(FieldInfo::new("count", "I"));

        assert!(ty.method("run", "()V").is_some());
        assert!(ty.method("run", "(I)V").is_none());
        assert!(ty.field("count").is_some());
        assert!(ty.field("missing").is_none());
    }

    #[test]
    fn test_names() {
        let ty = TypeStructure::new("a.b.C", TypeKind::Class);
        assert_eq!(ty.package(), "a.b");
        assert_eq!(ty.simple_name(), "C");
        assert_eq!(package_of("Default"), "");
    }

    #[test]
    fn test_restrictions_roundtrip_as_list() {
        let ty = TypeStructure::new("a.C", TypeKind::Interface)
            .with_restrictions(Restriction::NoImplement | Restriction::NoExtend);
        let json = serde_json::to_string(&ty).unwrap();
        assert!(json.contains("no-implement"));
        let back: TypeStructure = serde_json::from_str(&json).unwrap();
        assert!(back.restrictions.contains(Restriction::NoImplement));
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let ty: TypeStructure = serde_json::from_str(r#"{"name":"x.Y"}"#).unwrap();
        assert_eq!(ty.kind, TypeKind::Class);
        assert!(ty.methods.is_empty());
        assert!(ty.restrictions.is_empty());
    }
}

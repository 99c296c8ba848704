//! Components and profiles.
//!
//! A [`Component`] is a deployable bundle: identity, version, and the set of
//! type structures it contains. A [`Profile`] is a snapshot of a full set of
//! components at one point in time (the workspace, or a released baseline).

use super::types::{package_of, TypeStructure};
use super::version::{Version, VersionParseError};
use crate::error::{ApiToolsError, ResolveErrorKind, Result};
use crate::filter::FilterStore;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A type structure together with the component that declares it.
#[derive(Debug, Clone)]
pub struct TypeHandle {
    pub component_id: String,
    pub structure: Arc<TypeStructure>,
}

impl TypeHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.structure.name
    }
}

/// Source of class structures keyed by qualified type name.
pub trait TypeProvider: Send + Sync {
    /// Find a type as seen from `from_component`.
    ///
    /// `Ok(None)` means the type is not visible; errors are reserved for
    /// failures of the underlying model.
    fn find_type(&self, from_component: &str, qualified_name: &str) -> Result<Option<TypeHandle>>;
}

/// A deployable unit of code.
#[derive(Debug)]
pub struct Component {
    id: String,
    version: String,
    location: Option<PathBuf>,
    types: IndexMap<String, Arc<TypeStructure>>,
    filter_store: FilterStore,
}

impl Component {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            filter_store: FilterStore::new(id.clone(), None),
            id,
            version: version.into(),
            location: None,
            types: IndexMap::new(),
        }
    }

    /// Set the on-disk location (archive or project folder) of the component.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        self.filter_store = FilterStore::new(self.id.clone(), Some(location.clone()));
        self.location = Some(location);
        self
    }

    /// Use an explicit filter store instead of the location-backed one.
    #[must_use]
    pub fn with_filter_store(mut self, store: FilterStore) -> Self {
        self.filter_store = store;
        self
    }

    #[must_use]
    pub fn with_type(mut self, structure: TypeStructure) -> Self {
        self.add_type(structure);
        self
    }

    pub fn add_type(&mut self, structure: TypeStructure) {
        self.types
            .insert(structure.name.clone(), Arc::new(structure));
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw version string as declared.
    #[must_use]
    pub fn version_str(&self) -> &str {
        &self.version
    }

    /// The parsed version.
    pub fn version(&self) -> std::result::Result<Version, VersionParseError> {
        Version::parse(&self.version)
    }

    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Look up a type declared by this component.
    #[must_use]
    pub fn find_type(&self, qualified_name: &str) -> Option<&Arc<TypeStructure>> {
        self.types.get(qualified_name)
    }

    /// All declared types, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeStructure>> {
        self.types.values()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Whether any type of this component lives in `package`.
    #[must_use]
    pub fn contains_package(&self, package: &str) -> bool {
        self.types.keys().any(|name| package_of(name) == package)
    }

    /// The problem filters of this component, loaded on first use.
    #[must_use]
    pub const fn filter_store(&self) -> &FilterStore {
        &self.filter_store
    }

    fn handle(&self, structure: &Arc<TypeStructure>) -> TypeHandle {
        TypeHandle {
            component_id: self.id.clone(),
            structure: Arc::clone(structure),
        }
    }
}

/// A snapshot of all components at one point in time.
#[derive(Debug, Default)]
pub struct Profile {
    name: String,
    components: IndexMap<String, Arc<Component>>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.add_component(component);
        self
    }

    pub fn add_component(&mut self, component: Component) {
        self.components
            .insert(component.id().to_string(), Arc::new(component));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Arc<Component>> {
        self.components.get(id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.components.values()
    }

    /// Components other than `from` that provide `package`, in profile order.
    pub fn resolve_package<'a>(
        &'a self,
        from: &'a str,
        package: &'a str,
    ) -> impl Iterator<Item = &'a Arc<Component>> + 'a {
        self.components
            .values()
            .filter(move |c| c.id() != from && c.contains_package(package))
    }
}

impl TypeProvider for Profile {
    fn find_type(&self, from_component: &str, qualified_name: &str) -> Result<Option<TypeHandle>> {
        let source = self.component(from_component).ok_or_else(|| {
            ApiToolsError::resolve(
                format!("looking up {qualified_name} in profile {}", self.name),
                ResolveErrorKind::ComponentNotFound(from_component.to_string()),
            )
        })?;

        if let Some(structure) = source.find_type(qualified_name) {
            return Ok(Some(source.handle(structure)));
        }

        let package = package_of(qualified_name);
        for provider in self.resolve_package(from_component, package) {
            if let Some(structure) = provider.find_type(qualified_name) {
                return Ok(Some(provider.handle(structure)));
            }
        }
        Ok(None)
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Serialized form of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub types: Vec<TypeStructure>,
}

/// Serialized form of a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentSnapshot>,
}

impl From<ComponentSnapshot> for Component {
    fn from(snapshot: ComponentSnapshot) -> Self {
        let mut component = Self::new(snapshot.id, snapshot.version);
        if let Some(location) = snapshot.location {
            component = component.with_location(location);
        }
        for structure in snapshot.types {
            component.add_type(structure);
        }
        component
    }
}

impl From<ProfileSnapshot> for Profile {
    fn from(snapshot: ProfileSnapshot) -> Self {
        let mut profile = Self::new(snapshot.name);
        for component in snapshot.components {
            profile.add_component(component.into());
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    fn profile() -> Profile {
        Profile::new("workspace")
            .with_component(
                Component::new("a", "1.0.0")
                    .with_type(TypeStructure::new("a.api.Foo", TypeKind::Class)),
            )
            .with_component(
                Component::new("b", "2.1.0")
                    .with_type(TypeStructure::new("b.api.Bar", TypeKind::Interface)),
            )
    }

    #[test]
    fn test_find_type_in_own_component() {
        let found = profile().find_type("a", "a.api.Foo").unwrap().unwrap();
        assert_eq!(found.component_id, "a");
        assert_eq!(found.name(), "a.api.Foo");
    }

    #[test]
    fn test_find_type_through_package_provider() {
        let found = profile().find_type("a", "b.api.Bar").unwrap().unwrap();
        assert_eq!(found.component_id, "b");
    }

    #[test]
    fn test_missing_type_is_not_an_error() {
        assert!(profile().find_type("a", "c.Missing").unwrap().is_none());
    }

    #[test]
    fn test_unknown_source_component_is_an_error() {
        assert!(profile().find_type("zzz", "a.api.Foo").is_err());
    }

    #[test]
    fn test_component_version_parse() {
        let c = Component::new("x", "1.2.3.qualifier");
        assert_eq!(c.version().unwrap().to_string(), "1.2.3.qualifier");
        assert!(Component::new("y", "not-a-version").version().is_err());
    }

    #[test]
    fn test_profile_from_snapshot() {
        let json = r#"{
            "name": "baseline",
            "components": [
                {"id": "a", "version": "1.0.0", "types": [{"name": "a.Foo"}]}
            ]
        }"#;
        let snapshot: ProfileSnapshot = serde_json::from_str(json).unwrap();
        let profile = Profile::from(snapshot);
        assert_eq!(profile.name(), "baseline");
        assert_eq!(profile.component("a").unwrap().type_count(), 1);
    }
}

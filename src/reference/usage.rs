use super::{Reference, ReferenceKind, ResolvedMember};
use crate::error::Result;
use crate::model::{Component, Restriction, TypeProvider};
use indexmap::IndexSet;
use std::time::Instant;
use tracing::{debug, warn};

/// A reference that violates a restriction declared by another component.
#[derive(Debug)]
pub struct IllegalApiUse {
    pub reference: Reference,
    pub restriction: Restriction,
    /// Component declaring the restricted element
    pub target_component: String,
    /// Source file of the referencing type, when known
    pub source_file: Option<String>,
}

impl IllegalApiUse {
    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        self.reference.kind()
    }

    /// `Type#member` label of the restricted element.
    #[must_use]
    pub fn target_label(&self) -> String {
        self.reference
            .resolved()
            .map_or_else(|| self.reference.target_type().to_string(), ResolvedMember::label)
    }
}

/// Scans use-sites for illegal references to restricted API.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApiUseAnalyzer;

impl ApiUseAnalyzer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve every use-site of the in-scope types of `component`.
    ///
    /// `scope` limits the scan to the named types; `None` scans every type.
    /// A lookup failure abandons that one reference and is logged.
    pub fn find_illegal_api_use(
        &self,
        provider: &dyn TypeProvider,
        component: &Component,
        scope: Option<&IndexSet<String>>,
    ) -> Result<Vec<IllegalApiUse>> {
        let start = Instant::now();
        let mut illegal = Vec::new();
        let mut scanned = 0usize;

        for structure in component.types() {
            if scope.is_some_and(|s| !s.contains(&structure.name)) {
                continue;
            }
            for site in &structure.uses {
                let Some(reference) = Reference::from_use_site(component.id(), &structure.name, site)
                else {
                    debug!("skipping use-site without member name in {}", structure.name);
                    continue;
                };
                scanned += 1;

                let resolved = match reference.resolve(provider) {
                    Ok(Some(resolved)) => resolved,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(
                            "failed to resolve reference from {} to {}: {e}",
                            structure.name,
                            reference.target_type()
                        );
                        continue;
                    }
                };

                let owner = resolved.owner();
                if owner.component_id == component.id() {
                    continue;
                }
                let restriction = reference.kind().violated_restriction();
                if !violates(resolved, restriction) {
                    continue;
                }

                let target_component = owner.component_id.clone();
                illegal.push(IllegalApiUse {
                    reference,
                    restriction,
                    target_component,
                    source_file: structure.source_file.clone(),
                });
            }
        }

        debug!(
            "API use scan of {} checked {scanned} references in {:?}, {} illegal",
            component.id(),
            start.elapsed(),
            illegal.len()
        );
        Ok(illegal)
    }
}

fn violates(resolved: &ResolvedMember, restriction: Restriction) -> bool {
    match (resolved, restriction) {
        // Member accesses are also illegal when the declaring type is @noreference
        (ResolvedMember::Field { owner, .. } | ResolvedMember::Method { owner, .. }, Restriction::NoReference) => {
            resolved.restrictions().contains(restriction)
                || owner.structure.restrictions.contains(restriction)
        }
        _ => resolved.restrictions().contains(restriction),
    }
}

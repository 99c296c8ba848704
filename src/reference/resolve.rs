use super::{ElementKind, ReferenceKind};
use crate::error::Result;
use crate::model::{FieldInfo, MethodInfo, Restrictions, TypeHandle, TypeProvider, UseSite};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// What a reference names inside its target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    Type,
    Field { name: String },
    Method { name: String, signature: String },
}

impl ReferenceTarget {
    #[must_use]
    pub const fn element(&self) -> ElementKind {
        match self {
            Self::Type => ElementKind::Type,
            Self::Field { .. } => ElementKind::Field,
            Self::Method { .. } => ElementKind::Method,
        }
    }

    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Type => None,
            Self::Field { name } | Self::Method { name, .. } => Some(name),
        }
    }
}

/// The declaration a reference resolved to.
#[derive(Debug, Clone)]
pub enum ResolvedMember {
    Type(TypeHandle),
    Field { owner: TypeHandle, field: FieldInfo },
    Method { owner: TypeHandle, method: MethodInfo },
}

impl ResolvedMember {
    /// Declaring type (the type itself for type references).
    #[must_use]
    pub const fn owner(&self) -> &TypeHandle {
        match self {
            Self::Type(owner) | Self::Field { owner, .. } | Self::Method { owner, .. } => owner,
        }
    }

    /// Restrictions declared on the resolved element itself.
    #[must_use]
    pub fn restrictions(&self) -> Restrictions {
        match self {
            Self::Type(owner) => owner.structure.restrictions,
            Self::Field { field, .. } => field.restrictions,
            Self::Method { method, .. } => method.restrictions,
        }
    }

    /// Human readable `Type#member` label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Type(owner) => owner.name().to_string(),
            Self::Field { owner, field } => format!("{}#{}", owner.name(), field.name),
            Self::Method { owner, method } => {
                format!("{}#{}{}", owner.name(), method.name, method.signature)
            }
        }
    }
}

/// A use-site to declaration edge.
#[derive(Debug)]
pub struct Reference {
    source_component: String,
    source_type: String,
    source_member: Option<String>,
    kind: ReferenceKind,
    target_type: String,
    target: ReferenceTarget,
    line: Option<u32>,
    resolution: OnceLock<Option<ResolvedMember>>,
}

impl Reference {
    fn new(
        source_component: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        target: ReferenceTarget,
        kind: ReferenceKind,
    ) -> Self {
        Self {
            source_component: source_component.into(),
            source_type: source_type.into(),
            source_member: None,
            kind,
            target_type: target_type.into(),
            target,
            line: None,
            resolution: OnceLock::new(),
        }
    }

    pub fn type_reference(
        source_component: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        kind: ReferenceKind,
    ) -> Self {
        Self::new(source_component, source_type, target_type, ReferenceTarget::Type, kind)
    }

    pub fn field_reference(
        source_component: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        field: impl Into<String>,
        kind: ReferenceKind,
    ) -> Self {
        let target = ReferenceTarget::Field { name: field.into() };
        Self::new(source_component, source_type, target_type, target, kind)
    }

    pub fn method_reference(
        source_component: impl Into<String>,
        source_type: impl Into<String>,
        target_type: impl Into<String>,
        method: impl Into<String>,
        signature: impl Into<String>,
        kind: ReferenceKind,
    ) -> Self {
        let target = ReferenceTarget::Method {
            name: method.into(),
            signature: signature.into(),
        };
        Self::new(source_component, source_type, target_type, target, kind)
    }

    /// Build a reference from a recorded use-site.
    ///
    /// Returns `None` when a member reference lacks its member name.
    pub fn from_use_site(component: &str, source_type: &str, site: &UseSite) -> Option<Self> {
        let target = match site.kind.element() {
            ElementKind::Type => ReferenceTarget::Type,
            ElementKind::Field => ReferenceTarget::Field {
                name: site.target_member.clone()?,
            },
            ElementKind::Method => ReferenceTarget::Method {
                name: site.target_member.clone()?,
                signature: site.target_signature.clone().unwrap_or_default(),
            },
        };
        let mut reference = Self::new(component, source_type, &site.target_type, target, site.kind);
        reference.source_member.clone_from(&site.source_member);
        reference.line = site.line;
        Some(reference)
    }

    #[must_use]
    pub fn source_component(&self) -> &str {
        &self.source_component
    }

    #[must_use]
    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    #[must_use]
    pub fn source_member(&self) -> Option<&str> {
        self.source_member.as_deref()
    }

    #[must_use]
    pub const fn kind(&self) -> ReferenceKind {
        self.kind
    }

    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    #[must_use]
    pub const fn target(&self) -> &ReferenceTarget {
        &self.target
    }

    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// The resolved declaration, if resolution already ran and succeeded.
    #[must_use]
    pub fn resolved(&self) -> Option<&ResolvedMember> {
        self.resolution.get().and_then(Option::as_ref)
    }

    /// Whether resolution has been attempted.
    #[must_use]
    pub fn is_resolution_computed(&self) -> bool {
        self.resolution.get().is_some()
    }

    /// Resolve against `provider`; later calls return the first outcome.
    ///
    /// A lookup error aborts this attempt without recording an outcome.
    pub fn resolve(&self, provider: &dyn TypeProvider) -> Result<Option<&ResolvedMember>> {
        if let Some(outcome) = self.resolution.get() {
            return Ok(outcome.as_ref());
        }
        let outcome = self.compute(provider)?;
        Ok(self.resolution.get_or_init(|| outcome).as_ref())
    }

    fn compute(&self, provider: &dyn TypeProvider) -> Result<Option<ResolvedMember>> {
        let Some(handle) = provider.find_type(&self.source_component, &self.target_type)? else {
            debug!(
                "unresolved reference from {} to missing type {}",
                self.source_type, self.target_type
            );
            return Ok(None);
        };

        match &self.target {
            ReferenceTarget::Type => Ok(Some(ResolvedMember::Type(handle))),
            ReferenceTarget::Field { name } => {
                let field = handle.structure.field(name).cloned();
                Ok(field.map(|field| ResolvedMember::Field {
                    owner: handle,
                    field,
                }))
            }
            ReferenceTarget::Method { name, signature } => {
                self.resolve_virtual(provider, handle, name, signature)
            }
        }
    }

    /// Depth-first hierarchy walk: own methods, then superinterfaces in
    /// declaration order for interface dispatch, else the superclass chain.
    fn resolve_virtual(
        &self,
        provider: &dyn TypeProvider,
        start: TypeHandle,
        name: &str,
        signature: &str,
    ) -> Result<Option<ResolvedMember>> {
        let mut stack = vec![start];
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(handle) = stack.pop() {
            if !visited.insert(handle.name().to_string()) {
                continue;
            }

            if let Some(method) = handle.structure.method(name, signature) {
                if method.synthetic {
                    // Synthetic matches end this branch of the walk
                    debug!("{}#{name}{signature} is synthetic, not resolving", handle.name());
                    continue;
                }
                let method = method.clone();
                return Ok(Some(ResolvedMember::Method {
                    owner: handle,
                    method,
                }));
            }

            if self.kind.is_interface_dispatch() {
                for interface in handle.structure.interfaces.iter().rev() {
                    if let Some(next) = provider.find_type(&handle.component_id, interface)? {
                        stack.push(next);
                    }
                }
            } else if let Some(superclass) = &handle.structure.superclass {
                if let Some(next) = provider.find_type(&handle.component_id, superclass)? {
                    stack.push(next);
                }
            }
        }
        Ok(None)
    }
}

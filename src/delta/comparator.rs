use super::{Delta, DeltaElement, DeltaFlag, DeltaKind};
use crate::error::{ApiToolsError, CompareErrorKind, Result};
use crate::model::{Component, MethodInfo, Restriction, TypeStructure, Visibility};
use enumset::EnumSet;

/// Produces delta trees between a reference and a current component.
///
/// `Ok(None)` means there is no difference.
pub trait Comparator: Send + Sync {
    /// Compare every API type of two versions of a component.
    fn compare_components(&self, reference: &Component, current: &Component) -> Result<Option<Delta>>;

    /// Compare a single type of two versions of a component.
    fn compare_type(
        &self,
        type_name: &str,
        reference: &Component,
        current: &Component,
    ) -> Result<Option<Delta>>;
}

/// Compares the API visible surface of [`TypeStructure`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralComparator;

impl StructuralComparator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn api_type(structure: &TypeStructure) -> bool {
    structure.visibility.is_api()
}

fn api_method(method: &MethodInfo) -> bool {
    method.visibility.is_api() && !method.synthetic
}

fn member_flag(method: &MethodInfo) -> DeltaFlag {
    if method.is_constructor() {
        DeltaFlag::Constructor
    } else {
        DeltaFlag::Method
    }
}

fn type_added(structure: &TypeStructure) -> Delta {
    Delta::new(DeltaElement::Component, DeltaKind::Added, DeltaFlag::Type).with_type_name(&structure.name)
}

fn type_removed(name: &str) -> Delta {
    Delta::new(DeltaElement::Component, DeltaKind::Removed, DeltaFlag::Type).with_type_name(name)
}

fn access_change(reference: Visibility, current: Visibility) -> Option<DeltaFlag> {
    match reference.cmp(&current) {
        std::cmp::Ordering::Less => Some(DeltaFlag::IncreaseAccess),
        std::cmp::Ordering::Greater => Some(DeltaFlag::DecreaseAccess),
        std::cmp::Ordering::Equal => None,
    }
}

/// Kind of a member addition, depending on what clients may do with the type.
fn addition_kind(current: &TypeStructure, method: Option<&MethodInfo>) -> DeltaKind {
    let element = DeltaElement::from(current.kind);
    if element == DeltaElement::Annotation {
        return DeltaKind::Added;
    }
    if element.is_interface() {
        // Interface constants never break implementors
        if method.is_none() {
            return DeltaKind::Added;
        }
        return if current.restrictions.contains(Restriction::NoImplement) {
            DeltaKind::AddedImplementRestriction
        } else {
            DeltaKind::AddedNotImplementRestriction
        };
    }
    if current.restrictions.contains(Restriction::NoExtend) {
        return DeltaKind::AddedExtendRestriction;
    }
    match method {
        Some(m) if m.is_abstract => DeltaKind::AddedNotExtendRestriction,
        Some(m) if m.is_static => DeltaKind::AddedNotExtendRestrictionStatic,
        _ => DeltaKind::Added,
    }
}

/// Leaf deltas between two versions of the same type.
fn compare_structures(reference: &TypeStructure, current: &TypeStructure) -> Vec<Delta> {
    let element = DeltaElement::from(current.kind);
    let name = current.name.as_str();
    let mut deltas = Vec::new();
    let delta = |kind: DeltaKind, flag: DeltaFlag| Delta::new(element, kind, flag).with_type_name(name);

    if reference.kind != current.kind {
        let changed = Delta::new(DeltaElement::from(reference.kind), DeltaKind::Changed, DeltaFlag::TypeKind)
            .with_type_name(name);
        return vec![changed];
    }

    if let Some(flag) = access_change(reference.visibility, current.visibility) {
        deltas.push(delta(DeltaKind::Changed, flag));
    }
    if !(current.restrictions - reference.restrictions).is_empty() {
        deltas.push(delta(DeltaKind::Changed, DeltaFlag::Restrictions));
    }
    if reference.superclass != current.superclass {
        deltas.push(delta(DeltaKind::Changed, DeltaFlag::Superclass));
    }
    for interface in &reference.interfaces {
        if !current.interfaces.contains(interface) {
            deltas.push(delta(DeltaKind::Removed, DeltaFlag::Superinterface).with_member(interface));
        }
    }
    for interface in &current.interfaces {
        if !reference.interfaces.contains(interface) {
            deltas.push(delta(DeltaKind::Added, DeltaFlag::Superinterface).with_member(interface));
        }
    }

    // Fields
    for old in reference.fields.iter().filter(|f| f.visibility.is_api()) {
        match current.field(&old.name).filter(|f| f.visibility.is_api()) {
            None => deltas.push(delta(DeltaKind::Removed, DeltaFlag::Field).with_member(&old.name)),
            Some(new) => {
                if old.descriptor != new.descriptor {
                    deltas.push(delta(DeltaKind::Changed, DeltaFlag::FieldType).with_member(&old.name));
                }
                if let Some(flag) = access_change(old.visibility, new.visibility) {
                    deltas.push(delta(DeltaKind::Changed, flag).with_member(&old.name));
                }
                if !(new.restrictions - old.restrictions).is_empty() {
                    deltas.push(delta(DeltaKind::Changed, DeltaFlag::Restrictions).with_member(&old.name));
                }
            }
        }
    }
    for new in current.fields.iter().filter(|f| f.visibility.is_api()) {
        if reference.field(&new.name).filter(|f| f.visibility.is_api()).is_none() {
            let kind = addition_kind(current, None);
            deltas.push(delta(kind, DeltaFlag::Field).with_member(&new.name));
        }
    }

    // Methods and constructors
    for old in reference.methods.iter().filter(|m| api_method(m)) {
        let flag = member_flag(old);
        match current.method(&old.name, &old.signature).filter(|m| api_method(m)) {
            None => deltas.push(delta(DeltaKind::Removed, flag).with_member(old.key())),
            Some(new) => {
                if let Some(access) = access_change(old.visibility, new.visibility) {
                    deltas.push(
                        Delta::new(element, DeltaKind::Changed, flag | access)
                            .with_type_name(name)
                            .with_member(old.key()),
                    );
                }
                if !(new.restrictions - old.restrictions).is_empty() {
                    deltas.push(
                        Delta::new(element, DeltaKind::Changed, flag | DeltaFlag::Restrictions)
                            .with_type_name(name)
                            .with_member(old.key()),
                    );
                }
            }
        }
    }
    for new in current.methods.iter().filter(|m| api_method(m)) {
        let known = reference
            .method(&new.name, &new.signature)
            .is_some_and(api_method);
        if !known {
            let kind = addition_kind(current, Some(new));
            deltas.push(delta(kind, member_flag(new)).with_member(new.key()));
        }
    }

    deltas
}

impl Comparator for StructuralComparator {
    fn compare_components(&self, reference: &Component, current: &Component) -> Result<Option<Delta>> {
        let mut children = Vec::new();

        for old in reference.types().filter(|t| api_type(t)) {
            match current.find_type(&old.name).filter(|t| api_type(t)) {
                None => children.push(type_removed(&old.name)),
                Some(new) => children.extend(compare_structures(old, new)),
            }
        }
        for new in current.types().filter(|t| api_type(t)) {
            if reference.find_type(&new.name).filter(|t| api_type(t)).is_none() {
                children.push(type_added(new));
            }
        }

        if children.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            Delta::new(DeltaElement::Component, DeltaKind::Changed, EnumSet::empty())
                .with_children(children),
        ))
    }

    fn compare_type(
        &self,
        type_name: &str,
        reference: &Component,
        current: &Component,
    ) -> Result<Option<Delta>> {
        let old = reference.find_type(type_name).filter(|t| api_type(t));
        let new = current.find_type(type_name).filter(|t| api_type(t));

        let children = match (old, new) {
            (Some(old), Some(new)) => compare_structures(old, new),
            (None, Some(new)) => vec![type_added(new)],
            (Some(_), None) => vec![type_removed(type_name)],
            (None, None) => {
                if reference.find_type(type_name).is_some() || current.find_type(type_name).is_some() {
                    // Not part of the API in either version
                    return Ok(None);
                }
                return Err(ApiToolsError::compare(
                    format!("comparing {type_name} in {}", current.id()),
                    CompareErrorKind::TypeNotFound(type_name.to_string()),
                ));
            }
        };

        if children.is_empty() {
            return Ok(None);
        }
        let element = new.or(old).map_or(DeltaElement::Component, |t| DeltaElement::from(t.kind));
        Ok(Some(
            Delta::new(element, DeltaKind::Changed, EnumSet::empty())
                .with_type_name(type_name)
                .with_children(children),
        ))
    }
}

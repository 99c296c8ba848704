use super::{Delta, DeltaFlag, DeltaKind};

/// Decides whether a delta keeps existing clients working at the byte code level.
pub trait CompatibilityClassifier: Send + Sync {
    fn is_binary_compatible(&self, delta: &Delta) -> bool;
}

/// Classification for the deltas produced by [`super::StructuralComparator`].
///
/// Additions are compatible unless they land in a type clients may extend
/// or implement. Removals are always breaking. Changes are breaking except
/// for widened access.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCompatibilityClassifier;

impl CompatibilityClassifier for DefaultCompatibilityClassifier {
    fn is_binary_compatible(&self, delta: &Delta) -> bool {
        match delta.kind {
            DeltaKind::Added
            | DeltaKind::AddedExtendRestriction
            | DeltaKind::AddedImplementRestriction => true,
            DeltaKind::AddedNotExtendRestriction
            | DeltaKind::AddedNotImplementRestriction
            | DeltaKind::AddedNotExtendRestrictionStatic
            | DeltaKind::Removed => false,
            DeltaKind::Changed => {
                !delta.flags.is_empty() && delta.flags.is_subset(DeltaFlag::IncreaseAccess.into())
            }
        }
    }
}

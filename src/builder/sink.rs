use super::collaborators::ProblemSink;
use crate::model::{ProblemRecord, ProblemSelector};
use indexmap::IndexMap;
use std::sync::{PoisonError, RwLock};

/// In-memory [`ProblemSink`].
///
/// Problems are keyed by [`ProblemRecord::key`], so emitting the same
/// problem twice keeps a single entry at its original position.
#[derive(Debug, Default)]
pub struct ProblemStore {
    problems: RwLock<IndexMap<String, ProblemRecord>>,
}

impl ProblemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded problem.
    #[must_use]
    pub fn all(&self) -> Vec<ProblemRecord> {
        self.problems
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProblemSink for ProblemStore {
    fn emit(&self, problem: ProblemRecord) {
        let key = problem.key();
        self.problems
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, problem);
    }

    fn clear(&self, selector: &ProblemSelector) {
        self.problems
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, p| !selector.matches(p));
    }

    fn problems(&self, selector: &ProblemSelector) -> Vec<ProblemRecord> {
        self.problems
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|p| selector.matches(p))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProblemCategory, Severity};

    fn problem(id: u32, category: ProblemCategory, type_name: &str) -> ProblemRecord {
        ProblemRecord::new(id, category, "core", "msg").with_type_name(type_name)
    }

    #[test]
    fn test_emit_is_idempotent() {
        let store = ProblemStore::new();
        store.emit(problem(1, ProblemCategory::Compatibility, "a.A"));
        store.emit(problem(1, ProblemCategory::Compatibility, "a.A").with_severity(Severity::Error));
        assert_eq!(store.len(), 1);
        assert!(store.all()[0].is_error());
    }

    #[test]
    fn test_clear_by_selector() {
        let store = ProblemStore::new();
        store.emit(problem(1, ProblemCategory::Compatibility, "a.A"));
        store.emit(problem(2, ProblemCategory::SinceTag, "a.B"));
        store.emit(problem(3, ProblemCategory::VersionNumbering, "a.A"));

        store.clear(
            &ProblemSelector::component("core")
                .with_type_name("a.A")
                .with_categories(ProblemCategory::Compatibility.into()),
        );
        let ids: Vec<_> = store.all().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);

        store.clear(&ProblemSelector::component("other"));
        assert_eq!(store.len(), 2);
        store.clear(&ProblemSelector::component("core"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_problems_query_keeps_order() {
        let store = ProblemStore::new();
        store.emit(problem(5, ProblemCategory::Usage, "a.C"));
        store.emit(problem(4, ProblemCategory::Usage, "a.D"));
        let found = store.problems(
            &ProblemSelector::component("core").with_categories(ProblemCategory::Usage.into()),
        );
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![5, 4]);
    }
}

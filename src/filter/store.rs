use super::matching::{problems_match, ProblemSignature};
use super::xml::{parse_filters, read_filter_document};
use super::GLOBAL_KEY;
use crate::model::ProblemRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// The problem signature a filter suppresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilteredProblem {
    pub id: u32,
    pub type_name: Option<String>,
    pub resource_path: Option<String>,
    pub arguments: Vec<String>,
}

impl FilteredProblem {
    #[must_use]
    pub fn signature(&self) -> ProblemSignature<'_> {
        ProblemSignature {
            id: self.id,
            type_name: self.type_name.as_deref(),
            arguments: &self.arguments,
        }
    }
}

impl From<&ProblemRecord> for FilteredProblem {
    fn from(problem: &ProblemRecord) -> Self {
        Self {
            id: problem.id,
            type_name: problem.type_name.clone(),
            resource_path: problem.resource.clone(),
            arguments: problem.arguments.clone(),
        }
    }
}

/// An accepted problem of one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiProblemFilter {
    pub component_id: String,
    pub problem: FilteredProblem,
    pub comment: Option<String>,
}

impl ApiProblemFilter {
    pub fn new(component_id: impl Into<String>, problem: FilteredProblem) -> Self {
        Self {
            component_id: component_id.into(),
            problem,
            comment: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Bucket key: the type name, or the global key for type-less problems.
    #[must_use]
    pub fn key(&self) -> &str {
        bucket_key(self.problem.type_name.as_deref())
    }
}

fn bucket_key(type_name: Option<&str>) -> &str {
    match type_name {
        Some(name) if !name.is_empty() => name,
        _ => GLOBAL_KEY,
    }
}

type FilterMap = IndexMap<String, Vec<ApiProblemFilter>>;

#[derive(Debug)]
enum FilterState {
    Unloaded,
    Loaded(FilterMap),
}

/// Accepted problems of one component, loaded on first use.
///
/// The backing document is read at most once per load cycle even under
/// concurrent first access. [`FilterStore::dispose`] returns the store to
/// the unloaded state. Changes are kept in memory only.
#[derive(Debug)]
pub struct FilterStore {
    component_id: String,
    location: Option<PathBuf>,
    state: RwLock<FilterState>,
}

impl FilterStore {
    /// Store backed by the filter document found at `location`, if any.
    pub fn new(component_id: impl Into<String>, location: Option<PathBuf>) -> Self {
        Self {
            component_id: component_id.into(),
            location,
            state: RwLock::new(FilterState::Unloaded),
        }
    }

    /// Store pre-populated with `filters` and no backing document.
    pub fn with_filters(component_id: impl Into<String>, filters: Vec<ApiProblemFilter>) -> Self {
        let store = Self {
            component_id: component_id.into(),
            location: None,
            state: RwLock::new(FilterState::Loaded(FilterMap::new())),
        };
        store.add_filters(filters);
        store
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            FilterState::Loaded(_)
        )
    }

    fn ensure_loaded(&self) {
        if self.is_loaded() {
            return;
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, FilterState::Unloaded) {
            *state = FilterState::Loaded(self.load());
        }
    }

    fn load(&self) -> FilterMap {
        let mut map = FilterMap::new();
        let Some(location) = &self.location else {
            return map;
        };
        match read_filter_document(location) {
            Ok(Some(xml)) => {
                for filter in parse_filters(&self.component_id, &xml) {
                    insert(&mut map, filter);
                }
                debug!(
                    "loaded {} filter buckets for {} from {}",
                    map.len(),
                    self.component_id,
                    location.display()
                );
            }
            Ok(None) => {}
            Err(e) => warn!("no filters available for {}: {e}", self.component_id),
        }
        map
    }

    /// Whether an accepted filter suppresses `problem`.
    pub fn is_filtered(&self, problem: &ProblemRecord) -> bool {
        self.ensure_loaded();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let FilterState::Loaded(map) = &*state else {
            return false;
        };
        if map.is_empty() {
            return false;
        }
        let Some(bucket) = map.get(bucket_key(problem.type_name.as_deref())) else {
            return false;
        };
        let live = ProblemSignature {
            id: problem.id,
            type_name: problem.type_name.as_deref(),
            arguments: &problem.arguments,
        };
        bucket
            .iter()
            .any(|filter| problems_match(filter.problem.signature(), live))
    }

    /// Merge filters into the store.
    pub fn add_filters(&self, filters: impl IntoIterator<Item = ApiProblemFilter>) {
        self.ensure_loaded();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let FilterState::Loaded(map) = &mut *state {
            for filter in filters {
                insert(map, filter);
            }
        }
    }

    /// Accept the given problems.
    pub fn add_filters_for(&self, problems: &[ProblemRecord]) {
        let filters: Vec<_> = problems
            .iter()
            .map(|p| ApiProblemFilter::new(self.component_id.clone(), FilteredProblem::from(p)))
            .collect();
        self.add_filters(filters);
    }

    /// Remove filters; `true` only if every one of them was present.
    ///
    /// Every removal is attempted even after a miss. An empty request
    /// removes nothing and returns `false`.
    pub fn remove_filters(&self, filters: &[ApiProblemFilter]) -> bool {
        if filters.is_empty() {
            return false;
        }
        self.ensure_loaded();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let FilterState::Loaded(map) = &mut *state else {
            return false;
        };

        let mut removed_all = true;
        for filter in filters {
            let key = filter.key();
            let removed = match map.get_mut(key) {
                Some(bucket) => {
                    let before = bucket.len();
                    bucket.retain(|f| f.problem != filter.problem);
                    let removed = bucket.len() < before;
                    if bucket.is_empty() {
                        map.shift_remove(key);
                    }
                    removed
                }
                None => false,
            };
            removed_all &= removed;
        }
        removed_all
    }

    /// All filters, grouped by bucket in insertion order.
    pub fn filters(&self) -> Vec<ApiProblemFilter> {
        self.ensure_loaded();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            FilterState::Loaded(map) => map.values().flatten().cloned().collect(),
            FilterState::Unloaded => Vec::new(),
        }
    }

    /// Release the in-memory filters; the next use reloads them.
    pub fn dispose(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = FilterState::Unloaded;
    }
}

fn insert(map: &mut FilterMap, filter: ApiProblemFilter) {
    let bucket = map.entry(filter.key().to_string()).or_default();
    if !bucket.contains(&filter) {
        bucket.push(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FILTER_FILE_NAME, SETTINGS_FOLDER};
    use crate::model::ProblemCategory;
    use std::sync::Arc;

    fn problem(id: u32, type_name: Option<&str>, args: &[&str]) -> ProblemRecord {
        let mut p = ProblemRecord::new(id, ProblemCategory::Compatibility, "core", "msg")
            .with_arguments(args.iter().map(ToString::to_string).collect());
        p.type_name = type_name.map(ToString::to_string);
        p
    }

    fn filter(id: u32, type_name: Option<&str>, args: &[&str]) -> ApiProblemFilter {
        ApiProblemFilter::new("core", FilteredProblem::from(&problem(id, type_name, args)))
    }

    #[test]
    fn test_is_filtered_by_type_bucket() {
        let store = FilterStore::with_filters("core", vec![filter(5, Some("a.Foo"), &["Bar"])]);
        assert!(store.is_filtered(&problem(5, Some("a.Foo"), &["x.Bar"])));
        assert!(!store.is_filtered(&problem(5, Some("a.Other"), &["x.Bar"])));
        assert!(!store.is_filtered(&problem(6, Some("a.Foo"), &["x.Bar"])));
    }

    #[test]
    fn test_global_bucket() {
        let store = FilterStore::with_filters("core", vec![filter(9, None, &["1.0.0"])]);
        assert!(store.is_filtered(&problem(9, None, &["1.0.0"])));
        // An empty type name lands in the global bucket but does not match a type-less filter
        assert!(!store.is_filtered(&problem(9, Some(""), &["1.0.0"])));
    }

    #[test]
    fn test_empty_store_filters_nothing() {
        let store = FilterStore::new("core", None);
        assert!(!store.is_filtered(&problem(1, None, &[])));
        assert!(store.is_loaded());
    }

    #[test]
    fn test_remove_filters_reports_partial_failure() {
        let a = filter(1, Some("a.A"), &[]);
        let b = filter(2, Some("a.B"), &[]);
        let store = FilterStore::with_filters("core", vec![a.clone(), b.clone()]);

        assert!(!store.remove_filters(&[]));
        assert!(!store.remove_filters(&[a.clone(), filter(3, Some("a.C"), &[])]));
        // The first removal still happened
        assert!(!store.is_filtered(&problem(1, Some("a.A"), &[])));
        assert!(store.remove_filters(&[b]));
        assert!(store.filters().is_empty());
    }

    #[test]
    fn test_add_filters_for_problems() {
        let store = FilterStore::new("core", None);
        let p = problem(4, Some("a.A"), &["m()"]);
        store.add_filters_for(&[p.clone(), p.clone()]);
        assert!(store.is_filtered(&p));
        assert_eq!(store.filters().len(), 1);
    }

    fn settings_dir(doc: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(SETTINGS_FOLDER)).unwrap();
        std::fs::write(dir.path().join(SETTINGS_FOLDER).join(FILTER_FILE_NAME), doc).unwrap();
        dir
    }

    const DOC: &str = r#"<component id="core" version="2">
  <resource path="src/a/A.java" type="a.A">
    <filter id="4"><message_arguments><message_argument value="m()"/></message_arguments></filter>
  </resource>
</component>"#;

    #[test]
    fn test_lazy_load_and_dispose() {
        let dir = settings_dir(DOC);
        let store = FilterStore::new("core", Some(dir.path().to_path_buf()));
        assert!(!store.is_loaded());
        assert!(store.is_filtered(&problem(4, Some("a.A"), &["m()"])));

        store.dispose();
        assert!(!store.is_loaded());
        std::fs::remove_file(dir.path().join(SETTINGS_FOLDER).join(FILTER_FILE_NAME)).unwrap();
        assert!(!store.is_filtered(&problem(4, Some("a.A"), &["m()"])));
    }

    #[test]
    fn test_unreadable_archive_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("core.jar");
        std::fs::write(&jar, b"definitely not a zip archive").unwrap();

        let store = FilterStore::new("core", Some(jar));
        assert!(!store.is_filtered(&problem(4, Some("a.A"), &["m()"])));
        assert!(store.is_loaded());
        assert!(store.filters().is_empty());
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let dir = settings_dir(DOC);
        let store = Arc::new(FilterStore::new("core", Some(dir.path().to_path_buf())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.is_filtered(&problem(4, Some("a.A"), &["m()"])))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(store.filters().len(), 1);
    }
}

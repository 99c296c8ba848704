//! Build orchestration.
//!
//! [`ApiBuilder`] runs one build of one component of a workspace profile
//! against its counterpart in a baseline profile:
//!
//! - A full build compares the whole component and scans every type for
//!   illegal API use.
//! - An incremental build only looks at the class files of a
//!   [`ResourceDelta`]; it compares and scans just the types they declare.
//!   Without a delta it falls back to a full build.
//!
//! Both paths classify the resulting deltas, check since tags of added
//! elements and evaluate the version policy once at the end. Problems are
//! handed to a [`ProblemSink`].

mod classify;
mod collaborators;
mod report;
mod resource;
mod since_tag;
mod sink;
mod source_index;
mod version_policy;

pub use classify::PassAccumulator;
pub use collaborators::{
    DocComment, PreferenceResolver, ProblemSink, SourceLocator, UniformPreferences,
    INCOMPATIBLE_API_COMPONENT_VERSION, INVALID_SINCE_TAG_VERSION, MALFORMED_SINCE_TAG,
    MANIFEST_RESOURCE, MISSING_SINCE_TAG, RESTRICTION_PREFIX,
};
pub use resource::{ResourceChange, ResourceDelta};
pub use since_tag::{check_since_tag, SinceTagFinding, SinceTagSeverities, SinceTagVersion};
pub use sink::ProblemStore;
pub use source_index::{Declaration, SourceIndex, TypeSource};
pub use version_policy::{evaluate as evaluate_version_policy, MarkerMerge, VersionVerdict};

use crate::delta::{
    Comparator, CompatibilityClassifier, DefaultCompatibilityClassifier, Delta,
    StructuralComparator,
};
use crate::error::{ApiToolsError, ResolveErrorKind, Result};
use crate::model::{
    ClassArtifactReader, ClassFileReader, Component, ProblemCategory, ProblemSelector, Profile,
};
use crate::reference::ApiUseAnalyzer;
use classify::PassContext;
use indexmap::IndexSet;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// How much of the component to rebuild.
#[derive(Debug, Clone, Default)]
pub enum BuildKind {
    #[default]
    Full,
    /// Rebuild what changed; `None` when no change information is available
    Incremental(Option<ResourceDelta>),
}

/// Path a build actually took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Full,
    Incremental,
}

/// One build of one component.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub workspace: &'a Profile,
    /// Baseline holding the reference components (`None` when there is none)
    pub baseline: Option<&'a Profile>,
    pub component_id: &'a str,
}

/// Toggles of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Compare changed types on the rayon pool
    pub parallel_compare: bool,
    /// Scan for illegal use of restricted API
    pub check_api_usage: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel_compare: false,
            check_api_usage: true,
        }
    }
}

/// Summary of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    pub component_id: String,
    pub mode: BuildMode,
    /// Types compared against the reference
    pub compared_types: usize,
    /// Whether a reference component existed
    pub has_reference: bool,
    pub breakage: bool,
    pub additions: bool,
    /// Problems handed to the sink
    pub emitted: usize,
    pub cancelled: bool,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

impl BuildOutcome {
    fn new(component_id: &str, mode: BuildMode) -> Self {
        Self {
            component_id: component_id.to_string(),
            mode,
            compared_types: 0,
            has_reference: false,
            breakage: false,
            additions: false,
            emitted: 0,
            cancelled: false,
            elapsed: Duration::ZERO,
        }
    }
}

/// Runs builds against pluggable collaborators.
pub struct ApiBuilder {
    comparator: Box<dyn Comparator>,
    classifier: Box<dyn CompatibilityClassifier>,
    preferences: Box<dyn PreferenceResolver>,
    sources: Box<dyn SourceLocator>,
    class_reader: Box<dyn ClassArtifactReader>,
    analyzer: ApiUseAnalyzer,
    options: BuildOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl ApiBuilder {
    /// Builder with the structural comparator and no source information.
    pub fn new(preferences: Box<dyn PreferenceResolver>) -> Self {
        Self {
            comparator: Box::new(StructuralComparator::new()),
            classifier: Box::new(DefaultCompatibilityClassifier),
            preferences,
            sources: Box::new(SourceIndex::new()),
            class_reader: Box::new(ClassFileReader),
            analyzer: ApiUseAnalyzer::new(),
            options: BuildOptions::default(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_comparator(mut self, comparator: Box<dyn Comparator>) -> Self {
        self.comparator = comparator;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn CompatibilityClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Box<dyn SourceLocator>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_class_reader(mut self, reader: Box<dyn ClassArtifactReader>) -> Self {
        self.class_reader = reader;
        self
    }

    #[must_use]
    pub const fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Flag checked before a build starts; a running build always completes.
    #[must_use]
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub const fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run one build.
    ///
    /// Fails only when the component is not part of the workspace. Comparator
    /// failures abandon the comparison and are logged.
    pub fn build(
        &self,
        request: &BuildRequest<'_>,
        kind: &BuildKind,
        sink: &dyn ProblemSink,
    ) -> Result<BuildOutcome> {
        let start = Instant::now();
        let component = request.workspace.component(request.component_id).ok_or_else(|| {
            ApiToolsError::resolve(
                format!("building {}", request.component_id),
                ResolveErrorKind::ComponentNotFound(request.component_id.to_string()),
            )
        })?;

        let mode = match kind {
            BuildKind::Incremental(Some(_)) => BuildMode::Incremental,
            _ => BuildMode::Full,
        };
        let mut outcome = BuildOutcome::new(component.id(), mode);
        if self.is_cancelled() {
            info!("build of {} cancelled", component.id());
            outcome.cancelled = true;
            return Ok(outcome);
        }

        let reference = request.baseline.and_then(|b| b.component(request.component_id));
        outcome.has_reference = reference.is_some();
        info!(
            "{} build of {} {} against {}",
            match mode {
                BuildMode::Full => "full",
                BuildMode::Incremental => "incremental",
            },
            component.id(),
            component.version_str(),
            reference.map_or_else(|| "no baseline".to_string(), |r| r.version_str().to_string())
        );

        let mut ctx = PassContext::new(
            component,
            reference.map(Arc::as_ref),
            self.classifier.as_ref(),
            self.preferences.as_ref(),
            sink,
            self.sources.as_ref(),
        );
        let pass = match kind {
            BuildKind::Incremental(Some(delta)) => {
                self.build_delta(&mut ctx, request.workspace, delta, &mut outcome)
            }
            _ => self.build_all(&mut ctx, request.workspace, &mut outcome),
        };

        outcome.breakage = pass.breakage;
        outcome.additions = pass.additions;
        outcome.emitted = ctx.emitted();
        outcome.elapsed = start.elapsed();
        info!(
            "finished build of {} in {:?}: {} problems",
            component.id(),
            outcome.elapsed,
            outcome.emitted
        );
        Ok(outcome)
    }

    fn build_all(
        &self,
        ctx: &mut PassContext<'_>,
        workspace: &Profile,
        outcome: &mut BuildOutcome,
    ) -> PassAccumulator {
        let component = ctx.component;
        ctx.sink.clear(&ProblemSelector::component(component.id()));

        let mut pass = PassAccumulator::default();
        match ctx.reference {
            Some(reference) => {
                let start = Instant::now();
                outcome.compared_types = reference.type_count().max(component.type_count());
                match self.comparator.compare_components(reference, component) {
                    Ok(Some(delta)) => {
                        pass = ctx.classify(&delta);
                        ctx.check_component_version(pass);
                    }
                    Ok(None) => debug!("no delta for {}", component.id()),
                    Err(e) => error!("comparison of {} abandoned: {e}", component.id()),
                }
                debug!("comparison of {} took {:?}", component.id(), start.elapsed());
            }
            None => debug!("{} has no reference, comparison skipped", component.id()),
        }

        self.check_api_usage(ctx, workspace, None);
        pass
    }

    fn build_delta(
        &self,
        ctx: &mut PassContext<'_>,
        workspace: &Profile,
        delta: &ResourceDelta,
        outcome: &mut BuildOutcome,
    ) -> PassAccumulator {
        let component = ctx.component;
        let mut types = IndexSet::new();
        for path in delta.class_files() {
            match self.class_reader.read_type_name(path) {
                Ok(name) => {
                    types.insert(name);
                }
                Err(e) => warn!("skipping {}: {e}", path.display()),
            }
        }
        if types.is_empty() {
            debug!("no type to check in {}", component.id());
            return PassAccumulator::default();
        }

        for type_name in &types {
            let mut selector = ProblemSelector::component(component.id()).with_categories(
                ProblemCategory::Compatibility | ProblemCategory::Usage | ProblemCategory::SinceTag,
            );
            ctx.sink.clear(&selector.clone().with_type_name(type_name.as_str()));
            if let Some(resource) = ctx.source_file(type_name) {
                selector = selector.with_resource(resource);
                ctx.sink.clear(&selector);
            }
        }

        let mut pass = PassAccumulator::default();
        if let Some(reference) = ctx.reference {
            outcome.compared_types = types.len();
            for (type_name, result) in self.compare_types(&types, reference, component) {
                match result {
                    Ok(Some(delta)) => pass = pass.merge(ctx.classify(&delta)),
                    Ok(None) => debug!("no delta for {type_name}"),
                    Err(e) => error!("comparison of {type_name} abandoned: {e}"),
                }
            }
            ctx.check_component_version(pass);
        } else {
            debug!("{} has no reference, comparison skipped", component.id());
        }

        self.check_api_usage(ctx, workspace, Some(&types));
        pass
    }

    /// Compare changed types, in parallel when enabled; results keep the input order.
    fn compare_types<'t>(
        &self,
        types: &'t IndexSet<String>,
        reference: &Component,
        component: &Component,
    ) -> Vec<(&'t str, Result<Option<Delta>>)> {
        let compare = |name: &'t String| {
            let start = Instant::now();
            let result = self.comparator.compare_type(name, reference, component);
            debug!("compared {name} in {:?}", start.elapsed());
            (name.as_str(), result)
        };
        if self.options.parallel_compare {
            let names: Vec<&'t String> = types.iter().collect();
            names.into_par_iter().map(compare).collect()
        } else {
            types.iter().map(compare).collect()
        }
    }

    fn check_api_usage(
        &self,
        ctx: &mut PassContext<'_>,
        workspace: &Profile,
        scope: Option<&IndexSet<String>>,
    ) {
        if !self.options.check_api_usage {
            return;
        }
        match self
            .analyzer
            .find_illegal_api_use(workspace, ctx.component, scope)
        {
            Ok(illegal) => {
                for use_site in &illegal {
                    ctx.report_illegal_use(use_site);
                }
            }
            Err(e) => error!("API use scan of {} failed: {e}", ctx.component.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MethodInfo, Severity, TypeKind, TypeStructure};
    use std::path::Path;

    struct NameFromPath;

    impl ClassArtifactReader for NameFromPath {
        fn read_type_name(&self, path: &Path) -> Result<String> {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            Ok(format!("a.{stem}"))
        }
    }

    fn service(methods: &[&str]) -> TypeStructure {
        methods.iter().fold(
            TypeStructure::new("a.Service", TypeKind::Class).with_source_file("src/a/Service.java"),
            |t, m| t.with_method(MethodInfo::new(*m, "()V")),
        )
    }

    fn profiles(reference: &str, current: &str, methods: &[&str]) -> (Profile, Profile) {
        let baseline = Profile::new("baseline")
            .with_component(Component::new("core", reference).with_type(service(&["run"])));
        let workspace = Profile::new("workspace")
            .with_component(Component::new("core", current).with_type(service(methods)));
        (baseline, workspace)
    }

    fn builder() -> ApiBuilder {
        ApiBuilder::new(Box::new(UniformPreferences(Severity::Warning)))
            .with_class_reader(Box::new(NameFromPath))
    }

    fn run(baseline: &Profile, workspace: &Profile, kind: &BuildKind, sink: &ProblemStore) -> BuildOutcome {
        let request = BuildRequest {
            workspace,
            baseline: Some(baseline),
            component_id: "core",
        };
        builder().build(&request, kind, sink).unwrap()
    }

    #[test]
    fn test_full_build_reports_breakage_and_version() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.1", &[]);
        let sink = ProblemStore::new();
        let outcome = run(&baseline, &workspace, &BuildKind::Full, &sink);
        assert!(outcome.breakage);
        assert_eq!(outcome.mode, BuildMode::Full);

        let version = sink.problems(
            &ProblemSelector::component("core").with_categories(ProblemCategory::VersionNumbering.into()),
        );
        assert_eq!(version.len(), 1);
        assert_eq!(version[0].suggested_version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_additions_need_minor_bump() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.0", &["run", "stop"]);
        let sink = ProblemStore::new();
        let outcome = run(&baseline, &workspace, &BuildKind::Full, &sink);
        assert!(outcome.additions && !outcome.breakage);
        let version = sink.problems(
            &ProblemSelector::component("core").with_categories(ProblemCategory::VersionNumbering.into()),
        );
        assert_eq!(version[0].suggested_version.as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_healthy_additions_clear_stale_version_problem() {
        let sink = ProblemStore::new();
        let (baseline, stale) = profiles("1.2.0", "1.2.0", &["run", "stop"]);
        run(&baseline, &stale, &BuildKind::Full, &sink);
        assert_eq!(sink.len(), 1);

        let (_, fixed) = profiles("1.2.0", "1.3.0", &["run", "stop"]);
        let delta = ResourceDelta::from_files(["bin/a/Service.class"]);
        run(&baseline, &fixed, &BuildKind::Incremental(Some(delta)), &sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unchanged_component_is_clean() {
        let (baseline, workspace) = profiles("1.0.0", "1.0.0", &["run"]);
        let sink = ProblemStore::new();
        let outcome = run(&baseline, &workspace, &BuildKind::Full, &sink);
        assert!(!outcome.breakage && !outcome.additions);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_incremental_without_delta_is_full() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.1", &[]);
        let sink = ProblemStore::new();
        let outcome = run(&baseline, &workspace, &BuildKind::Incremental(None), &sink);
        assert_eq!(outcome.mode, BuildMode::Full);
        assert!(outcome.breakage);
    }

    #[test]
    fn test_incremental_ignores_non_class_resources() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.1", &[]);
        let sink = ProblemStore::new();
        let delta = ResourceDelta::from_files(["src/a/Service.java"]);
        let outcome = run(&baseline, &workspace, &BuildKind::Incremental(Some(delta)), &sink);
        assert_eq!(outcome.mode, BuildMode::Incremental);
        assert_eq!(outcome.compared_types, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_parallel_compare_matches_sequential() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.1", &[]);
        let delta = ResourceDelta::from_files(["bin/a/Service.class", "bin/a/Service.class"]);
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: "core",
        };
        let sink = ProblemStore::new();
        let outcome = builder()
            .with_options(BuildOptions {
                parallel_compare: true,
                check_api_usage: true,
            })
            .build(&request, &BuildKind::Incremental(Some(delta)), &sink)
            .unwrap();
        assert_eq!(outcome.compared_types, 1);
        assert!(outcome.breakage);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_missing_component_is_an_error() {
        let (baseline, workspace) = profiles("1.0.0", "1.0.0", &[]);
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: "absent",
        };
        let err = builder()
            .build(&request, &BuildKind::Full, &ProblemStore::new())
            .unwrap_err();
        assert!(matches!(err, ApiToolsError::Resolve { .. }));
    }

    #[test]
    fn test_cancelled_before_start() {
        let (baseline, workspace) = profiles("1.2.0", "1.2.1", &[]);
        let flag = Arc::new(AtomicBool::new(true));
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: "core",
        };
        let sink = ProblemStore::new();
        let outcome = builder()
            .with_cancellation(flag)
            .build(&request, &BuildKind::Full, &sink)
            .unwrap();
        assert!(outcome.cancelled);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unparseable_versions_skip_the_version_policy() {
        for (reference, current) in [("1.2.0", "not-a-version"), ("not-a-version", "1.2.1")] {
            let (baseline, workspace) = profiles(reference, current, &[]);
            let sink = ProblemStore::new();
            let outcome = run(&baseline, &workspace, &BuildKind::Full, &sink);

            assert!(outcome.breakage, "{reference} -> {current}");
            let problems = sink.all();
            assert!(problems
                .iter()
                .any(|p| p.category == ProblemCategory::Compatibility));
            assert!(problems
                .iter()
                .all(|p| p.category != ProblemCategory::VersionNumbering));
        }
    }

    #[test]
    fn test_first_release_has_no_comparison_problems() {
        let workspace = Profile::new("workspace")
            .with_component(Component::new("core", "1.0.0").with_type(service(&["run", "stop"])));
        let request = BuildRequest {
            workspace: &workspace,
            baseline: None,
            component_id: "core",
        };
        let sink = ProblemStore::new();
        let outcome = builder().build(&request, &BuildKind::Full, &sink).unwrap();
        assert!(!outcome.has_reference);
        assert!(sink.is_empty());
    }
}

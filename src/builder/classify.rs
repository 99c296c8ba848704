//! Delta classification.
//!
//! Every leaf of a delta tree is either a compatible change, which may add
//! API and needs a since tag, or a breaking one, which becomes a
//! compatibility problem unless a filter accepts it. What the pass saw is
//! collected in a [`PassAccumulator`] that feeds the version policy.

use super::collaborators::{
    PreferenceResolver, ProblemSink, SourceLocator, INVALID_SINCE_TAG_VERSION,
    MALFORMED_SINCE_TAG, MANIFEST_RESOURCE, MISSING_SINCE_TAG,
};
use super::since_tag::{check_since_tag, SinceTagSeverities};
use crate::delta::{CompatibilityClassifier, Delta, DeltaFlag, DeltaKind};
use crate::model::{
    pack_problem_id, Component, MarkerKind, ProblemCategory, ProblemRecord, Version,
};
use tracing::{debug, warn};

/// What one build pass observed for a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassAccumulator {
    /// An incompatible, unfiltered delta was seen
    pub breakage: bool,
    /// A compatible addition was seen
    pub additions: bool,
}

impl PassAccumulator {
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            breakage: self.breakage || other.breakage,
            additions: self.additions || other.additions,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.breakage && !self.additions
    }
}

/// Everything a build pass over one component needs to report problems.
pub(crate) struct PassContext<'a> {
    pub(crate) component: &'a Component,
    pub(crate) reference: Option<&'a Component>,
    pub(crate) classifier: &'a dyn CompatibilityClassifier,
    pub(crate) preferences: &'a dyn PreferenceResolver,
    pub(crate) sink: &'a dyn ProblemSink,
    pub(crate) sources: &'a dyn SourceLocator,
    pub(crate) component_version: Option<Version>,
    since: SinceTagSeverities,
    emitted: usize,
}

impl<'a> PassContext<'a> {
    pub(crate) fn new(
        component: &'a Component,
        reference: Option<&'a Component>,
        classifier: &'a dyn CompatibilityClassifier,
        preferences: &'a dyn PreferenceResolver,
        sink: &'a dyn ProblemSink,
        sources: &'a dyn SourceLocator,
    ) -> Self {
        let unit = component.id();
        let since = SinceTagSeverities {
            missing: preferences.severity_for(MISSING_SINCE_TAG, unit),
            malformed: preferences.severity_for(MALFORMED_SINCE_TAG, unit),
            invalid: preferences.severity_for(INVALID_SINCE_TAG_VERSION, unit),
        };
        let component_version = match component.version() {
            Ok(version) => Some(version),
            Err(e) => {
                warn!("component {unit} has an unusable version: {e}");
                None
            }
        };
        Self {
            component,
            reference,
            classifier,
            preferences,
            sink,
            sources,
            component_version,
            since,
            emitted: 0,
        }
    }

    /// Number of problems handed to the sink so far.
    pub(crate) const fn emitted(&self) -> usize {
        self.emitted
    }

    /// Classify the leaves of `delta` in depth-first order.
    pub(crate) fn classify(&mut self, delta: &Delta) -> PassAccumulator {
        let mut pass = PassAccumulator::default();
        for leaf in delta.flatten() {
            self.process_delta(leaf, &mut pass);
        }
        pass
    }

    fn process_delta(&mut self, delta: &Delta, pass: &mut PassAccumulator) {
        debug!("{}: {}", delta.preference_key(), delta.message());

        if self.classifier.is_binary_compatible(delta) {
            if matches!(
                delta.kind,
                DeltaKind::Added | DeltaKind::AddedExtendRestriction | DeltaKind::AddedImplementRestriction
            ) {
                pass.additions = true;
                self.check_since_tag(delta);
            }
            return;
        }

        let problem = self.delta_problem(delta);
        if self.component.filter_store().is_filtered(&problem) {
            debug!("{} is filtered", delta.message());
            return;
        }
        pass.breakage = true;

        if self.breakage_allowed() {
            debug!("{} breaks API in a new major version", delta.message());
        } else {
            let severity = self
                .preferences
                .severity_for(&problem.preference_key, self.component.id());
            if !severity.is_ignore() {
                self.emit(problem.with_severity(severity));
            }
        }

        if matches!(
            delta.kind,
            DeltaKind::Added
                | DeltaKind::AddedNotExtendRestriction
                | DeltaKind::AddedNotImplementRestriction
                | DeltaKind::AddedNotExtendRestrictionStatic
        ) {
            self.check_since_tag(delta);
        }
    }

    /// Breakage is expected when the major version already went up.
    fn breakage_allowed(&self) -> bool {
        let (Some(current), Some(reference)) = (
            self.component_version.as_ref(),
            self.reference.and_then(|r| r.version().ok()),
        ) else {
            return false;
        };
        reference.major < current.major
    }

    fn delta_problem(&self, delta: &Delta) -> ProblemRecord {
        let type_name = delta.type_name.as_deref();
        let resource = type_name
            .and_then(|t| self.source_file(t))
            .unwrap_or_else(|| MANIFEST_RESOURCE.to_string());
        let range = type_name.and_then(|t| {
            self.sources
                .member_range(t, delta.member.as_deref())
                .or_else(|| self.sources.member_range(t, None))
        });

        let mut problem = ProblemRecord::new(
            pack_problem_id(
                ProblemCategory::Compatibility,
                delta.element.code(),
                delta.kind.code(),
                delta.flag_bits(),
            ),
            ProblemCategory::Compatibility,
            self.component.id(),
            delta.message(),
        )
        .with_resource(Some(resource))
        .with_arguments(delta.arguments())
        .with_preference_key(delta.preference_key())
        .with_range(range);
        if let Some(name) = type_name {
            problem = problem.with_type_name(name);
        }
        problem
    }

    fn check_since_tag(&mut self, delta: &Delta) {
        if !delta.adds_documented_element() || self.since.all_ignored() {
            return;
        }
        let (Some(type_name), Some(version)) =
            (delta.type_name.as_deref(), self.component_version.as_ref())
        else {
            return;
        };
        let member = if delta.flags.contains(DeltaFlag::Type) {
            None
        } else {
            delta.member.as_deref()
        };

        let Some(source_file) = self.source_file(type_name) else {
            debug!("no source for {type_name}, since tag not checked");
            return;
        };
        let Some(range) = self.sources.member_range(type_name, member) else {
            debug!("no declaration for {}, since tag not checked", label(type_name, member));
            return;
        };
        let comment = self.sources.comment_at(&source_file, range.offset);
        let Some(finding) = check_since_tag(&comment, version) else {
            return;
        };

        let marker = finding.marker();
        let severity = self.since.for_marker(marker);
        if severity.is_ignore() {
            return;
        }
        let subject = label(type_name, member);
        let mut arguments = vec![subject.clone()];
        arguments.extend(finding.value().map(ToString::to_string));

        let problem = ProblemRecord::new(
            pack_problem_id(ProblemCategory::SinceTag, delta.element.code(), 0, marker.code()),
            ProblemCategory::SinceTag,
            self.component.id(),
            finding.message(&subject, version),
        )
        .with_severity(severity)
        .with_resource(Some(source_file))
        .with_type_name(type_name)
        .with_arguments(arguments)
        .with_preference_key(since_tag_key(marker))
        .with_range(Some(range))
        .with_marker(marker)
        .with_suggested_version(finding.suggested());
        self.emit_unless_filtered(problem);
    }

    /// Source file of `type_name`, from the locator or the type structure.
    pub(crate) fn source_file(&self, type_name: &str) -> Option<String> {
        self.sources.source_file(type_name).or_else(|| {
            self.component
                .find_type(type_name)
                .and_then(|t| t.source_file.clone())
        })
    }

    pub(crate) fn emit(&mut self, problem: ProblemRecord) {
        self.sink.emit(problem);
        self.emitted += 1;
    }

    /// Emit `problem` unless a filter of the component accepts it.
    pub(crate) fn emit_unless_filtered(&mut self, problem: ProblemRecord) -> bool {
        if self.component.filter_store().is_filtered(&problem) {
            debug!("{} is filtered", problem.message);
            return false;
        }
        self.emit(problem);
        true
    }
}

fn since_tag_key(marker: MarkerKind) -> &'static str {
    match marker {
        MarkerKind::SinceTagMalformed => MALFORMED_SINCE_TAG,
        MarkerKind::SinceTagInvalid => INVALID_SINCE_TAG_VERSION,
        _ => MISSING_SINCE_TAG,
    }
}

fn label(type_name: &str, member: Option<&str>) -> String {
    match member {
        Some(member) => format!("{type_name}#{member}"),
        None => type_name.to_string(),
    }
}

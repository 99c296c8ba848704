use super::classify::{PassAccumulator, PassContext};
use super::collaborators::{INCOMPATIBLE_API_COMPONENT_VERSION, MANIFEST_RESOURCE};
use super::version_policy::{
    evaluate, merge_markers, should_clear_version_problems, violation_message, MarkerMerge,
    VersionVerdict,
};
use crate::delta::DeltaElement;
use crate::model::{
    pack_problem_id, MarkerKind, ProblemCategory, ProblemRecord, ProblemSelector, Restrictions,
    SourceRange,
};
use crate::reference::{ElementKind, IllegalApiUse};
use tracing::{debug, warn};

impl PassContext<'_> {
    fn version_selector(&self) -> ProblemSelector {
        ProblemSelector::component(self.component.id())
            .with_categories(ProblemCategory::VersionNumbering.into())
    }

    fn has_compatibility_problems(&self) -> bool {
        !self
            .sink
            .problems(
                &ProblemSelector::component(self.component.id())
                    .with_categories(ProblemCategory::Compatibility.into()),
            )
            .is_empty()
    }

    /// Evaluate the version policy for everything the pass observed.
    pub(crate) fn check_component_version(&mut self, pass: PassAccumulator) {
        let Some(reference) = self.reference else {
            return;
        };
        if pass.is_empty() {
            self.cleanup_version_problems();
            return;
        }
        let severity = self
            .preferences
            .severity_for(INCOMPATIBLE_API_COMPONENT_VERSION, self.component.id());
        if severity.is_ignore() {
            return;
        }

        let reference_version = match reference.version() {
            Ok(version) => version,
            Err(e) => {
                warn!("skipping version check of {}: {e}", self.component.id());
                return;
            }
        };
        let Some(component_version) = self.component_version.clone() else {
            warn!("skipping version check of {}: unusable version", self.component.id());
            return;
        };

        match evaluate(&reference_version, &component_version, pass) {
            None => {}
            Some(VersionVerdict::Satisfied) => self.cleanup_version_problems(),
            Some(VersionVerdict::Violation { marker, suggested }) => {
                let problem = ProblemRecord::new(
                    pack_problem_id(
                        ProblemCategory::VersionNumbering,
                        DeltaElement::Component.code(),
                        0,
                        marker.code(),
                    ),
                    ProblemCategory::VersionNumbering,
                    self.component.id(),
                    violation_message(marker, &reference_version, &component_version),
                )
                .with_severity(severity)
                .with_resource(Some(MANIFEST_RESOURCE.to_string()))
                .with_arguments(vec![reference_version.to_string(), component_version.to_string()])
                .with_preference_key(INCOMPATIBLE_API_COMPONENT_VERSION)
                .with_marker(marker)
                .with_suggested_version(suggested.to_string());
                self.record_version_problem(problem, marker);
            }
        }
    }

    fn record_version_problem(&mut self, problem: ProblemRecord, marker: MarkerKind) {
        if self.component.filter_store().is_filtered(&problem) {
            debug!("version problem of {} is filtered", self.component.id());
            return;
        }
        let selector = self.version_selector();
        let existing: Vec<MarkerKind> = self
            .sink
            .problems(&selector)
            .iter()
            .filter_map(|p| p.marker)
            .collect();

        match merge_markers(&existing, marker, self.has_compatibility_problems()) {
            MarkerMerge::Keep => {}
            MarkerMerge::Emit => self.emit(problem),
            MarkerMerge::Replace => {
                self.sink.clear(&selector);
                self.emit(problem);
            }
        }
    }

    /// Drop stale version problems unless compatibility problems still justify them.
    pub(crate) fn cleanup_version_problems(&self) {
        if should_clear_version_problems(self.has_compatibility_problems()) {
            self.sink.clear(&self.version_selector());
        }
    }

    /// Turn an illegal reference into a usage problem.
    pub(crate) fn report_illegal_use(&mut self, illegal: &IllegalApiUse) {
        let reference = &illegal.reference;
        let kind = reference.kind();
        let source_type = reference.source_type();
        let target = illegal.target_label();

        let resource = self
            .source_file(source_type)
            .or_else(|| illegal.source_file.clone())
            .unwrap_or_else(|| MANIFEST_RESOURCE.to_string());
        let range = self
            .sources
            .member_range(source_type, reference.source_member())
            .or_else(|| {
                reference.line().map(|line| SourceRange {
                    offset: 0,
                    length: 0,
                    line: Some(line),
                })
            });
        let element = match kind.element() {
            ElementKind::Type => 1,
            ElementKind::Field => 2,
            ElementKind::Method => 3,
        };

        let problem = ProblemRecord::new(
            pack_problem_id(
                ProblemCategory::Usage,
                element,
                kind.code(),
                Restrictions::only(illegal.restriction).as_u32(),
            ),
            ProblemCategory::Usage,
            self.component.id(),
            format!(
                "{source_type} illegally {kind} {target}, which {} declares {}",
                illegal.target_component,
                illegal.restriction.tag()
            ),
        )
        .with_resource(Some(resource))
        .with_type_name(source_type)
        .with_arguments(vec![target, source_type.to_string()])
        .with_preference_key(kind.preference_key())
        .with_range(range);

        if self.component.filter_store().is_filtered(&problem) {
            debug!("{} is filtered", problem.message);
            return;
        }
        let severity = self
            .preferences
            .severity_for(kind.preference_key(), self.component.id());
        if severity.is_ignore() {
            return;
        }
        self.emit(problem.with_severity(severity));
    }
}


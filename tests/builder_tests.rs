//! Build orchestration tests
//!
//! Incremental builds driven by real class files, parallel comparison,
//! builds without a baseline, and the version and since-tag rules.

use api_tools::{
    builder::{
        check_since_tag, evaluate_version_policy, ApiBuilder, BuildKind, BuildMode, BuildOptions,
        BuildRequest, DocComment, PassAccumulator, ProblemStore, ResourceDelta, SinceTagFinding,
        VersionVerdict,
    },
    config::SeverityConfig,
    model::{MarkerKind, ProblemCategory, Profile, Version},
    pipeline::{load_profile, run_builds},
};
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

const CORE: &str = "org.example.core";

fn profile(name: &str) -> Profile {
    let path = Path::new(FIXTURES_DIR).join("profiles").join(name);
    load_profile(&path, true).expect("Failed to load profile")
}

/// Smallest class file declaring `internal_name`.
fn class_bytes(internal_name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&52u16.to_be_bytes());
    // 1: Utf8 name, 2: Class -> 1
    out.extend_from_slice(&3u16.to_be_bytes());
    out.push(1);
    out.extend_from_slice(&u16::try_from(internal_name.len()).unwrap().to_be_bytes());
    out.extend_from_slice(internal_name.as_bytes());
    out.push(7);
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0x0021u16.to_be_bytes());
    out.extend_from_slice(&2u16.to_be_bytes());
    out
}

/// Write class files for `internal_names` under `dir/bin`.
fn write_classes(dir: &Path, internal_names: &[&str]) -> Vec<PathBuf> {
    internal_names
        .iter()
        .map(|name| {
            let path = dir.join("bin").join(format!("{name}.class"));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, class_bytes(name)).unwrap();
            path
        })
        .collect()
}

fn builder(parallel: bool) -> ApiBuilder {
    ApiBuilder::new(Box::new(SeverityConfig::default())).with_options(BuildOptions {
        parallel_compare: parallel,
        check_api_usage: true,
    })
}

fn incremental(files: Vec<PathBuf>) -> BuildKind {
    BuildKind::Incremental(Some(ResourceDelta::from_files(files)))
}

// ============================================================================
// Incremental Builds
// ============================================================================

mod incremental_tests {
    use super::*;

    #[test]
    fn test_incremental_build_compares_changed_type_only() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_classes(dir.path(), &["org/example/api/Widget"]);
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));

        let store = ProblemStore::new();
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };
        let outcome = builder(false).build(&request, &incremental(files), &store).unwrap();

        assert_eq!(outcome.mode, BuildMode::Incremental);
        assert_eq!(outcome.compared_types, 1);
        assert!(outcome.breakage);
        let problems = store.all();
        assert!(problems
            .iter()
            .any(|p| p.category == ProblemCategory::Compatibility
                && p.type_name.as_deref() == Some("org.example.api.Widget")));
        assert!(problems
            .iter()
            .any(|p| p.marker == Some(MarkerKind::MajorVersionChange)));
    }

    #[test]
    fn test_incremental_build_clears_stale_problems() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_classes(dir.path(), &["org/example/api/Widget"]);
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));
        let store = ProblemStore::new();

        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };
        builder(false).build(&request, &BuildKind::Full, &store).unwrap();
        assert!(!store.is_empty());

        // The change is reverted: the workspace matches the baseline again
        let reverted = BuildRequest {
            workspace: &baseline,
            baseline: Some(&baseline),
            component_id: CORE,
        };
        let outcome = builder(false).build(&reverted, &incremental(files), &store).unwrap();

        assert!(!outcome.breakage);
        assert!(store.is_empty(), "stale problems left: {:?}", store.all());
    }

    #[test]
    fn test_unreadable_class_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("Broken.class");
        std::fs::write(&bogus, b"not a class").unwrap();
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));

        let store = ProblemStore::new();
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };
        let outcome = builder(false)
            .build(&request, &incremental(vec![bogus]), &store)
            .unwrap();

        assert_eq!(outcome.compared_types, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_incremental_without_delta_runs_full_build() {
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));
        let store = ProblemStore::new();
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };
        let outcome = builder(false)
            .build(&request, &BuildKind::Incremental(None), &store)
            .unwrap();
        assert_eq!(outcome.mode, BuildMode::Full);
        assert!(outcome.breakage);
    }

    #[test]
    fn test_parallel_compare_keeps_results_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let names = [
            "org/example/api/Widget",
            "org/example/api/Listener",
            "org/example/internal/Helper",
        ];
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };

        let sequential = ProblemStore::new();
        let files = write_classes(dir.path(), &names);
        builder(false)
            .build(&request, &incremental(files.clone()), &sequential)
            .unwrap();

        let parallel = ProblemStore::new();
        let outcome = builder(true)
            .build(&request, &incremental(files), &parallel)
            .unwrap();

        assert_eq!(outcome.compared_types, 3);
        assert_eq!(sequential.all(), parallel.all());
    }
}

// ============================================================================
// Builds Without a Baseline
// ============================================================================

mod no_baseline_tests {
    use super::*;

    #[test]
    fn test_only_usage_is_checked_without_baseline() {
        let workspace = profile("workspace.json");
        let run = run_builds(&builder(false), &workspace, None, &[], &BuildKind::Full).unwrap();

        assert!(run.outcomes.iter().all(|o| !o.has_reference));
        assert!(run.outcomes.iter().all(|o| !o.breakage && !o.additions));
        assert_eq!(run.problems.len(), 2);
        assert!(run
            .problems
            .iter()
            .all(|p| p.category == ProblemCategory::Usage && p.component_id == "org.example.ui"));
    }

    #[test]
    fn test_usage_check_can_be_disabled() {
        let workspace = profile("workspace.json");
        let builder = ApiBuilder::new(Box::new(SeverityConfig::default())).with_options(BuildOptions {
            parallel_compare: false,
            check_api_usage: false,
        });
        let run = run_builds(&builder, &workspace, None, &[], &BuildKind::Full).unwrap();
        assert!(run.problems.is_empty());
    }
}

// ============================================================================
// Comparator Failures
// ============================================================================

mod comparator_failure_tests {
    use super::*;
    use api_tools::delta::{Comparator, Delta};
    use api_tools::error::{ApiToolsError, CompareErrorKind};
    use api_tools::model::Component;

    struct BrokenComparator;

    impl Comparator for BrokenComparator {
        fn compare_components(
            &self,
            _reference: &Component,
            current: &Component,
        ) -> api_tools::Result<Option<Delta>> {
            Err(ApiToolsError::compare(
                format!("comparing {}", current.id()),
                CompareErrorKind::TypeNotFound("org.example.api.Widget".to_string()),
            ))
        }

        fn compare_type(
            &self,
            type_name: &str,
            _reference: &Component,
            current: &Component,
        ) -> api_tools::Result<Option<Delta>> {
            Err(ApiToolsError::compare(
                format!("comparing {type_name} in {}", current.id()),
                CompareErrorKind::TypeNotFound(type_name.to_string()),
            ))
        }
    }

    fn broken_builder() -> ApiBuilder {
        builder(false).with_comparator(Box::new(BrokenComparator))
    }

    #[test]
    fn test_failed_comparison_still_scans_usage() {
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));
        let run = run_builds(&broken_builder(), &workspace, Some(&baseline), &[], &BuildKind::Full)
            .unwrap();

        assert!(run.outcomes.iter().all(|o| o.has_reference && !o.breakage && !o.additions));
        assert_eq!(run.problems.len(), 2);
        assert!(run
            .problems
            .iter()
            .all(|p| p.category == ProblemCategory::Usage && p.component_id == "org.example.ui"));
    }

    #[test]
    fn test_failed_incremental_comparison_emits_nothing_for_core() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_classes(dir.path(), &["org/example/api/Widget"]);
        let (baseline, workspace) = (profile("baseline.json"), profile("workspace.json"));
        let store = ProblemStore::new();
        let request = BuildRequest {
            workspace: &workspace,
            baseline: Some(&baseline),
            component_id: CORE,
        };

        let outcome = broken_builder()
            .build(&request, &incremental(files), &store)
            .unwrap();

        assert_eq!(outcome.compared_types, 1);
        assert!(!outcome.breakage);
        assert!(store.is_empty());
    }
}

// ============================================================================
// Version Policy
// ============================================================================

mod version_policy_tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    const BREAKAGE: PassAccumulator = PassAccumulator {
        breakage: true,
        additions: false,
    };
    const ADDITIONS: PassAccumulator = PassAccumulator {
        breakage: false,
        additions: true,
    };

    fn suggested(verdict: Option<VersionVerdict>) -> Option<(MarkerKind, String)> {
        match verdict {
            Some(VersionVerdict::Violation { marker, suggested }) => Some((marker, suggested.to_string())),
            _ => None,
        }
    }

    #[test]
    fn test_breakage_needs_major_increment() {
        let cases = [
            ("1.0.0", "1.0.0", Some("2.0.0")),
            ("1.0.0", "1.5.3", Some("2.0.0")),
            ("3.2.1", "3.9.0", Some("4.0.0")),
            ("1.0.0", "2.0.0", None),
        ];
        for (reference, component, expected) in cases {
            let verdict = evaluate_version_policy(&v(reference), &v(component), BREAKAGE);
            match expected {
                Some(version) => assert_eq!(
                    suggested(verdict),
                    Some((MarkerKind::MajorVersionChange, version.to_string())),
                    "{reference} -> {component}"
                ),
                None => assert_eq!(verdict, Some(VersionVerdict::Satisfied)),
            }
        }
    }

    #[test]
    fn test_additions_need_minor_increment() {
        let cases = [
            ("1.0.0", "1.0.0", Some("1.1.0")),
            ("1.4.0", "1.4.7", Some("1.5.0")),
            ("1.0.0", "1.1.0", None),
        ];
        for (reference, component, expected) in cases {
            let verdict = evaluate_version_policy(&v(reference), &v(component), ADDITIONS);
            match expected {
                Some(version) => assert_eq!(
                    suggested(verdict),
                    Some((MarkerKind::MinorVersionChange, version.to_string())),
                    "{reference} -> {component}"
                ),
                None => assert_eq!(verdict, Some(VersionVerdict::Satisfied)),
            }
        }
    }

    #[test]
    fn test_qualifier_is_kept_in_suggestion() {
        let verdict = evaluate_version_policy(&v("1.0.0"), &v("1.0.0.qualifier"), BREAKAGE);
        assert_eq!(
            suggested(verdict),
            Some((MarkerKind::MajorVersionChange, "2.0.0.qualifier".to_string()))
        );
    }

    #[test]
    fn test_quiet_pass_has_no_verdict() {
        let verdict = evaluate_version_policy(&v("1.0.0"), &v("1.0.0"), PassAccumulator::default());
        assert!(verdict.is_none());
    }
}

// ============================================================================
// Since Tags
// ============================================================================

mod since_tag_tests {
    use super::*;

    fn check(comment: &DocComment, component: &str) -> Option<SinceTagFinding> {
        check_since_tag(comment, &Version::parse(component).unwrap())
    }

    #[test]
    fn test_missing_tags() {
        for comment in [DocComment::Missing, DocComment::Plain] {
            assert_eq!(
                check(&comment, "3.4.2"),
                Some(SinceTagFinding::Missing {
                    suggested: "3.4".to_string()
                })
            );
        }
    }

    #[test]
    fn test_valid_tags() {
        for since in ["3.4", "3.0", "2", "org.example.core 3.4"] {
            assert_eq!(check(&DocComment::doc(since), "3.4.2"), None, "{since}");
        }
    }

    #[test]
    fn test_malformed_tags() {
        assert_eq!(
            check(&DocComment::doc("3.4.1"), "3.4.2"),
            Some(SinceTagFinding::Malformed {
                value: "3.4.1".to_string(),
                suggested: "3.4".to_string()
            })
        );
        assert_eq!(
            check(&DocComment::doc("soon"), "3.4.2").map(|f| f.marker()),
            Some(MarkerKind::SinceTagMalformed)
        );
    }

    #[test]
    fn test_newer_tag_is_invalid() {
        assert_eq!(
            check(&DocComment::doc("org.example.core 3.5"), "3.4.2"),
            Some(SinceTagFinding::Invalid {
                value: "org.example.core 3.5".to_string(),
                suggested: "org.example.core 3.4".to_string()
            })
        );
    }
}

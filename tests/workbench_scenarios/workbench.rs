//! Whole runs: planning, parallel execution and reporting.

use crate::common::*;
use std::sync::Arc;

fn demo_repository(demo: &DemoData) -> (Arc<InMemoryRepository>, DemoSummary) {
    let repo = Arc::new(InMemoryRepository::named("demo"));
    let summary = seed_demo(&repo, demo, at(0)).unwrap();
    (repo, summary)
}

/// Outcome counts per test case, in report order
fn case_outcomes(report: &WorkbenchReport) -> Vec<(String, TestCaseState, usize, usize, usize)> {
    report
        .test_cases
        .iter()
        .map(|t| {
            (
                t.id.to_string(),
                t.state,
                t.outcomes.passed,
                t.outcomes.failed,
                t.outcomes.not_supported,
            )
        })
        .collect()
}

#[test]
fn demo_repository_is_conformant_in_every_profile() {
    let (repo, seeded) = demo_repository(&DemoData::default());

    let report = workbench(repo, config()).run().unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.test_cases.len(), seeded.types.len() * 2);
    for profile in &report.profiles {
        assert_eq!(profile.status, ProfileStatus::Conformant, "{}", profile.profile);
    }
    assert!(report
        .test_cases
        .iter()
        .all(|t| t.state == TestCaseState::Completed && t.discovered == 5));

    // Entity types: 16 + 11 assertions each; relationship types: 11 + 11.
    let totals = report.totals();
    assert_eq!(totals.failed, 0);
    assert_eq!(totals.not_supported, 0);
    assert_eq!(totals.total, 3 * (16 + 11) + 3 * (11 + 11));
}

#[test]
fn parallel_run_matches_sequential_run() {
    let demo = DemoData {
        entity_types: 4,
        instances_per_type: 6,
        versions_per_instance: 2,
    };
    let (repo, _) = demo_repository(&demo);
    repo.inject(Fault::DuplicateSearchResults);
    repo.decline(Operation::GetRelationshipHistory);

    let sequential = workbench(repo.clone(), WorkbenchConfig { workers: 1, ..config() })
        .keep_assertions(true)
        .run()
        .unwrap();
    let parallel = workbench(repo, WorkbenchConfig { workers: 8, ..config() })
        .keep_assertions(true)
        .run()
        .unwrap();

    assert_eq!(case_outcomes(&sequential), case_outcomes(&parallel));
    let calls = |report: &WorkbenchReport| {
        report
            .assertions
            .iter()
            .map(|a| (a.test_case_id.clone(), a.operation, a.parameters.clone(), a.outcome))
            .collect::<Vec<_>>()
    };
    assert_eq!(calls(&sequential), calls(&parallel));
    assert_ne!(sequential.run_id, parallel.run_id);
}

#[test]
fn configured_types_replace_the_repository_catalog() {
    let (repo, seeded) = demo_repository(&DemoData::default());
    let chosen = seeded.types[1].clone();
    let cfg = WorkbenchConfig {
        types: vec![chosen.clone()],
        ..config()
    };

    let report = Workbench::for_connector(cfg, repo.clone(), repo)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.test_cases.len(), 2);
    assert!(report.test_cases.iter().all(|t| t.type_name == chosen.name));
    let not_exercised = report
        .profiles
        .iter()
        .filter(|p| p.status == ProfileStatus::NotExercised)
        .count();
    // Only the entity profiles of one type were touched.
    assert_eq!(not_exercised, 4);
}

#[test]
fn report_serializes_and_renders() {
    let (repo, _) = projects(3, 2);
    repo.decline(Operation::GetEntitySummary);

    let report = workbench(repo, config())
        .keep_assertions(true)
        .run()
        .unwrap();

    let json = report.to_json_pretty().unwrap();
    let parsed: WorkbenchReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.run_id, report.run_id);
    assert_eq!(parsed.totals(), report.totals());
    assert_eq!(parsed.assertions.len(), report.assertions.len());
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["repository"], json!("fixture-repository"));
    assert_eq!(value["settings"]["user_id"], json!(USER));
    assert!(value["assertions"].as_array().unwrap().len() > 0);

    let lean = report.clone().without_assertions();
    assert!(lean.assertions.is_empty());
    let lean_json: serde_json::Value =
        serde_json::from_str(&lean.to_json_pretty().unwrap()).unwrap();
    assert!(lean_json.get("assertions").is_none());

    let text = report.render_text();
    assert!(text.contains("fixture-repository"));
    assert!(text.contains("entity-retrieval"));
    assert!(text.contains("not exercised"));
    assert!(!text.contains("Run failures"));
}

#[test]
fn repeated_runs_into_one_recorder_accumulate() {
    let (repo, _) = projects(2, 1);
    let bench = workbench(repo, config());
    let recorder = AssertionRecorder::new();

    let first = bench.run_with(&recorder).unwrap();
    let after_first = recorder.len();
    let second = bench.run_with(&recorder).unwrap();

    assert_eq!(recorder.len(), after_first * 2);
    assert_eq!(second.totals().total, first.totals().total * 2);
}

#[test]
fn each_run_starts_from_an_empty_recorder() {
    let (repo, _) = projects(2, 1);
    let bench = workbench(repo, config());

    let first = bench.run().unwrap();
    let second = bench.run().unwrap();

    assert_eq!(first.totals(), second.totals());
    assert_ne!(first.run_id, second.run_id);
}

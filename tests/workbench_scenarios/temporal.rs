//! As-of reads and version histories.

use crate::common::*;
use proptest::prelude::*;
use std::sync::Arc;

#[test]
fn as_of_between_versions_reads_the_older_version() {
    let (repo, guids) = projects(1, 3);
    // Versions at 0, 10 and 20; read as of 15.
    let mut case = RetrievalTestCase::<Entities>::historical(project(), at(15));

    let (recorder, result) = run_case(&mut case, repo.clone(), config());

    result.unwrap();
    assert!(recorder
        .assertions()
        .iter()
        .all(|a| a.outcome == Outcome::Passed));
    let snapshot = repo
        .get_entity_detail(USER, &guids[0], Some(at(15)))
        .unwrap();
    assert_eq!(snapshot.version, 2);
    assert_eq!(snapshot.update_time, at(10));
}

#[test]
fn detail_ignoring_as_of_time_is_failed() {
    let (repo, _) = projects(3, 3);
    let connector: Arc<dyn RepositoryConnector> = Arc::new(IgnoresAsOf(repo));
    let mut case = RetrievalTestCase::<Entities>::historical(project(), at(15));

    let (recorder, result) = run_case(&mut case, connector, config());

    result.unwrap();
    let details = for_operation(&recorder, Operation::GetEntityDetail);
    assert_eq!(outcomes(&details), vec![Outcome::Failed; 3]);
    for assertion in &details {
        assert!(assertion.detail.as_deref().unwrap().contains("written at"));
    }
    // The history itself is fine.
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntityHistory)),
        vec![Outcome::Passed; 3]
    );
}

#[test]
fn instances_created_after_as_of_time_are_not_discovered() {
    let (repo, early) = projects(2, 1);
    // Created at 1_000 and 1_001, after the as-of time of 500.
    let late: Vec<Guid> = (0..2)
        .map(|i| {
            repo.create_entity(&project(), [("name", json!("late"))], at(1_000 + i))
                .unwrap()
        })
        .collect();
    let mut case = RetrievalTestCase::<Entities>::historical(project(), at(500));

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    assert_eq!(case.discovered(), early.len());
    for assertion in recorder.assertions() {
        assert_eq!(assertion.outcome, Outcome::Passed);
        for guid in &late {
            assert!(!assertion.parameters.contains(guid.as_str()));
        }
    }
}

#[test]
fn as_of_before_any_instance_discovers_nothing() {
    let (repo, _) = projects(3, 1);
    let mut case = RetrievalTestCase::<Entities>::historical(project(), Timestamp::from_secs(1));

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    assert_eq!(case.discovered(), 0);
    assert_eq!(recorder.len(), 1);
    assert_eq!(recorder.assertions()[0].outcome, Outcome::Passed);
}

#[test]
fn history_page_is_bounded_by_max_page_size() {
    let (repo, guids) = projects(2, 5);
    let cfg = WorkbenchConfig {
        max_page_size: 2,
        ..config()
    };
    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());

    let (recorder, result) = run_case(&mut case, repo.clone(), cfg);

    result.unwrap();
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntityHistory)),
        vec![Outcome::Passed; 2]
    );
    let page = repo
        .get_entity_history(USER, &guids[0], &HistoryRequest::full(2))
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].version, 5);
    assert!(history_is_backwards(&page));
}

#[test]
fn backwards_history_lists_every_version_most_recent_first() {
    let (repo, assignments) = project_graph(2);
    let history = repo
        .get_relationship_history(USER, &assignments[0], &HistoryRequest::full(100))
        .unwrap();

    let versions: Vec<u64> = history.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![2, 1]);
    assert_eq!(history[0].properties["role"], json!("lead"));
    assert_eq!(history[1].properties["role"], json!("owner"));
}

#[test]
fn workbench_as_of_time_follows_the_configured_lookback() {
    let (repo, _) = projects(2, 3);
    let cfg = WorkbenchConfig {
        history_lookback_ms: 60_000,
        ..config()
    };
    let bench = workbench(repo, cfg);

    assert_eq!(bench.context().as_of_time(), Timestamp::from_secs(BASE_SECS + 100_000 - 60));
    let report = bench.run().unwrap();
    assert_eq!(report.settings.as_of_time, bench.context().as_of_time());
    assert!(!report.has_failures());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn as_of_reads_are_consistent_at_any_point_in_time(
        instances in 0usize..4,
        versions in 1u64..6,
        offset in 0u64..80,
    ) {
        let (repo, _) = projects(instances, versions);
        let mut case = RetrievalTestCase::<Entities>::historical(project(), at(offset));

        let (recorder, result) = run_case(&mut case, repo, config());

        prop_assert!(result.is_ok());
        prop_assert_eq!(case.discovered(), instances.min(offset as usize + 1));
        prop_assert_eq!(count(&recorder.assertions(), Outcome::Failed), 0);
        prop_assert_eq!(recorder.len(), 1 + 2 * case.discovered());
    }
}

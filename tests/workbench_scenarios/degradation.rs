//! Connectors that implement only part of the contract.

use crate::common::*;
use std::sync::Arc;

#[test]
fn unsupported_history_is_recorded_once_per_instance_but_called_once() {
    let (repo, _) = projects(5, 2);
    repo.decline(Operation::GetEntityHistory);
    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    assert_eq!(case.state(), TestCaseState::Completed);

    let histories = for_operation(&recorder, Operation::GetEntityHistory);
    assert_eq!(outcomes(&histories), vec![Outcome::NotSupported; 5]);
    assert_eq!(histories.iter().filter(|a| !a.skipped).count(), 1);
    assert!(histories[1..].iter().all(|a| a.skipped && a.elapsed_micros == 0));

    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::FindEntities)),
        vec![Outcome::Passed]
    );
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntityDetail)),
        vec![Outcome::Passed; 5]
    );
}

#[test]
fn skipped_assertions_do_not_count_towards_latency() {
    let (repo, _) = projects(4, 1);
    repo.decline(Operation::GetEntityHistory);
    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());

    let (recorder, result) = run_case(&mut case, repo, config());
    result.unwrap();

    let histories = for_operation(&recorder, Operation::GetEntityHistory);
    let summary = OutcomeSummary::from_assertions(&histories);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.not_supported, 4);
    assert_eq!(summary.latency.unwrap().samples, 1);
}

#[test]
fn connector_with_only_search_and_detail_runs_on_trait_defaults() {
    let (repo, _) = projects(3, 2);
    let connector: Arc<dyn RepositoryConnector> = Arc::new(SearchAndDetailOnly(repo));

    let mut current = RetrievalTestCase::<Entities>::current(project());
    let (recorder, result) = run_case(&mut current, connector.clone(), config());
    result.unwrap();
    assert_eq!(current.state(), TestCaseState::Completed);
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::EntityExists)),
        vec![Outcome::NotSupported; 3]
    );
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntitySummary)),
        vec![Outcome::NotSupported; 3]
    );
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntityDetail)),
        vec![Outcome::Passed; 3]
    );
    assert_eq!(
        ProfileStatus::classify(&recorder.summary(ProfileId::EntityRetrieval)),
        ProfileStatus::Conformant
    );

    let mut historical = RetrievalTestCase::<Entities>::historical(project(), run_start());
    let (recorder, result) = run_case(&mut historical, connector, config());
    result.unwrap();
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::GetEntityHistory)),
        vec![Outcome::NotSupported; 3]
    );
}

#[test]
fn declined_as_of_reads_end_the_historical_case_after_discovery() {
    let (repo, _) = projects(3, 2);
    repo.decline_as_of();

    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());
    let (recorder, result) = run_case(&mut case, repo.clone(), config());

    result.unwrap();
    assert_eq!(case.state(), TestCaseState::Completed);
    assert_eq!(case.discovered(), 0);
    assert_eq!(outcomes(&recorder.assertions()), vec![Outcome::NotSupported]);
    assert_eq!(
        ProfileStatus::classify(&recorder.summary(ProfileId::EntityHistorySearch)),
        ProfileStatus::NotSupported
    );

    // Current reads are unaffected.
    let mut current = RetrievalTestCase::<Entities>::current(project());
    let (recorder, result) = run_case(&mut current, repo, config());
    result.unwrap();
    assert!(recorder
        .assertions()
        .iter()
        .all(|a| a.outcome == Outcome::Passed));
}

#[test]
fn declined_relationship_history_leaves_relationship_profiles_split() {
    let (repo, _) = project_graph(3);
    repo.decline(Operation::GetRelationshipHistory);
    let bench = workbench(repo, config());

    let report = bench.run().unwrap();

    assert!(report.failures.is_empty());
    assert!(!report.has_failures());
    let status = |profile: ProfileId| {
        report
            .profiles
            .iter()
            .find(|p| p.profile == profile)
            .map(|p| p.status)
            .unwrap()
    };
    assert_eq!(status(ProfileId::RelationshipSearch), ProfileStatus::Conformant);
    assert_eq!(status(ProfileId::RelationshipRetrieval), ProfileStatus::Conformant);
    // Detail as-of reads pass, histories do not; both feed the same profile.
    assert_eq!(status(ProfileId::RelationshipHistoryRetrieval), ProfileStatus::Conformant);
    let summary = &report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::RelationshipHistoryRetrieval)
        .unwrap()
        .summary;
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.not_supported, 3);
    assert_eq!(status(ProfileId::EntityHistoryRetrieval), ProfileStatus::Conformant);
}

#[test]
fn unsupported_discovery_in_a_workbench_run_marks_search_not_supported() {
    let (repo, _) = projects(2, 1);
    repo.decline(Operation::FindEntities);
    let report = workbench(repo, config()).run().unwrap();

    assert!(!report.has_failures());
    let search = report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::EntitySearch)
        .unwrap();
    assert_eq!(search.status, ProfileStatus::NotSupported);
    let retrieval = report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::EntityRetrieval)
        .unwrap();
    assert_eq!(retrieval.status, ProfileStatus::NotExercised);
}

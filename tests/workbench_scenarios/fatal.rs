//! Genuine errors abort one test case and nothing else.

use crate::common::*;
use std::sync::Arc;
use std::time::Duration;

fn state_of(report: &WorkbenchReport, id: &str) -> TestCaseState {
    report
        .test_cases
        .iter()
        .find(|t| t.id.as_str() == id)
        .map(|t| t.state)
        .unwrap()
}

#[test]
fn transient_error_aborts_only_the_cases_that_hit_it() {
    let (repo, _) = project_graph(3);
    let broken = repo
        .find_entities(USER, &FindRequest::of_type(project().guid, 1))
        .unwrap()[0]
        .guid
        .clone();
    repo.inject(Fault::Fail {
        operation: Operation::GetEntityDetail,
        guid: Some(broken.clone()),
        error: ConnectorError::transient("connection reset by peer"),
    });

    let report = workbench(repo, config())
        .keep_assertions(true)
        .run()
        .unwrap();

    assert!(report.has_failures());
    assert_eq!(report.failures.len(), 2);
    for failure in &report.failures {
        assert_eq!(failure.type_name, "Project");
        assert_eq!(failure.operation.as_deref(), Some("get_entity_detail"));
        assert!(failure.message.contains("Transient"));
        assert!(failure.message.contains(broken.as_str()));
    }
    assert_eq!(state_of(&report, "entity-retrieval-Project"), TestCaseState::Aborted);
    assert_eq!(state_of(&report, "entity-history-retrieval-Project"), TestCaseState::Aborted);
    assert_eq!(state_of(&report, "entity-retrieval-Person"), TestCaseState::Completed);
    assert_eq!(
        state_of(&report, "relationship-history-retrieval-ProjectAssignment"),
        TestCaseState::Completed
    );

    // The aborting call itself left no assertion behind.
    assert!(report.assertions.iter().all(|a| {
        !(a.operation == Operation::GetEntityDetail && a.parameters.contains(broken.as_str()))
    }));
    assert_eq!(report.totals().failed, 0);
}

#[test]
fn assertions_made_before_the_abort_are_kept() {
    let (repo, _) = projects(3, 1);
    repo.inject(Fault::Fail {
        operation: Operation::GetEntityDetail,
        guid: None,
        error: ConnectorError::transient("backend down"),
    });
    let mut case = RetrievalTestCase::<Entities>::current(project());

    let (recorder, result) = run_case(&mut case, repo, config());

    let err = result.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::GetEntityDetail));
    assert_eq!(case.state(), TestCaseState::Aborted);
    // discover + 3 probes + 3 summaries, then the first detail read aborts.
    assert_eq!(recorder.len(), 7);
    assert!(for_operation(&recorder, Operation::GetEntityDetail).is_empty());
}

#[test]
fn invalid_parameter_from_discovery_is_fatal() {
    let (repo, _) = project_graph(2);
    repo.inject(Fault::Fail {
        operation: Operation::FindRelationships,
        guid: None,
        error: ConnectorError::invalid_parameter("typeGUID rejected"),
    });

    let report = workbench(repo, config()).run().unwrap();

    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| f.operation.as_deref() == Some("find_relationships")
            && f.message.contains("InvalidParameter")));
    let search = report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::RelationshipSearch)
        .unwrap();
    assert_eq!(search.status, ProfileStatus::NotExercised);
}

#[test]
fn slow_call_past_the_timeout_aborts_with_timed_out() {
    let (repo, _) = projects(2, 2);
    repo.inject(Fault::Delay {
        operation: Operation::GetEntityHistory,
        delay: Duration::from_millis(300),
    });
    let cfg = WorkbenchConfig {
        call_timeout_ms: Some(20),
        ..config()
    };

    let report = workbench(repo, cfg).run().unwrap();

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.test_case_id.as_str(), "entity-history-retrieval-Project");
    assert_eq!(failure.operation.as_deref(), Some("get_entity_history"));
    assert!(failure.message.contains("timed out after 20ms"));
    assert_eq!(state_of(&report, "entity-retrieval-Project"), TestCaseState::Completed);
    assert!(report.has_failures());
}

#[test]
fn profile_keeps_its_verdict_but_counts_the_aborted_case() {
    let (repo, _) = projects(3, 2);
    repo.inject(Fault::Fail {
        operation: Operation::GetEntityHistory,
        guid: None,
        error: ConnectorError::transient("history store offline"),
    });

    let report = workbench(repo, config()).run().unwrap();

    let history = report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::EntityHistoryRetrieval)
        .unwrap();
    // The as-of detail reads passed before the first history read aborted.
    assert_eq!(history.status, ProfileStatus::Conformant);
    assert_eq!(history.summary.passed, 3);
    assert_eq!(history.aborted_test_cases, 1);
    let retrieval = report
        .profiles
        .iter()
        .find(|p| p.profile == ProfileId::EntityRetrieval)
        .unwrap();
    assert_eq!(retrieval.aborted_test_cases, 0);

    assert!(report.has_failures());
    assert!(report.render_text().contains("conformant (1 aborted)"));
}

struct UnreachableCatalog;

impl TypeCatalog for UnreachableCatalog {
    fn type_descriptors(&self) -> ConnectorResult<Vec<TypeDescriptor>> {
        Err(ConnectorError::transient("metadata service unreachable"))
    }
}

#[test]
fn unreadable_catalog_fails_the_whole_run() {
    let (repo, _) = projects(1, 1);
    let ctx = WorkContext::starting_at(config(), repo, run_start()).unwrap();
    let bench = Workbench::new(ctx, Arc::new(UnreachableCatalog));

    let err = bench.run().unwrap_err();

    assert!(matches!(err, HarnessError::Catalog(_)));
    assert!(err.to_string().contains("metadata service unreachable"));
}

#[test]
fn empty_catalog_is_an_empty_run() {
    let (repo, _) = projects(1, 1);
    let ctx = WorkContext::starting_at(config(), repo, run_start()).unwrap();
    let bench = Workbench::new(ctx, Arc::new(StaticTypeCatalog::new(Vec::new())));

    let report = bench.run().unwrap();

    assert!(report.test_cases.is_empty());
    assert!(!report.has_failures());
    assert!(report
        .profiles
        .iter()
        .all(|p| p.status == ProfileStatus::NotExercised));
}

//! Results that contradict earlier steps are FAILED, never fatal.

use crate::common::*;
use std::sync::Arc;

#[test]
fn detail_missing_for_a_discovered_instance_fails_only_that_instance() {
    let (repo, guids) = projects(3, 1);
    let hidden = guids[1].clone();
    repo.inject(Fault::HideDetail(hidden.clone()));
    let mut case = RetrievalTestCase::<Entities>::current(project());

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    assert_eq!(case.state(), TestCaseState::Completed);
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::EntityExists)),
        vec![Outcome::Passed; 3]
    );

    let details = for_operation(&recorder, Operation::GetEntityDetail);
    assert_eq!(count(&details, Outcome::Failed), 1);
    assert_eq!(count(&details, Outcome::Passed), 2);
    let failed = details
        .iter()
        .find(|a| a.outcome == Outcome::Failed)
        .unwrap();
    assert!(failed.parameters.contains(hidden.as_str()));
    assert!(failed.detail.as_deref().unwrap().contains("absent"));
}

#[test]
fn hidden_detail_fails_the_as_of_read_but_not_the_history() {
    let (repo, guids) = projects(3, 2);
    repo.inject(Fault::HideDetail(guids[0].clone()));
    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    let details = for_operation(&recorder, Operation::GetEntityDetail);
    assert_eq!(count(&details, Outcome::Failed), 1);
    let histories = for_operation(&recorder, Operation::GetEntityHistory);
    assert_eq!(outcomes(&histories), vec![Outcome::Passed; 3]);

    let summary = recorder.summary(ProfileId::EntityHistoryRetrieval);
    assert_eq!(summary.passed, 5);
    assert_eq!(summary.failed, 1);
}

#[test]
fn detail_answering_for_another_instance_is_failed() {
    let (repo, _) = projects(2, 1);
    let connector: Arc<dyn RepositoryConnector> = Arc::new(WrongInstance(repo));
    let mut case = RetrievalTestCase::<Entities>::current(project());

    let (recorder, result) = run_case(&mut case, connector, config());

    result.unwrap();
    let details = for_operation(&recorder, Operation::GetEntityDetail);
    assert_eq!(outcomes(&details), vec![Outcome::Failed; 2]);
    for assertion in &details {
        assert!(assertion.detail.as_deref().unwrap().contains("-copy"));
    }
    // Probes were answered correctly.
    assert_eq!(
        outcomes(&for_operation(&recorder, Operation::EntityExists)),
        vec![Outcome::Passed; 2]
    );
}

#[test]
fn deleted_instance_is_only_visible_before_the_delete() {
    let (repo, guids) = projects(2, 1);
    // Deleted after the as-of time.
    repo.delete_instance(&guids[0], at(500)).unwrap();
    let mut case = RetrievalTestCase::<Entities>::historical(project(), at(100));

    let (recorder, result) = run_case(&mut case, repo.clone(), config());
    result.unwrap();
    assert_eq!(case.discovered(), 2);
    // As-of reads still see the instance, and its history includes the delete.
    assert_eq!(count(&recorder.assertions(), Outcome::Failed), 0);

    let mut current = RetrievalTestCase::<Entities>::current(project());
    let (recorder, result) = run_case(&mut current, repo, config());
    result.unwrap();
    assert_eq!(current.discovered(), 1);
    assert_eq!(count(&recorder.assertions(), Outcome::Failed), 0);
}

#[test]
fn failure_detail_is_recorded_for_forward_history() {
    let (repo, guids) = projects(2, 3);
    repo.inject(Fault::ForwardHistory(guids[1].clone()));
    let mut case = RetrievalTestCase::<Entities>::historical(project(), run_start());

    let (recorder, result) = run_case(&mut case, repo, config());

    result.unwrap();
    let histories = for_operation(&recorder, Operation::GetEntityHistory);
    assert_eq!(count(&histories, Outcome::Failed), 1);
    let failed = histories
        .iter()
        .find(|a| a.outcome == Outcome::Failed)
        .unwrap();
    assert!(failed.parameters.contains(guids[1].as_str()));
    assert!(failed.detail.is_some());
}

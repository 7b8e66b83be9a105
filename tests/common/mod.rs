//! Shared fixtures for the workbench integration suites.
//!
//! Import via `mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Arc;

pub use repoconform::*;
pub use serde_json::json;

/// Calling identity used by direct connector calls in tests
pub const USER: &str = "integration-tests";

/// Seconds since epoch at which fixture data starts
pub const BASE_SECS: u64 = 1_000_000;

/// Fixture versions are written this many seconds apart
pub const VERSION_SPACING_SECS: u64 = 10;

pub fn at(offset_secs: u64) -> Timestamp {
    Timestamp::from_secs(BASE_SECS + offset_secs)
}

/// Start time of fixture runs, well after all fixture data
pub fn run_start() -> Timestamp {
    at(100_000)
}

pub fn project() -> TypeDescriptor {
    TypeDescriptor::entity("0799569f-0c16-4a1f-86d9-e2e89568f7fd", "Project")
}

pub fn person() -> TypeDescriptor {
    TypeDescriptor::entity("ac406bf8-e53e-49f1-9088-2af28bbbd285", "Person")
}

pub fn assignment() -> TypeDescriptor {
    TypeDescriptor::relationship("2d0a7d7e-7ac0-4a1a-a3b5-2a1f1a2e3b4c", "ProjectAssignment")
}

// ============================================================================
// Repository fixtures
// ============================================================================

/// Repository holding `count` projects with `versions` versions each.
///
/// Project `i` is created at `at(i)`; version `v` is written at
/// `at(i + (v - 1) * VERSION_SPACING_SECS)`.
pub fn projects(count: usize, versions: u64) -> (Arc<InMemoryRepository>, Vec<Guid>) {
    let repo = Arc::new(InMemoryRepository::named("fixture-repository"));
    repo.register_type(project());
    let guids = add_projects(&repo, count, versions);
    (repo, guids)
}

pub fn add_projects(repo: &InMemoryRepository, count: usize, versions: u64) -> Vec<Guid> {
    (0..count as u64)
        .map(|i| {
            let guid = repo
                .create_entity(&project(), [("name", json!(format!("project-{}", i)))], at(i))
                .unwrap();
            for v in 2..=versions {
                repo.update_instance(
                    &guid,
                    [("revision", json!(v))],
                    at(i + (v - 1) * VERSION_SPACING_SECS),
                )
                .unwrap();
            }
            guid
        })
        .collect()
}

/// Projects, people, and one assignment per project
pub fn project_graph(count: usize) -> (Arc<InMemoryRepository>, Vec<Guid>) {
    let (repo, projects) = projects(count, 2);
    repo.register_type(person());
    repo.register_type(assignment());
    let mut assignments = Vec::new();
    for (i, project_guid) in projects.iter().enumerate() {
        let person_guid = repo
            .create_entity(&person(), [("name", json!(format!("person-{}", i)))], at(i as u64))
            .unwrap();
        let rel = repo
            .create_relationship(
                &assignment(),
                project_guid.clone(),
                person_guid,
                [("role", json!("owner"))],
                at(i as u64 + 1),
            )
            .unwrap();
        repo.update_instance(&rel, [("role", json!("lead"))], at(i as u64 + 50))
            .unwrap();
        assignments.push(rel);
    }
    (repo, assignments)
}

// ============================================================================
// Running test cases
// ============================================================================

pub fn config() -> WorkbenchConfig {
    WorkbenchConfig {
        user_id: USER.to_string(),
        ..WorkbenchConfig::default()
    }
}

pub fn context(repo: Arc<dyn RepositoryConnector>, config: WorkbenchConfig) -> WorkContext {
    WorkContext::starting_at(config, repo, run_start()).unwrap()
}

/// Run one test case to completion and hand back everything it left behind.
pub fn run_case(
    case: &mut dyn TestCase,
    repo: Arc<dyn RepositoryConnector>,
    config: WorkbenchConfig,
) -> (AssertionRecorder, HarnessResult<()>) {
    let ctx = context(repo, config);
    let recorder = AssertionRecorder::new();
    let result = case.run(&ctx, &recorder);
    (recorder, result)
}

pub fn for_operation(recorder: &AssertionRecorder, operation: Operation) -> Vec<Assertion> {
    recorder
        .assertions()
        .into_iter()
        .filter(|a| a.operation == operation)
        .collect()
}

pub fn outcomes(assertions: &[Assertion]) -> Vec<Outcome> {
    assertions.iter().map(|a| a.outcome).collect()
}

pub fn count(assertions: &[Assertion], outcome: Outcome) -> usize {
    assertions.iter().filter(|a| a.outcome == outcome).count()
}

pub fn workbench(
    repo: Arc<InMemoryRepository>,
    config: WorkbenchConfig,
) -> Workbench {
    let catalog = repo.clone();
    let ctx = WorkContext::starting_at(config, repo, run_start()).unwrap();
    Workbench::new(ctx, catalog)
}

// ============================================================================
// Connectors with deliberate contract violations
// ============================================================================

/// Connector that only implements search and detail reads
pub struct SearchAndDetailOnly(pub Arc<InMemoryRepository>);

impl RepositoryConnector for SearchAndDetailOnly {
    fn repository_name(&self) -> &str {
        "search-and-detail-only"
    }

    fn find_entities(
        &self,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.0.find_entities(user_id, request)
    }

    fn get_entity_detail(
        &self,
        user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        self.0.get_entity_detail(user_id, guid, as_of_time)
    }
}

/// Connector whose detail reads ignore the as-of time
pub struct IgnoresAsOf(pub Arc<InMemoryRepository>);

impl RepositoryConnector for IgnoresAsOf {
    fn repository_name(&self) -> &str {
        "ignores-as-of"
    }

    fn find_entities(
        &self,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.0.find_entities(user_id, request)
    }

    fn get_entity_detail(
        &self,
        user_id: &str,
        guid: &Guid,
        _as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        self.0.get_entity_detail(user_id, guid, None)
    }

    fn get_entity_history(
        &self,
        user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.0.get_entity_history(user_id, guid, request)
    }
}

/// Connector whose detail reads answer with a different instance
pub struct WrongInstance(pub Arc<InMemoryRepository>);

impl RepositoryConnector for WrongInstance {
    fn repository_name(&self) -> &str {
        "wrong-instance"
    }

    fn find_entities(
        &self,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.0.find_entities(user_id, request)
    }

    fn entity_exists(
        &self,
        user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        self.0.entity_exists(user_id, guid)
    }

    fn get_entity_detail(
        &self,
        user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        let mut snapshot = self.0.get_entity_detail(user_id, guid, as_of_time)?;
        snapshot.guid = Guid::from(format!("{}-copy", guid));
        Ok(snapshot)
    }
}

//! repoconform - conformance and performance workbench for repository connectors
//!
//! A repository connector exposes versioned metadata instances (entities and
//! the relationships between them) through a small contract: search by type,
//! existence probes, detail reads (optionally as of a point in time) and
//! version histories. The workbench drives any connector through that
//! contract, records one assertion per call and rolls the results up into
//! capability profiles.
//!
//! # Quick Start
//!
//! ```
//! use repoconform::{seed_demo, DemoData, InMemoryRepository, Timestamp, Workbench, WorkbenchConfig};
//! use std::sync::Arc;
//!
//! let repo = Arc::new(InMemoryRepository::new());
//! seed_demo(&repo, &DemoData::default(), Timestamp::from_secs(1_000)).unwrap();
//!
//! let report = Workbench::for_connector(WorkbenchConfig::default(), repo.clone(), repo)
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! assert!(!report.has_failures());
//! ```
//!
//! # Crates
//!
//! - `conform-core`: the connector contract ([`RepositoryConnector`], snapshots, errors)
//! - `conform-harness`: test cases, recorder, profiles, [`Workbench`]
//! - `conform-memory`: [`InMemoryRepository`], the reference connector

pub use conform_core::{
    history_is_backwards, ConnectorError, ConnectorResult, FindRequest, Guid, HistoryOrder,
    HistoryRequest, InstanceSnapshot, InstanceStatus, Operation, RepositoryConnector,
    StaticTypeCatalog, Timestamp, TypeCatalog, TypeCategory, TypeDescriptor,
};
pub use conform_harness::{
    Assertion, AssertionRecorder, CallContext, Entities, HarnessError, HarnessResult,
    InstanceFamily, LatencyStats, Outcome, OutcomeSummary, ProfileAggregator, ProfileId,
    ProfileReport, ProfileStatus, Relationships, RetrievalMode, RetrievalTestCase, RunFailure,
    RunSettings, TestCase, TestCaseId, TestCaseState, TestCaseSummary, WorkContext, Workbench,
    WorkbenchConfig, WorkbenchReport, CONFIG_FILE_NAME,
};
pub use conform_memory::{
    seed_demo, Capabilities, DemoData, DemoSummary, Fault, FaultPlan, InMemoryRepository,
    VersionChain, DEFAULT_REPOSITORY_NAME,
};

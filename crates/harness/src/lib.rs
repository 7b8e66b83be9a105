//! Conformance and performance workbench for repository connectors
//!
//! The workbench drives a black-box [`RepositoryConnector`] through a fixed
//! protocol per type (discover, verify existence, read snapshots, read
//! history), records one [`Assertion`] per contract call, and rolls the
//! assertions up into capability profiles.
//!
//! # Layers
//!
//! - [`WorkContext`]: read-only run state (caller identity, limits, connector)
//! - [`AssertionRecorder`]: append-only, thread-safe outcome sink
//! - [`RetrievalTestCase`]: one type, one variant, one sequential protocol
//! - [`ProfileAggregator`]: per-profile counts and latency
//! - [`Workbench`]: plans, runs (in parallel) and reports
//!
//! [`RepositoryConnector`]: conform_core::RepositoryConnector

#![warn(clippy::all)]

pub mod assertion;
pub mod config;
pub mod context;
pub mod error;
pub mod profile;
pub mod recorder;
pub mod report;
pub mod testcase;
pub mod workbench;

pub use assertion::{Assertion, Outcome, ProfileId, TestCaseId};
pub use config::{WorkbenchConfig, CONFIG_FILE_NAME};
pub use context::WorkContext;
pub use error::{CallContext, HarnessError, HarnessResult};
pub use profile::{ProfileAggregator, ProfileReport, ProfileStatus};
pub use recorder::{AssertionRecorder, LatencyStats, OutcomeSummary, RunFailure};
pub use report::{RunSettings, WorkbenchReport};
pub use testcase::{
    Entities, InstanceFamily, Relationships, RetrievalMode, RetrievalTestCase, TestCase,
    TestCaseState, TestCaseSummary,
};
pub use workbench::Workbench;

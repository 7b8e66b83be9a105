//! Test cases
//!
//! A test case validates one type with one variant of the retrieval
//! protocol. Its steps run one after another because each step consumes the
//! identities the discovery step produced. Every contract call yields one
//! assertion; only fatal errors leave the test case through `run`.

mod family;
mod invoke;
mod retrieval;

pub use family::{Entities, InstanceFamily, Relationships};
pub use retrieval::{RetrievalMode, RetrievalTestCase};

use conform_core::{TypeCategory, TypeDescriptor};
use serde::{Deserialize, Serialize};

use crate::assertion::{ProfileId, TestCaseId};
use crate::context::WorkContext;
use crate::error::HarnessResult;
use crate::recorder::{AssertionRecorder, OutcomeSummary};

/// Lifecycle of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseState {
    /// Built, not yet run
    Created,
    /// Executing its steps
    Running,
    /// Every step ran (individual assertions may still have failed)
    Completed,
    /// A fatal error stopped the test case
    Aborted,
}

/// One bounded unit of validation for one type
pub trait TestCase: Send {
    /// Stable identity
    fn id(&self) -> &TestCaseId;

    /// Variant name, e.g. `entity-history-retrieval`
    fn variant(&self) -> &'static str;

    /// Type under test
    fn type_descriptor(&self) -> &TypeDescriptor;

    /// Lifecycle state
    fn state(&self) -> TestCaseState;

    /// Identities found by the discovery step
    fn discovered(&self) -> usize;

    /// Profiles the assertions of this test case count towards
    fn profiles(&self) -> [ProfileId; 2];

    /// Execute every step once, recording assertions into `recorder`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; assertions recorded before it stay.
    fn run(&mut self, ctx: &WorkContext, recorder: &AssertionRecorder) -> HarnessResult<()>;
}

/// Per-test-case line of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseSummary {
    /// Test case identity
    pub id: TestCaseId,
    /// Variant name
    pub variant: String,
    /// Type name
    pub type_name: String,
    /// Type category
    pub category: TypeCategory,
    /// Final lifecycle state
    pub state: TestCaseState,
    /// Identities found by discovery
    pub discovered: usize,
    /// Counts and latency of the test case's assertions
    pub outcomes: OutcomeSummary,
}

impl TestCaseSummary {
    /// Summarize `case` from what it recorded
    pub fn collect(case: &dyn TestCase, recorder: &AssertionRecorder) -> Self {
        let type_def = case.type_descriptor();
        TestCaseSummary {
            id: case.id().clone(),
            variant: case.variant().to_string(),
            type_name: type_def.name.clone(),
            category: type_def.category,
            state: case.state(),
            discovered: case.discovered(),
            outcomes: recorder.test_case_summary(case.id()),
        }
    }
}

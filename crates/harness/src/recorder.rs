//! Append-only assertion recorder
//!
//! Test cases running on different workers share one recorder. Recording
//! takes a short `parking_lot` lock and pushes onto a vector; nothing is ever
//! removed or rewritten, so read-side queries always see a prefix of the
//! final result.
//!
//! # Example
//!
//! ```ignore
//! let recorder = AssertionRecorder::new();
//! recorder.record(assertion);
//! let summary = recorder.summary(ProfileId::EntityRetrieval);
//! println!("{} passed, p99 {:?}", summary.passed, summary.latency.map(|l| l.p99_micros));
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::assertion::{Assertion, Outcome, ProfileId, TestCaseId};
use crate::error::HarnessError;

/// Latency distribution of a set of calls (microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Number of samples
    pub samples: usize,
    /// Fastest call
    pub min_micros: u64,
    /// Mean call time
    pub mean_micros: f64,
    /// 99th percentile call time
    pub p99_micros: u64,
    /// Slowest call
    pub max_micros: u64,
}

impl LatencyStats {
    /// Distribution of `samples`, `None` when there are none
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let sum: u128 = sorted.iter().map(|&s| s as u128).sum();
        // Nearest rank: ceil(0.99 * n), 1-based.
        let rank = (sorted.len() * 99 + 99) / 100;
        Some(LatencyStats {
            samples: sorted.len(),
            min_micros: sorted[0],
            mean_micros: sum as f64 / sorted.len() as f64,
            p99_micros: sorted[rank - 1],
            max_micros: sorted[sorted.len() - 1],
        })
    }
}

/// Outcome counts plus latency of a set of assertions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomeSummary {
    /// Assertions counted
    pub total: usize,
    /// PASSED assertions
    pub passed: usize,
    /// FAILED assertions
    pub failed: usize,
    /// NOT_SUPPORTED assertions
    pub not_supported: usize,
    /// Latency over every counted assertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyStats>,
}

impl OutcomeSummary {
    /// Tally a set of assertions
    pub fn from_assertions<'a>(assertions: impl IntoIterator<Item = &'a Assertion>) -> Self {
        let mut summary = OutcomeSummary::default();
        let mut samples = Vec::new();
        for assertion in assertions {
            summary.total += 1;
            match assertion.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::NotSupported => summary.not_supported += 1,
            }
            if !assertion.skipped {
                samples.push(assertion.elapsed_micros);
            }
        }
        summary.latency = LatencyStats::from_samples(&samples);
        summary
    }
}

/// A test case aborted by a fatal error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Aborted test case
    pub test_case_id: TestCaseId,
    /// Type the test case was exercising
    pub type_name: String,
    /// Operation that failed, if the error came from a contract call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Full diagnostic message
    pub message: String,
}

impl RunFailure {
    /// Failure record for `error` raised by `test_case_id`
    pub fn new(test_case_id: &TestCaseId, type_name: &str, error: &HarnessError) -> Self {
        RunFailure {
            test_case_id: test_case_id.clone(),
            type_name: type_name.to_string(),
            operation: error.operation().map(|op| op.name().to_string()),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    assertions: Vec<Assertion>,
    failures: Vec<RunFailure>,
}

/// Shared, append-only sink for assertions and run failures
///
/// Cloning yields another handle onto the same recorder.
#[derive(Debug, Clone, Default)]
pub struct AssertionRecorder {
    state: Arc<Mutex<RecorderState>>,
}

impl AssertionRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assertion
    pub fn record(&self, assertion: Assertion) {
        self.state.lock().assertions.push(assertion);
    }

    /// Append a run-level failure
    pub fn record_failure(&self, failure: RunFailure) {
        self.state.lock().failures.push(failure);
    }

    /// Number of recorded assertions
    pub fn len(&self) -> usize {
        self.state.lock().assertions.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every assertion in recording order
    pub fn assertions(&self) -> Vec<Assertion> {
        self.state.lock().assertions.clone()
    }

    /// Assertions tagged with `profile`
    pub fn for_profile(&self, profile: ProfileId) -> Vec<Assertion> {
        self.filtered(|a| a.profile == profile)
    }

    /// Assertions made by `test_case_id`
    pub fn for_test_case(&self, test_case_id: &TestCaseId) -> Vec<Assertion> {
        self.filtered(|a| &a.test_case_id == test_case_id)
    }

    /// Counts and latency for `profile`
    pub fn summary(&self, profile: ProfileId) -> OutcomeSummary {
        let state = self.state.lock();
        OutcomeSummary::from_assertions(state.assertions.iter().filter(|a| a.profile == profile))
    }

    /// Counts and latency for `test_case_id`
    pub fn test_case_summary(&self, test_case_id: &TestCaseId) -> OutcomeSummary {
        let state = self.state.lock();
        OutcomeSummary::from_assertions(
            state
                .assertions
                .iter()
                .filter(|a| &a.test_case_id == test_case_id),
        )
    }

    /// Every run-level failure in recording order
    pub fn failures(&self) -> Vec<RunFailure> {
        self.state.lock().failures.clone()
    }

    fn filtered(&self, keep: impl Fn(&Assertion) -> bool) -> Vec<Assertion> {
        self.state
            .lock()
            .assertions
            .iter()
            .filter(|a| keep(a))
            .cloned()
            .collect()
    }
}

//! Profile aggregation
//!
//! Profiles are fixed before a run starts. After the run, every recorded
//! assertion is partitioned by its profile id and each partition is reduced
//! to counts plus latency. A profile nobody contributed to is reported as
//! [`ProfileStatus::NotExercised`], which is not the same thing as a
//! supported profile with zero failures.
//!
//! The verdict only reflects recorded assertions. A test case that aborted
//! stops contributing, so its profiles also carry a count of aborted test
//! cases.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::assertion::{Assertion, ProfileId};
use crate::recorder::{AssertionRecorder, OutcomeSummary};

/// Conformance verdict of one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    /// No assertion was recorded for the profile
    NotExercised,
    /// Every assertion reported NOT_SUPPORTED
    NotSupported,
    /// At least one PASSED assertion and no FAILED ones
    Conformant,
    /// At least one FAILED assertion
    NonConformant,
}

impl ProfileStatus {
    /// Verdict for a summary
    pub fn classify(summary: &OutcomeSummary) -> Self {
        if summary.total == 0 {
            ProfileStatus::NotExercised
        } else if summary.failed > 0 {
            ProfileStatus::NonConformant
        } else if summary.passed == 0 {
            ProfileStatus::NotSupported
        } else {
            ProfileStatus::Conformant
        }
    }

    /// Label used in text reports
    pub const fn label(&self) -> &'static str {
        match self {
            ProfileStatus::NotExercised => "not exercised",
            ProfileStatus::NotSupported => "not supported",
            ProfileStatus::Conformant => "conformant",
            ProfileStatus::NonConformant => "NON-CONFORMANT",
        }
    }
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate of one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Profile
    pub profile: ProfileId,
    /// Profile description
    pub description: String,
    /// Verdict
    pub status: ProfileStatus,
    /// Counts and latency
    pub summary: OutcomeSummary,
    /// Test cases of this profile that aborted before finishing
    #[serde(default, skip_serializing_if = "is_zero")]
    pub aborted_test_cases: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Rolls recorded assertions up into profile reports
#[derive(Debug, Clone)]
pub struct ProfileAggregator {
    profiles: Vec<ProfileId>,
}

impl Default for ProfileAggregator {
    fn default() -> Self {
        Self::new(ProfileId::ALL.to_vec())
    }
}

impl ProfileAggregator {
    /// Aggregator over the given profiles, reported in that order
    pub fn new(profiles: Vec<ProfileId>) -> Self {
        ProfileAggregator { profiles }
    }

    /// Profiles this aggregator reports on
    pub fn profiles(&self) -> &[ProfileId] {
        &self.profiles
    }

    /// One report per profile from everything in `recorder`
    pub fn aggregate(&self, recorder: &AssertionRecorder) -> Vec<ProfileReport> {
        self.aggregate_assertions(&recorder.assertions())
    }

    /// One report per profile from a set of assertions
    ///
    /// Assertions tagged with a profile outside this aggregator are ignored.
    pub fn aggregate_assertions(&self, assertions: &[Assertion]) -> Vec<ProfileReport> {
        let mut partitions: HashMap<ProfileId, Vec<&Assertion>> = HashMap::new();
        for assertion in assertions {
            partitions.entry(assertion.profile).or_default().push(assertion);
        }

        self.profiles
            .iter()
            .map(|&profile| {
                let summary = partitions
                    .get(&profile)
                    .map(|part| OutcomeSummary::from_assertions(part.iter().copied()))
                    .unwrap_or_default();
                ProfileReport {
                    profile,
                    description: profile.description().to_string(),
                    status: ProfileStatus::classify(&summary),
                    summary,
                    aborted_test_cases: 0,
                }
            })
            .collect()
    }
}

//! Assertions and the identifiers that tag them
//!
//! An [`Assertion`] is written once per contract call attempt and never
//! changed afterwards. It names the test case that made the call, the
//! profile the call counts towards, the operation, the parameters, how long
//! the call took and what the outcome was.

use conform_core::{Operation, TypeCategory, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of one contract call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Call succeeded and the result was consistent
    Passed,
    /// Call succeeded but the result contradicted an earlier step
    Failed,
    /// Connector declined the operation
    NotSupported,
}

impl Outcome {
    /// Upper-case label used in reports
    pub const fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::NotSupported => "NOT_SUPPORTED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Capability profiles assertions roll up into
///
/// Profile ids are stable: reports and dashboards key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileId {
    /// Current-state entity search
    EntitySearch,
    /// Entity existence, summary and detail reads
    EntityRetrieval,
    /// Entity search as of a point in time
    EntityHistorySearch,
    /// Entity as-of detail and version history reads
    EntityHistoryRetrieval,
    /// Current-state relationship search
    RelationshipSearch,
    /// Relationship existence and detail reads
    RelationshipRetrieval,
    /// Relationship search as of a point in time
    RelationshipHistorySearch,
    /// Relationship as-of detail and version history reads
    RelationshipHistoryRetrieval,
}

impl ProfileId {
    /// Every profile in report order
    pub const ALL: [ProfileId; 8] = [
        ProfileId::EntitySearch,
        ProfileId::EntityRetrieval,
        ProfileId::EntityHistorySearch,
        ProfileId::EntityHistoryRetrieval,
        ProfileId::RelationshipSearch,
        ProfileId::RelationshipRetrieval,
        ProfileId::RelationshipHistorySearch,
        ProfileId::RelationshipHistoryRetrieval,
    ];

    /// Stable profile id
    pub const fn id(&self) -> &'static str {
        match self {
            ProfileId::EntitySearch => "entity-search",
            ProfileId::EntityRetrieval => "entity-retrieval",
            ProfileId::EntityHistorySearch => "entity-history-search",
            ProfileId::EntityHistoryRetrieval => "entity-history-retrieval",
            ProfileId::RelationshipSearch => "relationship-search",
            ProfileId::RelationshipRetrieval => "relationship-retrieval",
            ProfileId::RelationshipHistorySearch => "relationship-history-search",
            ProfileId::RelationshipHistoryRetrieval => "relationship-history-retrieval",
        }
    }

    /// One-line description for reports
    pub const fn description(&self) -> &'static str {
        match self {
            ProfileId::EntitySearch => "Search for entities of a type",
            ProfileId::EntityRetrieval => "Probe and retrieve entities by guid",
            ProfileId::EntityHistorySearch => "Search for entities as of a point in time",
            ProfileId::EntityHistoryRetrieval => "Retrieve historical entity state and versions",
            ProfileId::RelationshipSearch => "Search for relationships of a type",
            ProfileId::RelationshipRetrieval => "Probe and retrieve relationships by guid",
            ProfileId::RelationshipHistorySearch => {
                "Search for relationships as of a point in time"
            }
            ProfileId::RelationshipHistoryRetrieval => {
                "Retrieve historical relationship state and versions"
            }
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Identity of one test case: variant plus type name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(String);

impl TestCaseId {
    /// Id of `variant` run against `type_def`, e.g. `entity-retrieval-Project`
    pub fn new(variant: &str, type_def: &TypeDescriptor) -> Self {
        TestCaseId(format!("{}-{}", variant, type_def.name))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one contract call attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Test case that made the call
    pub test_case_id: TestCaseId,
    /// What the call was checking
    pub description: String,
    /// Profile the call counts towards
    pub profile: ProfileId,
    /// Call parameters, rendered for humans
    pub parameters: String,
    /// Contract operation
    pub operation: Operation,
    /// Category of the type under test
    pub category: TypeCategory,
    /// Wall-clock time of the call
    pub elapsed_micros: u64,
    /// Recorded without a call, because the operation already reported
    /// unsupported earlier in the test case
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    /// Result
    pub outcome: Outcome,
    /// Why the call failed or was not supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Assertion {
    /// Elapsed time as a `Duration`
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_micros)
    }

    /// Elapsed time in (fractional) milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed_micros as f64 / 1_000.0
    }
}

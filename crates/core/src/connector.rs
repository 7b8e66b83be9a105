//! The repository connector contract
//!
//! `RepositoryConnector` is the only view the workbench has of a backend.
//! Entities and relationships expose the same primitives:
//!
//! ```text
//! find            -> instances of a type (optionally as of a time)
//! exists          -> light-weight probe, Option<snapshot>
//! summary         -> minimal-detail read (entities only)
//! detail          -> full read, optionally as of a time
//! history         -> every version, paged, most recent first
//! ```
//!
//! Every operation has a default body returning
//! `ConnectorError::Unsupported`, so a backend implements only what it
//! actually supports. Declining an operation must use that signal and never
//! return placeholder data.
//!
//! Thread safety: the workbench calls a connector from several worker
//! threads at once, hence `Send + Sync`.

use crate::contract::{FindRequest, Guid, HistoryRequest, InstanceSnapshot, Timestamp};
use crate::error::{ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract operation identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `find_entities`
    FindEntities,
    /// `entity_exists`
    EntityExists,
    /// `get_entity_summary`
    GetEntitySummary,
    /// `get_entity_detail`
    GetEntityDetail,
    /// `get_entity_history`
    GetEntityHistory,
    /// `find_relationships`
    FindRelationships,
    /// `relationship_exists`
    RelationshipExists,
    /// `get_relationship`
    GetRelationship,
    /// `get_relationship_history`
    GetRelationshipHistory,
}

impl Operation {
    /// Every operation, entity family first
    pub const ALL: [Operation; 9] = [
        Operation::FindEntities,
        Operation::EntityExists,
        Operation::GetEntitySummary,
        Operation::GetEntityDetail,
        Operation::GetEntityHistory,
        Operation::FindRelationships,
        Operation::RelationshipExists,
        Operation::GetRelationship,
        Operation::GetRelationshipHistory,
    ];

    /// Method name on the contract
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::FindEntities => "find_entities",
            Operation::EntityExists => "entity_exists",
            Operation::GetEntitySummary => "get_entity_summary",
            Operation::GetEntityDetail => "get_entity_detail",
            Operation::GetEntityHistory => "get_entity_history",
            Operation::FindRelationships => "find_relationships",
            Operation::RelationshipExists => "relationship_exists",
            Operation::GetRelationship => "get_relationship",
            Operation::GetRelationshipHistory => "get_relationship_history",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation set every repository backend implements
///
/// Absence is reported as `Ok(None)` by the `*_exists` probes and as
/// `ConnectorError::NotFound` by the other reads. A detail read whose
/// `as_of_time` precedes the instance's creation must report absence.
pub trait RepositoryConnector: Send + Sync {
    /// Human-readable backend name, used in reports
    fn repository_name(&self) -> &str;

    /// Up to `request.limit` entities of `request.type_guid`
    fn find_entities(
        &self,
        _user_id: &str,
        _request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::FindEntities))
    }

    /// Existence probe for an entity
    fn entity_exists(
        &self,
        _user_id: &str,
        _guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::EntityExists))
    }

    /// Minimal-detail entity read
    fn get_entity_summary(&self, _user_id: &str, _guid: &Guid) -> ConnectorResult<InstanceSnapshot> {
        Err(ConnectorError::unsupported(Operation::GetEntitySummary))
    }

    /// Full entity read, optionally as of a point in time
    fn get_entity_detail(
        &self,
        _user_id: &str,
        _guid: &Guid,
        _as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        Err(ConnectorError::unsupported(Operation::GetEntityDetail))
    }

    /// Paged version history of an entity
    fn get_entity_history(
        &self,
        _user_id: &str,
        _guid: &Guid,
        _request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::GetEntityHistory))
    }

    /// Up to `request.limit` relationships of `request.type_guid`
    fn find_relationships(
        &self,
        _user_id: &str,
        _request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::FindRelationships))
    }

    /// Existence probe for a relationship
    fn relationship_exists(
        &self,
        _user_id: &str,
        _guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::RelationshipExists))
    }

    /// Full relationship read, optionally as of a point in time
    fn get_relationship(
        &self,
        _user_id: &str,
        _guid: &Guid,
        _as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        Err(ConnectorError::unsupported(Operation::GetRelationship))
    }

    /// Paged version history of a relationship
    fn get_relationship_history(
        &self,
        _user_id: &str,
        _guid: &Guid,
        _request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        Err(ConnectorError::unsupported(Operation::GetRelationshipHistory))
    }
}

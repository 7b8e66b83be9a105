//! Instance families
//!
//! Entities and relationships expose the same primitives under different
//! operation names. An [`InstanceFamily`] maps the generic steps of a test
//! case onto one family's operations and profiles, so a single
//! `RetrievalTestCase<F>` serves both.

use conform_core::{
    ConnectorError, ConnectorResult, FindRequest, Guid, HistoryRequest, InstanceSnapshot,
    Operation, RepositoryConnector, Timestamp, TypeCategory,
};

use crate::assertion::ProfileId;

/// Strategy mapping generic retrieval steps onto one instance family
pub trait InstanceFamily: Send + Sync + 'static {
    /// Category of the types this family tests
    const CATEGORY: TypeCategory;

    /// Discovery operation
    const FIND: Operation;
    /// Existence probe operation
    const EXISTS: Operation;
    /// Minimal-detail read, if the family has one
    const SUMMARY: Option<Operation>;
    /// Full read operation
    const DETAIL: Operation;
    /// Version history operation
    const HISTORY: Operation;

    /// Profile of current-state discovery
    const SEARCH_PROFILE: ProfileId;
    /// Profile of current-state reads
    const RETRIEVAL_PROFILE: ProfileId;
    /// Profile of as-of discovery
    const HISTORY_SEARCH_PROFILE: ProfileId;
    /// Profile of as-of reads and version history
    const HISTORY_RETRIEVAL_PROFILE: ProfileId;

    /// Discover instances of a type
    fn find(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>>;

    /// Probe an instance
    fn exists(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>>;

    /// Minimal-detail read; only called when `SUMMARY` is `Some`
    ///
    /// Families without a summary read answer `Unsupported`.
    fn summary(
        _repo: &dyn RepositoryConnector,
        _user_id: &str,
        _guid: &Guid,
    ) -> ConnectorResult<InstanceSnapshot> {
        Err(ConnectorError::unsupported(
            Self::SUMMARY.unwrap_or(Self::DETAIL),
        ))
    }

    /// Full read, optionally as of a point in time
    fn detail(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot>;

    /// Version history page
    fn history(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>>;
}

/// Entity family
#[derive(Debug, Clone, Copy, Default)]
pub struct Entities;

impl InstanceFamily for Entities {
    const CATEGORY: TypeCategory = TypeCategory::Entity;

    const FIND: Operation = Operation::FindEntities;
    const EXISTS: Operation = Operation::EntityExists;
    const SUMMARY: Option<Operation> = Some(Operation::GetEntitySummary);
    const DETAIL: Operation = Operation::GetEntityDetail;
    const HISTORY: Operation = Operation::GetEntityHistory;

    const SEARCH_PROFILE: ProfileId = ProfileId::EntitySearch;
    const RETRIEVAL_PROFILE: ProfileId = ProfileId::EntityRetrieval;
    const HISTORY_SEARCH_PROFILE: ProfileId = ProfileId::EntityHistorySearch;
    const HISTORY_RETRIEVAL_PROFILE: ProfileId = ProfileId::EntityHistoryRetrieval;

    fn find(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        repo.find_entities(user_id, request)
    }

    fn exists(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        repo.entity_exists(user_id, guid)
    }

    fn summary(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<InstanceSnapshot> {
        repo.get_entity_summary(user_id, guid)
    }

    fn detail(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        repo.get_entity_detail(user_id, guid, as_of_time)
    }

    fn history(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        repo.get_entity_history(user_id, guid, request)
    }
}

/// Relationship family
#[derive(Debug, Clone, Copy, Default)]
pub struct Relationships;

impl InstanceFamily for Relationships {
    const CATEGORY: TypeCategory = TypeCategory::Relationship;

    const FIND: Operation = Operation::FindRelationships;
    const EXISTS: Operation = Operation::RelationshipExists;
    const SUMMARY: Option<Operation> = None;
    const DETAIL: Operation = Operation::GetRelationship;
    const HISTORY: Operation = Operation::GetRelationshipHistory;

    const SEARCH_PROFILE: ProfileId = ProfileId::RelationshipSearch;
    const RETRIEVAL_PROFILE: ProfileId = ProfileId::RelationshipRetrieval;
    const HISTORY_SEARCH_PROFILE: ProfileId = ProfileId::RelationshipHistorySearch;
    const HISTORY_RETRIEVAL_PROFILE: ProfileId = ProfileId::RelationshipHistoryRetrieval;

    fn find(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        repo.find_relationships(user_id, request)
    }

    fn exists(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        repo.relationship_exists(user_id, guid)
    }

    fn detail(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        repo.get_relationship(user_id, guid, as_of_time)
    }

    fn history(
        repo: &dyn RepositoryConnector,
        user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        repo.get_relationship_history(user_id, guid, request)
    }
}

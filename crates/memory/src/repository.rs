//! In-memory repository connector
//!
//! A complete, well-behaved implementation of the repository contract. It
//! serves as the reference a conformance run is expected to pass against,
//! and, with [`Capabilities`] and [`FaultPlan`], as a controllable
//! misbehaving backend.
//!
//! Instances live in a `DashMap<Guid, VersionChain>`; every write appends a
//! new version. Writes take explicit timestamps so tests can place versions
//! before or after an as-of time.

use conform_core::{
    ConnectorError, ConnectorResult, FindRequest, Guid, HistoryRequest, InstanceSnapshot,
    InstanceStatus, Operation, RepositoryConnector, Timestamp, TypeCatalog, TypeCategory,
    TypeDescriptor,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::chain::VersionChain;
use crate::faults::{Capabilities, Fault, FaultPlan};

/// Default repository name
pub const DEFAULT_REPOSITORY_NAME: &str = "in-memory-repository";

/// Thread-safe in-memory repository
#[derive(Debug)]
pub struct InMemoryRepository {
    name: String,
    types: RwLock<Vec<TypeDescriptor>>,
    instances: DashMap<Guid, VersionChain>,
    capabilities: RwLock<Capabilities>,
    faults: FaultPlan,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Empty repository with every capability
    pub fn new() -> Self {
        Self::named(DEFAULT_REPOSITORY_NAME)
    }

    /// Empty repository reporting `name`
    pub fn named(name: impl Into<String>) -> Self {
        InMemoryRepository {
            name: name.into(),
            types: RwLock::new(Vec::new()),
            instances: DashMap::new(),
            capabilities: RwLock::new(Capabilities::full()),
            faults: FaultPlan::new(),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Register a type; registering the same guid again is a no-op
    pub fn register_type(&self, type_def: TypeDescriptor) {
        let mut types = self.types.write();
        if types.iter().all(|t| t.guid != type_def.guid) {
            debug!(type_name = %type_def.name, category = %type_def.category, "Registered type");
            types.push(type_def);
        }
    }

    fn registered(&self, type_guid: &Guid) -> Option<TypeDescriptor> {
        self.types
            .read()
            .iter()
            .find(|t| &t.guid == type_guid)
            .cloned()
    }

    fn require_type(
        &self,
        type_def: &TypeDescriptor,
        category: TypeCategory,
    ) -> ConnectorResult<()> {
        match self.registered(&type_def.guid) {
            Some(t) if t.category == category => Ok(()),
            Some(t) => Err(ConnectorError::invalid_parameter(format!(
                "type {} is a {} type, not a {} type",
                t.name, t.category, category
            ))),
            None => Err(ConnectorError::invalid_parameter(format!(
                "unknown type {} ({})",
                type_def.name, type_def.guid
            ))),
        }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create an entity of `type_def` at `at`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the type is not a registered entity type.
    pub fn create_entity<K, P>(
        &self,
        type_def: &TypeDescriptor,
        properties: P,
        at: Timestamp,
    ) -> ConnectorResult<Guid>
    where
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        self.require_type(type_def, TypeCategory::Entity)?;
        let guid = Guid::new();
        let snapshot = with_properties(InstanceSnapshot::entity(guid.clone(), type_def, at), properties);
        self.instances.insert(guid.clone(), VersionChain::new(snapshot));
        debug!(guid = %guid, type_name = %type_def.name, "Created entity");
        Ok(guid)
    }

    /// Create a relationship of `type_def` between two entities at `at`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the type is not a registered relationship
    /// type, or `NotFound` if an end is not a live entity.
    pub fn create_relationship<K, P>(
        &self,
        type_def: &TypeDescriptor,
        end1: Guid,
        end2: Guid,
        properties: P,
        at: Timestamp,
    ) -> ConnectorResult<Guid>
    where
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        self.require_type(type_def, TypeCategory::Relationship)?;
        for end in [&end1, &end2] {
            let live = self.instances.get(end).map_or(false, |chain| {
                !chain.is_deleted()
                    && chain
                        .latest()
                        .map_or(false, |l| l.category == TypeCategory::Entity)
            });
            if !live {
                return Err(ConnectorError::not_found(end));
            }
        }
        let guid = Guid::new();
        let snapshot = with_properties(
            InstanceSnapshot::relationship(guid.clone(), type_def, end1, end2, at),
            properties,
        );
        self.instances.insert(guid.clone(), VersionChain::new(snapshot));
        debug!(guid = %guid, type_name = %type_def.name, "Created relationship");
        Ok(guid)
    }

    /// Write a new version of an instance at `at`, merging `properties`
    ///
    /// Returns the new version number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown or deleted instances and
    /// `InvalidParameter` if `at` precedes the latest version.
    pub fn update_instance<K, P>(
        &self,
        guid: &Guid,
        properties: P,
        at: Timestamp,
    ) -> ConnectorResult<u64>
    where
        K: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
    {
        self.append(guid, at, |next| {
            for (name, value) in properties {
                next.properties.insert(name.into(), value);
            }
        })
    }

    /// Soft-delete an instance at `at`; its history is kept
    ///
    /// # Errors
    ///
    /// Same as [`update_instance`](Self::update_instance).
    pub fn delete_instance(&self, guid: &Guid, at: Timestamp) -> ConnectorResult<u64> {
        self.append(guid, at, |next| next.status = InstanceStatus::Deleted)
    }

    fn append(
        &self,
        guid: &Guid,
        at: Timestamp,
        change: impl FnOnce(&mut InstanceSnapshot),
    ) -> ConnectorResult<u64> {
        let mut chain = self
            .instances
            .get_mut(guid)
            .ok_or_else(|| ConnectorError::not_found(guid))?;
        let latest = match chain.latest() {
            Some(latest) if latest.status == InstanceStatus::Active => latest,
            _ => return Err(ConnectorError::not_found(guid)),
        };
        if at.is_before(latest.update_time) {
            return Err(ConnectorError::invalid_parameter(format!(
                "version time {} precedes latest version time {}",
                at.to_rfc3339(),
                latest.update_time.to_rfc3339()
            )));
        }
        let mut next = latest.next_version(at);
        change(&mut next);
        let version = next.version;
        chain.push(next);
        debug!(guid = %guid, version, "Appended version");
        Ok(version)
    }

    // ========================================================================
    // Capabilities and faults
    // ========================================================================

    /// Replace the capability set
    pub fn set_capabilities(&self, capabilities: Capabilities) {
        *self.capabilities.write() = capabilities;
    }

    /// Current capability set
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.read().clone()
    }

    /// Decline `operation` from now on
    pub fn decline(&self, operation: Operation) {
        let mut caps = self.capabilities.write();
        *caps = caps.clone().without(operation);
    }

    /// Decline as-of reads from now on
    pub fn decline_as_of(&self) {
        let mut caps = self.capabilities.write();
        *caps = caps.clone().without_as_of();
    }

    /// Inject a fault
    pub fn inject(&self, fault: Fault) {
        debug!(?fault, "Injected fault");
        self.faults.inject(fault);
    }

    /// Injected faults
    pub fn faults(&self) -> &FaultPlan {
        &self.faults
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of instances, deleted ones included
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of versions of an instance
    pub fn version_count(&self, guid: &Guid) -> Option<usize> {
        self.instances.get(guid).map(|chain| chain.len())
    }

    // ========================================================================
    // Contract plumbing shared by both families
    // ========================================================================

    fn admit(
        &self,
        operation: Operation,
        guid: Option<&Guid>,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<()> {
        self.capabilities
            .read()
            .check(operation, as_of_time.is_some())?;
        self.faults.before_call(operation, guid)
    }

    fn find(
        &self,
        operation: Operation,
        category: TypeCategory,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.admit(operation, None, request.as_of_time)?;
        match self.registered(&request.type_guid) {
            Some(t) if t.category == category => {}
            _ => {
                return Err(ConnectorError::invalid_parameter(format!(
                    "{} is not a known {} type",
                    request.type_guid, category
                )))
            }
        }

        let mut hits: Vec<InstanceSnapshot> = self
            .instances
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .resolve(request.as_of_time)
                    .filter(|s| {
                        s.status == InstanceStatus::Active
                            && s.category == category
                            && s.type_guid == request.type_guid
                    })
                    .cloned()
            })
            .collect();
        hits.sort_by(|a, b| {
            a.create_time
                .cmp(&b.create_time)
                .then_with(|| a.guid.cmp(&b.guid))
        });

        if self.faults.duplicates_search_results() {
            hits = hits.into_iter().flat_map(|s| [s.clone(), s]).collect();
        }
        hits.truncate(request.limit);
        Ok(hits)
    }

    fn probe(
        &self,
        operation: Operation,
        category: TypeCategory,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        self.admit(operation, Some(guid), None)?;
        Ok(self.live(guid, category, None))
    }

    fn read(
        &self,
        operation: Operation,
        category: TypeCategory,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        self.admit(operation, Some(guid), as_of_time)?;
        if self.faults.hides_detail(guid) {
            return Err(ConnectorError::not_found(guid));
        }
        self.live(guid, category, as_of_time)
            .ok_or_else(|| ConnectorError::not_found(guid))
    }

    fn history(
        &self,
        operation: Operation,
        category: TypeCategory,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.admit(operation, Some(guid), None)?;
        if request.page_size == 0 {
            return Err(ConnectorError::invalid_parameter(
                "page_size must be at least 1",
            ));
        }
        let chain = self
            .instances
            .get(guid)
            .ok_or_else(|| ConnectorError::not_found(guid))?;
        if chain.latest().map_or(true, |l| l.category != category) {
            return Err(ConnectorError::not_found(guid));
        }
        let mut page = chain.history(request);
        if self.faults.forwards_history(guid) {
            page.reverse();
        }
        Ok(page)
    }

    /// Version of `guid` in effect at `as_of_time` (or now), if it is a live
    /// instance of `category`
    fn live(
        &self,
        guid: &Guid,
        category: TypeCategory,
        as_of_time: Option<Timestamp>,
    ) -> Option<InstanceSnapshot> {
        let chain = self.instances.get(guid)?;
        chain
            .resolve(as_of_time)
            .filter(|s| s.status == InstanceStatus::Active && s.category == category)
            .cloned()
    }
}

fn with_properties<K, P>(mut snapshot: InstanceSnapshot, properties: P) -> InstanceSnapshot
where
    K: Into<String>,
    P: IntoIterator<Item = (K, Value)>,
{
    for (name, value) in properties {
        snapshot.properties.insert(name.into(), value);
    }
    snapshot
}

impl RepositoryConnector for InMemoryRepository {
    fn repository_name(&self) -> &str {
        &self.name
    }

    fn find_entities(
        &self,
        _user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.find(Operation::FindEntities, TypeCategory::Entity, request)
    }

    fn entity_exists(
        &self,
        _user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        self.probe(Operation::EntityExists, TypeCategory::Entity, guid)
    }

    fn get_entity_summary(&self, _user_id: &str, guid: &Guid) -> ConnectorResult<InstanceSnapshot> {
        self.read(Operation::GetEntitySummary, TypeCategory::Entity, guid, None)
            .map(|s| s.summary())
    }

    fn get_entity_detail(
        &self,
        _user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        self.read(Operation::GetEntityDetail, TypeCategory::Entity, guid, as_of_time)
    }

    fn get_entity_history(
        &self,
        _user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.history(Operation::GetEntityHistory, TypeCategory::Entity, guid, request)
    }

    fn find_relationships(
        &self,
        _user_id: &str,
        request: &FindRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.find(Operation::FindRelationships, TypeCategory::Relationship, request)
    }

    fn relationship_exists(
        &self,
        _user_id: &str,
        guid: &Guid,
    ) -> ConnectorResult<Option<InstanceSnapshot>> {
        self.probe(Operation::RelationshipExists, TypeCategory::Relationship, guid)
    }

    fn get_relationship(
        &self,
        _user_id: &str,
        guid: &Guid,
        as_of_time: Option<Timestamp>,
    ) -> ConnectorResult<InstanceSnapshot> {
        self.read(Operation::GetRelationship, TypeCategory::Relationship, guid, as_of_time)
    }

    fn get_relationship_history(
        &self,
        _user_id: &str,
        guid: &Guid,
        request: &HistoryRequest,
    ) -> ConnectorResult<Vec<InstanceSnapshot>> {
        self.history(
            Operation::GetRelationshipHistory,
            TypeCategory::Relationship,
            guid,
            request,
        )
    }
}

impl TypeCatalog for InMemoryRepository {
    fn type_descriptors(&self) -> ConnectorResult<Vec<TypeDescriptor>> {
        Ok(self.types.read().clone())
    }
}

//! Instance snapshots
//!
//! An `InstanceSnapshot` is the full property state of one entity or
//! relationship at one version. Entities and relationships share the shape;
//! relationships additionally name the two instances they link.
//!
//! ## History ordering
//!
//! History sequences requested with `HistoryOrder::Backwards` must list the
//! most recent version first. `history_is_backwards` checks that versions
//! never increase along the sequence.

use super::{Guid, Timestamp, TypeCategory, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of an instance version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Live instance
    Active,
    /// Soft-deleted instance, still visible to history reads
    Deleted,
}

/// State of one instance at one version
///
/// ## Invariants
///
/// - `guid` is the same for every version of the instance
/// - `version` strictly increases with each update
/// - `create_time <= update_time`
/// - `ends` is `Some` exactly for relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    /// Instance identity
    pub guid: Guid,
    /// Type of the instance
    pub type_guid: Guid,
    /// Type name, carried for diagnostics
    pub type_name: String,
    /// Entity or relationship
    pub category: TypeCategory,
    /// Version number of this snapshot
    pub version: u64,
    /// When the instance was created
    pub create_time: Timestamp,
    /// When this version was written
    pub update_time: Timestamp,
    /// Lifecycle status at this version
    pub status: InstanceStatus,
    /// Property state
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Linked instances (relationships only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends: Option<(Guid, Guid)>,
}

impl InstanceSnapshot {
    /// First version of an entity instance
    pub fn entity(guid: Guid, type_def: &TypeDescriptor, created: Timestamp) -> Self {
        InstanceSnapshot {
            guid,
            type_guid: type_def.guid.clone(),
            type_name: type_def.name.clone(),
            category: TypeCategory::Entity,
            version: 1,
            create_time: created,
            update_time: created,
            status: InstanceStatus::Active,
            properties: BTreeMap::new(),
            ends: None,
        }
    }

    /// First version of a relationship instance between `end1` and `end2`
    pub fn relationship(
        guid: Guid,
        type_def: &TypeDescriptor,
        end1: Guid,
        end2: Guid,
        created: Timestamp,
    ) -> Self {
        InstanceSnapshot {
            category: TypeCategory::Relationship,
            ends: Some((end1, end2)),
            ..InstanceSnapshot::entity(guid, type_def, created)
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Next version of this instance, written at `at`
    pub fn next_version(&self, at: Timestamp) -> Self {
        InstanceSnapshot {
            version: self.version + 1,
            update_time: at,
            ..self.clone()
        }
    }

    /// True when the instance had been created at `as_of`
    pub fn existed_at(&self, as_of: Timestamp) -> bool {
        !self.create_time.is_after(as_of)
    }

    /// Copy holding only identity, type and version information
    pub fn summary(&self) -> Self {
        InstanceSnapshot {
            properties: BTreeMap::new(),
            ..self.clone()
        }
    }
}

/// True when versions never increase along `history` (most recent first).
pub fn history_is_backwards(history: &[InstanceSnapshot]) -> bool {
    history.windows(2).all(|pair| pair[0].version >= pair[1].version)
}

//! Demo data for self-tests
//!
//! Seeds a repository with a small, fully consistent metadata graph: a few
//! entity types with versioned instances, and one relationship type per
//! neighbouring pair of entity types.

use conform_core::{ConnectorResult, Guid, Timestamp, TypeDescriptor};
use serde_json::json;
use std::time::Duration;
use tracing::info;

use crate::repository::InMemoryRepository;

const ENTITY_TYPE_NAMES: [&str; 8] = [
    "Project",
    "Person",
    "Team",
    "Asset",
    "GlossaryTerm",
    "Community",
    "Collection",
    "Database",
];

/// Shape of the demo data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoData {
    /// Entity types to create
    pub entity_types: usize,
    /// Instances per type, entities and relationships alike
    pub instances_per_type: usize,
    /// Versions written per instance (1 = never updated)
    pub versions_per_instance: usize,
}

impl Default for DemoData {
    fn default() -> Self {
        DemoData {
            entity_types: 3,
            instances_per_type: 5,
            versions_per_instance: 3,
        }
    }
}

/// What [`seed_demo`] created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    /// Entity and relationship types, in registration order
    pub types: Vec<TypeDescriptor>,
    /// Instances created
    pub instances: usize,
    /// Versions written, first versions included
    pub versions: usize,
}

/// Seed `repo` with demo data, every version written at or after `base`.
///
/// Versions are spaced one second apart per instance, so everything is in
/// place a few minutes after `base` at most.
///
/// # Errors
///
/// Propagates repository write errors.
pub fn seed_demo(
    repo: &InMemoryRepository,
    demo: &DemoData,
    base: Timestamp,
) -> ConnectorResult<DemoSummary> {
    let mut summary = DemoSummary::default();
    let versions = demo.versions_per_instance.max(1);

    let entity_types: Vec<TypeDescriptor> = (0..demo.entity_types)
        .map(|i| {
            let name = ENTITY_TYPE_NAMES
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("DemoEntity{}", i));
            TypeDescriptor::entity(Guid::new(), name)
        })
        .collect();

    let mut instances: Vec<Vec<Guid>> = Vec::with_capacity(entity_types.len());
    for (t, type_def) in entity_types.iter().enumerate() {
        repo.register_type(type_def.clone());
        summary.types.push(type_def.clone());
        let mut guids = Vec::with_capacity(demo.instances_per_type);
        for k in 0..demo.instances_per_type {
            let created = offset(base, t, k);
            let guid = repo.create_entity(
                type_def,
                [
                    ("qualifiedName", json!(format!("{}::{}", type_def.name, k))),
                    ("displayName", json!(format!("{} {}", type_def.name, k))),
                ],
                created,
            )?;
            summary.versions += 1 + write_versions(repo, &guid, created, versions)?;
            guids.push(guid);
        }
        summary.instances += guids.len();
        instances.push(guids);
    }

    let n = entity_types.len();
    for t in 0..n {
        let (from, to) = (&entity_types[t], &entity_types[(t + 1) % n]);
        let rel_type = TypeDescriptor::relationship(Guid::new(), format!("{}To{}", from.name, to.name));
        repo.register_type(rel_type.clone());
        summary.types.push(rel_type.clone());

        let count = demo.instances_per_type;
        for k in 0..count {
            let created = offset(base, n + t, k);
            let end1 = instances[t][k].clone();
            let end2 = instances[(t + 1) % n][(k + 1) % count].clone();
            let guid = repo.create_relationship(
                &rel_type,
                end1,
                end2,
                [("label", json!(format!("{} {}", rel_type.name, k)))],
                created,
            )?;
            summary.versions += 1 + write_versions(repo, &guid, created, versions)?;
            summary.instances += 1;
        }
    }

    info!(
        types = summary.types.len(),
        instances = summary.instances,
        versions = summary.versions,
        "Seeded demo data"
    );
    Ok(summary)
}

/// Creation time of instance `k` of the `t`-th type
fn offset(base: Timestamp, t: usize, k: usize) -> Timestamp {
    base.saturating_add(Duration::from_millis((t * 1_000 + k) as u64))
}

/// Write versions 2..=`versions`, one second apart; returns how many
fn write_versions(
    repo: &InMemoryRepository,
    guid: &Guid,
    created: Timestamp,
    versions: usize,
) -> ConnectorResult<usize> {
    for v in 2..=versions {
        let at = created.saturating_add(Duration::from_secs((v - 1) as u64));
        repo.update_instance(guid, [("revision", json!(v))], at)?;
    }
    Ok(versions - 1)
}

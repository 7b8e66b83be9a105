//! Type descriptors
//!
//! Types are defined outside the workbench. A test case only needs to know
//! a type's guid (to search by it), its name (for diagnostics) and whether
//! it describes entities or relationships (to pick the instance family).

use super::Guid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instance family a type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    /// Entity type
    Entity,
    /// Relationship type (links two entities)
    Relationship,
}

impl TypeCategory {
    /// Stable lowercase label
    pub const fn label(&self) -> &'static str {
        match self {
            TypeCategory::Entity => "entity",
            TypeCategory::Relationship => "relationship",
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Name and identity of an entity or relationship type definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Unique identifier of the type definition
    pub guid: Guid,
    /// Type name, e.g. `Project`
    pub name: String,
    /// Instance family
    pub category: TypeCategory,
}

impl TypeDescriptor {
    /// Describe an entity type
    pub fn entity(guid: impl Into<Guid>, name: impl Into<String>) -> Self {
        TypeDescriptor {
            guid: guid.into(),
            name: name.into(),
            category: TypeCategory::Entity,
        }
    }

    /// Describe a relationship type
    pub fn relationship(guid: impl Into<Guid>, name: impl Into<String>) -> Self {
        TypeDescriptor {
            guid: guid.into(),
            name: name.into(),
            category: TypeCategory::Relationship,
        }
    }

    /// True for entity types
    pub fn is_entity(&self) -> bool {
        self.category == TypeCategory::Entity
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.guid)
    }
}

//! Type catalogs
//!
//! The workbench does not define types; it asks a catalog for the ordered
//! list of type descriptors to exercise.

use crate::contract::TypeDescriptor;
use crate::error::ConnectorResult;

/// Source of the type descriptors a run exercises
pub trait TypeCatalog: Send + Sync {
    /// Ordered list of types to test
    fn type_descriptors(&self) -> ConnectorResult<Vec<TypeDescriptor>>;
}

/// Fixed list of type descriptors, typically read from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTypeCatalog {
    types: Vec<TypeDescriptor>,
}

impl StaticTypeCatalog {
    /// Catalog over the given types, in order
    pub fn new(types: Vec<TypeDescriptor>) -> Self {
        StaticTypeCatalog { types }
    }

    /// Number of types in the catalog
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the catalog holds no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for StaticTypeCatalog {
    fn type_descriptors(&self) -> ConnectorResult<Vec<TypeDescriptor>> {
        Ok(self.types.clone())
    }
}

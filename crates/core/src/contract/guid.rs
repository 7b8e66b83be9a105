//! Instance identity
//!
//! A `Guid` names exactly one entity or relationship instance. It is opaque to
//! the workbench: connectors may use any string scheme, the reference
//! connector uses UUID v4.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique identifier of one instance
///
/// ## Invariants
///
/// - Unique within a repository
/// - Stable across every version of the same logical instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Generate a fresh random guid
    pub fn new() -> Self {
        Guid(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier
    pub fn from_string(value: impl Into<String>) -> Self {
        Guid(value.into())
    }

    /// The identifier as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Guid::new()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Guid(value.to_string())
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Guid(value)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

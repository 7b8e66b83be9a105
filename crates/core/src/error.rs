//! Error types returned by repository connectors
//!
//! Connectors report failure through [`ConnectorError`], a tagged result the
//! workbench branches on:
//! - **Unsupported**: the connector declines an optional operation
//! - **NotFound**: the instance is absent (at the requested time)
//! - **InvalidParameter** / **Transient**: anything else, a genuine defect
//!   from the workbench's point of view
//!
//! We use `thiserror` for automatic `Display` and `Error` implementations.

use crate::connector::Operation;
use crate::contract::Guid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for connector operations
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

/// Failure signalled by a repository connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ConnectorError {
    /// The connector does not implement this operation
    #[error("function not supported: {operation}")]
    Unsupported {
        /// Declined operation
        operation: Operation,
    },

    /// No such instance
    #[error("instance not found: {guid}")]
    NotFound {
        /// Requested instance
        guid: Guid,
    },

    /// A request parameter was rejected
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong
        reason: String,
    },

    /// The backend failed to serve the request
    #[error("repository error: {reason}")]
    Transient {
        /// Backend diagnostic
        reason: String,
    },
}

impl ConnectorError {
    /// Declined operation
    pub fn unsupported(operation: Operation) -> Self {
        ConnectorError::Unsupported { operation }
    }

    /// Absent instance
    pub fn not_found(guid: &Guid) -> Self {
        ConnectorError::NotFound { guid: guid.clone() }
    }

    /// Rejected parameter
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        ConnectorError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Backend failure
    pub fn transient(reason: impl Into<String>) -> Self {
        ConnectorError::Transient {
            reason: reason.into(),
        }
    }

    /// True for the "unsupported function" signal
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ConnectorError::Unsupported { .. })
    }

    /// True when the instance is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConnectorError::NotFound { .. })
    }

    /// Stable variant name, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectorError::Unsupported { .. } => "Unsupported",
            ConnectorError::NotFound { .. } => "NotFound",
            ConnectorError::InvalidParameter { .. } => "InvalidParameter",
            ConnectorError::Transient { .. } => "Transient",
        }
    }
}

//! Error types for the workbench
//!
//! Only failures that abort a test case (or the whole run) become a
//! [`HarnessError`]. Unsupported operations and consistency violations are
//! recorded as assertions instead and never surface here.

use conform_core::{ConnectorError, Guid, Operation, Timestamp, TypeDescriptor};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for workbench operations
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Diagnostic context of one contract call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Contract operation
    pub operation: Operation,
    /// Name of the type under test
    pub type_name: String,
    /// Guid of the type under test
    pub type_guid: Guid,
    /// Instance involved, if any
    pub guid: Option<Guid>,
    /// As-of time of the call, if any
    pub as_of_time: Option<Timestamp>,
}

impl CallContext {
    /// Context of a call against `type_def`
    pub fn new(operation: Operation, type_def: &TypeDescriptor) -> Self {
        CallContext {
            operation,
            type_name: type_def.name.clone(),
            type_guid: type_def.guid.clone(),
            guid: None,
            as_of_time: None,
        }
    }

    /// Attach the instance involved
    pub fn with_guid(mut self, guid: &Guid) -> Self {
        self.guid = Some(guid.clone());
        self
    }

    /// Attach the as-of time
    pub fn with_as_of(mut self, as_of_time: Option<Timestamp>) -> Self {
        self.as_of_time = as_of_time;
        self
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on type {} ({})",
            self.operation, self.type_name, self.type_guid
        )?;
        if let Some(guid) = &self.guid {
            write!(f, " for instance {}", guid)?;
        }
        if let Some(as_of) = &self.as_of_time {
            write!(f, " as of {}", as_of.to_rfc3339())?;
        }
        Ok(())
    }
}

/// Errors that abort a test case or a run
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A contract call failed with something other than "unsupported"
    #[error("{context} failed with {}: {source}", .source.kind())]
    Operation {
        /// Where the call was made
        context: CallContext,
        /// What the connector reported
        #[source]
        source: ConnectorError,
    },

    /// A contract call did not return within the configured timeout
    #[error("{context} timed out after {timeout_ms}ms")]
    Timeout {
        /// Where the call was made
        context: CallContext,
        /// Configured per-call timeout
        timeout_ms: u64,
    },

    /// The type catalog could not be listed
    #[error("type catalog unavailable: {0}")]
    Catalog(#[source] ConnectorError),

    /// Invalid workbench configuration
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },

    /// Worker pool could not be started
    #[error("worker pool error: {reason}")]
    Pool {
        /// Pool diagnostic
        reason: String,
    },

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl HarnessError {
    /// Configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        HarnessError::Config {
            reason: reason.into(),
        }
    }

    /// Operation the error is tied to, if it came from a contract call
    pub fn operation(&self) -> Option<Operation> {
        match self {
            HarnessError::Operation { context, .. } | HarnessError::Timeout { context, .. } => {
                Some(context.operation)
            }
            _ => None,
        }
    }
}

//! Contract types for repository connector conformance
//!
//! This crate defines what a repository connector must look like from the
//! outside. The workbench never sees a connector's storage; it only sees:
//! - Guid: Opaque, stable identity of one entity or relationship instance
//! - TypeDescriptor: Name + guid + category of the type under test
//! - InstanceSnapshot: Property state of an instance at one version
//! - FindRequest / HistoryRequest: Parameters of search and history calls
//! - ConnectorError: Tagged failure (`Unsupported`, `NotFound`, `Transient`, ...)
//! - RepositoryConnector: The operation set every backend implements
//! - TypeCatalog: Source of the type descriptors a run exercises

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod connector;
pub mod contract;
pub mod error;

pub use catalog::{StaticTypeCatalog, TypeCatalog};
pub use connector::{Operation, RepositoryConnector};
pub use contract::{
    history_is_backwards, FindRequest, Guid, HistoryOrder, HistoryRequest, InstanceSnapshot,
    InstanceStatus, Timestamp, TypeCategory, TypeDescriptor,
};
pub use error::{ConnectorError, ConnectorResult};

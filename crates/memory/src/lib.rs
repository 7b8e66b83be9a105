//! In-memory reference connector
//!
//! [`InMemoryRepository`] implements the whole repository contract and the
//! type catalog over versioned in-memory storage. A conformance run against
//! it with default capabilities is expected to pass every profile; the
//! capability switches and the fault plan turn it into a backend that
//! declines operations, misbehaves or stalls on demand.

#![warn(clippy::all)]

pub mod chain;
pub mod demo;
pub mod faults;
pub mod repository;

pub use chain::VersionChain;
pub use demo::{seed_demo, DemoData, DemoSummary};
pub use faults::{Capabilities, Fault, FaultPlan};
pub use repository::{InMemoryRepository, DEFAULT_REPOSITORY_NAME};

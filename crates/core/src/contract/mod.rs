//! Contract types shared by connectors and the workbench
//!
//! Every instance a connector hands back obeys three rules:
//!
//! 1. **Addressable**: it carries a `Guid` that is stable across versions
//! 2. **Typed**: it names exactly one `TypeDescriptor`
//! 3. **Versioned**: it carries a monotonically increasing version and the
//!    timestamps that bound it, so history and as-of reads can be checked
//!
//! ## Module Structure
//!
//! - `guid`: Instance identity
//! - `type_descriptor`: Type under test and its category
//! - `snapshot`: Instance state at one version
//! - `request`: Search and history parameters
//! - `timestamp`: Microsecond timestamps

pub mod guid;
pub mod request;
pub mod snapshot;
pub mod timestamp;
pub mod type_descriptor;

pub use guid::Guid;
pub use request::{FindRequest, HistoryOrder, HistoryRequest};
pub use snapshot::{history_is_backwards, InstanceSnapshot, InstanceStatus};
pub use timestamp::Timestamp;
pub use type_descriptor::{TypeCategory, TypeDescriptor};

//! Explicit state-diff replication layer.
//!
//! The engine-style property replication is replaced by an explicit model:
//! the authoritative session compares component state around each mutation
//! and emits [`ReplicationMessage`]s naming exactly the sync-worthy fields
//! (health attributes, grant lists, item identity/quantity). A reliable
//! ordered transport between sessions is assumed, not implemented.

mod bitmask;
mod diff;
mod messages;

pub use bitmask::{HealthSetFields, ItemFields};
pub use diff::{diff_health, health_snapshot, HealthSnapshot};
pub use messages::ReplicationMessage;

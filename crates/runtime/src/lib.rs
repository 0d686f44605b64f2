//! Distributed-authority session layer over the deterministic core.
//!
//! This crate wires the core components into server and client sessions:
//! the server session is the single authoritative mutation context, the
//! client session is an observer applying replicated state. Between them sit
//! an explicit state-diff replication layer and a topic-based event bus that
//! notifies observers strictly after mutations commit.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the server/client session objects
//! - [`events`] provides the topic-based event bus for flexible routing
//! - [`replication`] defines field masks, messages, and the client apply path
//! - [`registry`] implements the core oracle traits over registered classes
pub mod events;
pub mod registry;
pub mod replication;
pub mod session;

mod error;

pub use error::{Result, RuntimeError};
pub use events::{AbilityEvent, AttributeEvent, Event, EventBus, InventoryEvent, Topic};
pub use registry::ClassRegistry;
pub use replication::{HealthSetFields, ItemFields, ReplicationMessage};
pub use session::{ActorComponents, ClientActorView, ClientSession, InventoryView, ServerSession};

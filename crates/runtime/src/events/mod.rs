//! Topic-based event bus for gameplay notifications.
//!
//! Events describe committed facts only: the session publishes them after a
//! core mutation has fully applied, never before or during. Observers (UI,
//! view models) subscribe per topic.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{AbilityEvent, AttributeEvent, Event, InventoryEvent, Topic};

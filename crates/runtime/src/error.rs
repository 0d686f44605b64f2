//! Unified error types surfaced by the session API.
//!
//! Wraps rejections from the core components so clients can bubble them up
//! with consistent context. Authority violations are additionally logged at
//! the session boundary before being returned.

use thiserror::Error;

use arpg_core::{
    ActorId, GrantError, InventoryGrantError, ItemDefId, NotAuthoritative, OracleError,
    ReceiveError, TransferError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("actor {actor} is not registered with this session")]
    UnknownActor { actor: ActorId },

    #[error("item definition {def} is not registered")]
    UnknownItemDef { def: ItemDefId },

    #[error("inventory {name:?} has no slot {slot} on actor {actor}")]
    UnknownSlot {
        actor: ActorId,
        name: String,
        slot: usize,
    },

    #[error(transparent)]
    NotAuthoritative(#[from] NotAuthoritative),

    #[error(transparent)]
    Ability(#[from] GrantError),

    #[error(transparent)]
    Grant(#[from] InventoryGrantError),

    #[error(transparent)]
    Receive(#[from] ReceiveError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

//! Network authority model.
//!
//! Every canonical state mutation must happen on the authority (the server).
//! Other execution contexts are observers or local predictors. The role and
//! net-mode enums here are the whole access-control surface the core exposes;
//! the runtime layer decides what to do with a [`NotAuthoritative`] rejection
//! (log and drop, per the cross-machine rule).

/// Network role of a component's owner on the local machine.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NetRole {
    /// Canonical owner of the state. Only this role may mutate.
    #[default]
    Authority,
    /// Locally controlled predictor (owning client).
    AutonomousProxy,
    /// Pure observer receiving replicated state.
    SimulatedProxy,
}

impl NetRole {
    #[inline]
    pub const fn is_authority(self) -> bool {
        matches!(self, NetRole::Authority)
    }
}

/// Network mode of the process the component lives in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NetMode {
    /// Single process acting as both server and client.
    #[default]
    Standalone,
    /// Server with no local player. Never processes local ability input.
    DedicatedServer,
    /// Server that also hosts a local player.
    ListenServer,
    /// Remote client connected to a server.
    Client,
}

impl NetMode {
    #[inline]
    pub const fn is_dedicated_server(self) -> bool {
        matches!(self, NetMode::DedicatedServer)
    }
}

/// Rejection returned by authority-gated entry points invoked off-authority.
///
/// This is the "logged and dropped" case: callers must treat it as a no-op,
/// never as a crash, and no partial state change may have occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("operation requires authority, called with role {role}")]
pub struct NotAuthoritative {
    pub role: NetRole,
}

impl NotAuthoritative {
    pub fn check(role: NetRole) -> Result<(), Self> {
        if role.is_authority() {
            Ok(())
        } else {
            Err(Self { role })
        }
    }
}

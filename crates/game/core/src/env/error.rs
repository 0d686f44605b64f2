/// Errors for oracle access when an Env is partially populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("ability oracle not available in environment")]
    AbilitiesNotAvailable,

    #[error("effect oracle not available in environment")]
    EffectsNotAvailable,

    #[error("item oracle not available in environment")]
    ItemsNotAvailable,

    #[error("config oracle not available in environment")]
    ConfigNotAvailable,

    #[error("rng oracle not available in environment")]
    RngNotAvailable,
}

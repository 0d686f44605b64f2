//! Traits describing read-only class and configuration data.
//!
//! Oracles expose ability/effect class defaults, item definitions, tunable
//! configuration, and deterministic randomness. The [`Env`] aggregate bundles
//! them so components can access everything they need without hard coupling
//! to concrete implementations (the runtime's class registry implements these
//! over plain maps).
mod abilities;
mod config;
mod error;
mod items;
mod rng;

pub use abilities::{AbilityOracle, EffectOracle};
pub use config::ConfigOracle;
pub use error::OracleError;
pub use items::ItemOracle;
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Aggregates read-only oracles required by the component operations.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, A, E, I, C, R>
where
    A: AbilityOracle + ?Sized,
    E: EffectOracle + ?Sized,
    I: ItemOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    abilities: Option<&'a A>,
    effects: Option<&'a E>,
    items: Option<&'a I>,
    config: Option<&'a C>,
    rng: Option<&'a R>,
}

pub type GameEnv<'a> = Env<
    'a,
    dyn AbilityOracle + 'a,
    dyn EffectOracle + 'a,
    dyn ItemOracle + 'a,
    dyn ConfigOracle + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, A, E, I, C, R> Env<'a, A, E, I, C, R>
where
    A: AbilityOracle + ?Sized,
    E: EffectOracle + ?Sized,
    I: ItemOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        abilities: Option<&'a A>,
        effects: Option<&'a E>,
        items: Option<&'a I>,
        config: Option<&'a C>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            abilities,
            effects,
            items,
            config,
            rng,
        }
    }

    pub fn with_all(
        abilities: &'a A,
        effects: &'a E,
        items: &'a I,
        config: &'a C,
        rng: &'a R,
    ) -> Self {
        Self::new(
            Some(abilities),
            Some(effects),
            Some(items),
            Some(config),
            Some(rng),
        )
    }

    pub fn empty() -> Self {
        Self {
            abilities: None,
            effects: None,
            items: None,
            config: None,
            rng: None,
        }
    }

    /// Returns the AbilityOracle, or an error if not available.
    pub fn abilities(&self) -> Result<&'a A, OracleError> {
        self.abilities.ok_or(OracleError::AbilitiesNotAvailable)
    }

    /// Returns the EffectOracle, or an error if not available.
    pub fn effects(&self) -> Result<&'a E, OracleError> {
        self.effects.ok_or(OracleError::EffectsNotAvailable)
    }

    /// Returns the ItemOracle, or an error if not available.
    pub fn items(&self) -> Result<&'a I, OracleError> {
        self.items.ok_or(OracleError::ItemsNotAvailable)
    }

    /// Returns the ConfigOracle, or an error if not available.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Returns the inventory capacity limit from the config oracle.
    pub fn max_inventory_capacity(&self) -> Result<usize, OracleError> {
        Ok(self.config()?.max_inventory_capacity())
    }
}

impl<'a, A, E, I, C, R> Env<'a, A, E, I, C, R>
where
    A: AbilityOracle + 'a,
    E: EffectOracle + 'a,
    I: ItemOracle + 'a,
    C: ConfigOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv`
    /// (borrows self). Overhead: five pointer copies.
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let abilities: Option<&'a dyn AbilityOracle> = self.abilities.map(|a| a as _);
        let effects: Option<&'a dyn EffectOracle> = self.effects.map(|e| e as _);
        let items: Option<&'a dyn ItemOracle> = self.items.map(|i| i as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|c| c as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env::new(abilities, effects, items, config, rng)
    }
}

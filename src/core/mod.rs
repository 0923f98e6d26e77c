//! Core engine infrastructure: configuration, errors and the seeded RNG.

pub mod balance;
pub mod error;
pub mod rng;

pub use balance::{BalanceConfig, ClassModifier, CombatConfig};
pub use error::{ConfigError, EngineError};
pub use rng::{unit_float, SeededRng};

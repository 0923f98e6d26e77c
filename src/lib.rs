//! Clanfall - battle resolution and progression engine.
//!
//! Pure, deterministic game math for the Clanfall browser RPG: seeded battle
//! resolvers, the leveling curve and stat-point economy, resource
//! regeneration, clan brackets, and the offline XP scheduler. Persistence,
//! HTTP and UI live elsewhere and call into this crate.

pub mod clan;
pub mod combat;
pub mod core;
pub mod offline;
pub mod progression;
pub mod resources;

pub use crate::core::{BalanceConfig, ConfigError, EngineError, SeededRng};
pub use clan::BracketTable;
pub use combat::{resolve_battle, BattleMode, BattleOutcome, BattleSeed, CombatStats};
pub use offline::{run_cycle, AccrualStore, MemoryStore};
pub use progression::{LevelUpResult, LevelingCurve};
pub use resources::{regenerate, RegenRates, ResourcePool};

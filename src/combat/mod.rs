//! Battle resolution: seeded, replayable, and side-effect free.

pub mod linear;
pub mod pending;
pub mod probabilistic;
pub mod resolver;
pub mod types;

pub use linear::resolve_linear;
pub use pending::{BattleRecord, PendingBattle};
pub use probabilistic::{currency_stolen, resolve_probabilistic, usable_clan_members};
pub use resolver::{resolve_battle, BattleMode, BattleOutcome};
pub use types::*;

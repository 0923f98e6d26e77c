//! Battle-mode dispatch.
//!
//! The linear and probabilistic resolvers evolved independently and use
//! unrelated formulas for the same characters. They are kept as separate
//! modes behind one entry point rather than merged.

use serde::{Deserialize, Serialize};

use super::linear::resolve_linear;
use super::probabilistic::resolve_probabilistic;
use super::types::{
    BattleSeed, CombatStats, Fighter, LinearBattleResult, ProbabilisticBattleResult, TrophyDelta,
};
use crate::core::balance::CombatConfig;
use crate::core::error::EngineError;
use crate::core::rng::SeededRng;

/// Which resolver a battle uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BattleMode {
    /// "game" battles.
    Linear,
    /// "storm8" battles. Hitlist (bounty) battles ignore low-health protection.
    Probabilistic { hitlist: bool },
}

/// Result of a resolved battle, tagged by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BattleOutcome {
    Linear(LinearBattleResult),
    Probabilistic(ProbabilisticBattleResult),
}

impl BattleOutcome {
    pub fn damage(&self) -> u64 {
        match self {
            BattleOutcome::Linear(r) => u64::from(r.damage),
            BattleOutcome::Probabilistic(r) => r.damage,
        }
    }

    pub fn attacker_won(&self) -> bool {
        match self {
            BattleOutcome::Linear(r) => r.attacker_wins,
            BattleOutcome::Probabilistic(r) => r.attacker_won,
        }
    }

    pub fn killed(&self) -> bool {
        match self {
            BattleOutcome::Linear(r) => r.killed,
            BattleOutcome::Probabilistic(r) => r.killed,
        }
    }

    pub fn defender_health_after(&self) -> u32 {
        match self {
            BattleOutcome::Linear(r) => r.defender_health_after,
            BattleOutcome::Probabilistic(r) => r.defender_health_after,
        }
    }

    /// Currency moved from defender to attacker. Linear battles never steal.
    pub fn currency_stolen(&self) -> u64 {
        match self {
            BattleOutcome::Linear(_) => 0,
            BattleOutcome::Probabilistic(r) => r.currency_stolen,
        }
    }

    pub fn xp_awarded(&self) -> u64 {
        match self {
            BattleOutcome::Linear(r) => r.xp_awarded,
            BattleOutcome::Probabilistic(r) => r.xp_awarded,
        }
    }

    /// Trophy increments for the trophy records.
    ///
    /// An attack nullified by low-health protection records nothing.
    pub fn trophies(&self) -> TrophyDelta {
        let mut delta = TrophyDelta::default();
        if let BattleOutcome::Probabilistic(r) = self {
            if r.protected {
                return delta;
            }
        }

        if self.attacker_won() {
            delta.attacker.wins = 1;
            delta.defender.losses = 1;
        } else {
            delta.attacker.losses = 1;
            delta.defender.wins = 1;
        }
        if self.killed() {
            delta.attacker.kills = 1;
            delta.defender.deaths = 1;
        }
        delta
    }
}

/// Resolves a battle from its stored seed.
///
/// Replaying with the same mode, stats, seed and config yields an identical
/// outcome.
pub fn resolve_battle(
    mode: BattleMode,
    attacker: &CombatStats,
    defender: &CombatStats,
    seed: &BattleSeed,
    config: &CombatConfig,
) -> Result<BattleOutcome, EngineError> {
    let mut rng = SeededRng::from_seed_str(seed.as_str());

    let outcome = match mode {
        BattleMode::Linear => {
            let attacker = Fighter::from_stats(attacker);
            let defender = Fighter::from_stats(defender);
            BattleOutcome::Linear(resolve_linear(&attacker, &defender, config, &mut rng)?)
        }
        BattleMode::Probabilistic { hitlist } => BattleOutcome::Probabilistic(
            resolve_probabilistic(attacker, defender, hitlist, config, &mut rng),
        ),
    };

    log::debug!(
        "battle {} ({:?}) {} -> {}: won={} damage={}",
        seed,
        mode,
        attacker.id,
        defender.id,
        outcome.attacker_won(),
        outcome.damage()
    );

    Ok(outcome)
}

//! Legacy multi-turn battles.
//!
//! Older clients could leave a battle in a "pending" state between turns.
//! Battles now resolve instantly, so any pending record that is read back is
//! completed on the spot from its stored seed instead of being left open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolver::{resolve_battle, BattleMode, BattleOutcome};
use super::types::{BattleSeed, CombatStats};
use crate::core::balance::CombatConfig;
use crate::core::error::EngineError;

/// A battle that was started but never resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBattle {
    pub seed: BattleSeed,
    pub mode: BattleMode,
    pub attacker: CombatStats,
    pub defender: CombatStats,
    pub started_at: DateTime<Utc>,
}

/// A stored battle, either resolved or left pending by a legacy client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BattleRecord {
    Pending(PendingBattle),
    Resolved {
        seed: BattleSeed,
        outcome: BattleOutcome,
    },
}

impl BattleRecord {
    pub fn is_pending(&self) -> bool {
        matches!(self, BattleRecord::Pending(_))
    }

    pub fn seed(&self) -> &BattleSeed {
        match self {
            BattleRecord::Pending(p) => &p.seed,
            BattleRecord::Resolved { seed, .. } => seed,
        }
    }

    /// Returns the resolved form of this record, completing it if pending.
    ///
    /// Completion uses the stored seed and stats, so settling the same
    /// pending record twice produces the same outcome.
    pub fn settle(self, config: &CombatConfig) -> Result<BattleRecord, EngineError> {
        match self {
            BattleRecord::Resolved { .. } => Ok(self),
            BattleRecord::Pending(pending) => {
                let outcome = pending.complete(config)?;
                Ok(BattleRecord::Resolved {
                    seed: pending.seed,
                    outcome,
                })
            }
        }
    }

    /// Outcome of this record, completing it first if needed.
    pub fn outcome(self, config: &CombatConfig) -> Result<BattleOutcome, EngineError> {
        match self {
            BattleRecord::Resolved { outcome, .. } => Ok(outcome),
            BattleRecord::Pending(pending) => pending.complete(config),
        }
    }
}

impl PendingBattle {
    fn complete(&self, config: &CombatConfig) -> Result<BattleOutcome, EngineError> {
        log::info!(
            "auto-completing pending battle {} started at {}",
            self.seed,
            self.started_at
        );
        resolve_battle(self.mode, &self.attacker, &self.defender, &self.seed, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::SkillPoints;
    use chrono::TimeZone;

    fn character(id: u64, attack: u32, defense: u32) -> CombatStats {
        CombatStats {
            id,
            level: 8,
            skills: SkillPoints {
                attack,
                defense,
                ..Default::default()
            },
            current_health: 90,
            max_health: 90,
            current_stamina: 5,
            equipment_attack: 10,
            equipment_defense: 10,
            clan_members: 12,
            banked_currency: 0,
            unbanked_currency: 800,
            class: "warrior".to_string(),
        }
    }

    fn pending(mode: BattleMode) -> PendingBattle {
        PendingBattle {
            seed: BattleSeed::from("legacy-battle-7"),
            mode,
            attacker: character(1, 30, 5),
            defender: character(2, 5, 20),
            started_at: Utc.with_ymd_and_hms(2023, 11, 2, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_settle_matches_immediate_resolution() {
        let config = CombatConfig::default();
        for mode in [BattleMode::Linear, BattleMode::Probabilistic { hitlist: false }] {
            let battle = pending(mode);
            let direct = resolve_battle(mode, &battle.attacker, &battle.defender, &battle.seed, &config).unwrap();

            let settled = BattleRecord::Pending(battle).outcome(&config).unwrap();
            assert_eq!(settled, direct);
        }
    }

    #[test]
    fn test_settle_resolved_is_unchanged() {
        let config = CombatConfig::default();
        let resolved = BattleRecord::Pending(pending(BattleMode::Linear))
            .settle(&config)
            .unwrap();
        assert!(!resolved.is_pending());

        let again = resolved.clone().settle(&config).unwrap();
        assert_eq!(again, resolved);
    }

    #[test]
    fn test_settle_propagates_unknown_class() {
        let config = CombatConfig::default();
        let mut battle = pending(BattleMode::Linear);
        battle.attacker.class = "monk".to_string();

        let record = BattleRecord::Pending(battle);
        assert_eq!(record.seed().as_str(), "legacy-battle-7");
        assert!(record.settle(&config).is_err());
    }
}

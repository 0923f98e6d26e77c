//! Battle inputs and results shared by both resolvers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::progression::SkillPoints;

/// Opaque string that fully determines a battle's random draws.
///
/// Generated and persisted by the caller so any battle can be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleSeed(String);

impl BattleSeed {
    /// Fresh random seed (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BattleSeed {
    fn from(seed: &str) -> Self {
        Self(seed.to_string())
    }
}

impl From<String> for BattleSeed {
    fn from(seed: String) -> Self {
        Self(seed)
    }
}

impl fmt::Display for BattleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a character's combat-relevant state, supplied per battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub id: u64,
    pub level: u32,
    #[serde(default)]
    pub skills: SkillPoints,
    pub current_health: u32,
    pub max_health: u32,
    #[serde(default)]
    pub current_stamina: u32,
    #[serde(default)]
    pub equipment_attack: u64,
    #[serde(default)]
    pub equipment_defense: u64,
    /// Total clan size; the probabilistic resolver caps how many are usable.
    #[serde(default)]
    pub clan_members: u32,
    #[serde(default)]
    pub banked_currency: u64,
    #[serde(default)]
    pub unbanked_currency: u64,
    pub class: String,
}

/// Input to the linear resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub class: String,
}

impl Fighter {
    pub fn new(hp: u32, atk: u32, def: u32, class: impl Into<String>) -> Self {
        Self {
            hp,
            atk,
            def,
            class: class.into(),
        }
    }

    /// Linear-mode view of a character: current health and skill investment.
    pub fn from_stats(stats: &CombatStats) -> Self {
        Self {
            hp: stats.current_health,
            atk: stats.skills.attack,
            def: stats.skills.defense,
            class: stats.class.clone(),
        }
    }
}

/// Outcome of a linear ("game") battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBattleResult {
    pub damage: u32,
    pub killed: bool,
    pub attacker_wins: bool,
    pub defender_wins: bool,
    pub defender_health_after: u32,
    pub xp_awarded: u64,
    /// Damage multiplier drawn for this battle.
    pub jitter: f64,
}

/// Outcome of a probabilistic ("storm8") battle, with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticBattleResult {
    pub attack_power: f64,
    pub defense_power: f64,
    /// Noise added to each power, in power units.
    pub attack_variance: f64,
    pub defense_variance: f64,
    pub effective_attack: f64,
    pub effective_defense: f64,
    pub damage: u64,
    pub attacker_won: bool,
    pub killed: bool,
    /// The low-health protection rule nullified this attack.
    pub protected: bool,
    pub currency_stolen: u64,
    pub defender_health_after: u32,
    pub xp_awarded: u64,
}

/// Win/loss/kill/death increments for one side of a battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophyCounts {
    pub wins: u32,
    pub losses: u32,
    pub kills: u32,
    pub deaths: u32,
}

/// Trophy increments for both sides of a battle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophyDelta {
    pub attacker: TrophyCounts,
    pub defender: TrophyCounts,
}

impl TrophyDelta {
    pub fn is_empty(&self) -> bool {
        *self == TrophyDelta::default()
    }
}

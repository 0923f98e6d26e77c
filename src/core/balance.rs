//! Balance configuration shared by every engine component.
//!
//! All tunable numbers live here (or in the section types owned by the
//! component modules) and are passed into engine calls explicitly, so several
//! balance configurations can run side by side. Every section falls back to
//! its `Default` when omitted from a TOML file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::{ConfigError, EngineError};
use crate::clan::BracketTable;
use crate::offline::OfflineConfig;
use crate::progression::LevelingCurve;
use crate::resources::RegenRates;

// =============================================================================
// COMBAT
// =============================================================================

/// Attack and defense multipliers for one character class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassModifier {
    pub attack: f64,
    pub defense: f64,
}

/// Tunables for both battle resolvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Fraction of effective defense that offsets attack (linear mode).
    pub mitigation: f64,

    /// Half-width of the linear damage jitter, as a fraction (0.05 = ±5%).
    pub jitter: f64,

    /// Per-class multipliers (linear mode). Unknown classes are an error.
    pub class_modifiers: BTreeMap<String, ClassModifier>,

    /// Half-width of the power noise, in percent of base power (probabilistic mode).
    pub variance_percent: f64,

    /// Defenders at or below this health (and above 0) cannot be attacked
    /// outside hitlist battles.
    pub protection_threshold: u32,

    /// Percent of the victim's unbanked currency taken on a win, before the damage bonus.
    pub steal_percent: f64,

    /// Usable clan members granted per character level.
    pub clan_members_per_level: u32,

    /// XP granted to an attacker who wins.
    pub win_xp: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        let class_modifiers = [
            ("warrior", 1.10, 1.00),
            ("rogue", 1.20, 0.90),
            ("mage", 1.30, 0.80),
            ("guardian", 0.90, 1.25),
        ]
        .into_iter()
        .map(|(name, attack, defense)| (name.to_string(), ClassModifier { attack, defense }))
        .collect();

        Self {
            mitigation: 0.5,
            jitter: 0.05,
            class_modifiers,
            variance_percent: 15.0,
            protection_threshold: 26,
            steal_percent: 10.0,
            clan_members_per_level: 5,
            win_xp: 10,
        }
    }
}

impl CombatConfig {
    /// Looks up a class modifier, failing on unknown tags.
    pub fn class_modifier(&self, class: &str) -> Result<ClassModifier, EngineError> {
        self.class_modifiers
            .get(class)
            .copied()
            .ok_or_else(|| EngineError::UnknownClass(class.to_string()))
    }
}

// =============================================================================
// AGGREGATE
// =============================================================================

/// Complete balance configuration passed into engine calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub combat: CombatConfig,
    pub leveling: LevelingCurve,
    pub brackets: BracketTable,
    pub regen: RegenRates,
    pub offline: OfflineConfig,
}

impl BalanceConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BalanceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Checks every value the engine relies on being in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let combat = &self.combat;
        if !(0.0..=1.0).contains(&combat.mitigation) {
            return Err(ConfigError::invalid(
                "combat.mitigation",
                format!("{} is outside 0..=1", combat.mitigation),
            ));
        }
        if !(0.0..1.0).contains(&combat.jitter) {
            return Err(ConfigError::invalid(
                "combat.jitter",
                format!("{} is outside 0..1", combat.jitter),
            ));
        }
        if !(0.0..=100.0).contains(&combat.variance_percent) {
            return Err(ConfigError::invalid(
                "combat.variance_percent",
                format!("{} is outside 0..=100", combat.variance_percent),
            ));
        }
        if !(0.0..=100.0).contains(&combat.steal_percent) {
            return Err(ConfigError::invalid(
                "combat.steal_percent",
                format!("{} is outside 0..=100", combat.steal_percent),
            ));
        }
        for (class, modifier) in &combat.class_modifiers {
            if modifier.attack < 0.0 || modifier.defense < 0.0 {
                return Err(ConfigError::invalid(
                    "combat.class_modifiers",
                    format!("class {} has a negative multiplier", class),
                ));
            }
        }

        self.leveling.validate()?;
        self.brackets.validate()?;
        self.offline.validate()?;
        Ok(())
    }
}

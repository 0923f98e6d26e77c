//! Exponential XP curve, stat-point awards and milestone achievements.
//!
//! XP is cumulative: a character at level `L` with total XP of at least
//! `xp_for_level(L + 1)` is due a level-up. Thresholds are computed in `f64`
//! and floored into `u64`; at the default level cap the largest threshold is
//! around 10^12, far inside the range where `f64` represents integers exactly.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

/// Result of applying XP to a character whose level advanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpResult {
    pub new_level: u32,
    pub points_gained: u32,
    /// Every milestone level crossed, in ascending order.
    pub achievements_earned: Vec<u32>,
}

/// Leveling constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingCurve {
    /// XP required to go from level 1 to level 2, before growth.
    pub base_xp: f64,
    /// Per-level growth factor of the threshold.
    pub growth: f64,
    pub max_level: u32,
    /// Stat points granted on every level-up.
    pub points_per_level: u32,
    /// Extra stat points granted when the new level is a multiple of `bonus_every`.
    pub bonus_points: u32,
    pub bonus_every: u32,
    /// Achievement milestones fall on every multiple of this level.
    pub milestone_interval: u32,
}

impl Default for LevelingCurve {
    fn default() -> Self {
        Self {
            base_xp: 100.0,
            growth: 1.08,
            max_level: 300,
            points_per_level: 5,
            bonus_points: 5,
            bonus_every: 5,
            milestone_interval: 25,
        }
    }
}

impl LevelingCurve {
    /// Cumulative XP required to reach `level`. Level 1 (and below) needs none.
    pub fn xp_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            return 0;
        }
        let exponent = f64::from(level - 1);
        (self.base_xp * self.growth.powf(exponent)).floor() as u64
    }

    /// Stat points awarded for arriving at `new_level`.
    pub fn points_for_level(&self, new_level: u32) -> u32 {
        let bonus = if self.bonus_every > 0 && new_level % self.bonus_every == 0 {
            self.bonus_points
        } else {
            0
        };
        self.points_per_level + bonus
    }

    /// Whether reaching `level` earns a milestone achievement.
    pub fn is_milestone(&self, level: u32) -> bool {
        self.milestone_interval > 0 && level % self.milestone_interval == 0
    }

    /// All milestone levels up to the cap.
    pub fn milestones(&self) -> Vec<u32> {
        (1..=self.max_level).filter(|&l| self.is_milestone(l)).collect()
    }

    /// Total stat points a character has earned by reaching `level` from level 1.
    pub fn total_points_for_level(&self, level: u32) -> u32 {
        (2..=level.min(self.max_level))
            .map(|l| self.points_for_level(l))
            .sum()
    }

    /// Advances `current_level` as far as `current_xp` allows.
    ///
    /// Returns `None` when the level does not change. A large grant can cross
    /// several levels and several milestones in one call; all of them are
    /// reported.
    pub fn check_for_level_up(&self, current_level: u32, current_xp: u64) -> Option<LevelUpResult> {
        let mut level = current_level;
        let mut points_gained = 0;
        let mut achievements_earned = Vec::new();

        while level < self.max_level && current_xp >= self.xp_for_level(level + 1) {
            level += 1;
            points_gained += self.points_for_level(level);
            if self.is_milestone(level) {
                achievements_earned.push(level);
            }
        }

        if level == current_level {
            return None;
        }

        Some(LevelUpResult {
            new_level: level,
            points_gained,
            achievements_earned,
        })
    }

    /// Level implied by a cumulative XP total, starting from level 1.
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        self.check_for_level_up(1, xp)
            .map(|result| result.new_level)
            .unwrap_or(1)
    }

    /// XP still needed to reach the next level, or `None` at the cap.
    pub fn xp_to_next_level(&self, level: u32, xp: u64) -> Option<u64> {
        if level >= self.max_level {
            return None;
        }
        Some(self.xp_for_level(level + 1).saturating_sub(xp))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level == 0 {
            return Err(ConfigError::invalid("leveling.max_level", "must be at least 1"));
        }
        if self.growth <= 1.0 {
            return Err(ConfigError::invalid(
                "leveling.growth",
                format!("{} must be greater than 1", self.growth),
            ));
        }
        if self.base_xp < 1.0 {
            return Err(ConfigError::invalid(
                "leveling.base_xp",
                format!("{} must be at least 1", self.base_xp),
            ));
        }
        let top = self.base_xp * self.growth.powf(f64::from(self.max_level - 1));
        if top >= 2f64.powi(53) {
            return Err(ConfigError::invalid(
                "leveling",
                "thresholds near the level cap exceed exact integer precision",
            ));
        }
        Ok(())
    }
}

//! Stat-point economy: points earned from level-ups and spent on skills.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::leveling::LevelUpResult;
use crate::core::error::EngineError;

/// Skills a player can invest stat points in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Attack,
    Defense,
    Health,
    Energy,
    Stamina,
}

impl Skill {
    pub fn all() -> [Skill; 5] {
        [
            Skill::Attack,
            Skill::Defense,
            Skill::Health,
            Skill::Energy,
            Skill::Stamina,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Attack => "attack",
            Skill::Defense => "defense",
            Skill::Health => "health",
            Skill::Energy => "energy",
            Skill::Stamina => "stamina",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Points invested per skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPoints {
    pub attack: u32,
    pub defense: u32,
    pub health: u32,
    pub energy: u32,
    pub stamina: u32,
}

impl SkillPoints {
    pub fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Attack => self.attack,
            Skill::Defense => self.defense,
            Skill::Health => self.health,
            Skill::Energy => self.energy,
            Skill::Stamina => self.stamina,
        }
    }

    fn get_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::Attack => &mut self.attack,
            Skill::Defense => &mut self.defense,
            Skill::Health => &mut self.health,
            Skill::Energy => &mut self.energy,
            Skill::Stamina => &mut self.stamina,
        }
    }

    pub fn total(&self) -> u32 {
        Skill::all()
            .iter()
            .fold(0u32, |sum, &s| sum.saturating_add(self.get(s)))
    }
}

/// Earned and allocated stat points for one character.
///
/// Allocation can never spend more than has been earned. Deserialization
/// goes through [`StatPoints::from_parts`], so persisted records obey it too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredStatPoints")]
pub struct StatPoints {
    earned: u32,
    allocated: SkillPoints,
}

/// Unchecked wire form of [`StatPoints`].
#[derive(Deserialize)]
struct StoredStatPoints {
    earned: u32,
    allocated: SkillPoints,
}

impl TryFrom<StoredStatPoints> for StatPoints {
    type Error = EngineError;

    fn try_from(stored: StoredStatPoints) -> Result<Self, Self::Error> {
        Self::from_parts(stored.earned, stored.allocated)
    }
}

impl StatPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a persisted record, rejecting one whose allocations exceed its earnings.
    pub fn from_parts(earned: u32, allocated: SkillPoints) -> Result<Self, EngineError> {
        let spent: u64 = Skill::all().iter().map(|&s| u64::from(allocated.get(s))).sum();
        if spent > u64::from(earned) {
            // Report against the skill with the largest allocation
            let skill = Skill::all()
                .into_iter()
                .max_by_key(|&s| allocated.get(s))
                .unwrap_or(Skill::Attack);
            return Err(EngineError::InsufficientStatPoints {
                skill,
                requested: allocated.total(),
                available: earned,
            });
        }
        Ok(Self { earned, allocated })
    }

    pub fn earned(&self) -> u32 {
        self.earned
    }

    pub fn spent(&self) -> u32 {
        self.allocated.total()
    }

    pub fn unspent(&self) -> u32 {
        self.earned.saturating_sub(self.spent())
    }

    pub fn allocated(&self) -> &SkillPoints {
        &self.allocated
    }

    /// Credits freshly earned points.
    pub fn award(&mut self, points: u32) {
        self.earned = self.earned.saturating_add(points);
    }

    /// Credits the points from a level-up.
    pub fn apply_level_up(&mut self, result: &LevelUpResult) {
        self.award(result.points_gained);
    }

    /// Invests `points` unspent points in `skill`.
    pub fn allocate(&mut self, skill: Skill, points: u32) -> Result<(), EngineError> {
        let available = self.unspent();
        if points > available {
            return Err(EngineError::InsufficientStatPoints {
                skill,
                requested: points,
                available,
            });
        }
        *self.allocated.get_mut(skill) += points;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_nothing_to_spend() {
        let mut points = StatPoints::new();
        assert_eq!(points.unspent(), 0);
        assert!(points.allocate(Skill::Attack, 1).is_err());
    }

    #[test]
    fn test_allocate_within_budget() {
        let mut points = StatPoints::new();
        points.award(10);

        points.allocate(Skill::Attack, 4).unwrap();
        points.allocate(Skill::Stamina, 6).unwrap();

        assert_eq!(points.spent(), 10);
        assert_eq!(points.unspent(), 0);
        assert_eq!(points.allocated().attack, 4);
        assert_eq!(points.allocated().stamina, 6);
    }

    #[test]
    fn test_overspend_is_rejected_without_change() {
        let mut points = StatPoints::new();
        points.award(5);
        points.allocate(Skill::Defense, 3).unwrap();

        let err = points.allocate(Skill::Health, 3).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientStatPoints {
                skill: Skill::Health,
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(points.allocated().health, 0);
        assert_eq!(points.spent(), 3);
    }

    #[test]
    fn test_apply_level_up_credits_points() {
        let mut points = StatPoints::new();
        points.apply_level_up(&LevelUpResult {
            new_level: 5,
            points_gained: 25,
            achievements_earned: vec![],
        });
        assert_eq!(points.earned(), 25);
    }

    #[test]
    fn test_from_parts_rejects_overspent_record() {
        let allocated = SkillPoints {
            attack: 8,
            defense: 4,
            ..Default::default()
        };
        assert!(StatPoints::from_parts(10, allocated).is_err());
        assert!(StatPoints::from_parts(12, allocated).is_ok());
    }

    #[test]
    fn test_deserialize_rejects_overspent_record() {
        let json = r#"{"earned":5,"allocated":{"attack":9,"defense":0,"health":0,"energy":0,"stamina":0}}"#;
        let err = serde_json::from_str::<StatPoints>(json).unwrap_err();
        assert!(err.to_string().contains("cannot spend"), "unexpected error: {}", err);

        let json = r#"{"earned":9,"allocated":{"attack":9,"defense":0,"health":0,"energy":0,"stamina":0}}"#;
        let points: StatPoints = serde_json::from_str(json).unwrap();
        assert_eq!(points.unspent(), 0);
        assert_eq!(serde_json::from_str::<StatPoints>(&serde_json::to_string(&points).unwrap()).unwrap(), points);
    }

    #[test]
    fn test_total_saturates_on_extreme_values() {
        let allocated = SkillPoints {
            attack: u32::MAX,
            defense: u32::MAX,
            ..Default::default()
        };
        assert_eq!(allocated.total(), u32::MAX);
        assert!(StatPoints::from_parts(u32::MAX, allocated).is_err());

        let single = SkillPoints {
            attack: u32::MAX,
            ..Default::default()
        };
        assert!(StatPoints::from_parts(u32::MAX, single).is_ok());
    }

    #[test]
    fn test_skill_display() {
        assert_eq!(Skill::Energy.to_string(), "energy");
    }
}

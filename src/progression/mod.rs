//! Character progression: the leveling curve and the stat-point economy.

pub mod leveling;
pub mod progress;
pub mod stat_points;

pub use leveling::{LevelUpResult, LevelingCurve};
pub use progress::CharacterProgress;
pub use stat_points::{Skill, SkillPoints, StatPoints};

//! A character's level, cumulative XP and stat points, updated together.

use serde::{Deserialize, Serialize};

use super::leveling::{LevelUpResult, LevelingCurve};
use super::stat_points::StatPoints;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProgress {
    pub level: u32,
    pub xp: u64,
    #[serde(default)]
    pub stat_points: StatPoints,
}

impl Default for CharacterProgress {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            stat_points: StatPoints::new(),
        }
    }
}

impl CharacterProgress {
    /// Adds XP and applies any resulting level-up, crediting its stat points.
    ///
    /// XP only ever grows; it saturates rather than wrapping.
    pub fn grant_xp(&mut self, xp: u64, curve: &LevelingCurve) -> Option<LevelUpResult> {
        self.xp = self.xp.saturating_add(xp);

        let result = curve.check_for_level_up(self.level, self.xp)?;
        self.level = result.new_level;
        self.stat_points.apply_level_up(&result);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_without_level_up() {
        let curve = LevelingCurve::default();
        let mut progress = CharacterProgress::default();

        assert!(progress.grant_xp(50, &curve).is_none());
        assert_eq!(progress.xp, 50);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.stat_points.earned(), 0);
    }

    #[test]
    fn test_grant_with_level_up_credits_points() {
        let curve = LevelingCurve::default();
        let mut progress = CharacterProgress::default();

        let result = progress.grant_xp(curve.xp_for_level(5), &curve).unwrap();

        assert_eq!(progress.level, 5);
        assert_eq!(result.points_gained, 25);
        assert_eq!(progress.stat_points.earned(), 25);
        assert_eq!(progress.stat_points.unspent(), 25);
    }

    #[test]
    fn test_repeated_grants_accumulate() {
        let curve = LevelingCurve::default();
        let mut progress = CharacterProgress::default();

        for _ in 0..100 {
            progress.grant_xp(37, &curve);
        }
        assert_eq!(progress.xp, 3700);
        assert_eq!(progress.level, curve.level_for_xp(3700));
        assert_eq!(progress.stat_points.earned(), curve.total_points_for_level(progress.level));
    }
}

//! Clan-size brackets used to gate matchmaking visibility.
//!
//! Brackets only decide who may see and attack whom; they never feed into
//! combat math.

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

/// Ascending bracket ceilings plus the rounding unit for clans past the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketTable {
    pub steps: Vec<u32>,
    pub overflow_unit: u32,
}

impl Default for BracketTable {
    fn default() -> Self {
        Self {
            steps: (4..=99).step_by(5).collect(),
            overflow_unit: 100,
        }
    }
}

impl BracketTable {
    /// Bracket for a clan of `size` members.
    ///
    /// The first step at or above `size`, or `size` rounded up to the next
    /// multiple of `overflow_unit` once the table is exhausted. Sizes whose
    /// rounded bracket would not fit in a `u32` share the `u32::MAX` bracket.
    pub fn bracket(&self, size: u32) -> u32 {
        if let Some(&step) = self.steps.iter().find(|&&step| step >= size) {
            return step;
        }
        size.div_ceil(self.overflow_unit)
            .checked_mul(self.overflow_unit)
            .unwrap_or(u32::MAX)
    }

    /// Whether two clans fall in the same bracket.
    pub fn same_bracket(&self, a: u32, b: u32) -> bool {
        self.bracket(a) == self.bracket(b)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::invalid("brackets.steps", "must not be empty"));
        }
        if self.steps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "brackets.steps",
                "must be strictly ascending",
            ));
        }
        if self.overflow_unit == 0 {
            return Err(ConfigError::invalid(
                "brackets.overflow_unit",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_steps() {
        let table = BracketTable::default();
        assert_eq!(table.steps.len(), 20);
        assert_eq!(table.steps[0], 4);
        assert_eq!(table.steps[19], 99);
    }

    #[test]
    fn test_bracket_within_steps() {
        let table = BracketTable::default();
        assert_eq!(table.bracket(0), 4);
        assert_eq!(table.bracket(1), 4);
        assert_eq!(table.bracket(4), 4);
        assert_eq!(table.bracket(5), 9);
        assert_eq!(table.bracket(50), 54);
        assert_eq!(table.bracket(99), 99);
    }

    #[test]
    fn test_bracket_merges_into_hundreds() {
        let table = BracketTable::default();
        assert_eq!(table.bracket(100), 100);
        assert_eq!(table.bracket(101), 200);
        assert_eq!(table.bracket(250), 300);
        assert_eq!(table.bracket(1000), 1000);
    }

    #[test]
    fn test_bracket_saturates_near_max_size() {
        let table = BracketTable::default();
        assert_eq!(table.bracket(u32::MAX), u32::MAX);
        assert_eq!(table.bracket(u32::MAX - 50), u32::MAX);
        // Largest multiple of 100 that fits
        assert_eq!(table.bracket(4_294_967_200), 4_294_967_200);
        assert!(table.same_bracket(u32::MAX, 4_294_967_201));
    }

    #[test]
    fn test_same_bracket() {
        let table = BracketTable::default();
        assert!(table.same_bracket(5, 9));
        assert!(!table.same_bracket(4, 5));
        assert!(table.same_bracket(150, 200));
        assert!(!table.same_bracket(99, 100));
    }

    #[test]
    fn test_custom_table() {
        let table = BracketTable {
            steps: vec![10, 50],
            overflow_unit: 25,
        };
        assert_eq!(table.bracket(11), 50);
        assert_eq!(table.bracket(51), 75);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_steps() {
        let table = BracketTable {
            steps: vec![9, 4],
            overflow_unit: 100,
        };
        assert!(table.validate().is_err());
    }
}

//! Storage seam for the offline accrual scheduler.
//!
//! Persistence belongs to the caller. A store must apply each grant as one
//! unit (ledger row, XP, level) and must refuse a grant whose high-water mark
//! no longer matches, which is how overlapping scheduler runs are kept from
//! crediting the same window twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use super::ledger::{CharacterId, Ledger, LedgerEntry};
use crate::core::error::EngineError;
use crate::progression::{CharacterProgress, LevelUpResult, LevelingCurve};

/// Errors raised by an [`AccrualStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer appended to the ledger since it was read.
    #[error("ledger for character {character_id} moved from {expected:?} to {found:?}")]
    Conflict {
        character_id: CharacterId,
        expected: Option<DateTime<Utc>>,
        found: Option<DateTime<Utc>>,
    },

    #[error("character {0} not found")]
    NotFound(CharacterId),

    /// The grant would break the ledger's ordering rules.
    #[error("ledger error: {0}")]
    Ledger(#[from] EngineError),

    /// Any failure inside the backing storage.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// What the scheduler reads about a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualCharacter {
    pub id: CharacterId,
    pub created_at: DateTime<Utc>,
    pub progress: CharacterProgress,
}

/// A grant to apply atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualGrant {
    pub entry: LedgerEntry,
    /// High-water mark observed when the award was computed.
    pub expected_high_water: Option<DateTime<Utc>>,
}

/// Persistence used by the scheduler.
pub trait AccrualStore {
    /// Every character eligible for offline accrual.
    fn character_ids(&self) -> Result<Vec<CharacterId>, StoreError>;

    /// Reads a character and its ledger.
    fn load(&self, id: CharacterId) -> Result<(AccrualCharacter, Ledger), StoreError>;

    /// Appends the ledger entry, adds its XP and applies any level-up, all
    /// or nothing. Must fail with [`StoreError::Conflict`] if the ledger's
    /// high-water mark differs from `grant.expected_high_water`.
    fn commit(&self, grant: &AccrualGrant, curve: &LevelingCurve) -> Result<Option<LevelUpResult>, StoreError>;
}

/// A character as held by [`MemoryStore`] and its JSON snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCharacter {
    pub id: CharacterId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: CharacterProgress,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
}

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub characters: Vec<StoredCharacter>,
}

#[derive(Debug)]
struct MemoryRecord {
    created_at: DateTime<Utc>,
    progress: CharacterProgress,
    ledger: Ledger,
}

/// In-memory [`AccrualStore`]. Each commit runs under one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<CharacterId, MemoryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<CharacterId, MemoryRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    /// Adds (or replaces) a character with an empty ledger.
    pub fn insert_character(
        &self,
        id: CharacterId,
        created_at: DateTime<Utc>,
        progress: CharacterProgress,
    ) -> Result<(), StoreError> {
        self.lock()?.insert(
            id,
            MemoryRecord {
                created_at,
                progress,
                ledger: Ledger::new(id),
            },
        );
        Ok(())
    }

    /// Builds a store from a snapshot, validating every ledger.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut records = BTreeMap::new();
        for character in snapshot.characters {
            let ledger = Ledger::from_entries(character.id, character.ledger)?;
            records.insert(
                character.id,
                MemoryRecord {
                    created_at: character.created_at,
                    progress: character.progress,
                    ledger,
                },
            );
        }
        Ok(Self {
            records: Mutex::new(records),
        })
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let records = self.lock()?;
        let characters = records
            .iter()
            .map(|(&id, record)| StoredCharacter {
                id,
                created_at: record.created_at,
                progress: record.progress.clone(),
                ledger: record.ledger.entries().to_vec(),
            })
            .collect();
        Ok(StoreSnapshot { characters })
    }
}

impl AccrualStore for MemoryStore {
    fn character_ids(&self) -> Result<Vec<CharacterId>, StoreError> {
        Ok(self.lock()?.keys().copied().collect())
    }

    fn load(&self, id: CharacterId) -> Result<(AccrualCharacter, Ledger), StoreError> {
        let records = self.lock()?;
        let record = records.get(&id).ok_or(StoreError::NotFound(id))?;
        let character = AccrualCharacter {
            id,
            created_at: record.created_at,
            progress: record.progress.clone(),
        };
        Ok((character, record.ledger.clone()))
    }

    fn commit(&self, grant: &AccrualGrant, curve: &LevelingCurve) -> Result<Option<LevelUpResult>, StoreError> {
        let mut records = self.lock()?;
        let id = grant.entry.character_id;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        let found = record.ledger.high_water_mark();
        if found != grant.expected_high_water {
            return Err(StoreError::Conflict {
                character_id: id,
                expected: grant.expected_high_water,
                found,
            });
        }

        // Ledger first: if the append is rejected nothing else changes
        record.ledger.append(grant.entry.clone())?;
        Ok(record.progress.grant_xp(grant.entry.xp_awarded, curve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn grant(id: CharacterId, from: i64, to: i64, xp: u64, expected: Option<i64>) -> AccrualGrant {
        AccrualGrant {
            entry: LedgerEntry {
                character_id: id,
                from_ts: t(from),
                to_ts: t(to),
                xp_awarded: xp,
                created_at: t(to),
            },
            expected_high_water: expected.map(t),
        }
    }

    #[test]
    fn test_commit_applies_ledger_and_xp() {
        let store = MemoryStore::new();
        store.insert_character(1, t(0), CharacterProgress::default()).unwrap();
        let curve = LevelingCurve::default();

        let level_up = store.commit(&grant(1, 0, 4, 200, None), &curve).unwrap();

        let (character, ledger) = store.load(1).unwrap();
        assert_eq!(character.progress.xp, 200);
        assert_eq!(ledger.high_water_mark(), Some(t(4)));
        assert_eq!(level_up.unwrap().new_level, character.progress.level);
    }

    #[test]
    fn test_stale_commit_conflicts() {
        let store = MemoryStore::new();
        store.insert_character(1, t(0), CharacterProgress::default()).unwrap();
        let curve = LevelingCurve::default();

        store.commit(&grant(1, 0, 4, 40, None), &curve).unwrap();
        // A second run that read the ledger before the first commit
        let err = store.commit(&grant(1, 0, 5, 50, None), &curve).unwrap_err();

        assert!(matches!(err, StoreError::Conflict { character_id: 1, .. }));
        let (character, ledger) = store.load(1).unwrap();
        assert_eq!(character.progress.xp, 40);
        assert_eq!(ledger.entries().len(), 1);
    }

    #[test]
    fn test_rejected_append_leaves_xp_untouched() {
        let store = MemoryStore::new();
        store.insert_character(1, t(0), CharacterProgress::default()).unwrap();
        let curve = LevelingCurve::default();
        store.commit(&grant(1, 0, 4, 40, None), &curve).unwrap();

        let err = store.commit(&grant(1, 3, 6, 30, Some(4)), &curve).unwrap_err();

        assert!(matches!(err, StoreError::Ledger(EngineError::LedgerOverlap { .. })));
        assert_eq!(store.load(1).unwrap().0.progress.xp, 40);
    }

    #[test]
    fn test_unknown_character() {
        let store = MemoryStore::new();
        assert!(matches!(store.load(99), Err(StoreError::NotFound(99))));
        assert!(matches!(
            store.commit(&grant(99, 0, 1, 1, None), &LevelingCurve::default()),
            Err(StoreError::NotFound(99))
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = MemoryStore::new();
        store.insert_character(2, t(0), CharacterProgress::default()).unwrap();
        store.insert_character(1, t(1), CharacterProgress::default()).unwrap();
        store.commit(&grant(1, 1, 3, 10, None), &LevelingCurve::default()).unwrap();

        let snapshot = store.snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = MemoryStore::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored.snapshot().unwrap(), snapshot);
        assert_eq!(restored.character_ids().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_snapshot_with_overspent_points_rejected() {
        let json = r#"{"characters":[{
            "id": 3,
            "created_at": "2024-06-01T00:00:00Z",
            "progress": {
                "level": 1,
                "xp": 0,
                "stat_points": {
                    "earned": 0,
                    "allocated": {"attack": 50, "defense": 0, "health": 0, "energy": 0, "stamina": 0}
                }
            }
        }]}"#;
        assert!(serde_json::from_str::<StoreSnapshot>(json).is_err());

        let fixed = json.replace(r#""earned": 0"#, r#""earned": 50"#);
        let snapshot: StoreSnapshot = serde_json::from_str(&fixed).unwrap();
        let store = MemoryStore::from_snapshot(snapshot).unwrap();
        assert_eq!(store.load(3).unwrap().0.progress.stat_points.unspent(), 0);
    }

    #[test]
    fn test_snapshot_with_overlapping_ledger_rejected() {
        let entry = |from: i64, to: i64| LedgerEntry {
            character_id: 5,
            from_ts: t(from),
            to_ts: t(to),
            xp_awarded: 1,
            created_at: t(to),
        };
        let snapshot = StoreSnapshot {
            characters: vec![StoredCharacter {
                id: 5,
                created_at: t(0),
                progress: CharacterProgress::default(),
                ledger: vec![entry(0, 5), entry(2, 6)],
            }],
        };
        assert!(matches!(
            MemoryStore::from_snapshot(snapshot),
            Err(StoreError::Ledger(_))
        ));
    }
}

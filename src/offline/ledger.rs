//! Append-only ledger of offline XP grants.
//!
//! Each entry covers a wall-clock window `[from_ts, to_ts]`. Windows for one
//! character never overlap and only move forward in time, which is what
//! stops the same interval from being credited twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

pub type CharacterId = u64;

/// One offline XP grant. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub character_id: CharacterId,
    pub from_ts: DateTime<Utc>,
    pub to_ts: DateTime<Utc>,
    pub xp_awarded: u64,
    pub created_at: DateTime<Utc>,
}

/// The ordered grant history of a single character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    character_id: CharacterId,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new(character_id: CharacterId) -> Self {
        Self {
            character_id,
            entries: Vec::new(),
        }
    }

    /// Rebuilds a ledger from stored rows, checking they form a valid history.
    pub fn from_entries(character_id: CharacterId, entries: Vec<LedgerEntry>) -> Result<Self, EngineError> {
        let mut ledger = Self::new(character_id);
        for entry in entries {
            ledger.append(entry)?;
        }
        Ok(ledger)
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the most recent credited window.
    pub fn high_water_mark(&self) -> Option<DateTime<Utc>> {
        self.entries.last().map(|e| e.to_ts)
    }

    /// XP from entries created strictly after `since`.
    pub fn xp_awarded_since(&self, since: DateTime<Utc>) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.created_at > since)
            .map(|e| e.xp_awarded)
            .sum()
    }

    pub fn total_xp_awarded(&self) -> u64 {
        self.entries.iter().map(|e| e.xp_awarded).sum()
    }

    /// Appends an entry whose window starts at or after the high-water mark.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), EngineError> {
        if entry.character_id != self.character_id {
            return Err(EngineError::LedgerOwnerMismatch {
                entry: entry.character_id,
                ledger: self.character_id,
            });
        }
        if entry.to_ts < entry.from_ts {
            return Err(EngineError::ReversedWindow {
                from: entry.from_ts,
                to: entry.to_ts,
            });
        }
        if let Some(high_water) = self.high_water_mark() {
            if entry.from_ts < high_water {
                return Err(EngineError::LedgerOverlap {
                    from: entry.from_ts,
                    to: entry.to_ts,
                    high_water,
                });
            }
        }
        self.entries.push(entry);
        Ok(())
    }
}

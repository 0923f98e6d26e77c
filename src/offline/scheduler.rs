//! Periodic idle-XP grants.
//!
//! The trigger is external: something calls [`run_cycle`] once per
//! scheduling period. Each character is credited for the time since its
//! ledger's high-water mark (or its creation), capped per burst and per
//! trailing day.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::{CharacterId, Ledger, LedgerEntry};
use super::store::{AccrualCharacter, AccrualGrant, AccrualStore, StoreError};
use crate::core::error::ConfigError;
use crate::progression::{LevelUpResult, LevelingCurve};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Offline accrual tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    pub xp_per_hour: f64,
    /// Most XP one character may receive in any trailing cap window.
    pub daily_cap: u64,
    /// Longest stretch of offline time credited in one grant.
    pub max_catchup_hours: f64,
    pub cap_window_hours: i64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            xp_per_hour: 50.0,
            daily_cap: 600,
            max_catchup_hours: 24.0,
            cap_window_hours: 24,
        }
    }
}

impl OfflineConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.xp_per_hour < 0.0 {
            return Err(ConfigError::invalid(
                "offline.xp_per_hour",
                format!("{} is negative", self.xp_per_hour),
            ));
        }
        if self.max_catchup_hours < 0.0 {
            return Err(ConfigError::invalid(
                "offline.max_catchup_hours",
                format!("{} is negative", self.max_catchup_hours),
            ));
        }
        if self.cap_window_hours <= 0 {
            return Err(ConfigError::invalid(
                "offline.cap_window_hours",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// What one character is due at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualPlan {
    /// Start of the uncredited window.
    pub last_update: DateTime<Utc>,
    pub hours_passed: f64,
    pub earned_in_window: u64,
    /// XP to grant; zero when nothing is due.
    pub award: u64,
    pub cap_reached: bool,
}

/// Computes the award for one character without touching storage.
pub fn plan_accrual(
    character: &AccrualCharacter,
    ledger: &Ledger,
    config: &OfflineConfig,
    now: DateTime<Utc>,
) -> AccrualPlan {
    let last_update = ledger
        .high_water_mark()
        .map_or(character.created_at, |hw| hw.max(character.created_at));

    let elapsed_secs = (now - last_update).num_milliseconds() as f64 / 1000.0;
    let hours_passed = (elapsed_secs / SECONDS_PER_HOUR).clamp(0.0, config.max_catchup_hours);

    let window_start = now - Duration::hours(config.cap_window_hours);
    let earned_in_window = ledger.xp_awarded_since(window_start);

    if earned_in_window >= config.daily_cap {
        return AccrualPlan {
            last_update,
            hours_passed,
            earned_in_window,
            award: 0,
            cap_reached: true,
        };
    }

    let potential = (hours_passed * config.xp_per_hour).floor() as u64;
    let award = potential.min(config.daily_cap - earned_in_window);

    AccrualPlan {
        last_update,
        hours_passed,
        earned_in_window,
        award,
        cap_reached: false,
    }
}

/// A character whose processing failed during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualFailure {
    pub character_id: CharacterId,
    pub error: String,
}

/// Summary of one scheduler cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub processed: u32,
    pub awarded: u32,
    pub capped: u32,
    pub xp_granted: u64,
    pub level_ups: Vec<(CharacterId, LevelUpResult)>,
    pub failures: Vec<AccrualFailure>,
}

enum CharacterOutcome {
    Awarded(u64, Option<LevelUpResult>),
    Capped,
    NothingDue,
}

fn process_character(
    store: &impl AccrualStore,
    id: CharacterId,
    curve: &LevelingCurve,
    config: &OfflineConfig,
    now: DateTime<Utc>,
) -> Result<CharacterOutcome, StoreError> {
    let (character, ledger) = store.load(id)?;
    let plan = plan_accrual(&character, &ledger, config, now);

    if plan.cap_reached {
        return Ok(CharacterOutcome::Capped);
    }
    if plan.award == 0 {
        return Ok(CharacterOutcome::NothingDue);
    }

    let grant = AccrualGrant {
        entry: LedgerEntry {
            character_id: id,
            from_ts: plan.last_update,
            to_ts: now,
            xp_awarded: plan.award,
            created_at: now,
        },
        expected_high_water: ledger.high_water_mark(),
    };
    let level_up = store.commit(&grant, curve)?;

    log::debug!(
        "offline accrual: character {} +{} xp for {:.2}h",
        id,
        plan.award,
        plan.hours_passed
    );
    Ok(CharacterOutcome::Awarded(plan.award, level_up))
}

/// Runs one accrual cycle over every character in `store`.
///
/// Failures are isolated per character: they are logged and reported, and
/// the remaining characters are still processed. Only failing to list the
/// characters aborts the cycle.
pub fn run_cycle(
    store: &impl AccrualStore,
    curve: &LevelingCurve,
    config: &OfflineConfig,
    now: DateTime<Utc>,
) -> Result<CycleReport, StoreError> {
    let mut report = CycleReport::default();

    for id in store.character_ids()? {
        report.processed += 1;
        match process_character(store, id, curve, config, now) {
            Ok(CharacterOutcome::Awarded(xp, level_up)) => {
                report.awarded += 1;
                report.xp_granted += xp;
                if let Some(result) = level_up {
                    report.level_ups.push((id, result));
                }
            }
            Ok(CharacterOutcome::Capped) => report.capped += 1,
            Ok(CharacterOutcome::NothingDue) => {}
            Err(e) => {
                log::warn!("offline accrual failed for character {}: {}", id, e);
                report.failures.push(AccrualFailure {
                    character_id: id,
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "offline accrual cycle: {} processed, {} awarded ({} xp), {} capped, {} failed",
        report.processed,
        report.awarded,
        report.xp_granted,
        report.capped,
        report.failures.len()
    );

    Ok(report)
}

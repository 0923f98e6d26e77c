//! Time-based regeneration of stamina, energy and health.
//!
//! The regen timestamp only advances by whole points, so leftover progress
//! toward the next point carries into the next call. Calling twice over a
//! split interval gives the same result as one call over the whole interval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Regenerating character resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Stamina,
    Energy,
    Health,
}

/// Minutes needed to regenerate one point of each resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenRates {
    pub stamina_minutes: u32,
    pub energy_minutes: u32,
    pub health_minutes: u32,
}

impl Default for RegenRates {
    fn default() -> Self {
        Self {
            stamina_minutes: 3,
            energy_minutes: 5,
            health_minutes: 2,
        }
    }
}

impl RegenRates {
    pub fn minutes_per_point(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Stamina => self.stamina_minutes,
            Resource::Energy => self.energy_minutes,
            Resource::Health => self.health_minutes,
        }
    }
}

/// A regenerating amount and the time its last whole point was credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: u32,
    pub max: u32,
    pub last_regen: DateTime<Utc>,
}

impl ResourcePool {
    pub fn new(current: u32, max: u32, last_regen: DateTime<Utc>) -> Self {
        Self {
            current,
            max,
            last_regen,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

/// Credits every whole point earned between `pool.last_regen` and `now`.
///
/// A zero rate or a non-positive elapsed interval leaves the pool untouched.
/// A pool already at or above `max` is never reduced.
pub fn regenerate(pool: ResourcePool, minutes_per_point: u32, now: DateTime<Utc>) -> ResourcePool {
    if minutes_per_point == 0 {
        return pool;
    }

    let elapsed_ms = (now - pool.last_regen).num_milliseconds();
    if elapsed_ms <= 0 {
        return pool;
    }

    let ms_per_point = i64::from(minutes_per_point) * MILLIS_PER_MINUTE;
    let points_gained = elapsed_ms / ms_per_point;
    if points_gained == 0 {
        return pool;
    }

    let current = if pool.current >= pool.max {
        pool.current
    } else {
        let gained = u32::try_from(points_gained).unwrap_or(u32::MAX);
        pool.current.saturating_add(gained).min(pool.max)
    };

    ResourcePool {
        current,
        max: pool.max,
        last_regen: pool.last_regen + Duration::milliseconds(points_gained * ms_per_point),
    }
}

/// A character's three regenerating pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePools {
    pub stamina: ResourcePool,
    pub energy: ResourcePool,
    pub health: ResourcePool,
}

impl ResourcePools {
    pub fn get(&self, resource: Resource) -> &ResourcePool {
        match resource {
            Resource::Stamina => &self.stamina,
            Resource::Energy => &self.energy,
            Resource::Health => &self.health,
        }
    }
}

/// Regenerates all three pools at their configured rates.
pub fn regenerate_pools(pools: ResourcePools, rates: &RegenRates, now: DateTime<Utc>) -> ResourcePools {
    ResourcePools {
        stamina: regenerate(pools.stamina, rates.minutes_per_point(Resource::Stamina), now),
        energy: regenerate(pools.energy, rates.minutes_per_point(Resource::Energy), now),
        health: regenerate(pools.health, rates.minutes_per_point(Resource::Health), now),
    }
}

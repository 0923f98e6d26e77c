//! Multi-factor power resolver used by "storm8" battles.
//!
//! Attack and defense power combine equipment (scaled by usable clan
//! members) with skill investment (scaled by level). Each side is perturbed
//! independently, the difference is the damage, and a winning attacker
//! steals part of the defender's unbanked currency.
//!
//! Defenders with low but non-zero health are protected from ordinary
//! attacks; hitlist (bounty) battles ignore the protection.

use rand::RngCore;

use super::types::{CombatStats, ProbabilisticBattleResult};
use crate::core::balance::CombatConfig;
use crate::core::rng::unit_float;

/// Theft grows by 1x per this much damage, up to [`MAX_STEAL_MULTIPLIER`].
const DAMAGE_PER_STEAL_BONUS: f64 = 1000.0;
const MAX_STEAL_MULTIPLIER: f64 = 1.5;

/// Clan members a character of `level` can bring to a fight.
///
/// Stops low-level accounts from multiplying their equipment by an
/// oversized clan.
pub fn usable_clan_members(level: u32, clan_members: u32, members_per_level: u32) -> u32 {
    level.saturating_mul(members_per_level).min(clan_members)
}

/// Base attack power before variance.
pub fn attack_power(stats: &CombatStats, config: &CombatConfig) -> f64 {
    let usable = usable_clan_members(stats.level, stats.clan_members, config.clan_members_per_level);
    stats.equipment_attack as f64 * f64::from(usable)
        + f64::from(stats.skills.attack) * f64::from(stats.level)
}

/// Base defense power before variance.
pub fn defense_power(stats: &CombatStats, config: &CombatConfig) -> f64 {
    let usable = usable_clan_members(stats.level, stats.clan_members, config.clan_members_per_level);
    stats.equipment_defense as f64 * f64::from(usable)
        + f64::from(stats.skills.defense) * f64::from(stats.level)
}

/// Noise for one power value: uniform in `±variance_percent%` of `base`.
pub fn power_variance(base: f64, variance_percent: f64, rng: &mut impl RngCore) -> f64 {
    let r = unit_float(rng);
    base * (variance_percent / 100.0) * (2.0 * r - 1.0)
}

/// Whether the low-health protection rule shields this defender.
pub fn is_protected(current_health: u32, threshold: u32, hitlist: bool) -> bool {
    !hitlist && current_health > 0 && current_health <= threshold
}

/// Currency taken from a defender who lost.
///
/// Never more than half the unbanked balance, whatever the damage.
pub fn currency_stolen(unbanked: u64, damage: u64, steal_percent: f64) -> u64 {
    let base_steal = (unbanked as f64 * steal_percent / 100.0).floor();
    let multiplier = (1.0 + damage as f64 / DAMAGE_PER_STEAL_BONUS).min(MAX_STEAL_MULTIPLIER);
    let scaled = (base_steal * multiplier).floor() as u64;
    scaled.min(unbanked / 2)
}

/// Resolves a probabilistic battle.
///
/// Two draws are always consumed (attack noise, then defense noise), even
/// when protection nullifies the attack, so the diagnostics are populated
/// and replays stay aligned.
pub fn resolve_probabilistic(
    attacker: &CombatStats,
    defender: &CombatStats,
    hitlist: bool,
    config: &CombatConfig,
    rng: &mut impl RngCore,
) -> ProbabilisticBattleResult {
    let attack_power = attack_power(attacker, config);
    let defense_power = defense_power(defender, config);

    let attack_variance = power_variance(attack_power, config.variance_percent, rng);
    let defense_variance = power_variance(defense_power, config.variance_percent, rng);

    let effective_attack = attack_power + attack_variance;
    let effective_defense = defense_power + defense_variance;

    let protected = is_protected(defender.current_health, config.protection_threshold, hitlist);

    let damage = if protected {
        0
    } else {
        (effective_attack - effective_defense).floor().max(0.0) as u64
    };
    let attacker_won = damage > 0;

    let currency_stolen = if attacker_won {
        currency_stolen(defender.unbanked_currency, damage, config.steal_percent)
    } else {
        0
    };

    let damage_to_health = u32::try_from(damage).unwrap_or(u32::MAX);
    let defender_health_after = defender.current_health.saturating_sub(damage_to_health);

    if protected {
        log::debug!(
            "storm8 battle {} -> {}: defender protected at {} health",
            attacker.id,
            defender.id,
            defender.current_health
        );
    } else {
        log::debug!(
            "storm8 battle {} -> {}: {:.1} vs {:.1} -> {} damage, {} stolen",
            attacker.id,
            defender.id,
            effective_attack,
            effective_defense,
            damage,
            currency_stolen
        );
    }

    ProbabilisticBattleResult {
        attack_power,
        defense_power,
        attack_variance,
        defense_variance,
        effective_attack,
        effective_defense,
        damage,
        attacker_won,
        killed: attacker_won && defender_health_after == 0,
        protected,
        currency_stolen,
        defender_health_after,
        xp_awarded: if attacker_won { config.win_xp } else { 0 },
    }
}

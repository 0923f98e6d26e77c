//! Linear attack/defense resolver used by "game" battles.
//!
//! One random draw per battle: class-scaled attack minus mitigated defense,
//! jittered by a few percent. Zero damage is a normal defender win.

use rand::RngCore;

use super::types::{Fighter, LinearBattleResult};
use crate::core::balance::CombatConfig;
use crate::core::error::EngineError;
use crate::core::rng::unit_float;

/// Resolves a linear battle.
///
/// Both class tags must exist in the modifier table; an unknown class fails
/// before any randomness is consumed.
pub fn resolve_linear(
    attacker: &Fighter,
    defender: &Fighter,
    config: &CombatConfig,
    rng: &mut impl RngCore,
) -> Result<LinearBattleResult, EngineError> {
    let attack_mod = config.class_modifier(&attacker.class)?;
    let defense_mod = config.class_modifier(&defender.class)?;

    let effective_attack = f64::from(attacker.atk) * attack_mod.attack;
    let effective_defense = f64::from(defender.def) * defense_mod.defense;

    let r = unit_float(rng);
    let jitter = 1.0 + (r * (2.0 * config.jitter) - config.jitter);

    let raw = ((effective_attack - effective_defense * config.mitigation) * jitter).round();
    // Float-to-int casts saturate, so negative raw damage lands on 0
    let damage = raw.max(0.0) as u32;

    let attacker_wins = damage > 0;
    let result = LinearBattleResult {
        damage,
        killed: damage >= defender.hp,
        attacker_wins,
        defender_wins: !attacker_wins,
        defender_health_after: defender.hp.saturating_sub(damage),
        xp_awarded: if attacker_wins { config.win_xp } else { 0 },
        jitter,
    };

    log::debug!(
        "linear battle: atk {:.1} vs def {:.1} x{:.4} -> {} damage",
        effective_attack,
        effective_defense,
        jitter,
        damage
    );

    Ok(result)
}

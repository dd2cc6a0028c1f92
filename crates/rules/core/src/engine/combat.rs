//! Standard battle odds.
//!
//! Pure formulas over the snapshot. Nothing here checks legality; callers
//! decide first whether an attack may happen at all.

use crate::config::RulesConfig;
use crate::effects::{EffectKind, get_target_bonus_effects};
use crate::ids::TilePos;
use crate::requirement::{Env, ReqContext};
use crate::ruleset::UnitClassFlags;
use crate::state::{Activity, Unit};

/// Chance that an attacker wins a battle fought round by round.
///
/// # Formula
///
/// Each round one side loses `firepower` hit points of the other. The
/// attacker loses a round with probability `p = ds / (as + ds)`. With
/// `n` rounds needed to kill the defender and `m` to kill the attacker:
///
/// ```text
/// win = (1-p)^n * sum_{k=0}^{m-1} C(n-1+k, k) * p^k
/// ```
///
/// # Arguments
///
/// * `att_strength`, `att_hp`, `att_fp` - Attacker power, hit points and firepower
/// * `def_strength`, `def_hp`, `def_fp` - Same for the defender
///
/// # Returns
///
/// Probability in `[0, 1]`.
pub fn win_chance(
    att_strength: u32,
    att_hp: u32,
    att_fp: u32,
    def_strength: u32,
    def_hp: u32,
    def_fp: u32,
) -> f64 {
    let att_fp = att_fp.max(1);
    let def_fp = def_fp.max(1);
    let att_rounds = att_hp.div_ceil(def_fp);
    let def_rounds = def_hp.div_ceil(att_fp);
    if def_rounds == 0 {
        return 1.0;
    }
    if att_rounds == 0 {
        return 0.0;
    }

    let att_lose_round = if att_strength + def_strength == 0 {
        0.5
    } else {
        f64::from(def_strength) / f64::from(att_strength + def_strength)
    };
    let def_lose_round = 1.0 - att_lose_round;

    // Binomial term for k lost rounds, updated in place.
    let mut term = def_lose_round.powi((def_rounds - 1) as i32);
    let mut total = term;
    for lost in 1..att_rounds {
        let n = lost + def_rounds - 1;
        term *= f64::from(n);
        term /= f64::from(lost);
        term *= att_lose_round;
        total += term;
    }
    total * def_lose_round
}

/// Attack power of a unit: strength scaled by veteran level, reduced when
/// the unit has less than one full move left.
pub fn attack_power(env: Env<'_>, attacker: &Unit) -> u32 {
    let Some(utype) = env.ruleset.unit_type(attacker.utype) else {
        return 0;
    };
    let power_fact = env
        .ruleset
        .veteran_level(attacker.utype, attacker.veteran)
        .map_or(100, |level| level.power_fact);
    let mut power = utype.attack_strength * RulesConfig::POWER_FACTOR * power_fact / 100;
    if attacker.moves_left < RulesConfig::SINGLE_MOVE {
        power = power * attacker.moves_left / RulesConfig::SINGLE_MOVE;
    }
    power
}

/// Defense power of `defender` against `attacker` on its tile.
///
/// Applies veteran level, terrain and extra defense bonuses, `Defend_Bonus`
/// effects and the fortified or in-city bonus.
pub fn defense_power(env: Env<'_>, attacker: &Unit, defender: &Unit) -> u32 {
    let ruleset = env.ruleset;
    let world = env.world;
    let Some(utype) = ruleset.unit_type(defender.utype) else {
        return 0;
    };
    let power_fact = ruleset
        .veteran_level(defender.utype, defender.veteran)
        .map_or(100, |level| level.power_fact);
    let mut power = utype.defense_strength * RulesConfig::POWER_FACTOR * power_fact / 100;

    let terrain_bonus = env.terrain_at(defender.tile).map_or(0, |terrain| terrain.defense_bonus);
    let extra_bonus: u32 = world.map.tile(defender.tile).map_or(0, |tile| {
        tile.extras
            .iter()
            .filter_map(|extra| ruleset.extra(*extra))
            .map(|extra| extra.defense_bonus)
            .sum()
    });
    power = power * (100 + terrain_bonus) / 100;
    power = power * (100 + extra_bonus) / 100;

    let target = ReqContext::for_unit(world, defender);
    let other = ReqContext::for_unit(world, attacker);
    let bonus = get_target_bonus_effects(env, &target, &other, EffectKind::DefendBonus);
    if bonus != 0 {
        power = (i64::from(power) * i64::from(100 + bonus).max(0) / 100) as u32;
    }

    let in_city = world.tile_city(defender.tile).is_some();
    let fortified = defender.activity == Activity::Fortified;
    if (in_city || fortified) && ruleset.uclass_has_builtin_flag(defender.utype, UnitClassFlags::CAN_FORTIFY)
    {
        power = power * 3 / 2;
    }
    power
}

/// Probability that `attacker` beats `defender`.
pub fn unit_win_chance(env: Env<'_>, attacker: &Unit, defender: &Unit) -> f64 {
    let firepower = |unit: &Unit| {
        env.ruleset
            .unit_type(unit.utype)
            .map_or(1, |utype| utype.firepower)
    };
    win_chance(
        attack_power(env, attacker),
        attacker.hp,
        firepower(attacker),
        defense_power(env, attacker, defender),
        defender.hp,
        firepower(defender),
    )
}

/// Whether `unit` takes part in the defense of its tile.
fn can_defend_here(env: Env<'_>, unit: &Unit) -> bool {
    let Some(utype) = env.ruleset.unit_type(unit.utype) else {
        return false;
    };
    if utype.defense_strength == 0 {
        return false;
    }
    !unit.is_transported() || env.can_exist_at_tile(unit.utype, unit.tile)
}

/// Best defender on `tile` against `attacker`.
///
/// The defender that gives the attacker the lowest win chance is picked.
/// Ties go to the cheaper unit, then to the one with the higher defense
/// rating.
pub fn get_defender<'a>(env: Env<'a>, attacker: &Unit, tile: TilePos) -> Option<&'a Unit> {
    let mut best: Option<(&'a Unit, u64, i32, u64)> = None;
    for defender in env.world.units_at(tile) {
        if !can_defend_here(env, defender) {
            continue;
        }
        let value = (100_000.0 * (1.0 - unit_win_chance(env, attacker, defender))) as u64;
        let cost = env
            .ruleset
            .unit_type(defender.utype)
            .map_or(0, |utype| utype.build_cost);
        let rating = defense_rating(env, attacker, defender);

        let change = match best {
            None => true,
            Some((_, best_value, best_cost, best_rating)) => {
                value > best_value
                    || (value == best_value
                        && (cost < best_cost || (cost == best_cost && rating > best_rating)))
            }
        };
        if change {
            best = Some((defender, value, cost, rating));
        }
    }
    best.map(|(defender, ..)| defender)
}

/// Defense strength times the rounds the defender lasts.
fn defense_rating(env: Env<'_>, attacker: &Unit, defender: &Unit) -> u64 {
    let att_fp = env
        .ruleset
        .unit_type(attacker.utype)
        .map_or(1, |utype| utype.firepower.max(1));
    let def_fp = env
        .ruleset
        .unit_type(defender.utype)
        .map_or(1, |utype| utype.firepower);
    u64::from(defense_power(env, attacker, defender))
        * u64::from(defender.hp.div_ceil(att_fp))
        * u64::from(def_fp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_fight_is_a_coin_flip() {
        let chance = win_chance(10, 10, 1, 10, 10, 1);
        assert!((chance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn stronger_side_is_favoured() {
        let strong = win_chance(30, 10, 1, 10, 10, 1);
        let weak = win_chance(10, 10, 1, 30, 10, 1);
        assert!(strong > 0.9);
        assert!(weak < 0.1);
        assert!((strong + weak - 1.0).abs() < 1e-9);
    }

    #[test]
    fn firepower_shortens_the_fight() {
        assert!(win_chance(10, 10, 2, 10, 10, 1) > win_chance(10, 10, 1, 10, 10, 1));
    }

    #[test]
    fn zero_strength_on_both_sides() {
        let chance = win_chance(0, 10, 1, 0, 10, 1);
        assert!((chance - 0.5).abs() < 1e-9);
    }
}

//! Rules of results that target units.

use crate::ids::TilePos;
use crate::requirement::Env;
use crate::ruleset::{Ruleset, UnitClassFlags, UnitType, UnitTypeFlags};
use crate::state::Unit;
use crate::tri::Tri;

use super::{ResultQuery, ResultRule};

/// Bribe Unit and Capture Units: the target unit changes owner.
pub struct TransferUnit;

impl ResultRule for TransferUnit {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        if !query.can_see_target_unit() {
            return Tri::Maybe;
        }
        let (Some(actor), Some(target)) = (query.actor_player(), query.target_unit()) else {
            return Tri::No;
        };
        let ruleset = query.env.ruleset;
        // A player can own only one unit of a unique type.
        if ruleset.utype_has_builtin_flag(target.utype, UnitTypeFlags::UNIQUE)
            && query
                .env
                .world
                .units
                .values()
                .any(|unit| unit.owner == actor.id && unit.utype == target.utype)
        {
            return Tri::No;
        }
        def
    }
}

pub struct HealUnit;

impl ResultRule for HealUnit {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let Some(target) = query.target_unit() else {
            return Tri::No;
        };
        let full_hp = query.env.ruleset.unit_type(target.utype).map_or(0, |utype| utype.hp);
        if target.hp >= full_hp {
            return Tri::No;
        }
        def
    }
}

pub struct Bombard;

impl ResultRule for Bombard {
    fn utype_ok(&self, utype: &UnitType, _ruleset: &Ruleset) -> bool {
        utype.bombard_rate > 0
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let world = query.env.world;
        let (Some(actor), Some(target)) = (query.actor_player(), query.target_unit()) else {
            return Tri::No;
        };
        if !world.players_at_war(actor.id, target.owner) {
            return Tri::No;
        }
        if world
            .tile_city(target.tile)
            .is_some_and(|city| !world.players_at_war(actor.id, city.owner))
        {
            return Tri::No;
        }
        def
    }
}

/// Explode Nuclear, Nuke City and Nuke Units.
pub struct Nuke;

impl ResultRule for Nuke {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let world = query.env.world;
        let (Some(unit), Some(tile)) = (query.actor_unit(), query.target.tile) else {
            return Tri::No;
        };
        // Exploding where the unit stands has no extra restrictions.
        if unit.tile == tile {
            return def;
        }
        if unit.moves_left == 0 {
            return Tri::No;
        }
        let city = world.tile_city(tile);
        if city.is_none() && world.unit_count_at(tile) == 0 {
            return Tri::No;
        }
        if city.is_some_and(|city| !world.players_at_war(unit.owner, city.owner)) {
            return Tri::No;
        }
        if world
            .units_at(tile)
            .any(|other| world.players_non_attack(unit.owner, other.owner))
        {
            return Tri::No;
        }
        if city.is_none() && !can_unit_attack_tile(query.env, unit, tile) {
            return Tri::No;
        }
        def
    }
}

// ============================================================================
// Combat
// ============================================================================

pub struct Attack;

impl ResultRule for Attack {
    fn utype_ok(&self, utype: &UnitType, _ruleset: &Ruleset) -> bool {
        utype.attack_strength > 0
    }

    fn actor_ok(&self, query: &ResultQuery<'_>) -> Tri {
        let Some(unit) = query.actor_unit() else {
            return Tri::Maybe;
        };
        if !query.env.is_native_tile(unit.utype, unit.tile)
            && !can_attack_from_non_native(query.env.ruleset, unit)
        {
            return Tri::No;
        }
        Tri::Yes
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let (Some(unit), Some(tile)) = (query.actor_unit(), query.target.tile) else {
            return Tri::No;
        };
        if query.env.world.unit_count_at(tile) == 0 {
            return Tri::No;
        }
        if !can_unit_attack_tile(query.env, unit, tile) {
            return Tri::No;
        }
        def
    }
}

/// Marines rule: ruleset flags let some units attack from non-native
/// tiles such as boats.
fn can_attack_from_non_native(ruleset: &Ruleset, unit: &Unit) -> bool {
    let class_flag = ruleset
        .uclass_flags
        .resolve("AttFromNonNative")
        .is_some_and(|flag| ruleset.uclass_has_flag(unit.utype, flag));
    let unit_flag = ruleset
        .unit_flags
        .resolve("Marines")
        .is_some_and(|flag| ruleset.utype_has_flag(unit.utype, flag));
    class_flag || unit_flag
}

/// Whether `attacker` may attack every unit on `tile`: all owners are at
/// war with it and every unit is reachable.
pub(crate) fn can_unit_attack_tile(env: Env<'_>, attacker: &Unit, tile: TilePos) -> bool {
    let world = env.world;
    let ruleset = env.ruleset;
    let in_city = world.tile_city(tile).is_some();

    if !in_city
        && !env.is_native_tile(attacker.utype, tile)
        && !ruleset.uclass_has_builtin_flag(attacker.utype, UnitClassFlags::ATTACK_NON_NATIVE)
    {
        return false;
    }

    world.units_at(tile).all(|defender| {
        world.players_at_war(attacker.owner, defender.owner)
            && (in_city || !ruleset.uclass_has_builtin_flag(defender.utype, UnitClassFlags::UNREACHABLE))
    })
}

pub struct WipeUnits;

impl ResultRule for WipeUnits {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        if !query.can_see_target_tile() {
            return Tri::Maybe;
        }
        let world = query.env.world;
        let (Some(actor), Some(tile)) = (query.actor_player(), query.target.tile) else {
            return Tri::No;
        };
        let mut units = world.units_at(tile).peekable();
        if units.peek().is_none() {
            return Tri::No;
        }
        let defenseless = units.all(|unit| {
            world.players_at_war(actor.id, unit.owner)
                && query
                    .env
                    .ruleset
                    .unit_type(unit.utype)
                    .is_some_and(|utype| utype.defense_strength == 0)
        });
        if !defenseless {
            return Tri::No;
        }
        def
    }
}

pub struct SpyAttack;

impl ResultRule for SpyAttack {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        if !query.can_see_target_tile() {
            return Tri::Maybe;
        }
        let world = query.env.world;
        let ruleset = query.env.ruleset;
        let (Some(actor), Some(tile)) = (query.actor_player(), query.target.tile) else {
            return Tri::No;
        };
        let has_defender = world.units_at(tile).any(|unit| {
            !world.players_allied(actor.id, unit.owner)
                && (ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::DIPLOMAT)
                    || ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::SUPER_SPY))
        });
        if !has_defender {
            return Tri::No;
        }
        def
    }
}

//! Rules of results that target a city.

use crate::config::RulesConfig;
use crate::effects::{EffectKind, get_target_bonus_effects};
use crate::ids::ImprovementId;
use crate::metaknowledge::{
    can_player_see_city_internals, can_player_see_units_in_city, can_see_techs_of_target,
    mke_can_see_city_externals,
};
use crate::requirement::{Env, ReqContext, tri_reqs_active};
use crate::ruleset::{Ruleset, UnitClassFlags, UnitType, UnitTypeFlags};
use crate::state::{City, Production};
use crate::tri::Tri;

use super::{ResultQuery, ResultRule};

pub struct Embassy;

impl ResultRule for Embassy {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        // A real embassy makes a second one pointless.
        match (query.actor_player(), query.target_player()) {
            (Some(actor), Some(target)) if actor.has_real_embassy_with(target.id) => Tri::No,
            _ => def,
        }
    }
}

pub struct TargetedStealTech;

impl ResultRule for TargetedStealTech {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        // Picking a tech needs knowing what the victim has.
        match (query.actor_player(), query.target_player()) {
            (Some(actor), Some(target)) if !can_see_techs_of_target(actor, target) => Tri::No,
            _ => def,
        }
    }
}

pub struct StealGold;

impl ResultRule for StealGold {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        match query.target_player() {
            Some(target) if target.gold <= 0 => Tri::No,
            _ => def,
        }
    }
}

// ============================================================================
// Trade
// ============================================================================

/// Trade Route and Enter Marketplace.
pub struct Trade;

impl ResultRule for Trade {
    fn actor_ok(&self, query: &ResultQuery<'_>) -> Tri {
        Tri::from_bool(query.homecity.is_some())
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let (Some(home), Some(target)) = (query.homecity, query.target_city()) else {
            return Tri::No;
        };
        if !can_cities_trade(query.config, home, target) {
            return Tri::No;
        }
        if query.action.result() == super::ActionResult::TradeRoute
            && !can_establish_trade_route(query.config, home, target)
        {
            return Tri::No;
        }
        def
    }
}

/// Two different cities may trade when they belong to different players or
/// lie far enough apart.
pub(crate) fn can_cities_trade(config: &RulesConfig, a: &City, b: &City) -> bool {
    a.id != b.id && (a.owner != b.owner || a.tile.map_distance(b.tile) >= config.trademindist)
}

pub(crate) fn can_establish_trade_route(config: &RulesConfig, a: &City, b: &City) -> bool {
    let limit = config.max_trade_routes as usize;
    !a.has_trade_route_with(b.id) && a.trade_partners.len() < limit && b.trade_partners.len() < limit
}

// ============================================================================
// Production
// ============================================================================

pub struct HelpWonder;

impl ResultRule for HelpWonder {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let Some(city) = query.target_city() else {
            return Tri::No;
        };
        if !query.omniscient
            && !query
                .actor_player()
                .is_some_and(|actor| can_player_see_city_internals(actor, city))
        {
            return Tri::Maybe;
        }
        // Extra shields would be wasted or land on something that can't
        // take help.
        if city.shield_stock >= production_cost(query.env.ruleset, city) {
            return Tri::No;
        }
        if let Production::Improvement(building) = city.production
            && improvement_obsolete(query.env, query.target, city, building)
        {
            return Tri::No;
        }
        def
    }
}

/// Shields needed to finish what `city` builds.
pub(crate) fn production_cost(ruleset: &Ruleset, city: &City) -> i32 {
    match city.production {
        Production::Improvement(id) => ruleset.improvement(id).map_or(0, |building| building.build_cost),
        Production::Unit(id) => ruleset.unit_type(id).map_or(0, |utype| utype.build_cost),
    }
}

fn improvement_obsolete(
    env: Env<'_>,
    context: &ReqContext<'_>,
    city: &City,
    building: ImprovementId,
) -> bool {
    let Some(improvement) = env.ruleset.improvement(building) else {
        return false;
    };
    if improvement.obsolete_by.is_empty() {
        return false;
    }
    let context = ReqContext {
        city: Some(city),
        tile: Some(city.tile),
        building: Some(building),
        ..*context
    };
    tri_reqs_active(env, &context, &ReqContext::empty(), &improvement.obsolete_by).is_yes()
}

pub struct JoinCity;

impl ResultRule for JoinCity {
    fn utype_ok(&self, utype: &UnitType, _ruleset: &Ruleset) -> bool {
        utype.pop_cost > 0
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let (Some(city), Some(utype)) = (query.target_city(), query.actor_utype()) else {
            return Tri::No;
        };
        if !query.omniscient
            && !query
                .actor_player()
                .is_some_and(|actor| mke_can_see_city_externals(query.env, actor, city))
        {
            return Tri::Maybe;
        }
        let new_size = city.size + utype.pop_cost;
        if new_size > query.config.add_to_size_limit {
            return Tri::No;
        }
        if !city_can_grow_to(query.env, query.target, city, new_size) {
            return Tri::No;
        }
        def
    }
}

fn city_can_grow_to(env: Env<'_>, context: &ReqContext<'_>, city: &City, size: u32) -> bool {
    let context = ReqContext {
        city: Some(city),
        tile: Some(city.tile),
        ..*context
    };
    let other = ReqContext::empty();
    if get_target_bonus_effects(env, &context, &other, EffectKind::SizeUnlimit) > 0 {
        return true;
    }
    match get_target_bonus_effects(env, &context, &other, EffectKind::SizeAdj) {
        limit if limit <= 0 => true,
        limit => size <= limit.unsigned_abs(),
    }
}

pub struct HomeCity;

impl ResultRule for HomeCity {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        match (query.actor_unit(), query.target_city()) {
            (Some(unit), Some(city)) if unit.homecity == Some(city.id) => Tri::No,
            _ => def,
        }
    }
}

// ============================================================================
// Airlift
// ============================================================================

pub struct Airlift;

impl ResultRule for Airlift {
    fn possible(&self, query: &ResultQuery<'_>, _def: Tri) -> Tri {
        let world = query.env.world;
        let (Some(unit), Some(dest)) = (query.actor_unit(), query.target_city()) else {
            return Tri::No;
        };
        if unit.moves_left == 0 {
            return Tri::No;
        }
        let Some(source) = world.tile_city(unit.tile) else {
            return Tri::No;
        };
        if source.id == dest.id
            || !world.players_allied(unit.owner, source.owner)
            || !world.players_allied(unit.owner, dest.owner)
        {
            return Tri::No;
        }
        if world
            .units_at(dest.tile)
            .any(|other| !world.players_allied(unit.owner, other.owner))
        {
            return Tri::No;
        }
        if !query.env.can_exist_at_tile(unit.utype, dest.tile) {
            return Tri::No;
        }

        let mut known = Tri::Yes;
        for city in [source, dest] {
            if city.airlift > 0 {
                continue;
            }
            let visible = query.omniscient
                || query
                    .actor_player()
                    .is_some_and(|actor| can_player_see_city_internals(actor, city));
            if visible {
                return Tri::No;
            }
            known = Tri::Maybe;
        }
        known
    }
}

// ============================================================================
// Conquest
// ============================================================================

pub struct ConquerCity;

impl ResultRule for ConquerCity {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let world = query.env.world;
        let ruleset = query.env.ruleset;
        let (Some(unit), Some(city)) = (query.actor_unit(), query.target_city()) else {
            return Tri::No;
        };
        if !world.players_at_war(unit.owner, city.owner) {
            return Tri::No;
        }
        if !ruleset.uclass_has_builtin_flag(unit.utype, UnitClassFlags::CAN_OCCUPY_CITY)
            || ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::NON_MIL)
        {
            return Tri::No;
        }
        if unit.moves_left == 0 {
            return Tri::No;
        }
        let units_visible = query.omniscient
            || query
                .actor_player()
                .is_some_and(|actor| can_player_see_units_in_city(query.env, actor, city));
        if !units_visible {
            return Tri::Maybe;
        }
        if world.unit_count_at(city.tile) > 0 {
            return Tri::No;
        }
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CityId, PlayerId, TilePos};

    fn city(id: u32, owner: u16, x: i32) -> City {
        City::new(
            CityId(id),
            PlayerId(owner),
            TilePos::new(x, 0),
            3,
            Production::Improvement(ImprovementId(0)),
        )
    }

    #[test]
    fn domestic_trade_needs_distance() {
        let config = RulesConfig::new();
        assert!(!can_cities_trade(&config, &city(1, 0, 0), &city(2, 0, 3)));
        assert!(can_cities_trade(&config, &city(1, 0, 0), &city(2, 0, 9)));
        assert!(can_cities_trade(&config, &city(1, 0, 0), &city(2, 1, 1)));
        assert!(!can_cities_trade(&config, &city(1, 0, 0), &city(1, 0, 0)));
    }

    #[test]
    fn trade_routes_are_limited() {
        let config = RulesConfig::new();
        let mut home = city(1, 0, 0);
        let target = city(2, 1, 5);
        assert!(can_establish_trade_route(&config, &home, &target));
        home.trade_partners = vec![CityId(2)];
        assert!(!can_establish_trade_route(&config, &home, &target));
        home.trade_partners = vec![CityId(7), CityId(8)];
        assert!(!can_establish_trade_route(&config, &home, &target));
    }
}

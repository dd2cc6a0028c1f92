//! Requirement evaluation from one player's point of view.
//!
//! The omniscient evaluator answers from the whole snapshot. A player asking
//! about its own options must only learn what it could already observe, so
//! every requirement first passes a knowability check: if the point-of-view
//! player can't know the answer, the result is `Maybe` whatever the truth is.

use crate::ids::TilePos;
use crate::requirement::{
    CityTile, DiplRel, Env, ReqContext, ReqProbType, ReqRange, ReqVec, Requirement, UnitState,
    Universal, VectorMode, range_tiles, tri_req_active,
};
use crate::state::{City, Player, TileKnown, Unit};
use crate::tri::{Tri, tri_all, tri_any};

/// Evaluates `req` as `pov` would see it.
///
/// `prob_type` decides how stale knowledge counts: under
/// [`ReqProbType::Possible`] a fogged tile's last known state is trusted,
/// under [`ReqProbType::Certain`] only tiles in current vision are.
pub fn mke_eval_req(
    env: Env<'_>,
    pov: &Player,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    req: &Requirement,
    prob_type: ReqProbType,
) -> Tri {
    if !is_req_knowable(env, pov, context, other, req, prob_type) {
        return Tri::Maybe;
    }
    tri_req_active(env, context, other, req)
}

/// Evaluates a whole vector as `pov` would see it.
pub fn mke_eval_reqs(
    env: Env<'_>,
    pov: &Player,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    reqs: &ReqVec,
    prob_type: ReqProbType,
) -> Tri {
    let results = reqs
        .iter()
        .map(|req| mke_eval_req(env, pov, context, other, req, prob_type));
    match reqs.mode() {
        VectorMode::All => tri_all(results),
        VectorMode::Any => tri_any(results),
    }
}

fn is_req_knowable(
    env: Env<'_>,
    pov: &Player,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    req: &Requirement,
    prob_type: ReqProbType,
) -> bool {
    let own_unit = |unit: &Unit| unit.owner == pov.id;
    let sees_unit = |unit: &Unit| own_unit(unit) || can_player_see_unit(env, pov, unit);
    let is_pov = |player: Option<&Player>| player.is_none_or(|player| player.id == pov.id);

    match req.source {
        Universal::None
        | Universal::Nation(_)
        | Universal::Action(_)
        | Universal::BuildingGenus(_) => true,

        Universal::UnitType(_)
        | Universal::UnitFlag(_)
        | Universal::UnitClass(_)
        | Universal::UnitClassFlag(_)
        | Universal::MinVeteran(_)
        | Universal::Activity(_) => context.unit.is_none_or(sees_unit),

        Universal::MinMoveFrags(_) | Universal::MinHitPoints(_) => {
            context.unit.is_none_or(own_unit)
        }

        Universal::UnitState(state) => match state {
            UnitState::HasHomeCity => context.unit.is_none_or(own_unit),
            UnitState::Transported
            | UnitState::Transporting
            | UnitState::OnLivableTile
            | UnitState::OnNativeTile
            | UnitState::OnDomesticTile => context.unit.is_none_or(sees_unit),
        },

        Universal::Terrain(_) | Universal::TerrainClass(_) | Universal::TerrainFlag(_) => {
            all_tiles(env, context, req.range, |tile| plr_knows_tile(env, pov, tile))
        }

        Universal::Extra(_) | Universal::ExtraFlag(_) => {
            req.range == ReqRange::Local
                || all_tiles(env, context, req.range, |tile| {
                    tile_state_visible(env, pov, tile, prob_type)
                })
        }

        Universal::CityTile(CityTile::Center | CityTile::Claimed) => {
            all_tiles(env, context, req.range, |tile| {
                tile_state_visible(env, pov, tile, prob_type)
            })
        }

        Universal::MaxUnitsOnTile(_) => all_tiles(env, context, req.range, |tile| {
            plr_sees_tile(env, pov, tile)
                && env
                    .world
                    .tile_city(tile)
                    .is_none_or(|city| can_player_see_units_in_city(env, pov, city))
        }),

        Universal::DiplRel(rel) => match req.range {
            ReqRange::Local => {
                rel.is_public()
                    || is_pov(context.player)
                    || is_pov(other.player)
                    || [context.player, other.player]
                        .into_iter()
                        .flatten()
                        .any(|player| pov.has_real_embassy_with(player.id))
            }
            ReqRange::Player => {
                rel.is_public()
                    || is_pov(context.player)
                    || context
                        .player
                        .is_some_and(|player| pov.has_real_embassy_with(player.id))
            }
            _ => rel.is_public(),
        },

        Universal::MinSize(_) => match (req.range, context.city) {
            (_, None) => true,
            (ReqRange::City, Some(city)) => mke_can_see_city_externals(env, pov, city),
            (_, Some(city)) => city.owner == pov.id,
        },

        Universal::Improvement(building) => {
            let wonder = env.ruleset.is_wonder(building);
            let city_visible = |city: &City| {
                city.owner == pov.id || (wonder && mke_can_see_city_externals(env, pov, city))
            };
            match req.range {
                ReqRange::Local => true,
                ReqRange::Tile => context
                    .tile
                    .and_then(|tile| env.world.tile_city(tile))
                    .is_none_or(city_visible),
                ReqRange::City => context.city.is_none_or(city_visible),
                ReqRange::TradeRoute => context.city.is_none_or(|city| city.owner == pov.id),
                ReqRange::Player | ReqRange::Continent => {
                    env.ruleset.is_great_wonder(building) || is_pov(context.player)
                }
                _ => env.ruleset.is_great_wonder(building),
            }
        }

        Universal::Advance(_) => match req.range {
            ReqRange::World => true,
            _ => context
                .player
                .is_none_or(|player| can_see_techs_of_target(pov, player)),
        },

        Universal::Government(_) => context
            .player
            .is_none_or(|player| player.id == pov.id || pov.has_real_embassy_with(player.id)),
    }
}

fn all_tiles(env: Env<'_>, context: &ReqContext<'_>, range: ReqRange, test: impl Fn(TilePos) -> bool) -> bool {
    match context.tile {
        Some(center) => range_tiles(env, center, range).into_iter().all(test),
        None => true,
    }
}

fn tile_state_visible(env: Env<'_>, pov: &Player, tile: TilePos, prob_type: ReqProbType) -> bool {
    match prob_type {
        ReqProbType::Certain => plr_sees_tile(env, pov, tile),
        ReqProbType::Possible => plr_knows_tile(env, pov, tile),
    }
}

// ============================================================================
// Visibility helpers
// ============================================================================

/// True when `pov` has ever seen `tile`.
pub fn plr_knows_tile(env: Env<'_>, pov: &Player, tile: TilePos) -> bool {
    env.world
        .map
        .index_of(tile)
        .is_some_and(|index| pov.tile_known(index) != TileKnown::Unknown)
}

/// True when `tile` is within `pov`'s current vision.
pub fn plr_sees_tile(env: Env<'_>, pov: &Player, tile: TilePos) -> bool {
    env.world
        .map
        .index_of(tile)
        .is_some_and(|index| pov.tile_known(index) == TileKnown::KnownSeen)
}

/// Whether `pov` can see `unit`.
///
/// Units are visible on seen tiles, except inside foreign cities and
/// foreign transports, where only the owner's allies see them.
pub fn can_player_see_unit(env: Env<'_>, pov: &Player, unit: &Unit) -> bool {
    let world = env.world;
    if world.players_allied(pov.id, unit.owner) {
        return true;
    }
    if !plr_sees_tile(env, pov, unit.tile) {
        return false;
    }
    if let Some(city) = world.tile_city(unit.tile)
        && !can_player_see_units_in_city(env, pov, city)
    {
        return false;
    }
    match unit.transported_by.and_then(|id| world.unit(id)) {
        Some(transport) => world.players_allied(pov.id, transport.owner),
        None => true,
    }
}

/// Whether `pov` can see which units are inside `city`.
pub fn can_player_see_units_in_city(env: Env<'_>, pov: &Player, city: &City) -> bool {
    env.world.players_allied(pov.id, city.owner)
}

/// Whether `pov` can see the outside of `city`: its size and visible
/// buildings.
pub fn mke_can_see_city_externals(env: Env<'_>, pov: &Player, city: &City) -> bool {
    city.owner == pov.id || plr_sees_tile(env, pov, city.tile)
}

/// Whether `pov` can see the inside of `city`: production and stock.
pub fn can_player_see_city_internals(pov: &Player, city: &City) -> bool {
    city.owner == pov.id
}

/// Whether `pov` can see which techs `target` knows.
pub fn can_see_techs_of_target(pov: &Player, target: &Player) -> bool {
    pov.id == target.id || pov.has_real_embassy_with(target.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CityId, GovernmentId, NationId, PlayerId, TechId, TerrainId, UnitId, UnitTypeId};
    use crate::requirement::tri_reqs_active;
    use crate::ruleset::Ruleset;
    use crate::state::{DiplState, GameMap, Production, World};

    fn world() -> World {
        let mut world = World::new(GameMap::filled(5, 5, TerrainId(0)));
        for id in 0..2 {
            world.players.push(Player::new(
                PlayerId(id),
                format!("p{id}"),
                NationId(id),
                GovernmentId(0),
            ));
        }
        world.players[0].diplstates.insert(PlayerId(1), DiplState::War);
        world.players[1].diplstates.insert(PlayerId(0), DiplState::War);
        world
            .units
            .insert(UnitId(1), Unit::new(UnitId(1), PlayerId(1), UnitTypeId(0), TilePos::new(3, 3)));
        world.cities.insert(
            CityId(1),
            City::new(CityId(1), PlayerId(1), TilePos::new(1, 1), 4, Production::Unit(UnitTypeId(0))),
        );
        world
    }

    fn see(world: &mut World, player: usize, tile: TilePos, known: TileKnown) {
        let index = world.map.index_of(tile).unwrap();
        world.players[player].set_tile_known(index, known);
    }

    #[test]
    fn unseen_enemy_unit_is_maybe() {
        let ruleset = Ruleset::new("mke");
        let mut world = world();
        let req = Requirement::new(Universal::MinVeteran(0), ReqRange::Local, true);
        {
            let env = Env::new(&ruleset, &world);
            let pov = &world.players[0];
            let unit = world.unit(UnitId(1)).unwrap();
            let ctx = ReqContext::for_unit(&world, unit);
            assert_eq!(
                mke_eval_req(env, pov, &ctx, &ReqContext::empty(), &req, ReqProbType::Certain),
                Tri::Maybe
            );
        }
        see(&mut world, 0, TilePos::new(3, 3), TileKnown::KnownSeen);
        let env = Env::new(&ruleset, &world);
        let pov = &world.players[0];
        let unit = world.unit(UnitId(1)).unwrap();
        let ctx = ReqContext::for_unit(&world, unit);
        assert_eq!(
            mke_eval_req(env, pov, &ctx, &ReqContext::empty(), &req, ReqProbType::Certain),
            Tri::Yes
        );
    }

    #[test]
    fn move_fragments_are_private() {
        let ruleset = Ruleset::new("mke");
        let mut world = world();
        see(&mut world, 0, TilePos::new(3, 3), TileKnown::KnownSeen);
        let env = Env::new(&ruleset, &world);
        let unit = world.unit(UnitId(1)).unwrap();
        let ctx = ReqContext::for_unit(&world, unit);
        let req = Requirement::new(Universal::MinMoveFrags(1), ReqRange::Local, true);

        assert_eq!(
            mke_eval_req(env, &world.players[0], &ctx, &ReqContext::empty(), &req, ReqProbType::Certain),
            Tri::Maybe
        );
        assert_eq!(
            mke_eval_req(env, &world.players[1], &ctx, &ReqContext::empty(), &req, ReqProbType::Certain),
            tri_req_active(env, &ctx, &ReqContext::empty(), &req)
        );
    }

    #[test]
    fn fogged_tiles_count_only_when_possible() {
        let ruleset = Ruleset::new("mke");
        let mut world = world();
        see(&mut world, 0, TilePos::new(2, 2), TileKnown::KnownUnseen);
        let env = Env::new(&ruleset, &world);
        let ctx = ReqContext::for_tile(&world, TilePos::new(2, 2));
        let req = Requirement::new(Universal::CityTile(CityTile::Center), ReqRange::Tile, false);
        let pov = &world.players[0];

        assert_eq!(
            mke_eval_req(env, pov, &ctx, &ReqContext::empty(), &req, ReqProbType::Certain),
            Tri::Maybe
        );
        assert_eq!(
            mke_eval_req(env, pov, &ctx, &ReqContext::empty(), &req, ReqProbType::Possible),
            Tri::Yes
        );
    }

    #[test]
    fn tech_knowledge_needs_an_embassy() {
        let ruleset = Ruleset::new("mke");
        let mut world = world();
        world.players[1].techs.insert(TechId(0));
        let req = Requirement::new(Universal::Advance(TechId(0)), ReqRange::Player, true);
        let reqs = ReqVec::new().with(req);
        {
            let env = Env::new(&ruleset, &world);
            let target = ReqContext::for_player(&world.players[1]);
            assert_eq!(
                mke_eval_reqs(env, &world.players[0], &target, &ReqContext::empty(), &reqs, ReqProbType::Certain),
                Tri::Maybe
            );
            assert_eq!(tri_reqs_active(env, &target, &ReqContext::empty(), &reqs), Tri::Yes);
        }
        world.players[0].real_embassies.insert(PlayerId(1));
        let env = Env::new(&ruleset, &world);
        let target = ReqContext::for_player(&world.players[1]);
        assert!(can_see_techs_of_target(&world.players[0], &world.players[1]));
        assert_eq!(
            mke_eval_reqs(env, &world.players[0], &target, &ReqContext::empty(), &reqs, ReqProbType::Certain),
            Tri::Yes
        );
    }

    #[test]
    fn public_diplomacy_is_always_known() {
        let ruleset = Ruleset::new("mke");
        let world = world();
        let env = Env::new(&ruleset, &world);
        let me = ReqContext::for_player(&world.players[1]);
        let them = ReqContext::for_player(&world.players[0]);
        let war = Requirement::new(Universal::DiplRel(DiplRel::War), ReqRange::Local, true);
        let embassy = Requirement::new(Universal::DiplRel(DiplRel::HasRealEmbassy), ReqRange::Player, true);
        let observer = Player::new(PlayerId(5), "observer", NationId(5), GovernmentId(0));

        assert_eq!(
            mke_eval_req(env, &observer, &me, &them, &war, ReqProbType::Certain),
            Tri::Yes
        );
        assert_eq!(
            mke_eval_req(env, &observer, &me, &them, &embassy, ReqProbType::Certain),
            Tri::Maybe
        );
    }

    #[test]
    fn units_in_foreign_cities_are_hidden() {
        let ruleset = Ruleset::new("mke");
        let mut world = world();
        see(&mut world, 0, TilePos::new(1, 1), TileKnown::KnownSeen);
        let mut defender = Unit::new(UnitId(2), PlayerId(1), UnitTypeId(0), TilePos::new(1, 1));
        defender.hp = 3;
        world.units.insert(UnitId(2), defender);
        let env = Env::new(&ruleset, &world);
        let unit = world.unit(UnitId(2)).unwrap();
        let city = world.city(CityId(1)).unwrap();

        assert!(!can_player_see_unit(env, &world.players[0], unit));
        assert!(can_player_see_unit(env, &world.players[1], unit));
        assert!(mke_can_see_city_externals(env, &world.players[0], city));
        assert!(!can_player_see_city_internals(&world.players[0], city));
    }
}

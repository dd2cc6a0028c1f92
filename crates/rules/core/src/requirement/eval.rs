//! Omniscient requirement evaluation.
//!
//! Every function here sees the whole snapshot. Player-perspective
//! evaluation wraps these in [`crate::metaknowledge`].
//!
//! A requirement whose needed context field is absent evaluates to
//! `Maybe`: the caller did not supply enough context to decide. Callers
//! that need a boolean pick a [`ReqProbType`].

use tracing::error;

use crate::ids::{ExtraId, ImprovementId, TilePos};
use crate::ruleset::{ExtraFlagId, TerrainClass};
use crate::state::{City, Player, Unit};
use crate::tri::{Tri, tri_all, tri_any};

use super::context::{Env, ReqContext};
use super::range::ReqRange;
use super::req::{ReqProbType, ReqVec, Requirement, VectorMode};
use super::universal::{CityTile, DiplRel, Universal, UnitState};

/// Three-valued evaluation of one requirement, `present` applied.
///
/// `context` is the side the requirement is about; `other` supplies the
/// second player for relational kinds such as [`Universal::DiplRel`].
pub fn tri_req_active(env: Env<'_>, context: &ReqContext<'_>, other: &ReqContext<'_>, req: &Requirement) -> Tri {
    let raw = universal_active(env, context, other, req);
    if req.present { raw } else { raw.negate() }
}

/// Boolean evaluation of one requirement.
pub fn is_req_active(
    env: Env<'_>,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    req: &Requirement,
    prob_type: ReqProbType,
) -> bool {
    prob_type.resolve(tri_req_active(env, context, other, req))
}

/// Three-valued evaluation of a vector in its combination mode.
///
/// An `All` vector stops at the first `No` but keeps going past `Maybe`.
pub fn tri_reqs_active(env: Env<'_>, context: &ReqContext<'_>, other: &ReqContext<'_>, reqs: &ReqVec) -> Tri {
    let results = reqs
        .iter()
        .map(|req| tri_req_active(env, context, other, req));
    match reqs.mode() {
        VectorMode::All => tri_all(results),
        VectorMode::Any => tri_any(results),
    }
}

/// Boolean evaluation of a vector.
pub fn are_reqs_active(
    env: Env<'_>,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    reqs: &ReqVec,
    prob_type: ReqProbType,
) -> bool {
    prob_type.resolve(tri_reqs_active(env, context, other, reqs))
}

/// Evaluates the universal of `req` at its range, ignoring `present`.
fn universal_active(env: Env<'_>, context: &ReqContext<'_>, other: &ReqContext<'_>, req: &Requirement) -> Tri {
    let range = req.range;
    if !req.kind().supports_range(range) {
        error!(
            kind = %req.kind(),
            range = %range,
            "requirement evaluated at an unsupported range"
        );
        return Tri::No;
    }

    match req.source {
        Universal::None => Tri::Yes,
        Universal::Advance(tech) => players_in_range(env, context, range, req.survives, |player| {
            player.knows_tech(tech)
        }),
        Universal::Government(gov) => with_player(context, |player| player.government == gov),
        Universal::Improvement(building) => improvement_in_range(env, context, range, req.survives, building),
        Universal::BuildingGenus(genus) => match context.building {
            Some(building) => Tri::from_bool(
                env.ruleset
                    .improvement(building)
                    .is_some_and(|b| b.genus == genus),
            ),
            None => Tri::Maybe,
        },
        Universal::Nation(nation) => players_in_range(env, context, range, req.survives, |player| {
            player.nation == nation
        }),
        Universal::UnitType(utype) => match context.utype() {
            Some(have) => Tri::from_bool(have == utype),
            None => Tri::Maybe,
        },
        Universal::UnitFlag(flag) => match context.utype() {
            Some(utype) => Tri::from_bool(env.ruleset.utype_has_flag(utype, flag)),
            None => Tri::Maybe,
        },
        Universal::UnitClass(class) => match context.utype() {
            Some(utype) => Tri::from_bool(
                env.ruleset
                    .unit_type(utype)
                    .is_some_and(|utype| utype.class == class),
            ),
            None => Tri::Maybe,
        },
        Universal::UnitClassFlag(flag) => match context.utype() {
            Some(utype) => Tri::from_bool(env.ruleset.uclass_has_flag(utype, flag)),
            None => Tri::Maybe,
        },
        Universal::Terrain(terrain) => tiles_in_range(env, context, range, |tile| {
            env.world.map.tile(tile).is_some_and(|t| t.terrain == terrain)
        }),
        Universal::TerrainClass(class) => tiles_in_range(env, context, range, |tile| {
            env.terrain_at(tile).is_some_and(|t| t.class == class)
        }),
        Universal::TerrainFlag(flag) => tiles_in_range(env, context, range, |tile| {
            env.terrain_at(tile).is_some_and(|t| t.flags.contains(flag))
        }),
        Universal::Extra(extra) => {
            if range == ReqRange::Local {
                match context.extra {
                    Some(have) => Tri::from_bool(have == extra),
                    None => Tri::Maybe,
                }
            } else {
                tiles_in_range(env, context, range, |tile| {
                    env.world.map.tile(tile).is_some_and(|t| t.has_extra(extra))
                })
            }
        }
        Universal::ExtraFlag(flag) => {
            if range == ReqRange::Local {
                match context.extra {
                    Some(extra) => Tri::from_bool(extra_has_flag(env, extra, flag)),
                    None => Tri::Maybe,
                }
            } else {
                tiles_in_range(env, context, range, |tile| {
                    env.world.map.tile(tile).is_some_and(|t| {
                        t.extras
                            .iter()
                            .any(|extra| extra_has_flag(env, *extra, flag))
                    })
                })
            }
        }
        Universal::DiplRel(rel) => diplrel_in_range(env, context, other, range, rel),
        Universal::CityTile(kind) => tiles_in_range(env, context, range, |tile| match kind {
            CityTile::Center => env.world.tile_city(tile).is_some(),
            CityTile::Claimed => env.world.tile_owner(tile).is_some(),
        }),
        Universal::MinSize(size) => match context.city {
            Some(city) => match range {
                ReqRange::TradeRoute => Tri::from_bool(
                    city.size >= size
                        || city
                            .trade_partners
                            .iter()
                            .filter_map(|id| env.world.city(*id))
                            .any(|partner| partner.size >= size),
                ),
                _ => Tri::from_bool(city.size >= size),
            },
            None => Tri::Maybe,
        },
        Universal::MinMoveFrags(frags) => with_unit(context, |unit| unit.moves_left >= frags),
        Universal::MinVeteran(level) => with_unit(context, |unit| unit.veteran >= level),
        Universal::MinHitPoints(hp) => with_unit(context, |unit| unit.hp >= hp),
        Universal::MaxUnitsOnTile(max) => tiles_in_range(env, context, range, |tile| {
            env.world.unit_count_at(tile) <= max as usize
        }),
        Universal::UnitState(state) => with_unit(context, |unit| match state {
            UnitState::Transported => unit.is_transported(),
            UnitState::Transporting => env.world.is_transporting(unit.id),
            UnitState::OnLivableTile => env.can_exist_at_tile(unit.utype, unit.tile),
            UnitState::OnNativeTile => env.is_native_tile(unit.utype, unit.tile),
            UnitState::HasHomeCity => unit.homecity.is_some(),
            UnitState::OnDomesticTile => env.world.tile_owner(unit.tile) == Some(unit.owner),
        }),
        Universal::Activity(activity) => with_unit(context, |unit| unit.activity == activity),
        Universal::Action(action) => match context.action {
            Some(have) => Tri::from_bool(have == action),
            None => Tri::Maybe,
        },
    }
}

fn with_player(context: &ReqContext<'_>, test: impl FnOnce(&Player) -> bool) -> Tri {
    context.player.map_or(Tri::Maybe, |player| Tri::from_bool(test(player)))
}

fn with_unit(context: &ReqContext<'_>, test: impl FnOnce(&Unit) -> bool) -> Tri {
    context.unit.map_or(Tri::Maybe, |unit| Tri::from_bool(test(unit)))
}

fn extra_has_flag(env: Env<'_>, extra: ExtraId, flag: ExtraFlagId) -> bool {
    env.ruleset
        .extra(extra)
        .is_some_and(|extra| extra.flags.contains(flag))
}

/// Tiles covered by a tile-based range around `center`.
pub(crate) fn range_tiles(env: Env<'_>, center: TilePos, range: ReqRange) -> Vec<TilePos> {
    match range {
        ReqRange::Local | ReqRange::Tile => vec![center],
        ReqRange::CAdjacent => std::iter::once(center)
            .chain(env.world.map.cardinal_adjacent_iter(center))
            .collect(),
        ReqRange::Adjacent => env.world.map.square_iter(center, 1).collect(),
        _ => Vec::new(),
    }
}

fn tiles_in_range(env: Env<'_>, context: &ReqContext<'_>, range: ReqRange, test: impl Fn(TilePos) -> bool) -> Tri {
    match context.tile {
        Some(center) => Tri::from_bool(range_tiles(env, center, range).into_iter().any(test)),
        None => Tri::Maybe,
    }
}

/// Players covered by a player-based range around the context player.
fn players_in_range(
    env: Env<'_>,
    context: &ReqContext<'_>,
    range: ReqRange,
    survives: bool,
    test: impl Fn(&Player) -> bool,
) -> Tri {
    let counts = |player: &&Player| survives || player.is_alive;
    match range {
        ReqRange::World => Tri::from_bool(env.world.players.iter().filter(counts).any(test)),
        _ => {
            let Some(me) = context.player else {
                return Tri::Maybe;
            };
            let found = match range {
                ReqRange::Player => test(me),
                ReqRange::Team => env
                    .world
                    .players
                    .iter()
                    .filter(counts)
                    .filter(|p| p.team == me.team)
                    .any(&test),
                ReqRange::Alliance => env
                    .world
                    .players
                    .iter()
                    .filter(counts)
                    .filter(|p| env.world.players_allied(me.id, p.id))
                    .any(&test),
                _ => false,
            };
            Tri::from_bool(found)
        }
    }
}

fn improvement_in_range(
    env: Env<'_>,
    context: &ReqContext<'_>,
    range: ReqRange,
    survives: bool,
    building: ImprovementId,
) -> Tri {
    let has = |city: &City| city.has_building(building);
    match range {
        ReqRange::Local => match context.building {
            Some(have) => Tri::from_bool(have == building),
            None => Tri::Maybe,
        },
        ReqRange::Tile => match context.tile {
            Some(tile) => Tri::from_bool(env.world.tile_city(tile).is_some_and(has)),
            None => Tri::Maybe,
        },
        ReqRange::City => context.city.map_or(Tri::Maybe, |city| Tri::from_bool(has(city))),
        ReqRange::TradeRoute => context.city.map_or(Tri::Maybe, |city| {
            Tri::from_bool(
                has(city)
                    || city
                        .trade_partners
                        .iter()
                        .filter_map(|id| env.world.city(*id))
                        .any(has),
            )
        }),
        ReqRange::Continent => {
            let Some(continent) = context
                .tile
                .and_then(|tile| env.world.map.tile(tile))
                .map(|tile| tile.continent)
            else {
                return Tri::Maybe;
            };
            Tri::from_bool(env.world.cities.values().any(|city| {
                has(city)
                    && env
                        .world
                        .map
                        .tile(city.tile)
                        .is_some_and(|tile| tile.continent == continent)
            }))
        }
        ReqRange::Player => context.player.map_or(Tri::Maybe, |player| {
            Tri::from_bool(env.world.cities_of(player.id).any(has))
        }),
        ReqRange::World => Tri::from_bool(
            (survives && env.world.wonders_ever_built.contains(&building))
                || env.world.cities.values().any(has),
        ),
        _ => Tri::No,
    }
}

fn diplrel_in_range(
    env: Env<'_>,
    context: &ReqContext<'_>,
    other: &ReqContext<'_>,
    range: ReqRange,
    rel: DiplRel,
) -> Tri {
    let world = env.world;
    let related_to_anyone = |p: &Player| {
        world
            .alive_players()
            .any(|q| q.id != p.id && env.is_diplrel_between(p, q, rel))
    };
    match range {
        ReqRange::Local => match (context.player, other.player) {
            (Some(me), Some(them)) => Tri::from_bool(env.is_diplrel_between(me, them, rel)),
            _ => Tri::Maybe,
        },
        ReqRange::Player => with_player(context, related_to_anyone),
        ReqRange::Team => with_player(context, |me| {
            world
                .alive_players()
                .filter(|p| p.team == me.team)
                .any(related_to_anyone)
        }),
        ReqRange::Alliance => with_player(context, |me| {
            world
                .alive_players()
                .filter(|p| world.players_allied(me.id, p.id))
                .any(related_to_anyone)
        }),
        ReqRange::World => Tri::from_bool(world.alive_players().any(related_to_anyone)),
        _ => Tri::No,
    }
}

/// True when a tile's terrain is of the oceanic class.
pub fn is_ocean_tile(env: Env<'_>, tile: TilePos) -> bool {
    env.terrain_at(tile)
        .is_some_and(|terrain| terrain.class == TerrainClass::Oceanic)
}

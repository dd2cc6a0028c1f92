//! Rules of results that target a tile.

use crate::ids::{ExtraId, TilePos};
use crate::metaknowledge::{plr_knows_tile, plr_sees_tile};
use crate::requirement::Env;
use crate::ruleset::{ExtraCauses, FlagId, TerrainFlags};
use crate::state::Unit;
use crate::tri::Tri;

use super::{ActionResult, ResultQuery, ResultRule};

// ============================================================================
// Found City
// ============================================================================

/// Why a city can't be founded on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CityBuildError {
    BadCityTerrain,
    BadUnitTerrain,
    BadBorders,
    NoMinDist,
}

fn city_build_here_test(env: Env<'_>, unit: &Unit, tile: TilePos, citymindist: u32) -> Result<(), CityBuildError> {
    if env
        .terrain_at(tile)
        .is_some_and(|terrain| terrain.flags.contains(FlagId::Builtin(TerrainFlags::NO_CITIES)))
    {
        return Err(CityBuildError::BadCityTerrain);
    }
    if !env.can_exist_at_tile(unit.utype, tile) {
        return Err(CityBuildError::BadUnitTerrain);
    }
    if env.world.tile_owner(tile).is_some_and(|owner| owner != unit.owner) {
        return Err(CityBuildError::BadBorders);
    }
    if city_min_dist_tiles(env, tile, citymindist).any(|other| env.world.tile_city(other).is_some()) {
        return Err(CityBuildError::NoMinDist);
    }
    Ok(())
}

/// Tiles where another city would be too close to one founded at `tile`.
fn city_min_dist_tiles(env: Env<'_>, tile: TilePos, citymindist: u32) -> impl Iterator<Item = TilePos> + '_ {
    let radius = i32::try_from(citymindist).unwrap_or(i32::MAX) - 1;
    env.world.map.square_iter(tile, radius)
}

pub struct FoundCity;

impl ResultRule for FoundCity {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let env = query.env;
        let (Some(unit), Some(actor), Some(tile)) =
            (query.actor_unit(), query.actor_player(), query.target.tile)
        else {
            return Tri::No;
        };
        let citymindist = query.config.effective_citymindist();
        let can_see_tile = query.can_see_target_tile();

        // Scenario switch. Settings are public.
        if query.config.prevent_new_cities {
            return Tri::No;
        }
        if can_see_tile && env.world.tile_city(tile).is_some() {
            return Tri::No;
        }

        match city_build_here_test(env, unit, tile, citymindist) {
            Ok(()) => {}
            Err(CityBuildError::BadCityTerrain | CityBuildError::BadUnitTerrain | CityBuildError::BadBorders) => {
                if can_see_tile {
                    return Tri::No;
                }
            }
            Err(CityBuildError::NoMinDist) => {
                if query.omniscient {
                    return Tri::No;
                }
                if city_min_dist_tiles(env, tile, citymindist)
                    .any(|other| env.world.tile_city(other).is_some() && plr_sees_tile(env, actor, other))
                {
                    return Tri::No;
                }
            }
        }

        if !can_see_tile {
            return Tri::Maybe;
        }
        // A fogged tile nearby could hide a city that is too close.
        if !query.omniscient && city_min_dist_tiles(env, tile, citymindist).any(|other| !plr_sees_tile(env, actor, other)) {
            return Tri::Maybe;
        }
        def
    }
}

// ============================================================================
// Paradrop
// ============================================================================

/// Paradrop Unit and Paradrop Unit Conquer.
pub struct Paradrop;

impl ResultRule for Paradrop {
    fn actor_ok(&self, query: &ResultQuery<'_>) -> Tri {
        let (Some(unit), Some(utype)) = (query.actor_unit(), query.actor_utype()) else {
            return Tri::Maybe;
        };
        // One drop per turn.
        if unit.paradropped || unit.moves_left < utype.paratroopers_mr_req {
            return Tri::No;
        }
        Tri::Yes
    }

    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let env = query.env;
        let (Some(unit), Some(utype), Some(actor), Some(tile)) = (
            query.actor_unit(),
            query.actor_utype(),
            query.actor_player(),
            query.target.tile,
        ) else {
            return Tri::No;
        };
        if !plr_knows_tile(env, actor, tile) {
            return Tri::No;
        }
        if unit.tile.real_distance(tile) > utype.paratroopers_range {
            return Tri::No;
        }
        if query.action.result() == ActionResult::Paradrop
            && query.can_see_target_tile()
            && env
                .world
                .tile_city(tile)
                .is_some_and(|city| !env.world.players_allied(actor.id, city.owner))
        {
            return Tri::No;
        }
        def
    }
}

// ============================================================================
// Terrain work
// ============================================================================

pub struct TransformTerrain;

impl ResultRule for TransformTerrain {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        let Some(terrain) = query.target.tile.and_then(|tile| query.env.terrain_at(tile)) else {
            return Tri::No;
        };
        match terrain.transform_result {
            Some(result) if result != terrain.id => def,
            _ => Tri::No,
        }
    }
}

pub struct Irrigate;

impl ResultRule for Irrigate {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        match query.target.tile.and_then(|tile| query.env.terrain_at(tile)) {
            Some(terrain) if terrain.irrigation_time > 0 => def,
            _ => Tri::No,
        }
    }
}

pub struct Mine;

impl ResultRule for Mine {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        match query.target.tile.and_then(|tile| query.env.terrain_at(tile)) {
            Some(terrain) if terrain.mining_time > 0 => def,
            _ => Tri::No,
        }
    }
}

pub struct Pillage;

impl ResultRule for Pillage {
    fn possible(&self, query: &ResultQuery<'_>, def: Tri) -> Tri {
        if !query.can_see_target_tile() {
            return Tri::Maybe;
        }
        let Some(tile) = query.target.tile else {
            return Tri::No;
        };
        let targets = pillageable_extras(query.env, tile);
        let ok = match query.target_extra {
            Some(extra) => targets.contains(&extra),
            None => !targets.is_empty(),
        };
        if ok { def } else { Tri::No }
    }
}

/// Extras on `tile` that can be pillaged now: removable by pillage and
/// not needed by another extra on the tile.
pub(crate) fn pillageable_extras(env: Env<'_>, tile: TilePos) -> Vec<ExtraId> {
    let Some(map_tile) = env.world.map.tile(tile) else {
        return Vec::new();
    };
    map_tile
        .extras
        .iter()
        .copied()
        .filter(|id| {
            env.ruleset
                .extra(*id)
                .is_some_and(|extra| extra.causes.contains(ExtraCauses::PILLAGE))
        })
        .filter(|id| {
            !map_tile.extras.iter().any(|other| {
                env.ruleset
                    .extra(*other)
                    .is_some_and(|other| other.dependencies.contains(id))
            })
        })
        .collect()
}

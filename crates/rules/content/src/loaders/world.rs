//! World snapshot loader.
//!
//! Snapshots name ruleset entities instead of numbering them, so they
//! survive ruleset edits:
//!
//! ```ron
//! (
//!     map: (width: 8, height: 8, terrain: "Grassland",
//!           tiles: [(x: 3, y: 4, terrain: Some("Hills"), owner: Some(1))]),
//!     players: [
//!         (name: "Caesar", diplstates: {1: War}, vision: All),
//!         (name: "Hammurabi", diplstates: {0: War}),
//!     ],
//!     cities: [(id: 1, owner: 1, x: 4, y: 4, size: 5, production: Unit("Warriors"))],
//!     units: [(id: 1, owner: 0, utype: "Settlers", x: 3, y: 3)],
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rules_core::config::RulesConfig;
use rules_core::state::{Activity, DiplState, Production, TileKnown};
use rules_core::{
    City, CityId, ExtraId, GameMap, GovernmentId, NationId, Player, PlayerId, Ruleset, TilePos, Unit, UnitId,
    World,
};
use serde::{Deserialize, Serialize};

use super::{LoadResult, read_file};
use crate::error::LoadError;

const FILE: &str = "world snapshot";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub turn: u32,
    pub map: MapSpec,
    #[serde(default)]
    pub players: Vec<PlayerSpec>,
    #[serde(default)]
    pub cities: Vec<CitySpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub wonders_ever_built: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    /// Terrain of every tile not listed in `tiles`.
    pub terrain: String,
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub terrain: Option<String>,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub owner: Option<u16>,
    #[serde(default)]
    pub continent: u16,
}

/// What a player knows of the map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Vision {
    /// Every tile is in sight.
    All,
    /// Listed tiles are in sight, the rest unknown.
    Seen(Vec<(i32, i32)>),
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub government: Option<String>,
    #[serde(default)]
    pub team: Option<u16>,
    #[serde(default)]
    pub gold: i32,
    #[serde(default)]
    pub techs: Vec<String>,
    #[serde(default)]
    pub diplstates: BTreeMap<u16, DiplState>,
    #[serde(default)]
    pub embassies: Vec<u16>,
    #[serde(default)]
    pub gives_vision: Vec<u16>,
    #[serde(default)]
    pub vision: Vision,
    /// Tiles seen before but fogged now.
    #[serde(default)]
    pub fogged: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProductionSpec {
    Unit(String),
    Improvement(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySpec {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub owner: u16,
    pub x: i32,
    pub y: i32,
    pub size: u32,
    #[serde(default)]
    pub buildings: Vec<String>,
    #[serde(default)]
    pub shield_stock: i32,
    pub production: ProductionSpec,
    #[serde(default)]
    pub trade_partners: Vec<u32>,
    #[serde(default)]
    pub airlift: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: u32,
    pub owner: u16,
    pub utype: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub homecity: Option<u32>,
    /// Move fragments. Missing means the type's full move rate.
    #[serde(default)]
    pub moves_left: Option<u32>,
    /// Missing means full health.
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub veteran: u8,
    #[serde(default)]
    pub transported_by: Option<u32>,
    #[serde(default)]
    pub activity: Activity,
    #[serde(default)]
    pub paradropped: bool,
}

/// Loader for world snapshots from RON files.
pub struct WorldLoader;

impl WorldLoader {
    /// Load a snapshot and resolve its names against `ruleset`.
    pub fn load(path: &Path, ruleset: &Ruleset) -> LoadResult<World> {
        let content = read_file(path)?;
        let snapshot: WorldSnapshot = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse world snapshot RON at {}: {}", path.display(), e))?;
        let world = snapshot.resolve(ruleset)?;
        tracing::debug!(
            path = %path.display(),
            players = world.players.len(),
            cities = world.cities.len(),
            units = world.units.len(),
            "world snapshot loaded"
        );
        Ok(world)
    }
}

impl WorldSnapshot {
    pub fn resolve(&self, ruleset: &Ruleset) -> Result<World, LoadError> {
        let unknown = |kind, name: &str| LoadError::unknown(FILE, kind, name);
        let terrain = |name: &str| ruleset.find_terrain(name).ok_or_else(|| unknown("terrain", name));

        let mut map = GameMap::filled(self.map.width, self.map.height, terrain(&self.map.terrain)?);
        for spec in &self.map.tiles {
            let pos = TilePos::new(spec.x, spec.y);
            let extras = spec
                .extras
                .iter()
                .map(|name| ruleset.find_extra(name).ok_or_else(|| unknown("extra", name)))
                .collect::<Result<Vec<ExtraId>, _>>()?;
            let tile_terrain = spec.terrain.as_deref().map(terrain).transpose()?;
            let tile = map
                .tile_mut(pos)
                .ok_or_else(|| unknown("tile", &format!("({}, {})", spec.x, spec.y)))?;
            if let Some(tile_terrain) = tile_terrain {
                tile.terrain = tile_terrain;
            }
            tile.extras = extras;
            tile.owner = spec.owner.map(PlayerId);
            tile.continent = spec.continent;
        }

        let mut world = World::new(map);
        world.turn = self.turn;
        for (index, spec) in self.players.iter().enumerate() {
            let player = Self::resolve_player(PlayerId(index as u16), spec, ruleset, &world.map)?;
            world.players.push(player);
        }
        for spec in &self.cities {
            let city = Self::resolve_city(spec, ruleset)?;
            world.cities.insert(city.id, city);
        }
        for spec in &self.units {
            let unit = Self::resolve_unit(spec, ruleset)?;
            world.units.insert(unit.id, unit);
        }
        for name in &self.wonders_ever_built {
            let wonder = ruleset
                .find_improvement(name)
                .ok_or_else(|| unknown("building", name))?;
            world.wonders_ever_built.insert(wonder);
        }
        Ok(world)
    }

    fn resolve_player(
        id: PlayerId,
        spec: &PlayerSpec,
        ruleset: &Ruleset,
        map: &GameMap,
    ) -> Result<Player, LoadError> {
        let nation = match spec.nation.as_deref() {
            Some(name) => ruleset
                .find_nation(name)
                .ok_or_else(|| LoadError::unknown(FILE, "nation", name))?,
            None => NationId(id.0),
        };
        let government = match spec.government.as_deref() {
            Some(name) => ruleset
                .find_government(name)
                .ok_or_else(|| LoadError::unknown(FILE, "government", name))?,
            None => GovernmentId(0),
        };

        let mut player = Player::new(id, &spec.name, nation, government);
        if let Some(team) = spec.team {
            player.team = team;
        }
        player.gold = spec.gold;
        for name in &spec.techs {
            let tech = ruleset
                .find_tech(name)
                .ok_or_else(|| LoadError::unknown(FILE, "tech", name))?;
            player.techs.insert(tech);
        }
        player.diplstates = spec
            .diplstates
            .iter()
            .map(|(other, state)| (PlayerId(*other), *state))
            .collect();
        player.real_embassies = spec.embassies.iter().copied().map(PlayerId).collect();
        player.gives_vision = spec.gives_vision.iter().copied().map(PlayerId).collect();

        let mut know = |x: i32, y: i32, known: TileKnown| {
            if let Some(index) = map.index_of(TilePos::new(x, y)) {
                player.set_tile_known(index, known);
            }
        };
        for &(x, y) in &spec.fogged {
            know(x, y, TileKnown::KnownUnseen);
        }
        match &spec.vision {
            Vision::All => {
                for index in 0..map.tiles.len() {
                    player.set_tile_known(index, TileKnown::KnownSeen);
                }
            }
            Vision::Seen(tiles) => {
                for &(x, y) in tiles {
                    know(x, y, TileKnown::KnownSeen);
                }
            }
            Vision::Unknown => {}
        }
        Ok(player)
    }

    fn resolve_city(spec: &CitySpec, ruleset: &Ruleset) -> Result<City, LoadError> {
        let production = match &spec.production {
            ProductionSpec::Unit(name) => Production::Unit(
                ruleset
                    .find_unit_type(name)
                    .ok_or_else(|| LoadError::unknown(FILE, "unit type", name))?,
            ),
            ProductionSpec::Improvement(name) => Production::Improvement(
                ruleset
                    .find_improvement(name)
                    .ok_or_else(|| LoadError::unknown(FILE, "building", name))?,
            ),
        };
        let id = CityId(spec.id);
        let mut city = City::new(id, PlayerId(spec.owner), TilePos::new(spec.x, spec.y), spec.size, production);
        if let Some(name) = &spec.name {
            city.name = name.clone();
        }
        for name in &spec.buildings {
            let building = ruleset
                .find_improvement(name)
                .ok_or_else(|| LoadError::unknown(FILE, "building", name))?;
            city.improvements.insert(building);
        }
        city.shield_stock = spec.shield_stock;
        city.trade_partners = spec.trade_partners.iter().copied().map(CityId).collect();
        city.airlift = spec.airlift;
        Ok(city)
    }

    fn resolve_unit(spec: &UnitSpec, ruleset: &Ruleset) -> Result<Unit, LoadError> {
        let utype_id = ruleset
            .find_unit_type(&spec.utype)
            .ok_or_else(|| LoadError::unknown(FILE, "unit type", &spec.utype))?;
        let mut unit = Unit::new(UnitId(spec.id), PlayerId(spec.owner), utype_id, TilePos::new(spec.x, spec.y));
        let utype = ruleset.unit_type(utype_id);
        unit.moves_left = spec
            .moves_left
            .or_else(|| utype.map(|utype| utype.move_rate))
            .unwrap_or(RulesConfig::SINGLE_MOVE);
        unit.hp = spec.hp.or_else(|| utype.map(|utype| utype.hp)).unwrap_or(unit.hp);
        unit.homecity = spec.homecity.map(CityId);
        unit.veteran = spec.veteran;
        unit.transported_by = spec.transported_by.map(UnitId);
        unit.activity = spec.activity;
        unit.paradropped = spec.paradropped;
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::ruleset::{Terrain, TerrainClass, UnitType};
    use rules_core::{TerrainId, UnitClassId, UnitTypeId};

    fn ruleset() -> Ruleset {
        let mut ruleset = Ruleset::new("world");
        ruleset.terrains.extend([
            Terrain::new(TerrainId(0), "Grassland", TerrainClass::Land),
            Terrain::new(TerrainId(1), "Hills", TerrainClass::Land),
        ]);
        let mut settlers = UnitType::new(UnitTypeId(0), "Settlers", UnitClassId(0));
        settlers.move_rate = 2 * RulesConfig::SINGLE_MOVE;
        ruleset.unit_types.push(settlers);
        ruleset
    }

    const SNAPSHOT: &str = r#"
(
    turn: 12,
    map: (width: 4, height: 4, terrain: "Grassland", tiles: [(x: 1, y: 1, terrain: Some("Hills"), owner: Some(1))]),
    players: [
        (name: "us", diplstates: {1: War}, vision: Seen([(0, 0), (1, 1)]), fogged: [(2, 2)]),
        (name: "them", diplstates: {0: War}, vision: All),
    ],
    cities: [(id: 7, owner: 1, x: 1, y: 1, size: 4, production: Unit("Settlers"))],
    units: [(id: 3, owner: 0, utype: "settlers", x: 0, y: 0)],
)
"#;

    #[test]
    fn snapshot_names_resolve() {
        let snapshot: WorldSnapshot = ron::from_str(SNAPSHOT).unwrap();
        let world = snapshot.resolve(&ruleset()).unwrap();

        assert_eq!(world.turn, 12);
        assert_eq!(world.map.tile(TilePos::new(1, 1)).map(|tile| tile.terrain), Some(TerrainId(1)));
        assert_eq!(world.tile_owner(TilePos::new(1, 1)), Some(PlayerId(1)));
        assert_eq!(world.players[0].diplstate_with(PlayerId(1)), DiplState::War);

        let us = &world.players[0];
        let index = |x, y| world.map.index_of(TilePos::new(x, y)).unwrap();
        assert_eq!(us.tile_known(index(1, 1)), TileKnown::KnownSeen);
        assert_eq!(us.tile_known(index(2, 2)), TileKnown::KnownUnseen);
        assert_eq!(us.tile_known(index(3, 3)), TileKnown::Unknown);

        let unit = &world.units[&UnitId(3)];
        assert_eq!(unit.moves_left, 2 * RulesConfig::SINGLE_MOVE);
        assert!(world.tile_city(TilePos::new(1, 1)).is_some());
    }

    #[test]
    fn unknown_unit_type_is_an_error() {
        let mut snapshot: WorldSnapshot = ron::from_str(SNAPSHOT).unwrap();
        snapshot.units[0].utype = "Galleon".to_owned();
        let err = snapshot.resolve(&ruleset()).unwrap_err();
        assert_eq!(err.to_string(), "world snapshot: unknown unit type \"Galleon\"");
    }
}

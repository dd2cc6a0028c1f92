//! Small fixed worlds for engine and upgrade tests.
//!
//! Compiled for this crate's own tests and, through the `testkit` feature,
//! for the integration suites under `tests/`.

use crate::action::ActionEnabler;
use crate::config::RulesConfig;
use crate::context::RulesetContext;
use crate::engine::ActionEngine;
use crate::ids::{
    CityId, GovernmentId, NationId, PlayerId, TechId, TerrainId, TilePos, UnitClassId, UnitId, UnitTypeId,
};
use crate::ruleset::{FlagId, FlagSet, Ruleset, Tech, Terrain, TerrainClass, UnitClass, UnitClassFlags, UnitType, UnitTypeFlags};
use crate::state::{City, DiplState, GameMap, Player, Production, TileKnown, Unit, World};

pub const SETTLERS: UnitTypeId = UnitTypeId(0);
pub const WARRIORS: UnitTypeId = UnitTypeId(1);
pub const DIPLOMAT: UnitTypeId = UnitTypeId(2);
pub const SPY: UnitTypeId = UnitTypeId(3);
pub const BOMBER: UnitTypeId = UnitTypeId(4);

pub const US: PlayerId = PlayerId(0);
pub const THEM: PlayerId = PlayerId(1);

/// One land class, grassland, five unit types and two techs.
pub fn ruleset() -> Ruleset {
    let mut ruleset = Ruleset::new("fixture");
    ruleset.unit_classes.push(UnitClass {
        id: UnitClassId(0),
        name: "Land".to_owned(),
        flags: FlagSet::default()
            .with(FlagId::Builtin(UnitClassFlags::CAN_OCCUPY_CITY))
            .with(FlagId::Builtin(UnitClassFlags::CAN_FORTIFY)),
    });
    let mut grassland = Terrain::new(TerrainId(0), "Grassland", TerrainClass::Land);
    grassland.native_to.push(UnitClassId(0));
    ruleset.terrains.push(grassland);

    let unit_type = |id, name: &str, flags: &[UnitTypeFlags], attack, defense| {
        let mut utype = UnitType::new(id, name, UnitClassId(0));
        for flag in flags {
            utype.flags.insert(FlagId::Builtin(*flag));
        }
        utype.attack_strength = attack;
        utype.defense_strength = defense;
        utype
    };
    let mut settlers = unit_type(SETTLERS, "Settlers", &[UnitTypeFlags::SETTLERS, UnitTypeFlags::NON_MIL], 0, 1);
    settlers.pop_cost = 1;
    ruleset.unit_types.extend([
        settlers,
        unit_type(WARRIORS, "Warriors", &[], 1, 1),
        unit_type(DIPLOMAT, "Diplomat", &[UnitTypeFlags::DIPLOMAT, UnitTypeFlags::NON_MIL], 0, 1),
        unit_type(SPY, "Spy", &[UnitTypeFlags::DIPLOMAT, UnitTypeFlags::SPY, UnitTypeFlags::NON_MIL], 0, 0),
        unit_type(BOMBER, "Bomber", &[], 12, 1),
    ]);
    ruleset.techs.extend([
        Tech {
            id: TechId(0),
            name: "Bronze Working".to_owned(),
            research_reqs: Vec::new(),
        },
        Tech {
            id: TechId(1),
            name: "Currency".to_owned(),
            research_reqs: vec![TechId(0)],
        },
    ]);
    ruleset
}

pub struct Fixture {
    pub context: RulesetContext,
    pub world: World,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_ruleset(ruleset())
    }

    pub fn with_ruleset(ruleset: Ruleset) -> Self {
        Self::with_context(RulesetContext::new(ruleset, RulesConfig::default()))
    }

    /// An 8x8 grassland map with two players at war. The first player
    /// sees every tile.
    pub fn with_context(context: RulesetContext) -> Self {
        let mut world = World::new(GameMap::filled(8, 8, TerrainId(0)));
        for (id, name) in [(US, "us"), (THEM, "them")] {
            world
                .players
                .push(Player::new(id, name, NationId(id.0), GovernmentId(0)));
        }
        world.players[0].diplstates.insert(THEM, DiplState::War);
        world.players[1].diplstates.insert(US, DiplState::War);
        for index in 0..world.map.tiles.len() {
            world.players[0].set_tile_known(index, TileKnown::KnownSeen);
        }
        Self { context, world }
    }

    #[must_use]
    pub fn with_enablers(mut self, enablers: impl IntoIterator<Item = ActionEnabler>) -> Self {
        self.context.enablers.extend(enablers);
        self
    }

    pub fn add_unit(&mut self, id: u32, owner: PlayerId, utype: UnitTypeId, tile: TilePos) -> UnitId {
        let id = UnitId(id);
        let mut unit = Unit::new(id, owner, utype, tile);
        unit.moves_left = RulesConfig::SINGLE_MOVE;
        self.world.units.insert(id, unit);
        id
    }

    pub fn add_city(&mut self, id: u32, owner: PlayerId, tile: TilePos) -> CityId {
        let id = CityId(id);
        self.world
            .cities
            .insert(id, City::new(id, owner, tile, 3, Production::Unit(WARRIORS)));
        id
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.world.units[&id]
    }

    pub fn city(&self, id: CityId) -> &City {
        &self.world.cities[&id]
    }

    pub fn engine(&self) -> ActionEngine<'_> {
        ActionEngine::new(&self.context, &self.world)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

use crate::action::ActionId;
use crate::ids::{ExtraId, ImprovementId, TilePos, UnitTypeId};
use crate::ruleset::{ExtraFlags, FlagId, Ruleset, Terrain};
use crate::state::{City, DiplState, Player, Unit, World};

use super::universal::DiplRel;

/// Read-only access to the ruleset and the state snapshot under evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a> {
    pub ruleset: &'a Ruleset,
    pub world: &'a World,
}

impl<'a> Env<'a> {
    pub fn new(ruleset: &'a Ruleset, world: &'a World) -> Self {
        Self { ruleset, world }
    }

    pub fn terrain_at(&self, tile: TilePos) -> Option<&'a Terrain> {
        self.world
            .map
            .tile(tile)
            .and_then(|t| self.ruleset.terrain(t.terrain))
    }

    /// True when units of `utype` can move on `tile` by its terrain or one of
    /// its extras.
    pub fn is_native_tile(&self, utype: UnitTypeId, tile: TilePos) -> bool {
        let Some(class) = self.ruleset.unit_type(utype).map(|utype| utype.class) else {
            return false;
        };
        let Some(map_tile) = self.world.map.tile(tile) else {
            return false;
        };
        let terrain_native = self
            .ruleset
            .terrain(map_tile.terrain)
            .is_some_and(|terrain| terrain.native_to.contains(&class));
        terrain_native
            || map_tile.extras.iter().any(|extra| {
                self.ruleset.extra(*extra).is_some_and(|extra| {
                    extra.native_to.contains(&class)
                        && extra.flags.contains(FlagId::Builtin(ExtraFlags::NATIVE_TILE))
                })
            })
    }

    /// True when a unit of `utype` can stay on `tile` outside a transport:
    /// the tile is native, or it holds a city reachable from a native
    /// neighbour.
    pub fn can_exist_at_tile(&self, utype: UnitTypeId, tile: TilePos) -> bool {
        if self.is_native_tile(utype, tile) {
            return true;
        }
        self.world.tile_city(tile).is_some()
            && self
                .world
                .map
                .adjacent_iter(tile)
                .any(|adjacent| self.is_native_tile(utype, adjacent))
    }

    /// Whether `rel` holds from `p1` towards `p2`.
    pub fn is_diplrel_between(&self, p1: &Player, p2: &Player, rel: DiplRel) -> bool {
        if rel == DiplRel::Foreign {
            return p1.id != p2.id;
        }
        if p1.id == p2.id {
            return false;
        }
        let state = self.world.diplstate(p1.id, p2.id);
        match rel {
            DiplRel::War => state == DiplState::War,
            DiplRel::CeaseFire => state == DiplState::CeaseFire,
            DiplRel::Armistice => state == DiplState::Armistice,
            DiplRel::Peace => state == DiplState::Peace,
            DiplRel::Alliance => state == DiplState::Alliance,
            DiplRel::NeverMet => state == DiplState::NoContact,
            DiplRel::Team => state == DiplState::Team,
            DiplRel::GivesSharedVision => p1.gives_vision.contains(&p2.id),
            DiplRel::ReceivesSharedVision => p2.gives_vision.contains(&p1.id),
            DiplRel::HasEmbassy | DiplRel::HasRealEmbassy => p1.has_real_embassy_with(p2.id),
            DiplRel::HostsEmbassy | DiplRel::HostsRealEmbassy => p2.has_real_embassy_with(p1.id),
            DiplRel::Foreign => p1.id != p2.id,
        }
    }
}

/// The entities a requirement is evaluated against. Absent fields mean the
/// caller has no such entity for this evaluation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqContext<'a> {
    pub player: Option<&'a Player>,
    pub city: Option<&'a City>,
    pub tile: Option<TilePos>,
    pub unit: Option<&'a Unit>,
    pub unittype: Option<UnitTypeId>,
    pub building: Option<ImprovementId>,
    pub extra: Option<ExtraId>,
    pub action: Option<ActionId>,
}

impl<'a> ReqContext<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_player(player: &'a Player) -> Self {
        Self {
            player: Some(player),
            ..Self::default()
        }
    }

    /// Context of a unit: its owner, its tile and any city on that tile.
    pub fn for_unit(world: &'a World, unit: &'a Unit) -> Self {
        Self {
            player: world.player(unit.owner),
            city: world.tile_city(unit.tile),
            tile: Some(unit.tile),
            unit: Some(unit),
            unittype: Some(unit.utype),
            ..Self::default()
        }
    }

    pub fn for_city(world: &'a World, city: &'a City) -> Self {
        Self {
            player: world.player(city.owner),
            city: Some(city),
            tile: Some(city.tile),
            ..Self::default()
        }
    }

    /// Context of a tile: its owner and any city centered on it.
    pub fn for_tile(world: &'a World, tile: TilePos) -> Self {
        Self {
            player: world.tile_owner(tile).and_then(|owner| world.player(owner)),
            city: world.tile_city(tile),
            tile: Some(tile),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionId) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn with_extra(mut self, extra: Option<ExtraId>) -> Self {
        self.extra = extra;
        self
    }

    #[must_use]
    pub fn with_building(mut self, building: Option<ImprovementId>) -> Self {
        self.building = building;
        self
    }

    /// Unit type from the explicit field, else from the unit.
    pub fn utype(&self) -> Option<UnitTypeId> {
        self.unittype.or(self.unit.map(|unit| unit.utype))
    }
}

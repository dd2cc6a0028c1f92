//! Read-only game state snapshots consumed by the evaluator and engine.
//!
//! The engine never mutates a [`World`]. Callers materialize one snapshot per
//! query batch: the server from authoritative state, a client from whatever
//! it currently knows. Visibility is carried per player in
//! [`Player::known`], so the same snapshot serves both omniscient and
//! player-perspective evaluation.
mod city;
mod map;
mod player;
mod unit;

use std::collections::{BTreeMap, BTreeSet};

pub use city::{City, Production};
pub use map::{GameMap, Tile, TileKnown};
pub use player::{DiplState, Player};
pub use unit::{Activity, Unit};

use crate::ids::{CityId, ImprovementId, PlayerId, TilePos, UnitId};

/// Complete snapshot of the entities the action rules read.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    #[cfg_attr(feature = "serde", serde(default))]
    pub turn: u32,
    pub map: GameMap,
    /// Players indexed by their [`PlayerId`].
    pub players: Vec<Player>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cities: BTreeMap<CityId, City>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub units: BTreeMap<UnitId, Unit>,
    /// Wonders that have been completed at some point, even if since lost.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wonders_ever_built: BTreeSet<ImprovementId>,
}

impl World {
    pub fn new(map: GameMap) -> Self {
        Self {
            turn: 0,
            map,
            players: Vec::new(),
            cities: BTreeMap::new(),
            units: BTreeMap::new(),
            wonders_ever_built: BTreeSet::new(),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index()).filter(|player| player.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index()).filter(|player| player.id == id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// The city centered on `tile`, if any.
    pub fn tile_city(&self, tile: TilePos) -> Option<&City> {
        self.cities.values().find(|city| city.tile == tile)
    }

    pub fn tile_owner(&self, tile: TilePos) -> Option<PlayerId> {
        self.map.tile(tile).and_then(|tile| tile.owner)
    }

    /// Units standing on `tile`, transported ones included, in id order.
    pub fn units_at(&self, tile: TilePos) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values().filter(move |unit| unit.tile == tile)
    }

    pub fn unit_count_at(&self, tile: TilePos) -> usize {
        self.units_at(tile).count()
    }

    /// Units directly transported by `transporter`.
    pub fn cargo_of(&self, transporter: UnitId) -> impl Iterator<Item = &Unit> + '_ {
        self.units
            .values()
            .filter(move |unit| unit.transported_by == Some(transporter))
    }

    pub fn is_transporting(&self, transporter: UnitId) -> bool {
        self.cargo_of(transporter).next().is_some()
    }

    /// Cities owned by `owner`.
    pub fn cities_of(&self, owner: PlayerId) -> impl Iterator<Item = &City> + '_ {
        self.cities.values().filter(move |city| city.owner == owner)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(|player| player.is_alive)
    }

    // ========================================================================
    // Diplomacy
    // ========================================================================

    pub fn diplstate(&self, a: PlayerId, b: PlayerId) -> DiplState {
        if a == b {
            return DiplState::Team;
        }
        self.player(a)
            .map(|player| player.diplstate_with(b))
            .unwrap_or_default()
    }

    /// Players who never met count as being at war.
    pub fn players_at_war(&self, a: PlayerId, b: PlayerId) -> bool {
        a != b && matches!(self.diplstate(a, b), DiplState::War | DiplState::NoContact)
    }

    pub fn players_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b || matches!(self.diplstate(a, b), DiplState::Alliance | DiplState::Team)
    }

    pub fn players_in_peace(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b
            || matches!(
                self.diplstate(a, b),
                DiplState::Peace | DiplState::Alliance | DiplState::Armistice | DiplState::Team
            )
    }

    /// Treaties that forbid attacking.
    pub fn players_non_attack(&self, a: PlayerId, b: PlayerId) -> bool {
        a != b
            && matches!(
                self.diplstate(a, b),
                DiplState::Peace | DiplState::CeaseFire | DiplState::Armistice
            )
    }

    pub fn same_team(&self, a: PlayerId, b: PlayerId) -> bool {
        match (self.player(a), self.player(b)) {
            (Some(pa), Some(pb)) => pa.team == pb.team,
            _ => a == b,
        }
    }

    // ========================================================================
    // Vision
    // ========================================================================

    pub fn tile_known_by(&self, player: PlayerId, tile: TilePos) -> TileKnown {
        match (self.player(player), self.map.index_of(tile)) {
            (Some(player), Some(index)) => player.tile_known(index),
            _ => TileKnown::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{GovernmentId, NationId, TerrainId, UnitTypeId};

    fn world() -> World {
        let mut world = World::new(GameMap::filled(4, 4, TerrainId(0)));
        for id in 0..3 {
            world.players.push(Player::new(
                PlayerId(id),
                format!("p{id}"),
                NationId(id),
                GovernmentId(0),
            ));
        }
        world
    }

    #[test]
    fn never_met_counts_as_war() {
        let mut world = world();
        assert!(world.players_at_war(PlayerId(0), PlayerId(1)));
        world.players[0]
            .diplstates
            .insert(PlayerId(1), DiplState::Peace);
        assert!(!world.players_at_war(PlayerId(0), PlayerId(1)));
        assert!(world.players_in_peace(PlayerId(0), PlayerId(1)));
        assert!(!world.players_at_war(PlayerId(2), PlayerId(2)));
    }

    #[test]
    fn cargo_is_tracked_by_transporter() {
        let mut world = world();
        let pos = TilePos::new(1, 1);
        world
            .units
            .insert(UnitId(1), Unit::new(UnitId(1), PlayerId(0), UnitTypeId(0), pos));
        let mut cargo = Unit::new(UnitId(2), PlayerId(0), UnitTypeId(0), pos);
        cargo.transported_by = Some(UnitId(1));
        world.units.insert(UnitId(2), cargo);

        assert!(world.is_transporting(UnitId(1)));
        assert!(!world.is_transporting(UnitId(2)));
        assert_eq!(world.unit_count_at(pos), 2);
    }

    #[test]
    fn player_lookup_checks_slot() {
        let world = world();
        assert!(world.player(PlayerId(2)).is_some());
        assert!(world.player(PlayerId(7)).is_none());
    }
}

use std::collections::BTreeSet;

use crate::ids::{CityId, ImprovementId, PlayerId, TilePos, UnitTypeId};

/// What a city is currently building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Production {
    Improvement(ImprovementId),
    Unit(UnitTypeId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub owner: PlayerId,
    pub tile: TilePos,
    pub size: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub improvements: BTreeSet<ImprovementId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield_stock: i32,
    pub production: Production,
    /// Partner cities of established trade routes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub trade_partners: Vec<CityId>,
    /// Airlifts the city can still send or receive this turn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub airlift: u32,
}

impl City {
    pub fn new(id: CityId, owner: PlayerId, tile: TilePos, size: u32, production: Production) -> Self {
        Self {
            id,
            name: format!("City {}", id.0),
            owner,
            tile,
            size,
            improvements: BTreeSet::new(),
            shield_stock: 0,
            production,
            trade_partners: Vec::new(),
            airlift: 0,
        }
    }

    pub fn has_building(&self, building: ImprovementId) -> bool {
        self.improvements.contains(&building)
    }

    pub fn has_trade_route_with(&self, other: CityId) -> bool {
        self.trade_partners.contains(&other)
    }
}

//! Strongly typed identifiers for world entities and ruleset entries.
//!
//! World ids (players, cities, units) are stable across snapshots. Ruleset
//! ids index the tables of a loaded [`crate::ruleset::Ruleset`] and are only
//! meaningful together with that ruleset.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($repr:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub $repr);

        impl $name {
            #[inline]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

// ============================================================================
// World entities
// ============================================================================

define_id!(
    /// Player slot number.
    PlayerId(u16),
    "player#"
);
define_id!(
    /// City identity, unique for the whole game.
    CityId(u32),
    "city#"
);
define_id!(
    /// Unit identity, unique for the whole game.
    UnitId(u32),
    "unit#"
);

// ============================================================================
// Ruleset entries
// ============================================================================

define_id!(TechId(u16), "tech#");
define_id!(GovernmentId(u16), "gov#");
define_id!(ImprovementId(u16), "building#");
define_id!(NationId(u16), "nation#");
define_id!(UnitTypeId(u16), "utype#");
define_id!(UnitClassId(u16), "uclass#");
define_id!(TerrainId(u16), "terrain#");
define_id!(ExtraId(u16), "extra#");

/// Tile coordinates on the game map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Real distance between two tiles: the larger of the axis deltas.
    pub fn real_distance(self, other: TilePos) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Sum of the axis deltas, used for trade distance.
    pub fn map_distance(self, other: TilePos) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Squared euclidean distance, used for city work radii.
    pub fn sq_distance(self, other: TilePos) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx * dx + dy * dy
    }

    /// True when `other` shares an edge with `self`.
    pub fn is_cardinally_adjacent(self, other: TilePos) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx + dy == 1
    }

    /// True when `other` touches `self` by edge or corner.
    pub fn is_adjacent(self, other: TilePos) -> bool {
        self != other && self.real_distance(other) == 1
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_distance_is_chebyshev() {
        let a = TilePos::new(2, 3);
        assert_eq!(a.real_distance(TilePos::new(2, 3)), 0);
        assert_eq!(a.real_distance(TilePos::new(3, 4)), 1);
        assert_eq!(a.real_distance(TilePos::new(5, 1)), 3);
    }

    #[test]
    fn adjacency_kinds() {
        let a = TilePos::new(0, 0);
        assert!(a.is_cardinally_adjacent(TilePos::new(0, 1)));
        assert!(!a.is_cardinally_adjacent(TilePos::new(1, 1)));
        assert!(a.is_adjacent(TilePos::new(1, 1)));
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(UnitId(7).to_string(), "unit#7");
        assert_eq!(TechId::new(3).index(), 3);
    }
}

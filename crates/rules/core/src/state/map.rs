use crate::ids::{ExtraId, PlayerId, TerrainId, TilePos};

/// Static contents of a single map tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub terrain: TerrainId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub extras: Vec<ExtraId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub owner: Option<PlayerId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub continent: u16,
}

impl Tile {
    pub fn new(terrain: TerrainId) -> Self {
        Self {
            terrain,
            extras: Vec::new(),
            owner: None,
            continent: 0,
        }
    }

    pub fn has_extra(&self, extra: ExtraId) -> bool {
        self.extras.contains(&extra)
    }
}

/// How much a player knows about a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKnown {
    /// Never seen.
    #[default]
    Unknown,
    /// Seen before but currently fogged; the player's picture may be stale.
    KnownUnseen,
    /// Currently within vision.
    KnownSeen,
}

/// Rectangular, non-wrapping game map stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameMap {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
}

impl GameMap {
    /// Creates a map filled with one terrain.
    pub fn filled(width: u32, height: u32, terrain: TerrainId) -> Self {
        let tiles = vec![Tile::new(terrain); (width * height) as usize];
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Row-major index of a position, if it lies on the map.
    pub fn index_of(&self, pos: TilePos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index_of(pos).and_then(|index| self.tiles.get(index))
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index_of(pos).and_then(|index| self.tiles.get_mut(index))
    }

    /// All on-map tiles within `radius` real distance of `center`, center
    /// included. A negative radius yields nothing. `center` must lie on the
    /// map; radii beyond the map size are cut down to it.
    pub fn square_iter(&self, center: TilePos, radius: i32) -> impl Iterator<Item = TilePos> + '_ {
        let span = i32::try_from(self.width.max(self.height)).unwrap_or(i32::MAX);
        let radius = radius.clamp(-1, span);
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| TilePos::new(center.x + dx, center.y + dy)))
            .filter(move |pos| self.contains(*pos))
    }

    /// On-map tiles touching `center` by edge or corner.
    pub fn adjacent_iter(&self, center: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        self.square_iter(center, 1).filter(move |pos| *pos != center)
    }

    /// On-map tiles sharing an edge with `center`.
    pub fn cardinal_adjacent_iter(&self, center: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        self.adjacent_iter(center)
            .filter(move |pos| pos.is_cardinally_adjacent(center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> GameMap {
        GameMap::filled(5, 4, TerrainId(0))
    }

    #[test]
    fn index_is_row_major() {
        let map = map();
        assert_eq!(map.index_of(TilePos::new(0, 0)), Some(0));
        assert_eq!(map.index_of(TilePos::new(2, 1)), Some(7));
        assert_eq!(map.index_of(TilePos::new(5, 0)), None);
        assert_eq!(map.index_of(TilePos::new(-1, 0)), None);
    }

    #[test]
    fn square_iter_is_clipped_at_the_edge() {
        let map = map();
        assert_eq!(map.square_iter(TilePos::new(0, 0), 1).count(), 4);
        assert_eq!(map.square_iter(TilePos::new(2, 2), 1).count(), 9);
        assert_eq!(map.square_iter(TilePos::new(2, 2), 0).count(), 1);
        assert_eq!(map.square_iter(TilePos::new(2, 2), -1).count(), 0);
    }

    #[test]
    fn huge_radius_covers_the_map_once() {
        let map = map();
        assert_eq!(map.square_iter(TilePos::new(4, 3), i32::MAX).count(), 20);
        assert_eq!(map.square_iter(TilePos::new(0, 0), i32::MAX - 1).count(), 20);
    }

    #[test]
    fn adjacency_iterators() {
        let map = map();
        assert_eq!(map.adjacent_iter(TilePos::new(2, 2)).count(), 8);
        assert_eq!(map.cardinal_adjacent_iter(TilePos::new(2, 2)).count(), 4);
        assert_eq!(map.cardinal_adjacent_iter(TilePos::new(0, 0)).count(), 2);
    }
}

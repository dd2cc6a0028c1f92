/// Scope over which a requirement is evaluated, from narrowest to widest.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ReqRange {
    Local,
    Tile,
    /// The tile and its cardinal neighbours.
    CAdjacent,
    /// The tile and all eight neighbours.
    Adjacent,
    City,
    #[strum(serialize = "Traderoute")]
    TradeRoute,
    Continent,
    Player,
    Team,
    Alliance,
    World,
}

impl ReqRange {
    /// Ranges whose sources can survive the loss of the entity.
    pub const fn allows_survives(self) -> bool {
        matches!(self, Self::World | Self::Alliance | Self::Team | Self::Player)
    }

    pub const fn is_tile_based(self) -> bool {
        matches!(self, Self::Tile | Self::CAdjacent | Self::Adjacent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn there_are_eleven_totally_ordered_ranges() {
        assert_eq!(ReqRange::COUNT, 11);
        let ranges: Vec<_> = ReqRange::iter().collect();
        assert!(ranges.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ranges.first(), Some(&ReqRange::Local));
        assert_eq!(ranges.last(), Some(&ReqRange::World));
    }

    #[test]
    fn rule_names_parse() {
        assert_eq!("traderoute".parse::<ReqRange>().ok(), Some(ReqRange::TradeRoute));
        assert_eq!("CAdjacent".parse::<ReqRange>().ok(), Some(ReqRange::CAdjacent));
        assert_eq!(ReqRange::Player.to_string(), "Player");
    }
}

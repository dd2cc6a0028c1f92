use crate::ids::{CityId, PlayerId, TilePos, UnitId, UnitTypeId};

/// Ongoing activity of a unit.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Activity {
    #[default]
    Idle,
    Pillage,
    Mine,
    Irrigate,
    Fortified,
    Fortifying,
    Sentry,
    Transform,
    Explore,
    Convert,
    Cultivate,
    Plant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub utype: UnitTypeId,
    pub tile: TilePos,
    #[cfg_attr(feature = "serde", serde(default))]
    pub homecity: Option<CityId>,
    /// Remaining move fragments this turn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub moves_left: u32,
    pub hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub veteran: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transported_by: Option<UnitId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub activity: Activity,
    /// Set once the unit has paradropped this turn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub paradropped: bool,
}

impl Unit {
    pub fn new(id: UnitId, owner: PlayerId, utype: UnitTypeId, tile: TilePos) -> Self {
        Self {
            id,
            owner,
            utype,
            tile,
            homecity: None,
            moves_left: 0,
            hp: 10,
            veteran: 0,
            transported_by: None,
            activity: Activity::Idle,
            paradropped: false,
        }
    }

    pub fn is_transported(&self) -> bool {
        self.transported_by.is_some()
    }
}

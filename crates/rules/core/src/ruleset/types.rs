use crate::ids::{
    ExtraId, GovernmentId, ImprovementId, NationId, TechId, TerrainId, UnitClassId, UnitTypeId,
};
use crate::requirement::ReqVec;

use super::flags::{ExtraFlags, FlagSet, TerrainFlags, UnitClassFlags, UnitTypeFlags};

/// Broad terrain category.
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
pub enum TerrainClass {
    #[default]
    Land,
    Oceanic,
}

/// Category of a city improvement.
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
pub enum BuildingGenus {
    GreatWonder,
    SmallWonder,
    #[default]
    Improvement,
    Special,
    Convert,
}

impl BuildingGenus {
    pub const fn is_wonder(self) -> bool {
        matches!(self, Self::GreatWonder | Self::SmallWonder)
    }
}

bitflags::bitflags! {
    /// Ways an extra can appear on or vanish from a tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ExtraCauses: u16 {
        const IRRIGATION = 1 << 0;
        const MINE = 1 << 1;
        const BASE = 1 << 2;
        const ROAD = 1 << 3;
        const HUT = 1 << 4;
        const POLLUTION = 1 << 5;
        const FALLOUT = 1 << 6;
        const RESOURCE = 1 << 7;
        /// Removal cause: the extra can be pillaged.
        const PILLAGE = 1 << 8;
    }
}

/// Veteran level: combat power bonus in percent of base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VeteranLevel {
    pub name: String,
    pub power_fact: u32,
    pub move_bonus: u32,
}

impl VeteranLevel {
    pub fn new(name: impl Into<String>, power_fact: u32) -> Self {
        Self {
            name: name.into(),
            power_fact,
            move_bonus: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tech {
    pub id: TechId,
    pub name: String,
    /// Direct research prerequisites.
    pub research_reqs: Vec<TechId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Government {
    pub id: GovernmentId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Improvement {
    pub id: ImprovementId,
    pub name: String,
    pub genus: BuildingGenus,
    pub build_cost: i32,
    pub reqs: ReqVec,
    /// Any active entry makes the improvement obsolete.
    pub obsolete_by: ReqVec,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitClass {
    pub id: UnitClassId,
    pub name: String,
    pub flags: FlagSet<UnitClassFlags>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitType {
    pub id: UnitTypeId,
    pub name: String,
    pub class: UnitClassId,
    pub flags: FlagSet<UnitTypeFlags>,
    pub attack_strength: u32,
    pub defense_strength: u32,
    /// Move fragments per turn.
    pub move_rate: u32,
    pub hp: u32,
    pub firepower: u32,
    /// Citizens added when joining a city. Zero means the type can't join.
    pub pop_cost: u32,
    pub bombard_rate: u32,
    pub build_cost: i32,
    pub paratroopers_range: u32,
    /// Move fragments a paratrooper needs left before dropping.
    pub paratroopers_mr_req: u32,
    pub obsoleted_by: Option<UnitTypeId>,
    pub converted_to: Option<UnitTypeId>,
    /// Type-specific veteran levels. Empty uses the ruleset defaults.
    pub veteran: Vec<VeteranLevel>,
}

impl UnitType {
    pub fn new(id: UnitTypeId, name: impl Into<String>, class: UnitClassId) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            flags: FlagSet::default(),
            attack_strength: 1,
            defense_strength: 1,
            move_rate: 9,
            hp: 10,
            firepower: 1,
            pop_cost: 0,
            bombard_rate: 0,
            build_cost: 10,
            paratroopers_range: 0,
            paratroopers_mr_req: 0,
            obsoleted_by: None,
            converted_to: None,
            veteran: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    pub id: TerrainId,
    pub name: String,
    pub class: TerrainClass,
    pub flags: FlagSet<TerrainFlags>,
    /// Unit classes that can move on this terrain.
    pub native_to: Vec<UnitClassId>,
    /// Defense bonus in percent.
    pub defense_bonus: u32,
    pub transform_result: Option<TerrainId>,
    /// Turns needed to irrigate. Zero means irrigation is impossible.
    pub irrigation_time: u32,
    /// Turns needed to mine. Zero means mining is impossible.
    pub mining_time: u32,
}

impl Terrain {
    pub fn new(id: TerrainId, name: impl Into<String>, class: TerrainClass) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            flags: FlagSet::default(),
            native_to: Vec::new(),
            defense_bonus: 0,
            transform_result: None,
            irrigation_time: 0,
            mining_time: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extra {
    pub id: ExtraId,
    pub name: String,
    pub flags: FlagSet<ExtraFlags>,
    pub causes: ExtraCauses,
    pub native_to: Vec<UnitClassId>,
    /// Requirements for building the extra.
    pub reqs: ReqVec,
    /// Extras that can't share a tile with this one.
    pub conflicts: Vec<ExtraId>,
    /// Extras this one depends on; they can't be removed while it stands.
    pub dependencies: Vec<ExtraId>,
    pub defense_bonus: u32,
}

impl Extra {
    pub fn new(id: ExtraId, name: impl Into<String>, causes: ExtraCauses) -> Self {
        Self {
            id,
            name: name.into(),
            flags: FlagSet::default(),
            causes,
            native_to: Vec::new(),
            reqs: ReqVec::new(),
            conflicts: Vec::new(),
            dependencies: Vec::new(),
            defense_bonus: 0,
        }
    }
}

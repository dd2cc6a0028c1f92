//! Universals: a kind of game thing paired with a concrete value.

use crate::action::ActionId;
use crate::ids::{
    ExtraId, GovernmentId, ImprovementId, NationId, TechId, TerrainId, UnitClassId, UnitTypeId,
};
use crate::ruleset::{
    BuildingGenus, ExtraFlagId, Ruleset, TerrainClass, TerrainFlagId, UnitClassFlagId, UnitFlagId,
};
use crate::state::Activity;

use super::error::RequirementError;
use super::range::ReqRange;

/// Diplomatic relation between a player and another player.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum DiplRel {
    War,
    #[strum(serialize = "Cease-fire")]
    CeaseFire,
    Armistice,
    Peace,
    Alliance,
    #[strum(serialize = "Never met")]
    NeverMet,
    Team,
    #[strum(serialize = "Gives shared vision")]
    GivesSharedVision,
    #[strum(serialize = "Receives shared vision")]
    ReceivesSharedVision,
    #[strum(serialize = "Hosts embassy")]
    HostsEmbassy,
    #[strum(serialize = "Has embassy")]
    HasEmbassy,
    #[strum(serialize = "Hosts real embassy")]
    HostsRealEmbassy,
    #[strum(serialize = "Has real embassy")]
    HasRealEmbassy,
    Foreign,
}

impl DiplRel {
    /// Relations every player can observe between any two players.
    pub const fn is_public(self) -> bool {
        matches!(
            self,
            Self::War
                | Self::CeaseFire
                | Self::Armistice
                | Self::Peace
                | Self::Alliance
                | Self::NeverMet
                | Self::Team
                | Self::Foreign
        )
    }
}

/// Property of a tile relative to cities and borders.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum CityTile {
    /// A city is centered on the tile.
    Center,
    /// The tile is inside someone's borders.
    Claimed,
}

/// Situational property of a unit.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum UnitState {
    Transported,
    Transporting,
    OnLivableTile,
    OnNativeTile,
    HasHomeCity,
    OnDomesticTile,
}

/// Kind tag of a [`Universal`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum UniversalKind {
    None,
    #[strum(to_string = "Tech", serialize = "Advance")]
    Advance,
    #[strum(to_string = "Gov", serialize = "Government")]
    Government,
    #[strum(to_string = "Building", serialize = "Improvement")]
    Improvement,
    BuildingGenus,
    Nation,
    UnitType,
    UnitFlag,
    UnitClass,
    UnitClassFlag,
    Terrain,
    TerrainClass,
    TerrainFlag,
    Extra,
    ExtraFlag,
    DiplRel,
    CityTile,
    MinSize,
    MinMoveFrags,
    MinVeteran,
    MinHitPoints,
    MaxUnitsOnTile,
    UnitState,
    Activity,
    Action,
}

impl UniversalKind {
    /// Ranges a requirement of this kind may use.
    pub fn supported_ranges(self) -> &'static [ReqRange] {
        use ReqRange::*;
        match self {
            Self::None => &[
                Local, Tile, CAdjacent, Adjacent, City, TradeRoute, Continent, Player, Team,
                Alliance, World,
            ],
            Self::Advance | Self::Nation => &[Player, Team, Alliance, World],
            Self::Government => &[Player],
            Self::Improvement => &[Local, Tile, City, TradeRoute, Continent, Player, World],
            Self::BuildingGenus
            | Self::UnitType
            | Self::UnitFlag
            | Self::UnitClass
            | Self::UnitClassFlag
            | Self::MinMoveFrags
            | Self::MinVeteran
            | Self::MinHitPoints
            | Self::UnitState
            | Self::Activity
            | Self::Action => &[Local],
            Self::Terrain | Self::TerrainClass | Self::TerrainFlag => {
                &[Tile, CAdjacent, Adjacent]
            }
            Self::Extra | Self::ExtraFlag => &[Local, Tile, CAdjacent, Adjacent],
            Self::CityTile | Self::MaxUnitsOnTile => &[Tile, CAdjacent, Adjacent],
            Self::DiplRel => &[Local, Player, Team, Alliance, World],
            Self::MinSize => &[City, TradeRoute],
        }
    }

    /// Range used when a ruleset omits it.
    pub fn default_range(self) -> ReqRange {
        match self {
            Self::Advance | Self::Government | Self::Nation => ReqRange::Player,
            Self::Improvement | Self::MinSize => ReqRange::City,
            Self::Terrain
            | Self::TerrainClass
            | Self::TerrainFlag
            | Self::CityTile
            | Self::MaxUnitsOnTile => ReqRange::Tile,
            Self::Extra | Self::ExtraFlag => ReqRange::Tile,
            _ => ReqRange::Local,
        }
    }

    pub fn supports_range(self, range: ReqRange) -> bool {
        self.supported_ranges().contains(&range)
    }

    /// Kinds where a context holds at most one value at a given range, so
    /// two different present values contradict each other.
    pub const fn is_single_valued(self) -> bool {
        matches!(
            self,
            Self::Government
                | Self::Nation
                | Self::BuildingGenus
                | Self::UnitType
                | Self::UnitClass
                | Self::Terrain
                | Self::TerrainClass
                | Self::Activity
                | Self::Action
        )
    }

    /// Kinds whose value is a lower bound.
    pub const fn is_minimum(self) -> bool {
        matches!(
            self,
            Self::MinSize | Self::MinMoveFrags | Self::MinVeteran | Self::MinHitPoints
        )
    }
}

/// A kind of game thing and its concrete value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Universal {
    None,
    Advance(TechId),
    Government(GovernmentId),
    Improvement(ImprovementId),
    BuildingGenus(BuildingGenus),
    Nation(NationId),
    UnitType(UnitTypeId),
    UnitFlag(UnitFlagId),
    UnitClass(UnitClassId),
    UnitClassFlag(UnitClassFlagId),
    Terrain(TerrainId),
    TerrainClass(TerrainClass),
    TerrainFlag(TerrainFlagId),
    Extra(ExtraId),
    ExtraFlag(ExtraFlagId),
    DiplRel(DiplRel),
    CityTile(CityTile),
    MinSize(u32),
    MinMoveFrags(u32),
    MinVeteran(u8),
    MinHitPoints(u32),
    MaxUnitsOnTile(u32),
    UnitState(UnitState),
    Activity(Activity),
    Action(ActionId),
}

impl Universal {
    pub fn kind(&self) -> UniversalKind {
        match self {
            Self::None => UniversalKind::None,
            Self::Advance(_) => UniversalKind::Advance,
            Self::Government(_) => UniversalKind::Government,
            Self::Improvement(_) => UniversalKind::Improvement,
            Self::BuildingGenus(_) => UniversalKind::BuildingGenus,
            Self::Nation(_) => UniversalKind::Nation,
            Self::UnitType(_) => UniversalKind::UnitType,
            Self::UnitFlag(_) => UniversalKind::UnitFlag,
            Self::UnitClass(_) => UniversalKind::UnitClass,
            Self::UnitClassFlag(_) => UniversalKind::UnitClassFlag,
            Self::Terrain(_) => UniversalKind::Terrain,
            Self::TerrainClass(_) => UniversalKind::TerrainClass,
            Self::TerrainFlag(_) => UniversalKind::TerrainFlag,
            Self::Extra(_) => UniversalKind::Extra,
            Self::ExtraFlag(_) => UniversalKind::ExtraFlag,
            Self::DiplRel(_) => UniversalKind::DiplRel,
            Self::CityTile(_) => UniversalKind::CityTile,
            Self::MinSize(_) => UniversalKind::MinSize,
            Self::MinMoveFrags(_) => UniversalKind::MinMoveFrags,
            Self::MinVeteran(_) => UniversalKind::MinVeteran,
            Self::MinHitPoints(_) => UniversalKind::MinHitPoints,
            Self::MaxUnitsOnTile(_) => UniversalKind::MaxUnitsOnTile,
            Self::UnitState(_) => UniversalKind::UnitState,
            Self::Activity(_) => UniversalKind::Activity,
            Self::Action(_) => UniversalKind::Action,
        }
    }

    /// Parses a universal from its kind and value names, resolving entity
    /// names against `ruleset`.
    pub fn from_names(kind: &str, value: &str, ruleset: &Ruleset) -> Result<Self, RequirementError> {
        let kind: UniversalKind = kind
            .trim()
            .parse()
            .map_err(|_| RequirementError::UnknownKind(kind.to_string()))?;
        let value = value.trim();
        let unknown = || RequirementError::UnknownValue {
            kind,
            value: value.to_string(),
        };
        let number = || value.parse::<u32>().map_err(|_| unknown());

        let universal = match kind {
            UniversalKind::None => Self::None,
            UniversalKind::Advance => Self::Advance(ruleset.find_tech(value).ok_or_else(unknown)?),
            UniversalKind::Government => {
                Self::Government(ruleset.find_government(value).ok_or_else(unknown)?)
            }
            UniversalKind::Improvement => {
                Self::Improvement(ruleset.find_improvement(value).ok_or_else(unknown)?)
            }
            UniversalKind::BuildingGenus => {
                Self::BuildingGenus(value.parse().map_err(|_| unknown())?)
            }
            UniversalKind::Nation => Self::Nation(ruleset.find_nation(value).ok_or_else(unknown)?),
            UniversalKind::UnitType => {
                Self::UnitType(ruleset.find_unit_type(value).ok_or_else(unknown)?)
            }
            UniversalKind::UnitFlag => {
                Self::UnitFlag(ruleset.unit_flags.resolve(value).ok_or_else(unknown)?)
            }
            UniversalKind::UnitClass => {
                Self::UnitClass(ruleset.find_unit_class(value).ok_or_else(unknown)?)
            }
            UniversalKind::UnitClassFlag => {
                Self::UnitClassFlag(ruleset.uclass_flags.resolve(value).ok_or_else(unknown)?)
            }
            UniversalKind::Terrain => {
                Self::Terrain(ruleset.find_terrain(value).ok_or_else(unknown)?)
            }
            UniversalKind::TerrainClass => {
                Self::TerrainClass(value.parse().map_err(|_| unknown())?)
            }
            UniversalKind::TerrainFlag => {
                Self::TerrainFlag(ruleset.terrain_flags.resolve(value).ok_or_else(unknown)?)
            }
            UniversalKind::Extra => Self::Extra(ruleset.find_extra(value).ok_or_else(unknown)?),
            UniversalKind::ExtraFlag => {
                Self::ExtraFlag(ruleset.extra_flags.resolve(value).ok_or_else(unknown)?)
            }
            UniversalKind::DiplRel => Self::DiplRel(value.parse().map_err(|_| unknown())?),
            UniversalKind::CityTile => Self::CityTile(value.parse().map_err(|_| unknown())?),
            UniversalKind::MinSize => Self::MinSize(number()?),
            UniversalKind::MinMoveFrags => Self::MinMoveFrags(number()?),
            UniversalKind::MinVeteran => {
                Self::MinVeteran(u8::try_from(number()?).map_err(|_| unknown())?)
            }
            UniversalKind::MinHitPoints => Self::MinHitPoints(number()?),
            UniversalKind::MaxUnitsOnTile => Self::MaxUnitsOnTile(number()?),
            UniversalKind::UnitState => Self::UnitState(value.parse().map_err(|_| unknown())?),
            UniversalKind::Activity => Self::Activity(value.parse().map_err(|_| unknown())?),
            UniversalKind::Action => Self::Action(value.parse().map_err(|_| unknown())?),
        };
        Ok(universal)
    }

    /// Rule name of the value part.
    pub fn value_name(&self, ruleset: &Ruleset) -> String {
        fn named(name: Option<&str>, fallback: impl ToString) -> String {
            name.map(str::to_string)
                .unwrap_or_else(|| fallback.to_string())
        }

        match self {
            Self::None => String::new(),
            Self::Advance(id) => named(ruleset.tech(*id).map(|e| e.name.as_str()), id),
            Self::Government(id) => named(ruleset.government(*id).map(|e| e.name.as_str()), id),
            Self::Improvement(id) => named(ruleset.improvement(*id).map(|e| e.name.as_str()), id),
            Self::BuildingGenus(genus) => genus.to_string(),
            Self::Nation(id) => named(ruleset.nation(*id).map(|e| e.name.as_str()), id),
            Self::UnitType(id) => named(ruleset.unit_type(*id).map(|e| e.name.as_str()), id),
            Self::UnitFlag(flag) => ruleset.unit_flags.name(*flag),
            Self::UnitClass(id) => named(ruleset.unit_class(*id).map(|e| e.name.as_str()), id),
            Self::UnitClassFlag(flag) => ruleset.uclass_flags.name(*flag),
            Self::Terrain(id) => named(ruleset.terrain(*id).map(|e| e.name.as_str()), id),
            Self::TerrainClass(class) => class.to_string(),
            Self::TerrainFlag(flag) => ruleset.terrain_flags.name(*flag),
            Self::Extra(id) => named(ruleset.extra(*id).map(|e| e.name.as_str()), id),
            Self::ExtraFlag(flag) => ruleset.extra_flags.name(*flag),
            Self::DiplRel(rel) => rel.to_string(),
            Self::CityTile(tile) => tile.to_string(),
            Self::MinSize(n) | Self::MinMoveFrags(n) | Self::MinHitPoints(n) | Self::MaxUnitsOnTile(n) => {
                n.to_string()
            }
            Self::MinVeteran(n) => n.to_string(),
            Self::UnitState(state) => state.to_string(),
            Self::Activity(activity) => activity.to_string(),
            Self::Action(action) => action.rule_name().to_string(),
        }
    }

    /// `Kind "value"` form used in logs and tool output.
    pub fn describe(&self, ruleset: &Ruleset) -> String {
        format!("{} \"{}\"", self.kind(), self.value_name(ruleset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::{FlagId, UnitTypeFlags};
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_a_default_range_it_supports() {
        for kind in UniversalKind::iter() {
            assert!(
                kind.supports_range(kind.default_range()),
                "{kind} default range unsupported"
            );
        }
    }

    #[test]
    fn kind_names_accept_aliases() {
        assert_eq!("Tech".parse::<UniversalKind>().ok(), Some(UniversalKind::Advance));
        assert_eq!("advance".parse::<UniversalKind>().ok(), Some(UniversalKind::Advance));
        assert_eq!("Gov".parse::<UniversalKind>().ok(), Some(UniversalKind::Government));
        assert_eq!(UniversalKind::Improvement.to_string(), "Building");
    }

    #[test]
    fn values_resolve_against_the_ruleset() {
        let ruleset = Ruleset::new("empty");
        assert_eq!(
            Universal::from_names("UnitFlag", "NonMil", &ruleset),
            Ok(Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::NON_MIL)))
        );
        assert_eq!(
            Universal::from_names("DiplRel", "has real embassy", &ruleset),
            Ok(Universal::DiplRel(DiplRel::HasRealEmbassy))
        );
        assert_eq!(
            Universal::from_names("MinMoveFrags", "1", &ruleset),
            Ok(Universal::MinMoveFrags(1))
        );
        assert!(matches!(
            Universal::from_names("UnitType", "Warriors", &ruleset),
            Err(RequirementError::UnknownValue { .. })
        ));
        assert!(matches!(
            Universal::from_names("Specialist", "Elvis", &ruleset),
            Err(RequirementError::UnknownKind(_))
        ));
    }

    #[test]
    fn describe_uses_rule_names() {
        let ruleset = Ruleset::new("empty");
        let source = Universal::Action(ActionId::FoundCity);
        assert_eq!(source.describe(&ruleset), "Action \"Found City\"");
        assert_eq!(
            Universal::DiplRel(DiplRel::CeaseFire).describe(&ruleset),
            "DiplRel \"Cease-fire\""
        );
    }
}

//! Ruleset entity tables.
//!
//! A [`Ruleset`] owns every named thing a requirement can refer to, along
//! with the flag name registries and the effect list. It is built once by a
//! loader and read-only afterwards.
mod flags;
mod types;

pub use flags::{
    ExtraFlagId, ExtraFlagRegistry, ExtraFlags, FlagError, FlagId, FlagRegistry, FlagSet,
    TerrainFlagId, TerrainFlagRegistry, TerrainFlags, UnitClassFlagId, UnitClassFlagRegistry,
    UnitClassFlags, UnitFlagId, UnitFlagRegistry, UnitTypeFlags, UserFlag,
};
pub use types::{
    BuildingGenus, Extra, ExtraCauses, Government, Improvement, Nation, Tech, Terrain,
    TerrainClass, UnitClass, UnitType, VeteranLevel,
};

use crate::effects::Effect;
use crate::ids::{
    ExtraId, GovernmentId, ImprovementId, NationId, TechId, TerrainId, UnitClassId, UnitTypeId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ruleset {
    pub name: String,
    pub techs: Vec<Tech>,
    pub governments: Vec<Government>,
    pub nations: Vec<Nation>,
    pub improvements: Vec<Improvement>,
    pub unit_classes: Vec<UnitClass>,
    pub unit_types: Vec<UnitType>,
    pub terrains: Vec<Terrain>,
    pub extras: Vec<Extra>,
    pub unit_flags: UnitFlagRegistry,
    pub uclass_flags: UnitClassFlagRegistry,
    pub terrain_flags: TerrainFlagRegistry,
    pub extra_flags: ExtraFlagRegistry,
    /// Default veteran levels for unit types without their own.
    pub veteran_levels: Vec<VeteranLevel>,
    pub effects: Vec<Effect>,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::new("unnamed")
    }
}

macro_rules! table_lookup {
    ($get:ident, $find:ident, $field:ident, $id:ty, $entry:ty) => {
        pub fn $get(&self, id: $id) -> Option<&$entry> {
            self.$field.get(id.index()).filter(|entry| entry.id == id)
        }

        /// Case-insensitive lookup by rule name.
        pub fn $find(&self, name: &str) -> Option<$id> {
            self.$field
                .iter()
                .find(|entry| entry.name.eq_ignore_ascii_case(name))
                .map(|entry| entry.id)
        }
    };
}

impl Ruleset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            techs: Vec::new(),
            governments: Vec::new(),
            nations: Vec::new(),
            improvements: Vec::new(),
            unit_classes: Vec::new(),
            unit_types: Vec::new(),
            terrains: Vec::new(),
            extras: Vec::new(),
            unit_flags: UnitFlagRegistry::new("unit type"),
            uclass_flags: UnitClassFlagRegistry::new("unit class"),
            terrain_flags: TerrainFlagRegistry::new("terrain"),
            extra_flags: ExtraFlagRegistry::new("extra"),
            veteran_levels: vec![VeteranLevel::new("green", 100)],
            effects: Vec::new(),
        }
    }

    table_lookup!(tech, find_tech, techs, TechId, Tech);
    table_lookup!(government, find_government, governments, GovernmentId, Government);
    table_lookup!(nation, find_nation, nations, NationId, Nation);
    table_lookup!(improvement, find_improvement, improvements, ImprovementId, Improvement);
    table_lookup!(unit_class, find_unit_class, unit_classes, UnitClassId, UnitClass);
    table_lookup!(unit_type, find_unit_type, unit_types, UnitTypeId, UnitType);
    table_lookup!(terrain, find_terrain, terrains, TerrainId, Terrain);
    table_lookup!(extra, find_extra, extras, ExtraId, Extra);

    /// Class of a unit type.
    pub fn utype_class(&self, utype: UnitTypeId) -> Option<&UnitClass> {
        self.unit_type(utype)
            .and_then(|utype| self.unit_class(utype.class))
    }

    pub fn utype_has_flag(&self, utype: UnitTypeId, flag: UnitFlagId) -> bool {
        self.unit_type(utype)
            .is_some_and(|utype| utype.flags.contains(flag))
    }

    pub fn utype_has_builtin_flag(&self, utype: UnitTypeId, flag: UnitTypeFlags) -> bool {
        self.utype_has_flag(utype, FlagId::Builtin(flag))
    }

    pub fn uclass_has_flag(&self, utype: UnitTypeId, flag: UnitClassFlagId) -> bool {
        self.utype_class(utype)
            .is_some_and(|class| class.flags.contains(flag))
    }

    pub fn uclass_has_builtin_flag(&self, utype: UnitTypeId, flag: UnitClassFlags) -> bool {
        self.uclass_has_flag(utype, FlagId::Builtin(flag))
    }

    /// Veteran level `level` of `utype`, falling back to the ruleset
    /// defaults.
    pub fn veteran_level(&self, utype: UnitTypeId, level: u8) -> Option<&VeteranLevel> {
        let levels = match self.unit_type(utype) {
            Some(utype) if !utype.veteran.is_empty() => &utype.veteran,
            _ => &self.veteran_levels,
        };
        levels.get(level as usize)
    }

    pub fn is_wonder(&self, building: ImprovementId) -> bool {
        self.improvement(building)
            .is_some_and(|building| building.genus.is_wonder())
    }

    pub fn is_great_wonder(&self, building: ImprovementId) -> bool {
        self.improvement(building)
            .is_some_and(|building| building.genus == BuildingGenus::GreatWonder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruleset() -> Ruleset {
        let mut ruleset = Ruleset::new("test");
        ruleset.unit_classes.push(UnitClass {
            id: UnitClassId(0),
            name: "Land".into(),
            flags: FlagSet::from_builtin(UnitClassFlags::CAN_OCCUPY_CITY),
        });
        let mut settlers = UnitType::new(UnitTypeId(0), "Settlers", UnitClassId(0));
        settlers.flags.insert(FlagId::Builtin(UnitTypeFlags::NON_MIL));
        ruleset.unit_types.push(settlers);
        ruleset
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let ruleset = ruleset();
        assert_eq!(ruleset.find_unit_type("settlers"), Some(UnitTypeId(0)));
        assert_eq!(ruleset.find_unit_class("LAND"), Some(UnitClassId(0)));
        assert_eq!(ruleset.find_unit_type("Warriors"), None);
    }

    #[test]
    fn flags_reach_through_class() {
        let ruleset = ruleset();
        assert!(ruleset.utype_has_builtin_flag(UnitTypeId(0), UnitTypeFlags::NON_MIL));
        assert!(ruleset.uclass_has_builtin_flag(UnitTypeId(0), UnitClassFlags::CAN_OCCUPY_CITY));
        assert!(!ruleset.uclass_has_builtin_flag(UnitTypeId(0), UnitClassFlags::MISSILE));
    }

    #[test]
    fn veteran_levels_fall_back_to_defaults() {
        let ruleset = ruleset();
        assert_eq!(
            ruleset.veteran_level(UnitTypeId(0), 0).map(|level| level.power_fact),
            Some(100)
        );
        assert!(ruleset.veteran_level(UnitTypeId(0), 1).is_none());
    }
}

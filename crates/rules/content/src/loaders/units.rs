//! `units.toml`: user flag names, veteran levels, unit classes and types.

use rules_core::compat::names::upgraded_unit_flag_name;
use rules_core::config::RulesConfig;
use rules_core::ruleset::{FlagSet, UnitClass, UnitType, VeteranLevel};
use rules_core::{Ruleset, UnitClassId, UnitTypeId};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

pub const FILE: &str = "units.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsFile {
    pub datafile: super::DatafileHeader,
    #[serde(default)]
    pub flags: UnitFlagNames,
    #[serde(default)]
    pub veteran: Vec<VeteranSpec>,
    #[serde(default, rename = "class")]
    pub classes: Vec<UnitClassSpec>,
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitTypeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitFlagNames {
    #[serde(default)]
    pub unit: Vec<UserFlagSpec>,
    #[serde(default)]
    pub uclass: Vec<UserFlagSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFlagSpec {
    pub name: String,
    #[serde(default)]
    pub help: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeteranSpec {
    pub name: String,
    pub power_fact: u32,
    #[serde(default)]
    pub move_bonus: u32,
}

impl VeteranSpec {
    fn build(&self) -> VeteranLevel {
        let mut level = VeteranLevel::new(&self.name, self.power_fact);
        level.move_bonus = self.move_bonus;
        level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitClassSpec {
    pub name: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeSpec {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default = "one")]
    pub attack: u32,
    #[serde(default = "one")]
    pub defense: u32,
    /// Whole moves per turn.
    #[serde(default = "one")]
    pub move_rate: u32,
    #[serde(default = "ten")]
    pub hitpoints: u32,
    #[serde(default = "one")]
    pub firepower: u32,
    #[serde(default)]
    pub pop_cost: u32,
    #[serde(default)]
    pub bombard_rate: u32,
    #[serde(default = "ten_i32")]
    pub build_cost: i32,
    #[serde(default)]
    pub paratroopers_range: u32,
    /// Whole moves a paratrooper needs left.
    #[serde(default)]
    pub paratroopers_mr_req: u32,
    #[serde(default)]
    pub obsolete_by: Option<String>,
    #[serde(default)]
    pub convert_to: Option<String>,
    #[serde(default)]
    pub veteran: Vec<VeteranSpec>,
}

fn one() -> u32 {
    1
}

fn ten() -> u32 {
    10
}

fn ten_i32() -> i32 {
    10
}

// ============================================================================
// Resolution
// ============================================================================

/// Claims user flag slots for the names the file declares.
pub fn register_flags(file: &UnitsFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    let flag_error = |source| LoadError::Flag {
        file: FILE.to_owned(),
        source,
    };
    for flag in &file.flags.unit {
        ruleset
            .unit_flags
            .add_user(&flag.name, flag.help.clone())
            .map_err(flag_error)?;
    }
    for flag in &file.flags.uclass {
        ruleset
            .uclass_flags
            .add_user(&flag.name, flag.help.clone())
            .map_err(flag_error)?;
    }
    Ok(())
}

pub fn load_veteran_levels(file: &UnitsFile, ruleset: &mut Ruleset) {
    if !file.veteran.is_empty() {
        ruleset.veteran_levels = file.veteran.iter().map(VeteranSpec::build).collect();
    }
}

pub fn load_classes(file: &UnitsFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    for (index, spec) in file.classes.iter().enumerate() {
        if ruleset.find_unit_class(&spec.name).is_some() {
            return Err(duplicate("unit class", &spec.name));
        }
        let mut flags = FlagSet::default();
        for name in &spec.flags {
            let flag = ruleset
                .uclass_flags
                .resolve(name)
                .ok_or_else(|| LoadError::unknown(FILE, "unit class flag", name))?;
            flags.insert(flag);
        }
        ruleset.unit_classes.push(UnitClass {
            id: UnitClassId(index as u16),
            name: spec.name.clone(),
            flags,
        });
    }
    Ok(())
}

/// Builds every unit type. Types referring to each other are linked in a
/// second pass so the order in the file doesn't matter.
pub fn load_unit_types(file: &UnitsFile, ruleset: &mut Ruleset, version: u32) -> Result<(), LoadError> {
    for (index, spec) in file.units.iter().enumerate() {
        if ruleset.find_unit_type(&spec.name).is_some() {
            return Err(duplicate("unit type", &spec.name));
        }
        let class = ruleset
            .find_unit_class(&spec.class)
            .ok_or_else(|| LoadError::unknown(FILE, "unit class", &spec.class))?;
        let mut utype = UnitType::new(UnitTypeId(index as u16), &spec.name, class);
        for name in &spec.flags {
            let name = upgraded_unit_flag_name(name, version);
            let flag = ruleset
                .unit_flags
                .resolve(name)
                .ok_or_else(|| LoadError::unknown(FILE, "unit type flag", name))?;
            utype.flags.insert(flag);
        }
        utype.attack_strength = spec.attack;
        utype.defense_strength = spec.defense;
        utype.move_rate = spec.move_rate * RulesConfig::SINGLE_MOVE;
        utype.hp = spec.hitpoints;
        utype.firepower = spec.firepower;
        utype.pop_cost = spec.pop_cost;
        utype.bombard_rate = spec.bombard_rate;
        utype.build_cost = spec.build_cost;
        utype.paratroopers_range = spec.paratroopers_range;
        utype.paratroopers_mr_req = spec.paratroopers_mr_req * RulesConfig::SINGLE_MOVE;
        utype.veteran = spec.veteran.iter().map(VeteranSpec::build).collect();
        ruleset.unit_types.push(utype);
    }

    for (index, spec) in file.units.iter().enumerate() {
        let link = |name: &Option<String>| -> Result<Option<UnitTypeId>, LoadError> {
            name.as_deref()
                .map(|name| {
                    ruleset
                        .find_unit_type(name)
                        .ok_or_else(|| LoadError::unknown(FILE, "unit type", name))
                })
                .transpose()
        };
        let obsoleted_by = link(&spec.obsolete_by)?;
        let converted_to = link(&spec.convert_to)?;
        let utype = &mut ruleset.unit_types[index];
        utype.obsoleted_by = obsoleted_by;
        utype.converted_to = converted_to;
    }
    Ok(())
}

fn duplicate(kind: &'static str, name: &str) -> LoadError {
    LoadError::DuplicateName {
        file: FILE.to_owned(),
        kind,
        name: name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::compat::{RSFORMAT_3_0, RSFORMAT_CURRENT};
    use rules_core::ruleset::{FlagId, UnitClassFlags, UnitTypeFlags};

    const UNITS: &str = r#"
[datafile]
options = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01"
format_version = 20

[flags]
unit = [{ name = "Horse", help = "Fast." }]

[[class]]
name = "Sea"
flags = ["CanOccupyCity"]

[[unit]]
name = "Ironclad"
class = "Sea"
flags = ["Trireme", "Horse"]
attack = 4
move_rate = 4
obsolete_by = "Destroyer"

[[unit]]
name = "Destroyer"
class = "Sea"
"#;

    fn parse() -> UnitsFile {
        toml::from_str(UNITS).unwrap()
    }

    fn load(version: u32) -> Result<Ruleset, LoadError> {
        let file = parse();
        let mut ruleset = Ruleset::new("units");
        register_flags(&file, &mut ruleset)?;
        load_classes(&file, &mut ruleset)?;
        load_unit_types(&file, &mut ruleset, version)?;
        Ok(ruleset)
    }

    #[test]
    fn old_flag_names_resolve_in_old_formats() {
        let ruleset = load(RSFORMAT_3_0).unwrap();
        let ironclad = &ruleset.unit_types[0];
        assert!(ironclad.flags.contains(FlagId::Builtin(UnitTypeFlags::COAST_STRICT)));
        assert!(ironclad.flags.contains(FlagId::User(0)));
        assert_eq!(ironclad.move_rate, 4 * RulesConfig::SINGLE_MOVE);
        assert_eq!(ironclad.obsoleted_by, Some(UnitTypeId(1)));
        assert!(ruleset.uclass_has_builtin_flag(UnitTypeId(1), UnitClassFlags::CAN_OCCUPY_CITY));

        let err = load(RSFORMAT_CURRENT).unwrap_err();
        assert!(matches!(err, LoadError::UnknownName { kind: "unit type flag", .. }));
    }
}

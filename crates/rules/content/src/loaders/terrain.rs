//! `terrain.toml`: terrains, extras and their user flag names.

use rules_core::ruleset::{Extra, ExtraCauses, Terrain, TerrainClass};
use rules_core::{ExtraId, Ruleset, TerrainId, UnitClassId};
use serde::{Deserialize, Serialize};

use super::reqs::{ReqSpec, resolve_reqs};
use super::units::UserFlagSpec;
use crate::error::LoadError;

pub const FILE: &str = "terrain.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainFile {
    pub datafile: super::DatafileHeader,
    #[serde(default)]
    pub flags: TerrainFlagNames,
    #[serde(default, rename = "terrain")]
    pub terrains: Vec<TerrainSpec>,
    #[serde(default, rename = "extra")]
    pub extras: Vec<ExtraSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainFlagNames {
    #[serde(default)]
    pub terrain: Vec<UserFlagSpec>,
    #[serde(default)]
    pub extra: Vec<UserFlagSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub name: String,
    #[serde(default)]
    pub class: TerrainClass,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub native_to: Vec<String>,
    #[serde(default)]
    pub defense_bonus: u32,
    #[serde(default)]
    pub transform_result: Option<String>,
    #[serde(default)]
    pub irrigation_time: u32,
    #[serde(default)]
    pub mining_time: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraSpec {
    pub name: String,
    #[serde(default)]
    pub causes: Vec<String>,
    /// Removal causes, e.g. `["Pillage"]`.
    #[serde(default)]
    pub rmcauses: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub native_to: Vec<String>,
    #[serde(default)]
    pub reqs: Vec<ReqSpec>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub defense_bonus: u32,
}

// ============================================================================
// Resolution
// ============================================================================

pub fn register_flags(file: &TerrainFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    let flag_error = |source| LoadError::Flag {
        file: FILE.to_owned(),
        source,
    };
    for flag in &file.flags.terrain {
        ruleset
            .terrain_flags
            .add_user(&flag.name, flag.help.clone())
            .map_err(flag_error)?;
    }
    for flag in &file.flags.extra {
        ruleset
            .extra_flags
            .add_user(&flag.name, flag.help.clone())
            .map_err(flag_error)?;
    }
    Ok(())
}

fn classes(ruleset: &Ruleset, names: &[String]) -> Result<Vec<UnitClassId>, LoadError> {
    names
        .iter()
        .map(|name| {
            ruleset
                .find_unit_class(name)
                .ok_or_else(|| LoadError::unknown(FILE, "unit class", name))
        })
        .collect()
}

fn causes(names: &[String]) -> Result<ExtraCauses, LoadError> {
    let mut causes = ExtraCauses::empty();
    for name in names {
        let cause = ExtraCauses::from_name(&name.to_ascii_uppercase())
            .ok_or_else(|| LoadError::unknown(FILE, "extra cause", name))?;
        causes |= cause;
    }
    Ok(causes)
}

/// Needs the unit classes.
pub fn load_terrains(file: &TerrainFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    for (index, spec) in file.terrains.iter().enumerate() {
        if ruleset.find_terrain(&spec.name).is_some() {
            return Err(duplicate("terrain", &spec.name));
        }
        let mut terrain = Terrain::new(TerrainId(index as u16), &spec.name, spec.class);
        for name in &spec.flags {
            let flag = ruleset
                .terrain_flags
                .resolve(name)
                .ok_or_else(|| LoadError::unknown(FILE, "terrain flag", name))?;
            terrain.flags.insert(flag);
        }
        terrain.native_to = classes(ruleset, &spec.native_to)?;
        terrain.defense_bonus = spec.defense_bonus;
        terrain.irrigation_time = spec.irrigation_time;
        terrain.mining_time = spec.mining_time;
        ruleset.terrains.push(terrain);
    }

    for (index, spec) in file.terrains.iter().enumerate() {
        let Some(name) = spec.transform_result.as_deref() else {
            continue;
        };
        let result = ruleset
            .find_terrain(name)
            .ok_or_else(|| LoadError::unknown(FILE, "terrain", name))?;
        ruleset.terrains[index].transform_result = Some(result);
    }
    Ok(())
}

/// Builds the extras without their requirements, which may name any
/// entity. See [`load_extra_reqs`].
pub fn load_extras(file: &TerrainFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    for (index, spec) in file.extras.iter().enumerate() {
        if ruleset.find_extra(&spec.name).is_some() {
            return Err(duplicate("extra", &spec.name));
        }
        let mut all_causes = causes(&spec.causes)?;
        all_causes |= causes(&spec.rmcauses)?;
        let mut extra = Extra::new(ExtraId(index as u16), &spec.name, all_causes);
        for name in &spec.flags {
            let flag = ruleset
                .extra_flags
                .resolve(name)
                .ok_or_else(|| LoadError::unknown(FILE, "extra flag", name))?;
            extra.flags.insert(flag);
        }
        extra.native_to = classes(ruleset, &spec.native_to)?;
        extra.defense_bonus = spec.defense_bonus;
        ruleset.extras.push(extra);
    }

    for (index, spec) in file.extras.iter().enumerate() {
        let extras = |names: &[String]| -> Result<Vec<ExtraId>, LoadError> {
            names
                .iter()
                .map(|name| {
                    ruleset
                        .find_extra(name)
                        .ok_or_else(|| LoadError::unknown(FILE, "extra", name))
                })
                .collect()
        };
        let conflicts = extras(&spec.conflicts)?;
        let dependencies = extras(&spec.dependencies)?;
        let extra = &mut ruleset.extras[index];
        extra.conflicts = conflicts;
        extra.dependencies = dependencies;
    }
    Ok(())
}

pub fn load_extra_reqs(file: &TerrainFile, ruleset: &mut Ruleset, version: u32) -> Result<(), LoadError> {
    for (index, spec) in file.extras.iter().enumerate() {
        let reqs = resolve_reqs(&spec.reqs, ruleset, version, FILE, &spec.name)?;
        ruleset.extras[index].reqs = reqs;
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
    use rules_core::ruleset::{FlagId, TerrainFlags, UnitClass};

    const TERRAIN: &str = r#"
[datafile]
options = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01"

[[terrain]]
name = "Hills"
flags = ["NoCities"]
native_to = ["Land"]
transform_result = "Plains"

[[terrain]]
name = "Plains"
native_to = ["Land"]

[[extra]]
name = "Fortress"
causes = ["Base"]
rmcauses = ["Pillage"]
dependencies = ["Road"]

[[extra]]
name = "Road"
causes = ["Road"]
"#;

    fn ruleset() -> Ruleset {
        let mut ruleset = Ruleset::new("terrain");
        ruleset.unit_classes.push(UnitClass {
            id: UnitClassId(0),
            name: "Land".to_owned(),
            flags: Default::default(),
        });
        ruleset
    }

    #[test]
    fn terrains_and_extras_link_by_name() {
        let file: TerrainFile = toml::from_str(TERRAIN).unwrap();
        let mut ruleset = ruleset();
        register_flags(&file, &mut ruleset).unwrap();
        load_terrains(&file, &mut ruleset).unwrap();
        load_extras(&file, &mut ruleset).unwrap();

        let hills = &ruleset.terrains[0];
        assert!(hills.flags.contains(FlagId::Builtin(TerrainFlags::NO_CITIES)));
        assert_eq!(hills.transform_result, Some(TerrainId(1)));
        assert_eq!(hills.native_to, vec![UnitClassId(0)]);

        let fortress = &ruleset.extras[0];
        assert!(fortress.causes.contains(ExtraCauses::BASE | ExtraCauses::PILLAGE));
        assert_eq!(fortress.dependencies, vec![ExtraId(1)]);
    }

    #[test]
    fn unknown_cause_is_rejected() {
        assert!(matches!(
            causes(&["Volcano".to_owned()]),
            Err(LoadError::UnknownName { kind: "extra cause", .. })
        ));
    }
}

//! `cities.toml`: techs, governments, nations and buildings.

use rules_core::ruleset::{BuildingGenus, Government, Improvement, Nation, Tech};
use rules_core::{GovernmentId, ImprovementId, NationId, ReqVec, Ruleset, TechId};
use serde::{Deserialize, Serialize};

use super::reqs::{ReqSpec, resolve_reqs};
use crate::error::LoadError;

pub const FILE: &str = "cities.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesFile {
    pub datafile: super::DatafileHeader,
    #[serde(default, rename = "tech")]
    pub techs: Vec<TechSpec>,
    #[serde(default, rename = "government")]
    pub governments: Vec<NamedSpec>,
    #[serde(default, rename = "nation")]
    pub nations: Vec<NamedSpec>,
    #[serde(default, rename = "building")]
    pub buildings: Vec<BuildingSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechSpec {
    pub name: String,
    #[serde(default)]
    pub reqs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedSpec {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub name: String,
    #[serde(default)]
    pub genus: BuildingGenus,
    #[serde(default)]
    pub build_cost: i32,
    #[serde(default)]
    pub reqs: Vec<ReqSpec>,
    #[serde(default)]
    pub obsolete_by: Vec<ReqSpec>,
}

/// Creates every named entity of the file. Requirements come later, once
/// every name in the ruleset is known.
pub fn load_entities(file: &CitiesFile, ruleset: &mut Ruleset) -> Result<(), LoadError> {
    for (index, spec) in file.techs.iter().enumerate() {
        if ruleset.find_tech(&spec.name).is_some() {
            return Err(duplicate("tech", &spec.name));
        }
        ruleset.techs.push(Tech {
            id: TechId(index as u16),
            name: spec.name.clone(),
            research_reqs: Vec::new(),
        });
    }
    for (index, spec) in file.techs.iter().enumerate() {
        let reqs = spec
            .reqs
            .iter()
            .map(|name| {
                ruleset
                    .find_tech(name)
                    .ok_or_else(|| LoadError::unknown(FILE, "tech", name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ruleset.techs[index].research_reqs = reqs;
    }

    for (index, spec) in file.governments.iter().enumerate() {
        if ruleset.find_government(&spec.name).is_some() {
            return Err(duplicate("government", &spec.name));
        }
        ruleset.governments.push(Government {
            id: GovernmentId(index as u16),
            name: spec.name.clone(),
        });
    }
    for (index, spec) in file.nations.iter().enumerate() {
        if ruleset.find_nation(&spec.name).is_some() {
            return Err(duplicate("nation", &spec.name));
        }
        ruleset.nations.push(Nation {
            id: NationId(index as u16),
            name: spec.name.clone(),
        });
    }
    for (index, spec) in file.buildings.iter().enumerate() {
        if ruleset.find_improvement(&spec.name).is_some() {
            return Err(duplicate("building", &spec.name));
        }
        ruleset.improvements.push(Improvement {
            id: ImprovementId(index as u16),
            name: spec.name.clone(),
            genus: spec.genus,
            build_cost: spec.build_cost,
            reqs: ReqVec::new(),
            obsolete_by: ReqVec::new(),
        });
    }
    Ok(())
}

pub fn load_building_reqs(file: &CitiesFile, ruleset: &mut Ruleset, version: u32) -> Result<(), LoadError> {
    for (index, spec) in file.buildings.iter().enumerate() {
        let reqs = resolve_reqs(&spec.reqs, ruleset, version, FILE, &spec.name)?;
        // Obsolescence is a disjunction.
        let obsolete_by = resolve_reqs(&spec.obsolete_by, ruleset, version, FILE, &spec.name)?
            .with_mode(rules_core::VectorMode::Any);
        let building = &mut ruleset.improvements[index];
        building.reqs = reqs;
        building.obsolete_by = obsolete_by;
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
    use rules_core::compat::RSFORMAT_CURRENT;
    use rules_core::{Universal, VectorMode};

    const CITIES: &str = r#"
[datafile]
options = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01"

[[tech]]
name = "Bronze Working"

[[tech]]
name = "Currency"
reqs = ["Bronze Working"]

[[government]]
name = "Despotism"

[[building]]
name = "Colossus"
genus = "GreatWonder"
reqs = [{ type = "Tech", name = "Bronze Working", range = "Player" }]
obsolete_by = [{ type = "Tech", name = "Currency", range = "Player" }]
"#;

    #[test]
    fn buildings_get_reqs_after_every_name_exists() {
        let file: CitiesFile = toml::from_str(CITIES).unwrap();
        let mut ruleset = Ruleset::new("cities");
        load_entities(&file, &mut ruleset).unwrap();
        load_building_reqs(&file, &mut ruleset, RSFORMAT_CURRENT).unwrap();

        assert_eq!(ruleset.techs[1].research_reqs, vec![TechId(0)]);
        let colossus = &ruleset.improvements[0];
        assert!(ruleset.is_great_wonder(colossus.id));
        assert_eq!(colossus.reqs.iter().next().map(|req| req.source), Some(Universal::Advance(TechId(0))));
        assert_eq!(colossus.obsolete_by.mode(), VectorMode::Any);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut file: CitiesFile = toml::from_str(CITIES).unwrap();
        file.governments.push(NamedSpec {
            name: "despotism".to_owned(),
        });
        let err = load_entities(&file, &mut Ruleset::new("cities")).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName { kind: "government", .. }));
    }
}

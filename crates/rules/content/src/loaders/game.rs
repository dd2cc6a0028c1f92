//! `game.toml`: settings, action tuning, enablers and legacy combat flags.
//!
//! ```toml
//! [settings]
//! citymindist = 3
//!
//! [[action]]
//! name = "Conquer City"
//! blocked_by = ["Attack"]
//!
//! [[enabler]]
//! action = "Found City"
//! actor_reqs = [{ type = "UnitFlag", name = "Cities", range = "Local" }]
//! ```

use rules_core::compat::names::upgraded_action_name;
use rules_core::{ActionEnabler, ActionId, ActionSet, LegacyCombatRules, RulesConfig, RulesetContext};
use serde::{Deserialize, Serialize};

use super::reqs::{ReqSpec, resolve_reqs};
use crate::error::LoadError;

pub const FILE: &str = "game.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFile {
    pub datafile: super::DatafileHeader,
    #[serde(default)]
    pub about: About,
    #[serde(default)]
    pub settings: RulesConfig,
    /// Combat switches of older formats; ignored for the current one.
    #[serde(default)]
    pub combat_rules: LegacyCombatRules,
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionSpec>,
    #[serde(default, rename = "enabler")]
    pub enablers: Vec<EnablerSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct About {
    #[serde(default)]
    pub name: Option<String>,
}

/// Ruleset overrides for one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default)]
    pub ui_name: Option<String>,
    #[serde(default)]
    pub max_distance: Option<u32>,
    #[serde(default)]
    pub blocked_by: Vec<String>,
    #[serde(default)]
    pub quiet: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnablerSpec {
    pub action: String,
    #[serde(default)]
    pub actor_reqs: Vec<ReqSpec>,
    #[serde(default)]
    pub target_reqs: Vec<ReqSpec>,
}

/// Rejects `[settings]` values the engine has no bounds for.
pub fn check_settings(settings: &RulesConfig) -> Result<(), LoadError> {
    if settings.citymindist > RulesConfig::MAX_CITYMINDIST {
        return Err(LoadError::SettingOutOfRange {
            file: FILE.to_owned(),
            name: "citymindist",
            value: settings.citymindist,
            max: RulesConfig::MAX_CITYMINDIST,
        });
    }
    Ok(())
}

fn action_id(name: &str, version: u32) -> Result<ActionId, LoadError> {
    let name = upgraded_action_name(name, version);
    ActionId::from_rule_name(name).ok_or_else(|| LoadError::unknown(FILE, "action", name))
}

/// Applies the `[[action]]` overrides to the catalog.
pub fn apply_actions(file: &GameFile, context: &mut RulesetContext, version: u32) -> Result<(), LoadError> {
    let catalog_error = |source| LoadError::Catalog {
        file: FILE.to_owned(),
        source,
    };
    for spec in &file.actions {
        let id = action_id(&spec.name, version)?;
        if let Some(ui_name) = &spec.ui_name {
            context.catalog.set_ui_name(id, ui_name.as_str()).map_err(catalog_error)?;
        }
        if let Some(max) = spec.max_distance {
            context.catalog.set_max_distance(id, max).map_err(catalog_error)?;
        }
        if !spec.blocked_by.is_empty() {
            let mut blocked_by = ActionSet::new();
            for name in &spec.blocked_by {
                blocked_by.insert(action_id(name, version)?);
            }
            context.catalog.set_blocked_by(id, blocked_by).map_err(catalog_error)?;
        }
        if let Some(quiet) = spec.quiet {
            context.catalog.set_quiet(id, quiet);
        }
    }
    Ok(())
}

/// Adds the `[[enabler]]` entries. Needs the complete ruleset.
pub fn load_enablers(file: &GameFile, context: &mut RulesetContext, version: u32) -> Result<(), LoadError> {
    let mut enablers = Vec::with_capacity(file.enablers.len());
    for spec in &file.enablers {
        let action = action_id(&spec.action, version)?;
        let owner = format!("enabler for {}", action.rule_name());
        let actor_reqs = resolve_reqs(&spec.actor_reqs, &context.ruleset, version, FILE, &owner)?;
        let target_reqs = resolve_reqs(&spec.target_reqs, &context.ruleset, version, FILE, &owner)?;
        enablers.push(ActionEnabler::new(action, actor_reqs, target_reqs));
    }
    context.enablers.extend(enablers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::Ruleset;
    use rules_core::compat::{RSFORMAT_3_0, RSFORMAT_CURRENT};

    const GAME: &str = r#"
[datafile]
options = "+Freeciv-ruleset-3.1-Devel-2021.Jan.01"
format_version = 20

[settings]
citymindist = 3

[[action]]
name = "Recycle Unit"
ui_name = "%sRecycle%s"

[[action]]
name = "Conquer City"
blocked_by = ["Attack"]
"#;

    fn context(file: &GameFile) -> RulesetContext {
        RulesetContext::new(Ruleset::new("game"), file.settings.clone())
    }

    #[test]
    fn settings_default_where_missing() {
        let file: GameFile = toml::from_str(GAME).unwrap();
        assert_eq!(file.settings.citymindist, 3);
        assert_eq!(file.settings.add_to_size_limit, RulesConfig::DEFAULT_ADD_TO_SIZE_LIMIT);
        assert_eq!(file.combat_rules, LegacyCombatRules::default());
    }

    #[test]
    fn citymindist_is_bounded() {
        let file: GameFile = toml::from_str(GAME).unwrap();
        check_settings(&file.settings).unwrap();
        check_settings(&RulesConfig::new().with_citymindist(0)).unwrap();

        let err = check_settings(&RulesConfig::new().with_citymindist(12)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::SettingOutOfRange {
                name: "citymindist",
                value: 12,
                max: 11,
                ..
            }
        ));
    }

    #[test]
    fn action_overrides_use_upgraded_names() {
        let file: GameFile = toml::from_str(GAME).unwrap();
        let mut context = context(&file);
        apply_actions(&file, &mut context, RSFORMAT_3_0).unwrap();
        assert_eq!(context.catalog.get(ActionId::DisbandUnitRecover).ui_name, "%sRecycle%s");
        assert!(
            context
                .catalog
                .action_would_be_blocked_by(ActionId::ConquerCity, ActionId::Attack)
        );

        let mut context = self::context(&file);
        let err = apply_actions(&file, &mut context, RSFORMAT_CURRENT).unwrap_err();
        assert!(matches!(err, LoadError::UnknownName { kind: "action", .. }));
    }
}

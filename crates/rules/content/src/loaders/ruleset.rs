//! Ruleset directory loader.
//!
//! # Directory Structure
//!
//! ```text
//! ruleset_dir/
//! ├── game.toml
//! ├── units.toml
//! ├── terrain.toml
//! ├── cities.toml
//! └── effects.toml
//! ```
//!
//! Files are parsed up front and their headers negotiated. Entities are
//! then built in dependency order: user flag names, legacy flags, named
//! entities, requirement lists, the action catalog and the enablers. The
//! remaining upgrade stages run on the finished context.

use std::path::Path;

use rules_core::compat::RulesetUpgrade;
use rules_core::{CompatInfo, Ruleset, RulesetContext, Upgraded};

use super::cities::{self, CitiesFile};
use super::datafile::negotiate_version;
use super::effects::{self, EffectsFile};
use super::game::{self, GameFile};
use super::terrain::{self, TerrainFile};
use super::units::{self, UnitsFile};
use super::{LoadResult, parse_toml};
use crate::error::LoadError;

/// The five parsed files of one ruleset directory.
struct RulesetFiles {
    game: GameFile,
    units: UnitsFile,
    terrain: TerrainFile,
    cities: CitiesFile,
    effects: EffectsFile,
}

impl RulesetFiles {
    fn read(dir: &Path) -> LoadResult<Self> {
        Ok(Self {
            game: parse_toml(&dir.join(game::FILE))?,
            units: parse_toml(&dir.join(units::FILE))?,
            terrain: parse_toml(&dir.join(terrain::FILE))?,
            cities: parse_toml(&dir.join(cities::FILE))?,
            effects: parse_toml(&dir.join(effects::FILE))?,
        })
    }

    fn version(&self, compat_mode: bool) -> Result<u32, LoadError> {
        negotiate_version(
            [
                (game::FILE, &self.game.datafile),
                (units::FILE, &self.units.datafile),
                (terrain::FILE, &self.terrain.datafile),
                (cities::FILE, &self.cities.datafile),
                (effects::FILE, &self.effects.datafile),
            ],
            compat_mode,
        )
    }
}

/// Loader for ruleset directories.
#[derive(Clone, Copy, Debug, Default)]
pub struct RulesetLoader {
    compat_mode: bool,
}

impl RulesetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept rulesets of the previous format and upgrade them.
    #[must_use]
    pub fn with_compat_mode(mut self, compat_mode: bool) -> Self {
        self.compat_mode = compat_mode;
        self
    }

    /// Loads, upgrades and sanity checks the ruleset in `dir`.
    ///
    /// Every upgrade warning is logged at `warn` level. They are also
    /// returned in [`Upgraded::warnings`].
    pub fn load(&self, dir: &Path) -> LoadResult<Upgraded> {
        let files = RulesetFiles::read(dir)?;
        let version = files.version(self.compat_mode)?;
        let info = CompatInfo::new(self.compat_mode, version);
        tracing::debug!(ruleset = %dir.display(), version, compat_mode = self.compat_mode, "loading ruleset");

        let name = files
            .game
            .about
            .name
            .clone()
            .or_else(|| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "ruleset".to_owned());
        let mut upgrade = RulesetUpgrade::new(info).with_legacy_rules(files.game.combat_rules);
        let ruleset = Self::build_ruleset(&files, name, &mut upgrade, version)?;

        game::check_settings(&files.game.settings)?;
        let mut context = RulesetContext::new(ruleset, files.game.settings.clone());
        game::apply_actions(&files.game, &mut context, version)?;
        game::load_enablers(&files.game, &mut context, version)?;

        let stage_error = |source| LoadError::compat(game::FILE, source);
        upgrade.add_obligatory_reqs(&mut context).map_err(stage_error)?;
        upgrade.postprocess(&mut context).map_err(stage_error)?;
        upgrade.sanity_check(&mut context).map_err(stage_error)?;
        let upgraded = upgrade.finish(context);

        for warning in &upgraded.warnings {
            tracing::warn!(ruleset = %dir.display(), "{}", warning);
        }
        tracing::info!(
            ruleset = %upgraded.context.ruleset.name,
            version,
            unit_types = upgraded.context.ruleset.unit_types.len(),
            enablers = upgraded.context.enablers.len(),
            warnings = upgraded.warnings.len(),
            "ruleset loaded"
        );
        Ok(upgraded)
    }

    fn build_ruleset(
        files: &RulesetFiles,
        name: String,
        upgrade: &mut RulesetUpgrade,
        version: u32,
    ) -> Result<Ruleset, LoadError> {
        let mut ruleset = Ruleset::new(name);

        units::register_flags(&files.units, &mut ruleset)?;
        terrain::register_flags(&files.terrain, &mut ruleset)?;
        upgrade
            .upgrade_names(&mut ruleset)
            .map_err(|source| LoadError::compat(units::FILE, source))?;

        cities::load_entities(&files.cities, &mut ruleset)?;
        units::load_veteran_levels(&files.units, &mut ruleset);
        units::load_classes(&files.units, &mut ruleset)?;
        terrain::load_terrains(&files.terrain, &mut ruleset)?;
        terrain::load_extras(&files.terrain, &mut ruleset)?;
        units::load_unit_types(&files.units, &mut ruleset, version)?;

        terrain::load_extra_reqs(&files.terrain, &mut ruleset, version)?;
        cities::load_building_reqs(&files.cities, &mut ruleset, version)?;
        let skipped = effects::load_effects(&files.effects, &mut ruleset, version)?;
        if skipped > 0 {
            tracing::debug!(skipped, "effects without engine use skipped");
        }
        Ok(ruleset)
    }
}

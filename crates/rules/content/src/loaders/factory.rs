//! Content factory for loading a ruleset and its world snapshots.

use std::path::{Path, PathBuf};

use rules_core::{Ruleset, Upgraded, World};

use crate::loaders::{LoadResult, RulesetLoader, WorldLoader};

/// Content factory that loads all rules content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── game.toml
/// ├── units.toml
/// ├── terrain.toml
/// ├── cities.toml
/// ├── effects.toml
/// └── snapshots/
///     ├── border_skirmish.ron
///     └── nuclear_winter.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
    loader: RulesetLoader,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            loader: RulesetLoader::new(),
        }
    }

    /// Accept rulesets of the previous format.
    #[must_use]
    pub fn with_compat_mode(mut self, compat_mode: bool) -> Self {
        self.loader = self.loader.with_compat_mode(compat_mode);
        self
    }

    /// Load, upgrade and check the ruleset files of the data directory.
    pub fn load_ruleset(&self) -> LoadResult<Upgraded> {
        self.loader.load(&self.data_dir)
    }

    /// Load a world from `snapshots/{name}.ron`.
    ///
    /// # Arguments
    ///
    /// * `name` - Snapshot file name without the `.ron` extension
    /// * `ruleset` - Ruleset the snapshot's names refer to
    pub fn load_snapshot(&self, name: &str, ruleset: &Ruleset) -> LoadResult<World> {
        WorldLoader::load(&self.snapshot_path(name), ruleset)
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("snapshots").join(format!("{}.ron", name))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/rules").with_compat_mode(true);
        assert_eq!(factory.data_dir(), Path::new("/tmp/rules"));
        assert_eq!(
            factory.snapshot_path("skirmish"),
            Path::new("/tmp/rules/snapshots/skirmish.ron")
        );
    }
}

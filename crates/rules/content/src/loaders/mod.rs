//! Loaders for ruleset directories and world snapshots.
//!
//! Each ruleset file has its own module with the serde layout of the file
//! and the code that resolves its names into `rules-core` entities.
//! [`RulesetLoader`] drives them in dependency order.

pub mod cities;
pub mod datafile;
pub mod effects;
pub mod factory;
pub mod game;
pub mod reqs;
pub mod ruleset;
pub mod terrain;
pub mod units;
pub mod world;

pub use datafile::DatafileHeader;
pub use factory::ContentFactory;
pub use reqs::ReqSpec;
pub use ruleset::RulesetLoader;
pub use world::{WorldLoader, WorldSnapshot};

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

pub(crate) fn parse_toml<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let content = read_file(path)?;
    toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse TOML at {}: {}", path.display(), e))
}

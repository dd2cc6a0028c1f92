//! Ruleset and world snapshot loaders.
//!
//! This crate reads the data files `rules-core` is configured from:
//! - Ruleset directories (TOML: game, units, terrain, cities, effects)
//! - World snapshots (RON) for offline queries
//!
//! Loading a ruleset negotiates capabilities and the format version, runs
//! the compatibility upgrader and logs every warning it reports.

pub mod error;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use error::LoadError;

#[cfg(feature = "loaders")]
pub use loaders::{
    ContentFactory, DatafileHeader, LoadResult, ReqSpec, RulesetLoader, WorldLoader, WorldSnapshot,
};

//! Action legality and probability engine for a Freeciv-style ruleset.
//!
//! `rules-core` decides whether a unit may perform an action against a
//! target, how likely it is to succeed, and what a player can know about
//! both. The ruleset side is one owned [`RulesetContext`]: entity tables,
//! the [`ActionCatalog`] and the [`EnablerStore`]. The game side is a
//! read-only [`World`] snapshot. Queries go through [`ActionEngine`].
//!
//! Rulesets written for an older format pass through [`compat`] once
//! before the first query. The crate does no I/O; loaders live in
//! `rules-content`.
pub mod action;
pub mod actres;
pub mod compat;
pub mod config;
pub mod context;
pub mod effects;
pub mod engine;
pub mod error;
pub mod ids;
pub mod metaknowledge;
pub mod requirement;
pub mod ruleset;
pub mod state;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
pub mod tri;

pub use action::{
    ActProb, Action, ActionCatalog, ActionEnabler, ActionId, ActionSet, ActorKind, CatalogError,
    EnablerStore, ReqVecProblem, TargetKind, action_enabler_suggest_repair,
};
pub use actres::{ActionResult, BattleKind, Hostility, SubTargetCompletion};
pub use compat::{
    CompatError, CompatInfo, CompatWarning, CompatWarningKind, LegacyCombatRules, RulesetUpgrade,
    UpgradeStage, Upgraded,
};
pub use config::RulesConfig;
pub use context::RulesetContext;
pub use effects::{Effect, EffectKind};
pub use engine::{ActionEngine, ActionTarget, TargetRef};
pub use error::{ErrorSeverity, RulesError};
pub use ids::{
    CityId, ExtraId, GovernmentId, ImprovementId, NationId, PlayerId, TechId, TerrainId, TilePos,
    UnitClassId, UnitId, UnitTypeId,
};
pub use requirement::{
    ReqContext, ReqRange, ReqVec, Requirement, RequirementError, Universal, UniversalKind,
    VectorMode,
};
pub use ruleset::{FlagError, Ruleset};
pub use state::{City, GameMap, Player, Unit, World};
pub use tri::Tri;

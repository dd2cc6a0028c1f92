//! Ruleset compatibility upgrader.
//!
//! Loading a ruleset written for an older format runs four one-shot
//! stages in a fixed order:
//!
//! 1. **Names**: legacy user flags are back-filled and renamed identifiers
//!    resolved ([`names`]).
//! 2. **Obligatory requirements**: enablers get the requirements the engine
//!    enforces anyway, splitting when there are alternatives.
//! 3. **Post-processing**: rules that used to be hard-coded become effects,
//!    enablers and blockers.
//! 4. **Sanity**: enablers that can never be active are disabled.
//!
//! Current-format rulesets skip the rewriting; their problems are errors.
//! Nothing is logged here: every recoverable change is reported as a
//! [`CompatWarning`] for the loader to log.

mod caps;
mod error;
pub mod names;
mod postprocess;
mod repair;
mod sanity;

pub use caps::{DEFAULT_FORMAT_VERSION, RULESET_CAPABILITIES, RULESET_COMPAT_CAP, check_capabilities, has_capabilities};
pub use error::CompatError;
pub use postprocess::LegacyCombatRules;
pub use sanity::enabler_sanity_problem;

use crate::context::RulesetContext;
use crate::ruleset::Ruleset;

/// Format version of 3.0 rulesets.
pub const RSFORMAT_3_0: u32 = 10;
/// Format version of 3.1 rulesets.
pub const RSFORMAT_3_1: u32 = 20;
pub const RSFORMAT_CURRENT: u32 = RSFORMAT_3_1;

// ============================================================================
// Warnings
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompatWarningKind {
    /// An enabler couldn't be repaired and is inert now.
    EnablerDisabled,
    /// Something old can't be translated; a human has to edit the ruleset.
    ManualFixNeeded,
    /// An effect became an enabler.
    EffectConverted,
    /// An enabler was split to cover alternative repairs.
    EnablerSplit,
    /// An enabler failed the sanity check and is inert now.
    SanityDisabled,
}

/// A change the upgrader made, or couldn't make.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompatWarning {
    pub kind: CompatWarningKind,
    pub message: String,
}

impl CompatWarning {
    pub fn new(kind: CompatWarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for CompatWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// Stages
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpgradeStage {
    NotStarted,
    NamesUpgraded,
    ObligatoryReqsAdded,
    PostProcessed,
    SanityChecked,
}

/// What is known about the ruleset being loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompatInfo {
    /// Whether older formats are accepted at all.
    pub compat_mode: bool,
    /// Format version of the datafiles.
    pub version: u32,
}

impl CompatInfo {
    pub fn new(compat_mode: bool, version: u32) -> Self {
        Self { compat_mode, version }
    }

    /// A current-format ruleset loaded without compatibility mode.
    pub fn current() -> Self {
        Self::new(false, RSFORMAT_CURRENT)
    }

    pub fn is_old_format(&self) -> bool {
        self.version < RSFORMAT_CURRENT
    }
}

/// Result of a full upgrade.
#[derive(Clone, Debug)]
pub struct Upgraded {
    pub context: RulesetContext,
    pub warnings: Vec<CompatWarning>,
    pub stage: UpgradeStage,
}

/// Drives the stages of one ruleset load.
///
/// Each stage runs once, in order. Loaders run [`Self::upgrade_names`]
/// before resolving entity definitions and the other stages once the
/// [`RulesetContext`] is complete.
#[derive(Clone, Debug)]
pub struct RulesetUpgrade {
    info: CompatInfo,
    legacy: LegacyCombatRules,
    stage: UpgradeStage,
    warnings: Vec<CompatWarning>,
}

impl RulesetUpgrade {
    pub fn new(info: CompatInfo) -> Self {
        Self {
            info,
            legacy: LegacyCombatRules::default(),
            stage: UpgradeStage::NotStarted,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_legacy_rules(mut self, legacy: LegacyCombatRules) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn info(&self) -> CompatInfo {
        self.info
    }

    pub fn stage(&self) -> UpgradeStage {
        self.stage
    }

    pub fn warnings(&self) -> &[CompatWarning] {
        &self.warnings
    }

    fn enter(&mut self, from: UpgradeStage, to: UpgradeStage) -> Result<(), CompatError> {
        if self.stage != from {
            return Err(CompatError::StageOrder {
                expected: from,
                found: self.stage,
            });
        }
        tracing::debug!(version = self.info.version, "ruleset upgrade stage {}", to);
        self.stage = to;
        Ok(())
    }

    /// Back-fills the legacy user flags of an old-format ruleset.
    pub fn upgrade_names(&mut self, ruleset: &mut Ruleset) -> Result<(), CompatError> {
        self.enter(UpgradeStage::NotStarted, UpgradeStage::NamesUpgraded)?;
        names::upgrade_flag_names(ruleset, self.info.version)
    }

    /// Repairs old-format enablers, or rejects current-format enablers
    /// that lack an obligatory requirement.
    pub fn add_obligatory_reqs(&mut self, context: &mut RulesetContext) -> Result<(), CompatError> {
        self.enter(UpgradeStage::NamesUpgraded, UpgradeStage::ObligatoryReqsAdded)?;
        if self.info.is_old_format() {
            repair::add_obligatory_hard_reqs(&mut context.enablers, &context.ruleset, &mut self.warnings);
            Ok(())
        } else {
            repair::check_obligatory_hard_reqs(&context.enablers, &context.ruleset)
        }
    }

    /// Turns formerly hard-coded rules of an old-format ruleset into data,
    /// then repairs the new enablers.
    pub fn postprocess(&mut self, context: &mut RulesetContext) -> Result<(), CompatError> {
        self.enter(UpgradeStage::ObligatoryReqsAdded, UpgradeStage::PostProcessed)?;
        if !self.info.is_old_format() {
            return Ok(());
        }
        postprocess::run(context, self.legacy, &mut self.warnings)?;
        repair::add_obligatory_hard_reqs(&mut context.enablers, &context.ruleset, &mut self.warnings);
        Ok(())
    }

    /// Disables insane enablers of old-format rulesets. In current-format
    /// rulesets an insane enabler is an error.
    pub fn sanity_check(&mut self, context: &mut RulesetContext) -> Result<(), CompatError> {
        self.enter(UpgradeStage::PostProcessed, UpgradeStage::SanityChecked)?;
        sanity::check_enablers(context, self.info.is_old_format(), &mut self.warnings)
    }

    pub fn finish(self, context: RulesetContext) -> Upgraded {
        Upgraded {
            context,
            warnings: self.warnings,
            stage: self.stage,
        }
    }
}

/// Runs every stage on a complete context.
///
/// The names stage runs on `context.ruleset` here, so entity definitions
/// must not already use the legacy flag names.
pub fn upgrade(
    mut context: RulesetContext,
    info: CompatInfo,
    legacy: LegacyCombatRules,
) -> Result<Upgraded, CompatError> {
    let mut upgrade = RulesetUpgrade::new(info).with_legacy_rules(legacy);
    upgrade.upgrade_names(&mut context.ruleset)?;
    upgrade.add_obligatory_reqs(&mut context)?;
    upgrade.postprocess(&mut context)?;
    upgrade.sanity_check(&mut context)?;
    Ok(upgrade.finish(context))
}

//! Errors raised while upgrading a ruleset.

use crate::action::{ActionId, CatalogError};
use crate::error::{ErrorSeverity, RulesError};
use crate::ruleset::FlagError;

use super::UpgradeStage;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompatError {
    #[error("ruleset datafile appears incompatible: options \"{found}\", supported \"{supported}\"")]
    Incompatible { found: String, supported: String },

    #[error("ruleset datafile claims unsupported option(s): options \"{found}\", supported \"{supported}\"")]
    UnsupportedOptions { found: String, supported: String },

    #[error("format version {version} is newer than the supported {current}")]
    FormatTooNew { version: u32, current: u32 },

    #[error("format version {version} is only loaded in compatibility mode")]
    NeedsCompatMode { version: u32 },

    #[error("can't back-fill legacy flags: {0}")]
    Flag(#[from] FlagError),

    #[error("{action}: {problem}")]
    MissingObligatoryReq { action: ActionId, problem: String },

    #[error("{action}: {problem}")]
    InsaneEnabler { action: ActionId, problem: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("upgrade step for {expected:?} run at {found:?}")]
    StageOrder {
        expected: UpgradeStage,
        found: UpgradeStage,
    },
}

impl RulesError for CompatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Flag(err) => err.severity(),
            Self::Catalog(err) => err.severity(),
            Self::StageOrder { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Incompatible { .. } => "COMPAT_INCOMPATIBLE",
            Self::UnsupportedOptions { .. } => "COMPAT_UNSUPPORTED_OPTIONS",
            Self::FormatTooNew { .. } => "COMPAT_FORMAT_TOO_NEW",
            Self::NeedsCompatMode { .. } => "COMPAT_NEEDS_COMPAT_MODE",
            Self::Flag(err) => err.error_code(),
            Self::MissingObligatoryReq { .. } => "COMPAT_MISSING_OBLIGATORY_REQ",
            Self::InsaneEnabler { .. } => "COMPAT_INSANE_ENABLER",
            Self::Catalog(err) => err.error_code(),
            Self::StageOrder { .. } => "COMPAT_STAGE_ORDER",
        }
    }
}

use crate::error::{ErrorSeverity, RulesError};

use super::range::ReqRange;
use super::universal::UniversalKind;

/// Errors raised while building requirements from rule names.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequirementError {
    #[error("unknown requirement type \"{0}\"")]
    UnknownKind(String),

    #[error("unknown {kind} value \"{value}\"")]
    UnknownValue { kind: UniversalKind, value: String },

    #[error("unknown requirement range \"{0}\"")]
    UnknownRange(String),

    #[error("{kind} requirements can't use range {range}")]
    UnsupportedRange { kind: UniversalKind, range: ReqRange },

    #[error("{kind} requirement at range {range} can't survive")]
    SurvivesNotAllowed { kind: UniversalKind, range: ReqRange },
}

impl RulesError for RequirementError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "REQ_UNKNOWN_KIND",
            Self::UnknownValue { .. } => "REQ_UNKNOWN_VALUE",
            Self::UnknownRange(_) => "REQ_UNKNOWN_RANGE",
            Self::UnsupportedRange { .. } => "REQ_UNSUPPORTED_RANGE",
            Self::SurvivesNotAllowed { .. } => "REQ_SURVIVES_NOT_ALLOWED",
        }
    }
}

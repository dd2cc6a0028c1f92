//! Structured load failures.
//!
//! Loaders return `anyhow` results with file context. The errors below are
//! the ones callers may want to match on: they survive as the root cause
//! and can be recovered with `downcast_ref::<LoadError>()`.

use rules_core::{CatalogError, CompatError, ErrorSeverity, FlagError, RequirementError, RulesError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{file}: {source}")]
    Compat {
        file: String,
        #[source]
        source: CompatError,
    },

    #[error("{file}: {source}")]
    Flag {
        file: String,
        #[source]
        source: FlagError,
    },

    #[error("{file}: {context}: {source}")]
    Requirement {
        file: String,
        context: String,
        #[source]
        source: RequirementError,
    },

    #[error("{file}: {source}")]
    Catalog {
        file: String,
        #[source]
        source: CatalogError,
    },

    #[error("{file}: unknown {kind} \"{name}\"")]
    UnknownName {
        file: String,
        kind: &'static str,
        name: String,
    },

    #[error("{file}: {kind} \"{name}\" is defined twice")]
    DuplicateName {
        file: String,
        kind: &'static str,
        name: String,
    },

    #[error("{file}: setting {name} = {value} is outside 0..={max}")]
    SettingOutOfRange {
        file: String,
        name: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{file}: format version {found} differs from {expected} of game.toml")]
    VersionMismatch { file: String, found: u32, expected: u32 },
}

impl LoadError {
    pub fn unknown(file: &str, kind: &'static str, name: &str) -> Self {
        Self::UnknownName {
            file: file.to_owned(),
            kind,
            name: name.to_owned(),
        }
    }

    pub fn compat(file: &str, source: CompatError) -> Self {
        Self::Compat {
            file: file.to_owned(),
            source,
        }
    }
}

impl RulesError for LoadError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Compat { source, .. } => source.severity(),
            Self::Flag { source, .. } => source.severity(),
            Self::Catalog { source, .. } => source.severity(),
            Self::Requirement { .. }
            | Self::UnknownName { .. }
            | Self::DuplicateName { .. }
            | Self::SettingOutOfRange { .. } => {
                ErrorSeverity::Validation
            }
            Self::VersionMismatch { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Compat { source, .. } => source.error_code(),
            Self::Flag { source, .. } => source.error_code(),
            Self::Catalog { source, .. } => source.error_code(),
            Self::Requirement { source, .. } => source.error_code(),
            Self::UnknownName { .. } => "LOAD_UNKNOWN_NAME",
            Self::DuplicateName { .. } => "LOAD_DUPLICATE_NAME",
            Self::SettingOutOfRange { .. } => "LOAD_SETTING_OUT_OF_RANGE",
            Self::VersionMismatch { .. } => "LOAD_VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_the_wrapped_error() {
        let err = LoadError::compat("game.toml", CompatError::NeedsCompatMode { version: 10 });
        assert!(err.severity().is_fatal());
        assert_eq!(err.error_code(), "COMPAT_NEEDS_COMPAT_MODE");

        let err = LoadError::unknown("units.toml", "unit class", "Sea");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.to_string(), "units.toml: unknown unit class \"Sea\"");
    }
}

//! Common error infrastructure for rules-core.
//!
//! Domain-specific errors (`RequirementError`, `CatalogError`, `CompatError`)
//! live next to the code that raises them. They share the classification
//! defined here so loaders and tools can decide uniformly whether a failure
//! aborts a ruleset load or only degrades it.

/// Severity level of an error.
///
/// - **Recoverable**: the caller may retry with different input
/// - **Validation**: malformed input that must be fixed by the author
/// - **Internal**: an engine invariant was violated
/// - **Fatal**: ruleset loading cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error, e.g. an unknown name in an optional lookup.
    Recoverable,

    /// Validation error, e.g. a requirement with a range its kind never
    /// supports.
    Validation,

    /// Internal error: a query was made with arguments that break an engine
    /// contract (target kind mismatch, missing entity).
    Internal,

    /// Fatal error: capability mismatch, unsupported format version or
    /// exhausted user flag slots.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error must abort a ruleset load.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all rules-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by what the loader has to do, not by impact
/// - Error codes are stable SCREAMING_SNAKE_CASE identifiers
pub trait RulesError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a stable error code for tooling and logs.
    fn error_code(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_fatal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}

//! Requirement lists as written in ruleset files.
//!
//! ```toml
//! reqs = [
//!     { type = "UnitFlag", name = "Settlers", range = "Local" },
//!     { type = "DiplRel", name = "Foreign", range = "Local", present = false },
//! ]
//! ```

use rules_core::compat::names::{upgraded_action_name, upgraded_req_kind_name, upgraded_unit_flag_name};
use rules_core::{ReqVec, Requirement, Ruleset};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

fn present_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Missing means the kind's default range.
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default = "present_default")]
    pub present: bool,
    #[serde(default)]
    pub survives: bool,
    #[serde(default)]
    pub quiet: bool,
}

impl ReqSpec {
    /// Resolves the names, upgrading those an older format used.
    pub fn resolve(&self, ruleset: &Ruleset, version: u32) -> Result<Requirement, rules_core::RequirementError> {
        let kind = upgraded_req_kind_name(&self.kind, version);
        let name = if kind.eq_ignore_ascii_case("UnitFlag") {
            upgraded_unit_flag_name(&self.name, version)
        } else if kind.eq_ignore_ascii_case("Action") {
            upgraded_action_name(&self.name, version)
        } else {
            &self.name
        };
        Requirement::from_names(
            kind,
            self.range.as_deref(),
            name,
            self.present,
            self.survives,
            self.quiet,
            ruleset,
        )
    }
}

/// Resolves a whole list. `context` names the owner in error messages.
pub fn resolve_reqs(
    specs: &[ReqSpec],
    ruleset: &Ruleset,
    version: u32,
    file: &str,
    context: &str,
) -> Result<ReqVec, LoadError> {
    specs
        .iter()
        .map(|spec| {
            spec.resolve(ruleset, version).map_err(|source| LoadError::Requirement {
                file: file.to_owned(),
                context: context.to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ReqVec::from_reqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules_core::compat::{RSFORMAT_3_0, RSFORMAT_CURRENT};
    use rules_core::{ReqRange, Universal};

    fn spec(kind: &str, name: &str) -> ReqSpec {
        ReqSpec {
            kind: kind.to_owned(),
            name: name.to_owned(),
            range: None,
            present: true,
            survives: false,
            quiet: false,
        }
    }

    #[test]
    fn old_kind_names_are_upgraded() {
        let ruleset = Ruleset::new("reqs");
        let req = spec("MinMoves", "1").resolve(&ruleset, RSFORMAT_3_0).unwrap();
        assert_eq!(req.source, Universal::MinMoveFrags(1));
        assert_eq!(req.range, ReqRange::Local);

        assert!(spec("MinMoves", "1").resolve(&ruleset, RSFORMAT_CURRENT).is_err());
    }

    #[test]
    fn old_action_names_are_upgraded() {
        let ruleset = Ruleset::new("reqs");
        let req = spec("Action", "Recycle Unit").resolve(&ruleset, RSFORMAT_3_0).unwrap();
        assert_eq!(req.source, Universal::Action(rules_core::ActionId::DisbandUnitRecover));
    }

    #[test]
    fn errors_name_their_owner() {
        let ruleset = Ruleset::new("reqs");
        let err = resolve_reqs(&[spec("Advance", "Alphabet")], &ruleset, RSFORMAT_CURRENT, "cities.toml", "Temple")
            .unwrap_err();
        assert!(err.to_string().starts_with("cities.toml: Temple:"));
    }
}

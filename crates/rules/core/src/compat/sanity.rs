//! Final enabler sanity check.

use crate::action::{ActionEnabler, ReqVecSide, enabler_first_self_contradiction};
use crate::context::RulesetContext;
use crate::requirement::{ReqRange, ReqVec, UniversalKind, universal_never_there};
use crate::ruleset::Ruleset;

use super::{CompatError, CompatWarning, CompatWarningKind};

/// Problem with one requirement vector on its own, if any.
fn req_vec_problem(reqs: &ReqVec, ruleset: &Ruleset) -> Option<String> {
    let present: Vec<_> = reqs.iter().filter(|req| req.present).collect();

    for (i, a) in present.iter().enumerate() {
        for b in &present[i + 1..] {
            if a.range != b.range {
                continue;
            }
            let (ka, kb) = (a.kind(), b.kind());
            if ka == kb
                && ka.is_single_valued()
                && matches!(a.range, ReqRange::Local | ReqRange::Tile | ReqRange::Player)
            {
                return Some(format!(
                    "{} requirements {{{}}} and {{{}}} can't both hold at {} range.",
                    ka,
                    a.describe(ruleset),
                    b.describe(ruleset),
                    a.range
                ));
            }
            // Wider ranges look at several tiles.
            if a.range == ReqRange::Tile
                && matches!(
                    (ka, kb),
                    (UniversalKind::Terrain, UniversalKind::TerrainClass)
                        | (UniversalKind::TerrainClass, UniversalKind::Terrain)
                )
            {
                return Some(format!(
                    "Both terrain and terrain class required at {} range.",
                    a.range
                ));
            }
        }
    }

    reqs.iter()
        .find(|req| req.present && universal_never_there(&req.source, ruleset))
        .map(|req| format!("{{{}}} can never be there.", req.describe(ruleset)))
}

/// Why `enabler` can never be active, if it can't.
pub fn enabler_sanity_problem(enabler: &ActionEnabler, ruleset: &Ruleset) -> Option<String> {
    for side in [ReqVecSide::Actor, ReqVecSide::Target] {
        if let Some(problem) = req_vec_problem(side.of(enabler), ruleset) {
            return Some(format!("{} in {}: {}", enabler.action.rule_name(), side, problem));
        }
    }
    enabler_first_self_contradiction(enabler, ruleset).map(|problem| problem.description)
}

/// Disables insane enablers of old formats. For the current format the
/// first insane enabler is an error.
pub(super) fn check_enablers(
    context: &mut RulesetContext,
    old_format: bool,
    warnings: &mut Vec<CompatWarning>,
) -> Result<(), CompatError> {
    let ruleset = &context.ruleset;
    for action in crate::action::ActionId::all() {
        for enabler in context.enablers.all_for_action_mut(action) {
            if !enabler.is_active() {
                continue;
            }
            let Some(problem) = enabler_sanity_problem(enabler, ruleset) else {
                continue;
            };
            if !old_format {
                return Err(CompatError::InsaneEnabler { action, problem });
            }
            enabler.disabled = true;
            warnings.push(CompatWarning::new(
                CompatWarningKind::SanityDisabled,
                format!("{problem} Disabled the enabler."),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;
    use crate::config::RulesConfig;
    use crate::ids::{TechId, TerrainId};
    use crate::requirement::{Requirement, Universal};
    use crate::ruleset::{Terrain, TerrainClass};

    fn ruleset() -> Ruleset {
        let mut ruleset = Ruleset::new("sane");
        ruleset.terrains.push(Terrain::new(TerrainId(0), "Grassland", TerrainClass::Land));
        ruleset.terrains.push(Terrain::new(TerrainId(1), "Ocean", TerrainClass::Oceanic));
        ruleset
    }

    fn tile(source: Universal, present: bool) -> Requirement {
        Requirement::new(source, ReqRange::Tile, present)
    }

    #[test]
    fn terrain_and_class_together_are_insane() {
        let enabler = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new(),
            ReqVec::new()
                .with(tile(Universal::Terrain(TerrainId(0)), true))
                .with(tile(Universal::TerrainClass(TerrainClass::Land), true)),
        );
        let problem = enabler_sanity_problem(&enabler, &ruleset()).unwrap();
        assert!(problem.contains("terrain class"));
    }

    #[test]
    fn terrains_at_tile_range_clash() {
        let enabler = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new(),
            ReqVec::new()
                .with(tile(Universal::Terrain(TerrainId(0)), true))
                .with(tile(Universal::Terrain(TerrainId(1)), true)),
        );
        assert!(enabler_sanity_problem(&enabler, &ruleset()).is_some());
    }

    #[test]
    fn several_terrains_in_adjacent_range_are_sane() {
        let adjacent = |source| Requirement::new(source, ReqRange::Adjacent, true);
        let enabler = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new(),
            ReqVec::new()
                .with(adjacent(Universal::Terrain(TerrainId(0))))
                .with(adjacent(Universal::Terrain(TerrainId(1))))
                .with(adjacent(Universal::TerrainClass(TerrainClass::Land))),
        );
        assert_eq!(enabler_sanity_problem(&enabler, &ruleset()), None);
    }

    #[test]
    fn unknown_tech_is_never_there() {
        let enabler = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new().with(Requirement::new(Universal::Advance(TechId(7)), ReqRange::Player, true)),
            ReqVec::new(),
        );
        assert!(enabler_sanity_problem(&enabler, &ruleset()).is_some());

        // Requiring the absence of something that never exists is fine.
        let absent = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new().with(Requirement::new(Universal::Advance(TechId(7)), ReqRange::Player, false)),
            ReqVec::new(),
        );
        assert_eq!(enabler_sanity_problem(&absent, &ruleset()), None);
    }

    #[test]
    fn old_formats_disable_and_warn() {
        let insane = ActionEnabler::new(
            ActionId::Pillage,
            ReqVec::new(),
            ReqVec::new()
                .with(tile(Universal::Terrain(TerrainId(0)), true))
                .with(tile(Universal::Terrain(TerrainId(0)), false)),
        );
        let mut context = RulesetContext::new(ruleset(), RulesConfig::default()).with_enablers([insane.clone()]);
        let mut warnings = Vec::new();
        check_enablers(&mut context, true, &mut warnings).unwrap();
        assert_eq!(context.enablers.enablers_for_action_count(ActionId::Pillage), 0);
        assert_eq!(warnings[0].kind, CompatWarningKind::SanityDisabled);

        let mut context = RulesetContext::new(ruleset(), RulesConfig::default()).with_enablers([insane]);
        let err = check_enablers(&mut context, false, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CompatError::InsaneEnabler { action: ActionId::Pillage, .. }));
    }
}

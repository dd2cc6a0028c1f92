//! Obligatory hard requirement pass.
//!
//! Old formats get their enablers repaired: every alternative way to
//! satisfy a missing requirement becomes its own enabler. Current-format
//! enablers must already be complete.

use crate::action::{ActionEnabler, ActionId, EnablerStore, action_enabler_suggest_repair, enabler_obligatory_problem};
use crate::ruleset::Ruleset;

use super::{CompatError, CompatWarning, CompatWarningKind};

/// Repairs every enabler of an old-format ruleset until none reports a
/// problem. Enablers that can't be repaired by appending requirements are
/// disabled.
pub fn add_obligatory_hard_reqs(enablers: &mut EnablerStore, ruleset: &Ruleset, warnings: &mut Vec<CompatWarning>) {
    for action in ActionId::all() {
        let list = enablers.all_for_action_mut(action);
        // Each round either disables an enabler or satisfies one more
        // obligatory requirement, so this ends.
        while repair_first_problem(list, ruleset, warnings) {}
    }
}

/// Fails on the first active current-format enabler that lacks an
/// obligatory requirement.
pub fn check_obligatory_hard_reqs(enablers: &EnablerStore, ruleset: &Ruleset) -> Result<(), CompatError> {
    for enabler in enablers.iter().filter(|enabler| enabler.is_active()) {
        if let Some(problem) = enabler_obligatory_problem(enabler, ruleset) {
            return Err(CompatError::MissingObligatoryReq {
                action: enabler.action,
                problem: problem.description,
            });
        }
    }
    Ok(())
}

/// Fixes the first active enabler in `list` that has a problem. Returns
/// whether anything changed, in which case the scan starts over.
fn repair_first_problem(list: &mut Vec<ActionEnabler>, ruleset: &Ruleset, warnings: &mut Vec<CompatWarning>) -> bool {
    let Some((index, problem)) = list
        .iter()
        .enumerate()
        .filter(|(_, enabler)| enabler.is_active())
        .find_map(|(index, enabler)| action_enabler_suggest_repair(enabler, ruleset).map(|problem| (index, problem)))
    else {
        return false;
    };
    let enabler = &mut list[index];

    if problem.solutions.is_empty() || !problem.is_append_only() {
        enabler.disabled = true;
        warnings.push(CompatWarning::new(
            CompatWarningKind::EnablerDisabled,
            format!(
                "Can't upgrade an enabler for {}: {} Disabled it.",
                enabler.action.rule_name(),
                problem.description
            ),
        ));
        return true;
    }

    let mut repaired: Vec<ActionEnabler> = problem
        .solutions
        .iter()
        .map(|change| {
            let mut clone = enabler.clone();
            change.apply(&mut clone);
            clone
        })
        .collect();
    if repaired.len() > 1 {
        warnings.push(CompatWarning::new(
            CompatWarningKind::EnablerSplit,
            format!(
                "Split an enabler for {} in {} to satisfy: {}",
                enabler.action.rule_name(),
                repaired.len(),
                problem.description
            ),
        ));
    }
    if let Some(first) = repaired.pop() {
        *enabler = first;
    }
    list.extend(repaired);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{DiplRel, ReqRange, ReqVec, Requirement, UnitState, Universal};

    fn local(source: Universal, present: bool) -> Requirement {
        Requirement::new(source, ReqRange::Local, present)
    }

    #[test]
    fn single_alternative_is_appended() {
        let ruleset = Ruleset::new("old");
        let mut store: EnablerStore = [ActionEnabler::unconditional(ActionId::UpgradeUnit)].into_iter().collect();
        let mut warnings = Vec::new();
        add_obligatory_hard_reqs(&mut store, &ruleset, &mut warnings);

        let upgraded = store.all_for_action(ActionId::UpgradeUnit);
        assert_eq!(upgraded.len(), 1);
        assert!(upgraded[0].actor_reqs.contains(&local(Universal::DiplRel(DiplRel::Foreign), false).with_quiet(true)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn alternatives_become_separate_enablers() {
        let ruleset = Ruleset::new("old");
        let enabler = ActionEnabler::new(
            ActionId::Paradrop,
            ReqVec::new()
                .with(local(Universal::MinMoveFrags(1), true))
                .with(local(Universal::UnitState(UnitState::Transporting), false)),
            ReqVec::new(),
        );
        let mut store: EnablerStore = [enabler].into_iter().collect();
        let mut warnings = Vec::new();
        add_obligatory_hard_reqs(&mut store, &ruleset, &mut warnings);

        let upgraded = store.all_for_action(ActionId::Paradrop);
        assert_eq!(upgraded.len(), 3);
        for enabler in upgraded {
            assert!(enabler.is_active());
            assert_eq!(enabler_obligatory_problem(enabler, &ruleset), None);
        }
        assert!(warnings.iter().any(|w| w.kind == CompatWarningKind::EnablerSplit));
    }

    #[test]
    fn contradicting_enabler_is_disabled() {
        let ruleset = Ruleset::new("old");
        let foreign = Universal::DiplRel(DiplRel::Foreign);
        let enabler = ActionEnabler::new(ActionId::UpgradeUnit, ReqVec::new().with(local(foreign, true)), ReqVec::new());
        let mut store: EnablerStore = [enabler].into_iter().collect();
        let mut warnings = Vec::new();
        add_obligatory_hard_reqs(&mut store, &ruleset, &mut warnings);

        let upgraded = store.all_for_action(ActionId::UpgradeUnit);
        assert_eq!(upgraded.len(), 1);
        assert!(!upgraded[0].is_active());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, CompatWarningKind::EnablerDisabled);
    }

    #[test]
    fn current_format_problems_are_fatal() {
        let ruleset = Ruleset::new("new");
        let store: EnablerStore = [ActionEnabler::unconditional(ActionId::UpgradeUnit)].into_iter().collect();
        let err = check_obligatory_hard_reqs(&store, &ruleset).unwrap_err();
        assert!(matches!(err, CompatError::MissingObligatoryReq { action: ActionId::UpgradeUnit, .. }));
    }
}

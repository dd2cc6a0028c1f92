//! The loaded ruleset as one owned value.
//!
//! A [`RulesetContext`] replaces process-wide action tables: it is built
//! once at load time, upgraded, and then shared read-only with every query.

use crate::action::{ActionCatalog, ActionEnabler, ActionId, EnablerStore};
use crate::actres::utype_hard_reqs_ok;
use crate::config::RulesConfig;
use crate::ids::{GovernmentId, UnitTypeId};
use crate::requirement::{ReqRange, ReqVec, Requirement, Universal, does_req_contradict_reqs};
use crate::ruleset::Ruleset;
use crate::state::Unit;

/// Everything the action engine reads besides the game state.
#[derive(Clone, Debug)]
pub struct RulesetContext {
    pub ruleset: Ruleset,
    pub catalog: ActionCatalog,
    pub enablers: EnablerStore,
    pub config: RulesConfig,
}

impl RulesetContext {
    /// Context with the default catalog for `config` and no enablers.
    pub fn new(ruleset: Ruleset, config: RulesConfig) -> Self {
        Self {
            catalog: ActionCatalog::new(&config),
            enablers: EnablerStore::new(),
            ruleset,
            config,
        }
    }

    #[must_use]
    pub fn with_enablers(mut self, enablers: impl IntoIterator<Item = ActionEnabler>) -> Self {
        self.enablers.extend(enablers);
        self
    }

    // ========================================================================
    // Unit type level queries
    // ========================================================================

    /// Whether units of `utype` could ever perform `action`: its hard
    /// requirements accept the type and some enabler's actor requirements
    /// don't rule the type out.
    pub fn utype_can_do_action(&self, utype: UnitTypeId, action: ActionId) -> bool {
        let Some(unit_type) = self.ruleset.unit_type(utype) else {
            return false;
        };
        if !utype_hard_reqs_ok(action, unit_type, &self.ruleset) {
            return false;
        }
        self.enablers
            .for_action(action)
            .any(|enabler| self.reqs_fulfillable_by_utype(utype, &enabler.actor_reqs))
    }

    pub fn unit_can_do_action(&self, unit: &Unit, action: ActionId) -> bool {
        self.utype_can_do_action(unit.utype, action)
    }

    /// False if any unit type requirement in `reqs` fails for `utype`.
    fn reqs_fulfillable_by_utype(&self, utype: UnitTypeId, reqs: &ReqVec) -> bool {
        reqs.iter()
            .filter(|req| req.range == ReqRange::Local)
            .all(|req| match self.utype_matches(utype, &req.source) {
                Some(matches) => matches == req.present,
                None => true,
            })
    }

    fn utype_matches(&self, utype: UnitTypeId, source: &Universal) -> Option<bool> {
        let ruleset = &self.ruleset;
        match *source {
            Universal::UnitType(wanted) => Some(wanted == utype),
            Universal::UnitFlag(flag) => Some(ruleset.utype_has_flag(utype, flag)),
            Universal::UnitClass(class) => {
                Some(ruleset.unit_type(utype).is_some_and(|utype| utype.class == class))
            }
            Universal::UnitClassFlag(flag) => Some(ruleset.uclass_has_flag(utype, flag)),
            _ => None,
        }
    }

    // ========================================================================
    // Enabler level queries
    // ========================================================================

    /// Whether players under `government` are immune to `action`.
    ///
    /// An action without enablers is never performed, so nobody counts as
    /// immune to it.
    pub fn action_immune_government(&self, government: GovernmentId, action: ActionId) -> bool {
        let mut enablers = self.enablers.for_action(action).peekable();
        if enablers.peek().is_none() {
            return false;
        }
        !enablers.any(|enabler| requirement_fulfilled_by_government(government, &enabler.target_reqs))
    }

    /// Whether `action` can never be performed while `situation` holds for
    /// the actor.
    pub fn action_blocked_by_situation_act(&self, action: ActionId, situation: &Requirement) -> bool {
        self.enablers
            .for_action(action)
            .all(|enabler| does_req_contradict_reqs(situation, &enabler.actor_reqs))
    }
}

fn requirement_fulfilled_by_government(government: GovernmentId, reqs: &ReqVec) -> bool {
    reqs.iter().all(|req| match req.source {
        Universal::Government(wanted) => (wanted == government) == req.present,
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UnitClassId;
    use crate::ruleset::{FlagId, UnitType, UnitTypeFlags};

    fn context() -> RulesetContext {
        let mut ruleset = Ruleset::new("context");
        let mut settlers = UnitType::new(UnitTypeId(0), "Settlers", UnitClassId(0));
        settlers.flags.insert(FlagId::Builtin(UnitTypeFlags::SETTLERS));
        ruleset.unit_types.push(settlers);
        ruleset
            .unit_types
            .push(UnitType::new(UnitTypeId(1), "Warriors", UnitClassId(0)));
        RulesetContext::new(ruleset, RulesConfig::default())
    }

    fn settlers_only() -> Requirement {
        Requirement::new(
            Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SETTLERS)),
            ReqRange::Local,
            true,
        )
    }

    #[test]
    fn unit_type_requirements_filter_actors() {
        let context = context().with_enablers([ActionEnabler::new(
            ActionId::FoundCity,
            ReqVec::new().with(settlers_only()),
            ReqVec::new(),
        )]);
        assert!(context.utype_can_do_action(UnitTypeId(0), ActionId::FoundCity));
        assert!(!context.utype_can_do_action(UnitTypeId(1), ActionId::FoundCity));
        assert!(!context.utype_can_do_action(UnitTypeId(0), ActionId::JoinCity));
    }

    #[test]
    fn immunity_needs_enablers() {
        let gov = |id, present| {
            Requirement::new(Universal::Government(GovernmentId(id)), ReqRange::Player, present)
        };
        let context = context().with_enablers([ActionEnabler::new(
            ActionId::SpyInciteCity,
            ReqVec::new(),
            ReqVec::new().with(gov(0, false)),
        )]);
        assert!(context.action_immune_government(GovernmentId(0), ActionId::SpyInciteCity));
        assert!(!context.action_immune_government(GovernmentId(1), ActionId::SpyInciteCity));
        assert!(!context.action_immune_government(GovernmentId(0), ActionId::SpyPoison));
    }

    #[test]
    fn situation_blocks_when_every_enabler_contradicts() {
        let context = context().with_enablers([ActionEnabler::new(
            ActionId::FoundCity,
            ReqVec::new().with(settlers_only()),
            ReqVec::new(),
        )]);
        assert!(context.action_blocked_by_situation_act(ActionId::FoundCity, &settlers_only().negated()));
        assert!(!context.action_blocked_by_situation_act(ActionId::FoundCity, &settlers_only()));
    }
}

//! Obligatory hard requirements and enabler repair.
//!
//! Some rules of an action result are enforced by the engine no matter
//! what the ruleset says. Every enabler must spell them out so that what
//! the ruleset shows is what the game does. An obligatory requirement is
//! a list of alternative requirements an enabler has to contradict; one
//! contradicted alternative is enough.

use arrayvec::ArrayVec;

use crate::actres::ActionResult;
use crate::requirement::{
    CityTile, DiplRel, ReqRange, ReqVec, Requirement, UnitState, Universal,
    does_req_contradict_reqs, req_vec_first_contradiction, universal_never_there,
};
use crate::ruleset::{FlagId, Ruleset, TerrainFlags, UnitClassFlags, UnitTypeFlags};
use crate::state::Activity;

use super::enabler::ActionEnabler;

/// Most alternatives a single obligatory requirement has.
pub const MAX_ALTERNATIVES: usize = 3;

/// Which requirement vector of an enabler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum ReqVecSide {
    #[strum(serialize = "actor_reqs")]
    Actor,
    #[strum(serialize = "target_reqs")]
    Target,
}

impl ReqVecSide {
    pub fn of(self, enabler: &ActionEnabler) -> &ReqVec {
        match self {
            Self::Actor => &enabler.actor_reqs,
            Self::Target => &enabler.target_reqs,
        }
    }

    pub fn of_mut(self, enabler: &mut ActionEnabler) -> &mut ReqVec {
        match self {
            Self::Actor => &mut enabler.actor_reqs,
            Self::Target => &mut enabler.target_reqs,
        }
    }
}

/// A requirement an enabler must contradict, and the vector it applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contradiction {
    pub req: Requirement,
    pub side: ReqVecSide,
}

/// One obligatory hard requirement of one or more results.
#[derive(Debug)]
pub struct ObligatoryReq {
    pub alternatives: &'static [Contradiction],
    /// Explains the rule; `{}` is replaced by the action's rule name.
    pub message: &'static str,
    pub results: &'static [ActionResult],
}

impl ObligatoryReq {
    /// Whether `enabler` already satisfies this requirement.
    pub fn is_fulfilled(&self, enabler: &ActionEnabler, ruleset: &Ruleset) -> bool {
        self.alternatives.iter().any(|alt| {
            does_req_contradict_reqs(&alt.req, alt.side.of(enabler))
                // A universal that is never there is always absent.
                || (alt.req.present && universal_never_there(&alt.req.source, ruleset))
        })
    }

    pub fn describe(&self, enabler: &ActionEnabler) -> String {
        self.message.replace("{}", enabler.action.rule_name())
    }
}

// ============================================================================
// The table
// ============================================================================

const fn contra(source: Universal, range: ReqRange, present: bool, side: ReqVecSide) -> Contradiction {
    Contradiction {
        req: Requirement::new(source, range, present).with_quiet(true),
        side,
    }
}

const fn actor(source: Universal, present: bool) -> Contradiction {
    contra(source, ReqRange::Local, present, ReqVecSide::Actor)
}

const fn target_tile(source: Universal, present: bool) -> Contradiction {
    contra(source, ReqRange::Tile, present, ReqVecSide::Target)
}

const FOREIGN: Universal = Universal::DiplRel(DiplRel::Foreign);
const NON_MIL: Universal = Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::NON_MIL));
const CAN_OCCUPY_CITY: Universal =
    Universal::UnitClassFlag(FlagId::Builtin(UnitClassFlags::CAN_OCCUPY_CITY));
const WAR: Universal = Universal::DiplRel(DiplRel::War);
const CITY_CENTER: Universal = Universal::CityTile(CityTile::Center);
const CLAIMED: Universal = Universal::CityTile(CityTile::Claimed);
const TRANSPORTING: Universal = Universal::UnitState(UnitState::Transporting);

static OBLIGATORY_HARD_REQS: &[ObligatoryReq] = &[
    ObligatoryReq {
        alternatives: &[actor(FOREIGN, false)],
        message: "All action enablers for {} must require a foreign target.",
        results: &[
            ActionResult::EstablishEmbassy,
            ActionResult::InvestigateCity,
            ActionResult::StealGold,
            ActionResult::StealMaps,
            ActionResult::StealTech,
            ActionResult::TargetedStealTech,
            ActionResult::InciteCity,
            ActionResult::BribeUnit,
            ActionResult::CaptureUnits,
            ActionResult::ConquerCity,
        ],
    },
    ObligatoryReq {
        alternatives: &[actor(FOREIGN, false), target_tile(CLAIMED, true)],
        message: "All action enablers for {} must require a non domestic target.",
        results: &[ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[actor(Universal::DiplRel(DiplRel::HasRealEmbassy), true)],
        message: "All action enablers for {} must require the absence of a real embassy.",
        results: &[ActionResult::EstablishEmbassy],
    },
    ObligatoryReq {
        alternatives: &[actor(Universal::Activity(Activity::Fortified), true)],
        message: "All action enablers for {} must require that the actor unit isn't already fortified.",
        results: &[ActionResult::Fortify],
    },
    ObligatoryReq {
        alternatives: &[actor(FOREIGN, true)],
        message: "All action enablers for {} must require a domestic target.",
        results: &[ActionResult::UpgradeUnit],
    },
    ObligatoryReq {
        alternatives: &[actor(Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SETTLERS)), false)],
        message: "All action enablers for {} must require that the actor has the Settlers utype flag.",
        results: &[ActionResult::TransformTerrain, ActionResult::Mine, ActionResult::Irrigate],
    },
    ObligatoryReq {
        alternatives: &[target_tile(Universal::TerrainFlag(FlagId::Builtin(TerrainFlags::NO_CITIES)), true)],
        message: "All action enablers for {} must require that the target doesn't have the NoCities terrain flag.",
        results: &[ActionResult::FoundCity],
    },
    ObligatoryReq {
        alternatives: &[actor(Universal::UnitState(UnitState::HasHomeCity), false)],
        message: "All action enablers for {} must require that the actor has a home city.",
        results: &[ActionResult::TradeRoute, ActionResult::Marketplace],
    },
    ObligatoryReq {
        alternatives: &[
            actor(NON_MIL, false),
            actor(Universal::DiplRel(DiplRel::Peace), true),
            target_tile(CLAIMED, true),
        ],
        message: "All action enablers for {} must require that the actor has the NonMil utype flag \
                  or that the target tile is unclaimed or that the diplomatic relation to the target \
                  tile owner isn't peace.",
        results: &[ActionResult::Paradrop, ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[actor(NON_MIL, true)],
        message: "All action enablers for {} must require that the actor doesn't have the NonMil utype flag.",
        results: &[ActionResult::Attack, ActionResult::ConquerCity, ActionResult::WipeUnits],
    },
    ObligatoryReq {
        alternatives: &[actor(NON_MIL, true), target_tile(CITY_CENTER, true)],
        message: "All action enablers for {} must require no city at the target tile or that the \
                  actor doesn't have the NonMil utype flag.",
        results: &[ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[actor(CAN_OCCUPY_CITY, false)],
        message: "All action enablers for {} must require that the actor has the CanOccupyCity uclass flag.",
        results: &[ActionResult::ConquerCity],
    },
    ObligatoryReq {
        alternatives: &[actor(CAN_OCCUPY_CITY, false), target_tile(CITY_CENTER, true)],
        message: "All action enablers for {} must require no city at the target tile or that the \
                  actor has the CanOccupyCity uclass flag.",
        results: &[ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[actor(WAR, false)],
        message: "All action enablers for {} must require that the actor is at war with the target.",
        results: &[ActionResult::ConquerCity],
    },
    ObligatoryReq {
        alternatives: &[actor(WAR, false), target_tile(CITY_CENTER, true)],
        message: "All action enablers for {} must require no city at the target tile or that the \
                  actor is at war with the target.",
        results: &[ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[actor(Universal::MinMoveFrags(1), false)],
        message: "All action enablers for {} must require that the actor has a movement point left.",
        results: &[ActionResult::ConquerCity, ActionResult::Paradrop, ActionResult::ParadropConquer],
    },
    ObligatoryReq {
        alternatives: &[target_tile(Universal::MaxUnitsOnTile(0), false)],
        message: "All action enablers for {} must require that the target city is empty.",
        results: &[ActionResult::ConquerCity],
    },
    ObligatoryReq {
        alternatives: &[actor(TRANSPORTING, true)],
        message: "All action enablers for {} must require that the actor isn't transporting another unit.",
        results: &[ActionResult::Paradrop, ActionResult::ParadropConquer, ActionResult::Airlift],
    },
    ObligatoryReq {
        alternatives: &[contra(TRANSPORTING, ReqRange::Local, true, ReqVecSide::Target)],
        message: "All action enablers for {} must require that the target isn't transporting another unit.",
        results: &[ActionResult::CaptureUnits],
    },
    ObligatoryReq {
        alternatives: &[contra(CITY_CENTER, ReqRange::Tile, false, ReqVecSide::Actor)],
        message: "All action enablers for {} must require that the actor unit is in a city.",
        results: &[ActionResult::Airlift],
    },
];

/// Obligatory hard requirements of `result`, in table order.
pub fn obligatory_hard_reqs(result: ActionResult) -> impl Iterator<Item = &'static ObligatoryReq> {
    OBLIGATORY_HARD_REQS
        .iter()
        .filter(move |oblig| oblig.results.contains(&result))
}

// ============================================================================
// Problems and repairs
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ReqVecChangeOp {
    Append,
    Remove,
}

/// One edit to one requirement vector of an enabler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReqVecChange {
    pub operation: ReqVecChangeOp,
    pub side: ReqVecSide,
    pub req: Requirement,
}

impl ReqVecChange {
    /// Applies the change. Returns `false` when a requirement to remove
    /// isn't there.
    pub fn apply(&self, enabler: &mut ActionEnabler) -> bool {
        let reqs = self.side.of_mut(enabler);
        match self.operation {
            ReqVecChangeOp::Append => {
                reqs.push(self.req);
                true
            }
            ReqVecChangeOp::Remove => match reqs.iter().position(|req| *req == self.req) {
                Some(index) => reqs.remove(index).is_some(),
                None => false,
            },
        }
    }

    pub fn describe(&self, ruleset: &Ruleset) -> String {
        let verb = match self.operation {
            ReqVecChangeOp::Append => "Add",
            ReqVecChangeOp::Remove => "Remove",
        };
        format!("{verb} {} ({})", self.req.describe(ruleset), self.side)
    }
}

/// A problem with an enabler and the alternative ways to fix it. Any
/// single suggestion fixes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReqVecProblem {
    pub description: String,
    pub solutions: ArrayVec<ReqVecChange, MAX_ALTERNATIVES>,
}

impl ReqVecProblem {
    pub fn is_append_only(&self) -> bool {
        self.solutions
            .iter()
            .all(|change| change.operation == ReqVecChangeOp::Append)
    }
}

/// First obligatory hard requirement `enabler` lacks, with one append
/// suggestion per alternative.
pub fn enabler_obligatory_problem(enabler: &ActionEnabler, ruleset: &Ruleset) -> Option<ReqVecProblem> {
    let oblig = obligatory_hard_reqs(enabler.action.result())
        .find(|oblig| !oblig.is_fulfilled(enabler, ruleset))?;
    Some(ReqVecProblem {
        description: oblig.describe(enabler),
        solutions: oblig
            .alternatives
            .iter()
            .map(|alt| ReqVecChange {
                operation: ReqVecChangeOp::Append,
                side: alt.side,
                req: alt.req.negated(),
            })
            .collect(),
    })
}

/// First pair of requirements in one vector of `enabler` that contradict
/// each other. Removing either fixes it.
pub fn enabler_first_self_contradiction(enabler: &ActionEnabler, ruleset: &Ruleset) -> Option<ReqVecProblem> {
    [ReqVecSide::Actor, ReqVecSide::Target].into_iter().find_map(|side| {
        let reqs = side.of(enabler);
        let (i, j) = req_vec_first_contradiction(reqs)?;
        let (a, b) = (*reqs.get(i)?, *reqs.get(j)?);
        Some(ReqVecProblem {
            description: format!(
                "Requirements {{{}}} and {{{}}} contradict each other in {} of {}.",
                a.describe(ruleset),
                b.describe(ruleset),
                side,
                enabler.action.rule_name()
            ),
            solutions: [a, b]
                .into_iter()
                .map(|req| ReqVecChange {
                    operation: ReqVecChangeOp::Remove,
                    side,
                    req,
                })
                .collect(),
        })
    })
}

/// Next problem with `enabler`, if any: missing obligatory requirements
/// first, then contradictions inside one vector.
pub fn action_enabler_suggest_repair(enabler: &ActionEnabler, ruleset: &Ruleset) -> Option<ReqVecProblem> {
    enabler_obligatory_problem(enabler, ruleset)
        .or_else(|| enabler_first_self_contradiction(enabler, ruleset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;

    fn local(source: Universal, present: bool) -> Requirement {
        Requirement::new(source, ReqRange::Local, present)
    }

    #[test]
    fn table_alternatives_fit_in_a_problem() {
        for oblig in OBLIGATORY_HARD_REQS {
            assert!(!oblig.alternatives.is_empty());
            assert!(oblig.alternatives.len() <= MAX_ALTERNATIVES);
            assert!(!oblig.results.is_empty());
            for alt in oblig.alternatives {
                assert!(alt.req.validate().is_ok(), "{}", oblig.message);
            }
        }
    }

    #[test]
    fn missing_foreign_requirement_is_suggested() {
        let ruleset = Ruleset::new("test");
        let enabler = ActionEnabler::unconditional(ActionId::SpyStealGold);
        let problem = action_enabler_suggest_repair(&enabler, &ruleset).unwrap();
        assert!(problem.description.contains("Steal Gold"));
        assert_eq!(problem.solutions.len(), 1);
        let change = problem.solutions[0];
        assert_eq!(change.operation, ReqVecChangeOp::Append);
        assert_eq!(change.side, ReqVecSide::Actor);
        assert_eq!(change.req.source, FOREIGN);
        assert!(change.req.present);

        let mut fixed = enabler.clone();
        assert!(change.apply(&mut fixed));
        assert_eq!(action_enabler_suggest_repair(&fixed, &ruleset), None);
    }

    #[test]
    fn paradrop_alternatives_are_offered_together() {
        let ruleset = Ruleset::new("test");
        let enabler = ActionEnabler::new(
            ActionId::Paradrop,
            ReqVec::new()
                .with(local(Universal::MinMoveFrags(1), true))
                .with(local(TRANSPORTING, false)),
            ReqVec::new(),
        );
        let problem = enabler_obligatory_problem(&enabler, &ruleset).unwrap();
        assert_eq!(problem.solutions.len(), 3);
        assert!(problem.is_append_only());
        assert_eq!(problem.solutions[2].side, ReqVecSide::Target);
        assert!(!problem.solutions[2].req.present);
    }

    #[test]
    fn self_contradiction_suggests_removals() {
        let ruleset = Ruleset::new("test");
        let war = local(WAR, true);
        let enabler = ActionEnabler::new(
            ActionId::HelpWonder,
            ReqVec::new().with(war).with(war.negated()),
            ReqVec::new(),
        );
        let problem = action_enabler_suggest_repair(&enabler, &ruleset).unwrap();
        assert!(!problem.is_append_only());
        assert_eq!(problem.solutions.len(), 2);

        let mut fixed = enabler.clone();
        assert!(problem.solutions[1].apply(&mut fixed));
        assert_eq!(fixed.actor_reqs.len(), 1);
        assert!(!problem.solutions[1].apply(&mut fixed));
    }

    #[test]
    fn never_there_universal_counts_as_absent() {
        let ruleset = Ruleset::new("test");
        let enabler = ActionEnabler::unconditional(ActionId::Fortify);
        assert!(enabler_obligatory_problem(&enabler, &ruleset).is_some());

        const ALTERNATIVES: &[Contradiction] = &[Contradiction {
            req: Requirement::new(Universal::UnitFlag(FlagId::User(3)), ReqRange::Local, true),
            side: ReqVecSide::Actor,
        }];
        let oblig = ObligatoryReq {
            alternatives: ALTERNATIVES,
            message: "",
            results: &[ActionResult::Fortify],
        };
        assert!(oblig.is_fulfilled(&enabler, &ruleset));
    }
}

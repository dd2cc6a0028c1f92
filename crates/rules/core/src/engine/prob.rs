//! Success odds as seen by the actor's owner.

use crate::action::{ActProb, ActionId, ActionSet};
use crate::actres::{ActionResult, BattleKind};
use crate::config::RulesConfig;
use crate::effects::{EffectKind, get_target_bonus_effects, is_effect_val_known};
use crate::ids::{ExtraId, TilePos};
use crate::metaknowledge::{can_player_see_unit, can_see_techs_of_target, plr_sees_tile};
use crate::requirement::{Env, ReqContext};
use crate::ruleset::{Ruleset, UnitTypeFlags};
use crate::state::{Player, Unit};
use crate::tri::Tri;

use super::ActionEngine;
use super::combat::{get_defender, unit_win_chance};

impl<'a> ActionEngine<'a> {
    /// Probability against one target.
    pub(super) fn prob(
        &self,
        action: ActionId,
        actor: &ReqContext<'a>,
        target: &ReqContext<'a>,
        target_extra: Option<ExtraId>,
    ) -> ActProb {
        let known = self.is_action_possible(action, actor, target, target_extra, false, ActionSet::EMPTY);
        if known.is_no() {
            return ActProb::IMPOSSIBLE;
        }
        let known = known.and(self.enabled_local(action, actor, target));
        let (chance, known) = self.result_chance(action, actor, target, known);
        match known {
            Tri::No => ActProb::IMPOSSIBLE,
            Tri::Maybe => ActProb::Unknown,
            Tri::Yes => chance,
        }
    }

    /// Probability against every unit on `tile`.
    pub(super) fn prob_vs_stack(
        &self,
        action: ActionId,
        actor_unit: &'a Unit,
        actor: &ReqContext<'a>,
        tile: TilePos,
    ) -> ActProb {
        let env = self.env();
        let Some(pov) = actor.player else {
            return ActProb::Unknown;
        };
        if !plr_sees_tile(env, pov, tile) {
            return ActProb::Unknown;
        }
        let mut units = self
            .world
            .units_at(tile)
            .filter(|unit| unit.id == actor_unit.id || can_player_see_unit(env, pov, unit))
            .peekable();
        if units.peek().is_none() {
            return ActProb::IMPOSSIBLE;
        }
        ActProb::for_stack(units.map(|unit| {
            let target = ReqContext::for_unit(self.world, unit).with_action(action);
            self.prob(action, actor, &target, None)
        }))
    }

    /// Result specific odds. May weaken `known` when the odds depend on
    /// something the actor's owner can't see.
    fn result_chance(
        &self,
        action: ActionId,
        actor: &ReqContext<'a>,
        target: &ReqContext<'a>,
        mut known: Tri,
    ) -> (ActProb, Tri) {
        let env = self.env();
        let result = action.result();
        let chance = match result {
            ActionResult::StealTech | ActionResult::TargetedStealTech => {
                if let (Some(thief), Some(victim)) = (actor.player, target.player) {
                    known = known.and(tech_can_be_stolen(env.ruleset, &self.context.config, thief, victim));
                }
                ActProb::NotImplemented
            }
            ActionResult::Attack => match (actor.unit, target.tile) {
                (Some(attacker), Some(tile)) => {
                    let (chance, seen) = self.attack_chance(attacker, target.unit, tile);
                    if !seen && known.is_yes() {
                        known = Tri::Maybe;
                    }
                    chance
                }
                _ => ActProb::NotImplemented,
            },
            ActionResult::BribeUnit | ActionResult::SabotageUnit | ActionResult::SpyAttack => {
                // A spy attack has no victim; every defender may fight.
                let victim = if result == ActionResult::SpyAttack { None } else { target.unit };
                match (actor.unit, target.tile) {
                    (Some(attacker), Some(tile)) => ap_diplomat_battle(env, attacker, victim, tile),
                    _ => ActProb::NotImplemented,
                }
            }
            // Spies can still get caught after winning any battle. Those
            // odds aren't modelled.
            _ if result.battle_kind() == BattleKind::Diplomatic
                && !matches!(result, ActionResult::EstablishEmbassy | ActionResult::InvestigateCity) =>
            {
                ActProb::NotImplemented
            }
            // No battle and no roll.
            _ => ActProb::CERTAIN,
        };
        (chance, known)
    }

    /// Odds of an attack on `tile`. Only the best defender fights; when
    /// evaluating one unit of a stack, the others count as certain.
    fn attack_chance(&self, attacker: &'a Unit, target_unit: Option<&'a Unit>, tile: TilePos) -> (ActProb, bool) {
        let env = self.env();
        let Some(defender) = get_defender(env, attacker, tile) else {
            return (ActProb::CERTAIN, true);
        };
        if target_unit.is_some_and(|unit| unit.id != defender.id) {
            return (ActProb::CERTAIN, true);
        }
        let seen = env
            .world
            .player(attacker.owner)
            .is_some_and(|pov| can_player_see_unit(env, pov, defender));
        if !seen {
            return (ActProb::NotImplemented, false);
        }
        let win = unit_win_chance(env, attacker, defender);
        // Rounding up keeps a tiny chance from reading as impossible.
        let chance = (f64::from(ActProb::MAX_CHANCE) * win).ceil() as u32;
        (ActProb::chance(chance), true)
    }
}

// ============================================================================
// Diplomatic battles
// ============================================================================

/// Whether `victim` knows a tech `thief` could steal.
///
/// `Maybe` when the thief can't see the victim's techs.
pub fn tech_can_be_stolen(ruleset: &Ruleset, config: &RulesConfig, thief: &Player, victim: &Player) -> Tri {
    if thief.id == victim.id {
        return Tri::No;
    }
    if !can_see_techs_of_target(thief, victim) {
        return Tri::Maybe;
    }
    let gettable = |tech: &crate::ruleset::Tech| {
        config.tech_steal_allow_holes || tech.research_reqs.iter().all(|req| thief.knows_tech(*req))
    };
    let stealable = ruleset
        .techs
        .iter()
        .any(|tech| victim.knows_tech(tech.id) && !thief.knows_tech(tech.id) && gettable(tech));
    Tri::from_bool(stealable)
}

/// Odds that `attacker` beats `defender` in a diplomatic battle.
///
/// # Formula
///
/// ```text
/// chance = 50 + 25 (attacker Spy) - 25 (defender Spy)
///        + attacker veteran power - defender veteran power
/// chance -= chance * Spy_Resistant% / 100
/// ```
///
/// A defending SuperSpy always wins; an attacking one wins against anyone
/// else. `Unknown` when the attacker's owner can't tell which
/// `Spy_Resistant` effects apply at the defender's tile.
pub fn ap_dipl_battle_win(env: Env<'_>, attacker: &Unit, defender: &Unit) -> ActProb {
    let ruleset = env.ruleset;
    let has_flag = |unit: &Unit, flag| ruleset.utype_has_builtin_flag(unit.utype, flag);

    if has_flag(defender, UnitTypeFlags::SUPER_SPY) {
        return ActProb::IMPOSSIBLE;
    }
    if has_flag(attacker, UnitTypeFlags::SUPER_SPY) {
        return ActProb::CERTAIN;
    }

    let mut chance: i64 = 50;
    if has_flag(attacker, UnitTypeFlags::SPY) {
        chance += 25;
    }
    if has_flag(defender, UnitTypeFlags::SPY) {
        chance -= 25;
    }
    let power = |unit: &Unit| {
        ruleset
            .veteran_level(unit.utype, unit.veteran)
            .map_or(100, |level| i64::from(level.power_fact))
    };
    chance += power(attacker) - power(defender);

    let Some(pov) = env.world.player(attacker.owner) else {
        return ActProb::Unknown;
    };
    let target = ReqContext::for_tile(env.world, defender.tile);
    let other = ReqContext::empty();
    if !is_effect_val_known(env, EffectKind::SpyResistant, pov, &target, &other) {
        return ActProb::Unknown;
    }
    let resist = get_target_bonus_effects(env, &target, &other, EffectKind::SpyResistant);
    chance -= chance * i64::from(resist) / 100;

    ActProb::chance((chance * 2).max(0) as u32)
}

/// Odds that `attacker` gets past the defending diplomats on `tile`.
///
/// The first unit able to defend fights; its owner's units never defend
/// against their own owner, and the victim itself only defends when it is
/// a SuperSpy.
pub fn ap_diplomat_battle(env: Env<'_>, attacker: &Unit, victim: Option<&Unit>, tile: TilePos) -> ActProb {
    let ruleset = env.ruleset;
    let pov = env.world.player(attacker.owner);
    for unit in env.world.units_at(tile) {
        if unit.owner == attacker.owner {
            continue;
        }
        let is_victim = victim.is_some_and(|victim| victim.id == unit.id);
        if is_victim && !ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::SUPER_SPY) {
            continue;
        }
        if !(ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::DIPLOMAT)
            || ruleset.utype_has_builtin_flag(unit.utype, UnitTypeFlags::SUPER_SPY))
        {
            continue;
        }
        if !pov.is_some_and(|pov| can_player_see_unit(env, pov, unit)) {
            return ActProb::Unknown;
        }
        return ap_dipl_battle_win(env, attacker, unit);
    }
    ActProb::CERTAIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{DIPLOMAT, Fixture, SPY, THEM, US, WARRIORS};
    use crate::ids::TechId;
    use crate::ruleset::FlagId;

    #[test]
    fn techs_need_an_embassy_to_judge() {
        let mut fixture = Fixture::new();
        fixture.world.players[1].techs.insert(TechId(1));
        let ruleset = &fixture.context.ruleset;
        let config = RulesConfig::default();
        let (us, them) = (&fixture.world.players[0], &fixture.world.players[1]);

        assert_eq!(tech_can_be_stolen(ruleset, &config, us, us), Tri::No);
        assert_eq!(tech_can_be_stolen(ruleset, &config, us, them), Tri::Maybe);

        let mut us = us.clone();
        us.real_embassies.insert(THEM);
        assert_eq!(tech_can_be_stolen(ruleset, &config, &us, them), Tri::Yes);

        // Currency needs Bronze Working, which the thief lacks.
        let strict = RulesConfig {
            tech_steal_allow_holes: false,
            ..RulesConfig::default()
        };
        assert_eq!(tech_can_be_stolen(ruleset, &strict, &us, them), Tri::No);
        us.techs.insert(TechId(0));
        assert_eq!(tech_can_be_stolen(ruleset, &strict, &us, them), Tri::Yes);
    }

    #[test]
    fn spies_fight_better() {
        let mut fixture = Fixture::new();
        let diplomat = fixture.add_unit(1, US, DIPLOMAT, TilePos::new(2, 2));
        let spy = fixture.add_unit(2, US, SPY, TilePos::new(2, 3));
        let defender = fixture.add_unit(3, THEM, DIPLOMAT, TilePos::new(3, 3));
        let env = fixture.engine().env();
        let defender = fixture.unit(defender);

        assert_eq!(ap_dipl_battle_win(env, fixture.unit(diplomat), defender), ActProb::chance(100));
        assert_eq!(ap_dipl_battle_win(env, fixture.unit(spy), defender), ActProb::chance(150));
        assert_eq!(ap_dipl_battle_win(env, defender, fixture.unit(spy)), ActProb::chance(50));
    }

    #[test]
    fn super_spies_decide_the_battle() {
        let mut fixture = Fixture::new();
        fixture.context.ruleset.unit_types[SPY.index()]
            .flags
            .insert(FlagId::Builtin(UnitTypeFlags::SUPER_SPY));
        let spy = fixture.add_unit(1, US, SPY, TilePos::new(2, 2));
        let diplomat = fixture.add_unit(2, THEM, DIPLOMAT, TilePos::new(3, 3));
        let env = fixture.engine().env();

        assert_eq!(ap_dipl_battle_win(env, fixture.unit(spy), fixture.unit(diplomat)), ActProb::CERTAIN);
        assert_eq!(ap_dipl_battle_win(env, fixture.unit(diplomat), fixture.unit(spy)), ActProb::IMPOSSIBLE);
    }

    #[test]
    fn only_foreign_diplomats_defend() {
        let mut fixture = Fixture::new();
        let attacker = fixture.add_unit(1, US, DIPLOMAT, TilePos::new(2, 2));
        let victim = fixture.add_unit(2, THEM, WARRIORS, TilePos::new(3, 3));
        fixture.add_unit(3, US, DIPLOMAT, TilePos::new(3, 3));
        let env = fixture.engine().env();
        let (attacker_unit, victim_unit) = (fixture.unit(attacker), fixture.unit(victim));
        assert_eq!(
            ap_diplomat_battle(env, attacker_unit, Some(victim_unit), TilePos::new(3, 3)),
            ActProb::CERTAIN
        );

        fixture.add_unit(4, THEM, DIPLOMAT, TilePos::new(3, 3));
        let env = fixture.engine().env();
        assert_eq!(
            ap_diplomat_battle(env, fixture.unit(attacker), Some(fixture.unit(victim)), TilePos::new(3, 3)),
            ActProb::chance(100)
        );
    }

    #[test]
    fn hidden_defenders_make_the_battle_unknown() {
        let mut fixture = Fixture::new();
        let attacker = fixture.add_unit(1, THEM, DIPLOMAT, TilePos::new(2, 2));
        fixture.add_unit(2, US, DIPLOMAT, TilePos::new(3, 3));
        let env = fixture.engine().env();
        assert_eq!(
            ap_diplomat_battle(env, fixture.unit(attacker), None, TilePos::new(3, 3)),
            ActProb::Unknown
        );
    }

    #[test]
    fn unit_target_odds_include_the_defending_diplomat() {
        let mut fixture =
            Fixture::new().with_enablers([crate::action::ActionEnabler::unconditional(ActionId::SpySabotageUnit)]);
        let attacker = fixture.add_unit(1, US, DIPLOMAT, TilePos::new(2, 2));
        let victim = fixture.add_unit(2, THEM, WARRIORS, TilePos::new(3, 3));
        fixture.add_unit(3, THEM, DIPLOMAT, TilePos::new(3, 3));
        let engine = fixture.engine();

        assert_eq!(
            engine.action_prob_vs_unit(ActionId::SpySabotageUnit, fixture.unit(attacker), fixture.unit(victim)),
            ActProb::chance(100)
        );
    }
}

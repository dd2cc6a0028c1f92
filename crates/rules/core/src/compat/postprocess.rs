//! Post-processing of old-format rulesets.
//!
//! Rules the engine used to hard-code are written out as effects,
//! enablers and blockers, and actions that were split since get enablers
//! for every part.

use crate::action::{ActionEnabler, ActionId, EnablerStore};
use crate::context::RulesetContext;
use crate::effects::{Effect, EffectKind};
use crate::requirement::{
    CityTile, DiplRel, ReqRange, ReqVec, Requirement, UnitState, Universal, UniversalKind,
    universal_is_mentioned_by_requirements, universal_replace_in_req_vec,
};
use crate::ruleset::{
    BuildingGenus, ExtraFlagId, FlagId, Ruleset, TerrainClass, UnitClassFlagId, UnitClassFlags,
    UnitFlagId, UnitTypeFlags,
};

use super::{CompatError, CompatWarning, CompatWarningKind};

/// Combat settings of older formats that are blockers now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LegacyCombatRules {
    /// Capturing units is forced when possible.
    pub force_capture_units: bool,
    /// Bombarding is forced when possible.
    pub force_bombard: bool,
    /// Exploding nuclear is forced when possible.
    pub force_explode_nuclear: bool,
}

pub(super) fn run(
    context: &mut RulesetContext,
    legacy: LegacyCombatRules,
    warnings: &mut Vec<CompatWarning>,
) -> Result<(), CompatError> {
    // Existing effects first, so the new ones aren't upgraded again.
    upgrade_effects(&mut context.ruleset);
    effects_to_enablers(&mut context.ruleset, &mut context.enablers, warnings);

    match LegacyFlags::resolve(&context.ruleset) {
        Some(flags) => {
            add_legacy_effects(&mut context.ruleset, &flags);
            context.enablers.extend(legacy_enablers(&flags));
        }
        None => warnings.push(CompatWarning::new(
            CompatWarningKind::ManualFixNeeded,
            "Legacy unit flags are missing. Formerly hard-coded actions have no enablers.",
        )),
    }

    split_enablers(&mut context.enablers);
    split_effect_universals(&mut context.ruleset);
    add_legacy_blockers(context, legacy)
}

fn local(source: Universal, present: bool) -> Requirement {
    Requirement::new(source, ReqRange::Local, present).with_quiet(true)
}

fn tile(source: Universal, present: bool) -> Requirement {
    Requirement::new(source, ReqRange::Tile, present).with_quiet(true)
}

// ============================================================================
// Effects
// ============================================================================

fn upgrade_effects(ruleset: &mut Ruleset) {
    let mut saboteur = Vec::new();
    for effect in &mut ruleset.effects {
        match effect.kind {
            // Founding and joining cities no longer cost moves when illegal.
            EffectKind::IllegalActionMoveCost => {
                effect.reqs.push(local(Universal::Action(ActionId::FoundCity), false));
                effect.reqs.push(local(Universal::Action(ActionId::JoinCity), false));
            }
            // Spy resistance used to cover sabotage too.
            EffectKind::SpyResistant => {
                saboteur.push(Effect::new(EffectKind::SaboteurResistant, effect.value, effect.reqs.clone()));
            }
            _ => {}
        }
    }
    ruleset.effects.extend(saboteur);
}

fn add_legacy_effects(ruleset: &mut Ruleset, flags: &LegacyFlags) {
    ruleset.effects.push(Effect::new(
        EffectKind::SpyResistant,
        25,
        ReqVec::new().with(tile(Universal::ExtraFlag(flags.diplomat_defense), true)),
    ));
}

/// Requirement kinds that describe the target tile of a terrain
/// alteration rather than the unit doing it.
fn is_terrain_target_req(req: &Requirement) -> bool {
    matches!(
        req.source.kind(),
        UniversalKind::Terrain
            | UniversalKind::TerrainClass
            | UniversalKind::TerrainFlag
            | UniversalKind::Extra
            | UniversalKind::ExtraFlag
            | UniversalKind::CityTile
            | UniversalKind::MaxUnitsOnTile
            | UniversalKind::Improvement
            | UniversalKind::BuildingGenus
            | UniversalKind::MinSize
    )
}

/// Turns the terrain alteration possibility effects into enablers.
fn effects_to_enablers(ruleset: &mut Ruleset, enablers: &mut EnablerStore, warnings: &mut Vec<CompatWarning>) {
    ruleset.effects.retain(|effect| {
        let action = match effect.kind {
            EffectKind::IrrigPossible => ActionId::Irrigate,
            EffectKind::MiningPossible => ActionId::Mine,
            EffectKind::TransformPossible => ActionId::TransformTerrain,
            _ => return true,
        };

        if effect.value < 0 {
            warnings.push(CompatWarning::new(
                CompatWarningKind::ManualFixNeeded,
                format!(
                    "Can't convert a negative {} effect ({}) to an enabler for {}.",
                    effect.kind,
                    effect.value,
                    action.rule_name()
                ),
            ));
        } else if effect.value > 0 {
            let (target, actor): (Vec<Requirement>, Vec<Requirement>) =
                effect.reqs.iter().copied().partition(is_terrain_target_req);
            enablers.add(ActionEnabler::new(action, ReqVec::from_reqs(actor), ReqVec::from_reqs(target)));
            warnings.push(CompatWarning::new(
                CompatWarningKind::EffectConverted,
                format!("Converted a {} effect to an enabler for {}.", effect.kind, action.rule_name()),
            ));
        }
        false
    });
}

/// Copies effects that mention an action that was split, once per part.
fn split_effect_universals(ruleset: &mut Ruleset) {
    const SPLITS: &[(ActionId, &[ActionId])] = &[
        (ActionId::Nuke, &[ActionId::NukeCity, ActionId::NukeUnits]),
        (ActionId::Attack, &[ActionId::SuicideAttack]),
    ];

    let mut copies = Vec::new();
    for effect in &ruleset.effects {
        for (old, parts) in SPLITS {
            let old = Universal::Action(*old);
            if !universal_is_mentioned_by_requirements(&effect.reqs, &old) {
                continue;
            }
            for part in *parts {
                let mut copy = effect.clone();
                universal_replace_in_req_vec(&mut copy.reqs, &old, &Universal::Action(*part));
                copies.push(copy);
            }
        }
    }
    ruleset.effects.extend(copies);
}

// ============================================================================
// Enablers for formerly hard-coded rules
// ============================================================================

/// Legacy user flags back-filled by the names stage.
struct LegacyFlags {
    capturer: UnitFlagId,
    capturable: UnitFlagId,
    cities: UnitFlagId,
    add_to_city: UnitFlagId,
    bombarder: UnitFlagId,
    nuclear: UnitFlagId,
    paratroopers: UnitFlagId,
    marines: UnitFlagId,
    airliftable: UnitClassFlagId,
    att_from_non_native: UnitClassFlagId,
    paradrop_from: ExtraFlagId,
    diplomat_defense: ExtraFlagId,
}

impl LegacyFlags {
    fn resolve(ruleset: &Ruleset) -> Option<Self> {
        let unit = |name| ruleset.unit_flags.resolve(name);
        let uclass = |name| ruleset.uclass_flags.resolve(name);
        let extra = |name| ruleset.extra_flags.resolve(name);
        Some(Self {
            capturer: unit("Capturer")?,
            capturable: unit("Capturable")?,
            cities: unit("Cities")?,
            add_to_city: unit("AddToCity")?,
            bombarder: unit("Bombarder")?,
            nuclear: unit("Nuclear")?,
            paratroopers: unit("Paratroopers")?,
            marines: unit("Marines")?,
            airliftable: uclass("Airliftable")?,
            att_from_non_native: uclass("AttFromNonNative")?,
            paradrop_from: extra("ParadropFrom")?,
            diplomat_defense: extra("DiplomatDefense")?,
        })
    }
}

fn enabler(action: ActionId, actor: &[Requirement], target: &[Requirement]) -> ActionEnabler {
    ActionEnabler::new(action, ReqVec::from_reqs(actor.to_vec()), ReqVec::from_reqs(target.to_vec()))
}

/// One enabler per alternative the engine used to check for each action.
fn legacy_enablers(flags: &LegacyFlags) -> Vec<ActionEnabler> {
    let unit_flag = |flag: UnitFlagId, present| local(Universal::UnitFlag(flag), present);
    let builtin = |flag: UnitTypeFlags, present| local(Universal::UnitFlag(FlagId::Builtin(flag)), present);
    let uclass_flag = |flag: UnitClassFlagId, present| local(Universal::UnitClassFlag(flag), present);
    let state = |state: UnitState, present| local(Universal::UnitState(state), present);
    let dipl = |rel: DiplRel, present| local(Universal::DiplRel(rel), present);
    let one_move = local(Universal::MinMoveFrags(1), true);
    let can_occupy = uclass_flag(FlagId::Builtin(UnitClassFlags::CAN_OCCUPY_CITY), true);
    let non_mil = builtin(UnitTypeFlags::NON_MIL, false);
    let war = dipl(DiplRel::War, true);
    let domestic = dipl(DiplRel::Foreign, false);
    let transporting = state(UnitState::Transporting, false);

    let conquer = [can_occupy, non_mil, war, one_move];
    let conquer_target = [tile(Universal::MaxUnitsOnTile(0), true)];
    let attack = [non_mil, one_move];

    vec![
        enabler(
            ActionId::CaptureUnits,
            &[unit_flag(flags.capturer, true), war, one_move],
            &[
                unit_flag(flags.capturable, true),
                tile(Universal::CityTile(CityTile::Center), false),
            ],
        ),
        // Outside borders, or inside own borders.
        enabler(
            ActionId::FoundCity,
            &[unit_flag(flags.cities, true), state(UnitState::OnLivableTile, true), one_move],
            &[tile(Universal::CityTile(CityTile::Claimed), false)],
        ),
        enabler(
            ActionId::FoundCity,
            &[unit_flag(flags.cities, true), state(UnitState::OnLivableTile, true), one_move, domestic],
            &[],
        ),
        enabler(
            ActionId::JoinCity,
            &[unit_flag(flags.add_to_city, true), one_move, domestic],
            &[],
        ),
        enabler(
            ActionId::Bombard,
            &[
                unit_flag(flags.bombarder, true),
                state(UnitState::Transported, false),
                one_move,
                war,
            ],
            &[tile(Universal::TerrainClass(TerrainClass::Oceanic), false)],
        ),
        enabler(ActionId::Nuke, &[unit_flag(flags.nuclear, true)], &[]),
        // Recycling into any city not at war or peace with the owner.
        enabler(
            ActionId::DisbandUnitRecover,
            &[
                builtin(UnitTypeFlags::EVACUATE_FIRST, false),
                dipl(DiplRel::War, false),
                dipl(DiplRel::CeaseFire, false),
                dipl(DiplRel::Armistice, false),
                dipl(DiplRel::Peace, false),
            ],
            &[],
        ),
        enabler(ActionId::DisbandUnit, &[builtin(UnitTypeFlags::EVACUATE_FIRST, false)], &[]),
        enabler(
            ActionId::HomeCity,
            &[
                builtin(UnitTypeFlags::NO_HOME, false),
                state(UnitState::HasHomeCity, true),
                domestic,
            ],
            &[],
        ),
        enabler(ActionId::UpgradeUnit, &[domestic], &[]),
        // From a city, or from a tile with a paradrop extra.
        enabler(
            ActionId::Paradrop,
            &[
                unit_flag(flags.paratroopers, true),
                transporting,
                tile(Universal::CityTile(CityTile::Center), true),
            ],
            &[],
        ),
        enabler(
            ActionId::Paradrop,
            &[
                unit_flag(flags.paratroopers, true),
                transporting,
                tile(Universal::ExtraFlag(flags.paradrop_from), true),
            ],
            &[],
        ),
        enabler(
            ActionId::Airlift,
            &[uclass_flag(flags.airliftable, true), transporting, one_move],
            &[],
        ),
        // From a native tile, as marines, or by a class that may attack
        // from non-native tiles.
        enabler(
            ActionId::Attack,
            &[attack[0], attack[1], state(UnitState::OnNativeTile, true)],
            &[],
        ),
        enabler(ActionId::Attack, &[attack[0], attack[1], unit_flag(flags.marines, true)], &[]),
        enabler(
            ActionId::Attack,
            &[attack[0], attack[1], uclass_flag(flags.att_from_non_native, true)],
            &[],
        ),
        enabler(
            ActionId::ConquerCity,
            &[conquer[0], conquer[1], conquer[2], conquer[3], state(UnitState::OnLivableTile, true)],
            &conquer_target,
        ),
        enabler(
            ActionId::ConquerCity,
            &[conquer[0], conquer[1], conquer[2], conquer[3], unit_flag(flags.marines, true)],
            &conquer_target,
        ),
        enabler(
            ActionId::ConquerCity,
            &[
                conquer[0],
                conquer[1],
                conquer[2],
                conquer[3],
                uclass_flag(flags.att_from_non_native, true),
            ],
            &conquer_target,
        ),
    ]
}

// ============================================================================
// Split actions
// ============================================================================

/// Actions once done by spies and non-spies alike, and what each does now.
/// `(old, spy, non_spy)`.
const SPY_SPLITS: &[(ActionId, ActionId, ActionId)] = &[
    (ActionId::SpyInvestigateCity, ActionId::SpyInvestigateCity, ActionId::InvestigateCitySpend),
    (ActionId::EstablishEmbassy, ActionId::EstablishEmbassy, ActionId::EstablishEmbassyStay),
    (ActionId::SpyInciteCity, ActionId::SpyInciteCityEsc, ActionId::SpyInciteCity),
    (ActionId::SpyStealGold, ActionId::SpyStealGoldEsc, ActionId::SpyStealGold),
    (ActionId::SpySabotageCity, ActionId::SpySabotageCityEsc, ActionId::SpySabotageCity),
    (
        ActionId::SpyTargetedSabotageCity,
        ActionId::SpyTargetedSabotageCityEsc,
        ActionId::SpyTargetedSabotageCity,
    ),
];

/// Replaces the enablers of `action` with two sets made by `split`.
fn split_each(
    store: &mut EnablerStore,
    action: ActionId,
    mut split: impl FnMut(ActionEnabler) -> [ActionEnabler; 2],
) {
    let old = std::mem::take(store.all_for_action_mut(action));
    for enabler in old {
        store.extend(split(enabler));
    }
}

fn with_actor_req(mut enabler: ActionEnabler, action: ActionId, req: Requirement) -> ActionEnabler {
    enabler.action = action;
    enabler.actor_reqs.push(req);
    enabler
}

fn split_enablers(store: &mut EnablerStore) {
    // Help Wonder now covers any improvement; old rules meant wonders.
    split_each(store, ActionId::HelpWonder, |enabler| {
        let genus = |genus: BuildingGenus| local(Universal::BuildingGenus(genus), true);
        let mut small = enabler.clone();
        small.target_reqs.push(genus(BuildingGenus::SmallWonder));
        let mut great = enabler;
        great.target_reqs.push(genus(BuildingGenus::GreatWonder));
        [great, small]
    });

    let spy = |present| local(Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SPY)), present);
    for &(old, spy_action, other_action) in SPY_SPLITS {
        split_each(store, old, |enabler| {
            [
                with_actor_req(enabler.clone(), spy_action, spy(true)),
                with_actor_req(enabler, other_action, spy(false)),
            ]
        });
    }

    // Explode Nuclear only covers the actor's own tile now.
    let nukes: Vec<ActionEnabler> = store.all_for_action(ActionId::Nuke).to_vec();
    for target_action in [ActionId::NukeCity, ActionId::NukeUnits] {
        store.extend(nukes.iter().cloned().map(|mut enabler| {
            enabler.action = target_action;
            enabler
        }));
    }

    // Missiles make suicide attacks.
    let missile = |present| local(Universal::UnitClassFlag(FlagId::Builtin(UnitClassFlags::MISSILE)), present);
    split_each(store, ActionId::Attack, |enabler| {
        [
            with_actor_req(enabler.clone(), ActionId::Attack, missile(false)),
            with_actor_req(enabler, ActionId::SuicideAttack, missile(true)),
        ]
    });
}

// ============================================================================
// Blockers
// ============================================================================

fn add_legacy_blockers(context: &mut RulesetContext, legacy: LegacyCombatRules) -> Result<(), CompatError> {
    const CONQUEST: &[ActionId] = &[
        ActionId::SuicideAttack,
        ActionId::Attack,
        ActionId::ConquerCity,
        ActionId::ConquerCity2,
    ];

    let catalog = &mut context.catalog;
    if legacy.force_capture_units {
        for &blocked in [ActionId::Bombard, ActionId::NukeUnits].iter().chain(CONQUEST) {
            catalog.add_blocked_by(blocked, ActionId::CaptureUnits)?;
        }
    }
    if legacy.force_bombard {
        for &blocked in std::iter::once(&ActionId::NukeUnits).chain(CONQUEST) {
            catalog.add_blocked_by(blocked, ActionId::Bombard)?;
        }
    }
    if legacy.force_explode_nuclear {
        for &blocked in CONQUEST {
            for blocker in [ActionId::Nuke, ActionId::NukeCity, ActionId::NukeUnits] {
                catalog.add_blocked_by(blocked, blocker)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{RSFORMAT_3_0, names};
    use crate::config::RulesConfig;

    fn old_context() -> RulesetContext {
        let mut ruleset = Ruleset::new("old");
        names::upgrade_flag_names(&mut ruleset, RSFORMAT_3_0).unwrap();
        RulesetContext::new(ruleset, RulesConfig::default())
    }

    #[test]
    fn illegal_action_move_cost_skips_city_founding() {
        let mut context = old_context();
        context
            .ruleset
            .effects
            .push(Effect::new(EffectKind::IllegalActionMoveCost, 9, ReqVec::new()));
        upgrade_effects(&mut context.ruleset);

        let reqs = &context.ruleset.effects[0].reqs;
        assert!(reqs.contains(&local(Universal::Action(ActionId::FoundCity), false)));
        assert!(reqs.contains(&local(Universal::Action(ActionId::JoinCity), false)));
    }

    #[test]
    fn spy_resistance_also_resists_saboteurs() {
        let mut ruleset = Ruleset::new("old");
        ruleset.effects.push(Effect::new(EffectKind::SpyResistant, 50, ReqVec::new()));
        upgrade_effects(&mut ruleset);
        assert_eq!(ruleset.effects.len(), 2);
        assert_eq!(ruleset.effects[1].kind, EffectKind::SaboteurResistant);
        assert_eq!(ruleset.effects[1].value, 50);
    }

    #[test]
    fn possibility_effects_become_enablers() {
        let mut ruleset = Ruleset::new("old");
        let reqs = ReqVec::new()
            .with(tile(Universal::TerrainClass(TerrainClass::Land), true))
            .with(local(Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SETTLERS)), true));
        ruleset.effects.extend([
            Effect::new(EffectKind::IrrigPossible, 1, reqs),
            Effect::new(EffectKind::MiningPossible, -1, ReqVec::new()),
            Effect::new(EffectKind::TransformPossible, 0, ReqVec::new()),
            Effect::new(EffectKind::DefendBonus, 50, ReqVec::new()),
        ]);
        let mut store = EnablerStore::new();
        let mut warnings = Vec::new();
        effects_to_enablers(&mut ruleset, &mut store, &mut warnings);

        assert_eq!(ruleset.effects.len(), 1);
        assert_eq!(store.len(), 1);
        let irrigate = &store.all_for_action(ActionId::Irrigate)[0];
        assert_eq!(irrigate.actor_reqs.len(), 1);
        assert_eq!(irrigate.target_reqs.len(), 1);
        assert_eq!(warnings[0].kind, CompatWarningKind::EffectConverted);
        assert_eq!(warnings[1].kind, CompatWarningKind::ManualFixNeeded);
    }

    #[test]
    fn nuke_enablers_cover_every_target() {
        let mut store: EnablerStore = [ActionEnabler::unconditional(ActionId::Nuke)].into_iter().collect();
        split_enablers(&mut store);
        for action in [ActionId::Nuke, ActionId::NukeCity, ActionId::NukeUnits] {
            assert_eq!(store.enablers_for_action_count(action), 1, "{action}");
        }
    }

    #[test]
    fn help_wonder_splits_by_genus() {
        let mut store: EnablerStore = [ActionEnabler::unconditional(ActionId::HelpWonder)].into_iter().collect();
        split_enablers(&mut store);
        let help = store.all_for_action(ActionId::HelpWonder);
        assert_eq!(help.len(), 2);
        assert!(help[0]
            .target_reqs
            .contains(&local(Universal::BuildingGenus(BuildingGenus::GreatWonder), true)));
        assert!(help[1]
            .target_reqs
            .contains(&local(Universal::BuildingGenus(BuildingGenus::SmallWonder), true)));
    }

    #[test]
    fn spy_actions_split_by_spy_flag() {
        let mut store: EnablerStore = [
            ActionEnabler::unconditional(ActionId::SpyInvestigateCity),
            ActionEnabler::unconditional(ActionId::SpyStealGold),
        ]
        .into_iter()
        .collect();
        split_enablers(&mut store);

        let spy = Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SPY));
        let investigate = &store.all_for_action(ActionId::SpyInvestigateCity)[0];
        assert!(investigate.actor_reqs.contains(&local(spy, true)));
        let spend = &store.all_for_action(ActionId::InvestigateCitySpend)[0];
        assert!(spend.actor_reqs.contains(&local(spy, false)));

        let escape = &store.all_for_action(ActionId::SpyStealGoldEsc)[0];
        assert!(escape.actor_reqs.contains(&local(spy, true)));
        let steal = &store.all_for_action(ActionId::SpyStealGold)[0];
        assert!(steal.actor_reqs.contains(&local(spy, false)));
    }

    #[test]
    fn missiles_get_suicide_attacks() {
        let mut store: EnablerStore = [ActionEnabler::unconditional(ActionId::Attack)].into_iter().collect();
        split_enablers(&mut store);
        let missile = Universal::UnitClassFlag(FlagId::Builtin(UnitClassFlags::MISSILE));
        assert!(store.all_for_action(ActionId::Attack)[0].actor_reqs.contains(&local(missile, false)));
        assert!(store.all_for_action(ActionId::SuicideAttack)[0].actor_reqs.contains(&local(missile, true)));
    }

    #[test]
    fn effects_follow_split_actions() {
        let mut ruleset = Ruleset::new("old");
        let reqs = ReqVec::new().with(local(Universal::Action(ActionId::Nuke), true));
        ruleset.effects.push(Effect::new(EffectKind::IllegalActionMoveCost, 3, reqs));
        split_effect_universals(&mut ruleset);

        let actions: Vec<_> = ruleset.effects.iter().map(|effect| effect.reqs.iter().next().map(|req| req.source)).collect();
        assert_eq!(
            actions,
            vec![
                Some(Universal::Action(ActionId::Nuke)),
                Some(Universal::Action(ActionId::NukeCity)),
                Some(Universal::Action(ActionId::NukeUnits)),
            ]
        );
    }

    #[test]
    fn forced_capture_blocks_attacks() {
        let mut context = old_context();
        let legacy = LegacyCombatRules {
            force_capture_units: true,
            ..LegacyCombatRules::default()
        };
        add_legacy_blockers(&mut context, legacy).unwrap();
        assert!(context.catalog.action_would_be_blocked_by(ActionId::Attack, ActionId::CaptureUnits));
        assert!(context.catalog.action_would_be_blocked_by(ActionId::Bombard, ActionId::CaptureUnits));
        assert!(!context.catalog.action_would_be_blocked_by(ActionId::Attack, ActionId::Bombard));
    }

    #[test]
    fn missing_legacy_flags_need_a_manual_fix() {
        let mut context = RulesetContext::new(Ruleset::new("bare"), RulesConfig::default());
        let mut warnings = Vec::new();
        run(&mut context, LegacyCombatRules::default(), &mut warnings).unwrap();
        assert!(context.enablers.is_empty());
        assert_eq!(warnings[0].kind, CompatWarningKind::ManualFixNeeded);
    }
}

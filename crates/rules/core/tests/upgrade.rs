use std::collections::BTreeSet;

use rules_core::compat::{RSFORMAT_3_0, RSFORMAT_CURRENT};
use rules_core::testkit::{self, BOMBER, Fixture, THEM, US, WARRIORS};
use rules_core::{
    ActionEnabler, ActionId, CompatError, CompatInfo, CompatWarningKind, ReqRange, ReqVec, Requirement, RulesConfig,
    RulesetContext, RulesetUpgrade, TechId, TilePos, Unit, Universal, UpgradeStage, Upgraded,
};

/// Loads the fixture ruleset as an old-format ruleset would be loaded:
/// names first, then entity flags, then the remaining stages.
fn upgrade_old(enablers: Vec<ActionEnabler>) -> Upgraded {
    let mut upgrade = RulesetUpgrade::new(CompatInfo::new(true, RSFORMAT_3_0));
    let mut ruleset = testkit::ruleset();
    upgrade.upgrade_names(&mut ruleset).unwrap();

    let nuclear = ruleset.unit_flags.resolve("Nuclear").unwrap();
    let paratroopers = ruleset.unit_flags.resolve("Paratroopers").unwrap();
    let bomber = &mut ruleset.unit_types[BOMBER.0 as usize];
    bomber.flags.insert(nuclear);
    bomber.flags.insert(paratroopers);

    let mut context = RulesetContext::new(ruleset, RulesConfig::default()).with_enablers(enablers);
    upgrade.add_obligatory_reqs(&mut context).unwrap();
    upgrade.postprocess(&mut context).unwrap();
    upgrade.sanity_check(&mut context).unwrap();
    upgrade.finish(context)
}

#[test]
fn old_paradrop_enablers_need_a_move_left() {
    let upgraded = upgrade_old(vec![ActionEnabler::unconditional(ActionId::Paradrop)]);
    assert_eq!(upgraded.stage, UpgradeStage::SanityChecked);

    let one_move = |req: &Requirement| {
        req.source == Universal::MinMoveFrags(1) && req.range == ReqRange::Local && req.present
    };
    let paradrops = upgraded.context.enablers.all_for_action(ActionId::Paradrop);
    assert!(!paradrops.is_empty());
    for enabler in paradrops {
        assert!(
            !enabler.is_active() || enabler.actor_reqs.iter().any(one_move),
            "{:?}",
            enabler.actor_reqs
        );
    }
    assert!(
        upgraded
            .warnings
            .iter()
            .any(|warning| warning.kind == CompatWarningKind::EnablerSplit)
    );
}

#[test]
fn old_nukes_split_by_target() {
    let upgraded = upgrade_old(Vec::new());
    let mut fixture = Fixture::with_context(upgraded.context);
    let bomber = fixture.add_unit(1, US, BOMBER, TilePos::new(3, 3));
    let city_tile = TilePos::new(4, 3);
    let city = fixture.add_city(1, THEM, city_tile);
    let units_tile = TilePos::new(2, 3);
    fixture.add_unit(2, THEM, WARRIORS, units_tile);

    let engine = fixture.engine();
    let actor = fixture.unit(bomber);
    assert!(engine.is_action_enabled_unit_on_tile(ActionId::Nuke, actor, actor.tile, None));
    assert!(!engine.is_action_enabled_unit_on_tile(ActionId::Nuke, actor, city_tile, None));
    assert!(engine.is_action_enabled_unit_on_city(ActionId::NukeCity, actor, fixture.city(city)));
    assert!(engine.is_action_enabled_unit_on_units(ActionId::NukeUnits, actor, units_tile));
    assert!(!engine.is_action_enabled_unit_on_units(ActionId::NukeUnits, actor, TilePos::new(3, 4)));
}

/// Tiles an old Explode Nuclear allowed: the actor's own tile, plus
/// adjacent tiles holding an enemy city or only enemy units.
fn old_nuke_targets(fixture: &Fixture, actor: TilePos) -> BTreeSet<TilePos> {
    let world = &fixture.world;
    fixture
        .world
        .map
        .square_iter(actor, 1)
        .filter(|&tile| {
            if tile == actor {
                return true;
            }
            let enemy_city = world.tile_city(tile).is_some_and(|city| city.owner == THEM);
            let mut units = world.units_at(tile).peekable();
            let enemy_units = units.peek().is_some() && units.all(|unit| unit.owner == THEM);
            enemy_city || enemy_units
        })
        .collect()
}

/// Tiles any of the split nuke actions accepts.
fn split_nuke_targets(fixture: &Fixture, actor: &Unit) -> BTreeSet<TilePos> {
    let engine = fixture.engine();
    fixture
        .world
        .map
        .square_iter(actor.tile, 1)
        .filter(|&tile| {
            let by_city = fixture
                .world
                .tile_city(tile)
                .is_some_and(|city| engine.is_action_enabled_unit_on_city(ActionId::NukeCity, actor, city));
            engine.is_action_enabled_unit_on_tile(ActionId::Nuke, actor, tile, None)
                || by_city
                || engine.is_action_enabled_unit_on_units(ActionId::NukeUnits, actor, tile)
        })
        .collect()
}

#[test]
fn old_nuke_enabler_keeps_its_targets_after_the_split() {
    let bronze = Requirement::new(Universal::Advance(TechId(0)), ReqRange::Player, true);
    let old_nuke = ActionEnabler::new(
        ActionId::Nuke,
        ReqVec::new().with(bronze),
        ReqVec::new(),
    );
    let upgraded = upgrade_old(vec![old_nuke]);

    for action in [ActionId::Nuke, ActionId::NukeCity, ActionId::NukeUnits] {
        assert!(
            upgraded
                .context
                .enablers
                .for_action(action)
                .any(|enabler| enabler.actor_reqs.iter().any(|req| *req == bronze)),
            "{} lost the actor requirement",
            action
        );
    }

    // Warriors lack the Nuclear flag, so only the ruleset's own enabler
    // can let them nuke.
    let mut fixture = Fixture::with_context(upgraded.context);
    let here = TilePos::new(3, 3);
    let nuker = fixture.add_unit(1, US, WARRIORS, here);
    fixture.add_city(1, THEM, TilePos::new(4, 3));
    fixture.add_unit(2, THEM, WARRIORS, TilePos::new(2, 3));
    fixture.add_unit(3, US, WARRIORS, TilePos::new(2, 2));
    fixture.add_city(2, US, TilePos::new(4, 4));

    assert!(split_nuke_targets(&fixture, fixture.unit(nuker)).is_empty());

    fixture.world.players[0].techs.insert(TechId(0));
    let expected = old_nuke_targets(&fixture, here);
    assert_eq!(
        expected,
        BTreeSet::from([here, TilePos::new(4, 3), TilePos::new(2, 3)])
    );
    assert_eq!(split_nuke_targets(&fixture, fixture.unit(nuker)), expected);
}

#[test]
fn old_nukes_block_conquest() {
    let upgraded = upgrade_old(Vec::new());
    let catalog = &upgraded.context.catalog;
    for blocker in [ActionId::Nuke, ActionId::NukeCity, ActionId::NukeUnits] {
        assert!(catalog.action_would_be_blocked_by(ActionId::ConquerCity, blocker));
    }
    assert!(!catalog.action_would_be_blocked_by(ActionId::NukeCity, ActionId::Nuke));
}

#[test]
fn current_format_missing_obligatory_req_is_fatal() {
    let mut upgrade = RulesetUpgrade::new(CompatInfo::new(false, RSFORMAT_CURRENT));
    let mut context = RulesetContext::new(testkit::ruleset(), RulesConfig::default())
        .with_enablers([ActionEnabler::unconditional(ActionId::Fortify)]);
    upgrade.upgrade_names(&mut context.ruleset).unwrap();

    let err = upgrade.add_obligatory_reqs(&mut context).unwrap_err();
    assert!(matches!(err, CompatError::MissingObligatoryReq { action: ActionId::Fortify, .. }));
    assert_eq!(upgrade.stage(), UpgradeStage::ObligatoryReqsAdded);
    assert!(upgrade.warnings().is_empty());
}

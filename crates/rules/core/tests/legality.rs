use rules_core::requirement::CityTile;
use rules_core::ruleset::{FlagId, UnitTypeFlags};
use rules_core::testkit::{Fixture, SETTLERS, THEM, US, WARRIORS};
use rules_core::{ActProb, ActionCatalog, ActionEnabler, ActionId, ReqRange, ReqVec, Requirement, RulesConfig, TargetRef, TilePos, Universal};

fn settlers_flag(present: bool) -> Requirement {
    Requirement::new(
        Universal::UnitFlag(FlagId::Builtin(UnitTypeFlags::SETTLERS)),
        ReqRange::Local,
        present,
    )
}

#[test]
fn action_without_enablers_is_never_legal() {
    let mut fixture = Fixture::new();
    let unit = fixture.add_unit(1, US, WARRIORS, TilePos::new(2, 2));
    let engine = fixture.engine();
    let unit = fixture.unit(unit);

    for action in [ActionId::Fortify, ActionId::DisbandUnit, ActionId::ConvertUnit] {
        assert!(!engine.is_action_enabled_unit_on_self(action, unit), "{action}");
        assert_eq!(engine.action_prob_self(action, unit), ActProb::IMPOSSIBLE);
    }
}

#[test]
fn contradictory_enablers_form_a_disjunction() {
    let enablers = [true, false]
        .map(|present| ActionEnabler::new(ActionId::DisbandUnit, ReqVec::new().with(settlers_flag(present)), ReqVec::new()));
    let mut fixture = Fixture::new().with_enablers(enablers);
    let settlers = fixture.add_unit(1, US, SETTLERS, TilePos::new(1, 1));
    let warriors = fixture.add_unit(2, US, WARRIORS, TilePos::new(5, 5));
    let engine = fixture.engine();

    assert!(engine.is_action_enabled_unit_on_self(ActionId::DisbandUnit, fixture.unit(settlers)));
    assert!(engine.is_action_enabled_unit_on_self(ActionId::DisbandUnit, fixture.unit(warriors)));
}

#[test]
fn failing_enabler_alone_keeps_the_action_illegal() {
    let enabler = ActionEnabler::new(ActionId::DisbandUnit, ReqVec::new().with(settlers_flag(true)), ReqVec::new());
    let mut fixture = Fixture::new().with_enablers([enabler]);
    let warriors = fixture.add_unit(1, US, WARRIORS, TilePos::new(5, 5));
    let engine = fixture.engine();

    assert!(!engine.is_action_enabled_unit_on_self(ActionId::DisbandUnit, fixture.unit(warriors)));
}

#[test]
fn adjacent_only_actions_reject_other_distances() {
    let catalog = ActionCatalog::new(&RulesConfig::default());
    let attack = catalog.get(ActionId::Attack);
    assert_eq!((attack.min_distance, attack.max_distance), (1, 1));
    assert!(!catalog.action_distance_accepted(ActionId::Attack, 0));
    assert!(catalog.action_distance_accepted(ActionId::Attack, 1));
    assert!(!catalog.action_distance_accepted(ActionId::Attack, 2));
}

#[test]
fn found_city_on_free_tile_until_a_city_stands_there() {
    let found = ActionEnabler::new(ActionId::FoundCity, ReqVec::new().with(settlers_flag(true)), ReqVec::new());
    let mut fixture = Fixture::new().with_enablers([found]);
    let tile = TilePos::new(4, 4);
    let settlers = fixture.add_unit(1, US, SETTLERS, tile);

    {
        let engine = fixture.engine();
        assert!(engine.is_action_enabled_unit_on_tile(ActionId::FoundCity, fixture.unit(settlers), tile, None));
    }

    fixture.add_city(1, US, tile);
    let engine = fixture.engine();
    assert!(!engine.is_action_enabled_unit_on_tile(ActionId::FoundCity, fixture.unit(settlers), tile, None));
}

#[test]
fn found_city_refuses_foreign_borders() {
    let found = ActionEnabler::new(ActionId::FoundCity, ReqVec::new().with(settlers_flag(true)), ReqVec::new());
    let mut fixture = Fixture::new().with_enablers([found]);
    let tile = TilePos::new(6, 1);
    let settlers = fixture.add_unit(1, US, SETTLERS, tile);
    if let Some(target) = fixture.world.map.tile_mut(tile) {
        target.owner = Some(THEM);
    }

    let engine = fixture.engine();
    assert!(!engine.is_action_enabled_unit_on_tile(ActionId::FoundCity, fixture.unit(settlers), tile, None));
}

#[test]
fn claimed_tile_requirement_reads_tile_owner() {
    let unclaimed = ActionEnabler::new(
        ActionId::Pillage,
        ReqVec::new(),
        ReqVec::new().with(Requirement::new(Universal::CityTile(CityTile::Claimed), ReqRange::Tile, false)),
    );
    let mut fixture = Fixture::new().with_enablers([unclaimed]);
    let tile = TilePos::new(3, 6);
    let warriors = fixture.add_unit(1, US, WARRIORS, tile);
    let target = TargetRef::Tile(tile, None);
    let engine = fixture.engine();
    assert!(engine.action_enabled_local(ActionId::Pillage, fixture.unit(warriors), target).is_yes());

    if let Some(owned) = fixture.world.map.tile_mut(tile) {
        owned.owner = Some(THEM);
    }
    let engine = fixture.engine();
    assert!(engine.action_enabled_local(ActionId::Pillage, fixture.unit(warriors), target).is_no());
}

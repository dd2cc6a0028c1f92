//! Loads small ruleset directories written to a temp dir.

use std::fs;
use std::path::Path;

use rules_content::{ContentFactory, LoadError};
use rules_core::compat::{RSFORMAT_CURRENT, RULESET_CAPABILITIES, RULESET_COMPAT_CAP};
use rules_core::{ActionEngine, ActionId, CompatError, CompatWarningKind, TilePos, UnitId, UpgradeStage, Universal};
use tempfile::TempDir;

fn header(old: bool) -> String {
    if old {
        format!("[datafile]\noptions = \"{}\"\nformat_version = 10\n", RULESET_COMPAT_CAP)
    } else {
        format!("[datafile]\noptions = \"{}\"\nformat_version = {}\n", RULESET_CAPABILITIES, RSFORMAT_CURRENT)
    }
}

const GAME: &str = r#"
[about]
name = "mini"

[settings]
citymindist = 2

[[enabler]]
action = "Found City"
actor_reqs = [
    { type = "UnitFlag", name = "Cities", range = "Local" },
    { type = "MinMoveFrags", name = "1", range = "Local" },
]
target_reqs = [{ type = "TerrainFlag", name = "NoCities", range = "Tile", present = false }]

[[enabler]]
action = "Fortify"
actor_reqs = [{ type = "Activity", name = "Fortified", range = "Local", present = false }]
"#;

const OLD_GAME: &str = r#"
[combat_rules]
force_capture_units = true

[[action]]
name = "Recycle Unit"
ui_name = "%sRecycle Unit%s"

[[enabler]]
action = "Paradrop Unit"
"#;

const UNITS: &str = r#"
[flags]
unit = [{ name = "Cities", help = "Can found cities." }]

[[class]]
name = "Land"
flags = ["CanOccupyCity", "CanFortify"]

[[unit]]
name = "Settlers"
class = "Land"
flags = ["Settlers", "NonMil", "Cities"]
attack = 0
pop_cost = 1

[[unit]]
name = "Warriors"
class = "Land"
"#;

const OLD_UNITS: &str = r#"
[[class]]
name = "Land"
flags = ["CanOccupyCity", "CanFortify"]

[[unit]]
name = "Settlers"
class = "Land"
flags = ["Settlers", "NonMil", "Cities"]
attack = 0

[[unit]]
name = "Paratroopers"
class = "Land"
flags = ["Paratroopers"]
paratroopers_range = 10
"#;

const TERRAIN: &str = r#"
[[terrain]]
name = "Grassland"
class = "Land"
native_to = ["Land"]

[[terrain]]
name = "Glacier"
class = "Land"
flags = ["NoCities"]
native_to = ["Land"]

[[extra]]
name = "Road"
causes = ["Road"]
"#;

const CITIES: &str = r#"
[[tech]]
name = "Bronze Working"

[[government]]
name = "Despotism"

[[nation]]
name = "Roman"

[[nation]]
name = "Babylonian"
"#;

const EFFECTS: &str = r#"
[[effect]]
type = "Spy_Resistant"
value = 50
reqs = [{ type = "Tech", name = "Bronze Working", range = "Player" }]
"#;

const SNAPSHOT: &str = r#"
(
    map: (width: 6, height: 6, terrain: "Grassland", tiles: [(x: 5, y: 5, terrain: Some("Glacier"))]),
    players: [
        (name: "Caesar", nation: Some("Roman"), diplstates: {1: Peace}, vision: All),
        (name: "Hammurabi", nation: Some("Babylonian"), diplstates: {0: Peace}),
    ],
    units: [
        (id: 1, owner: 0, utype: "Settlers", x: 2, y: 2),
        (id: 2, owner: 0, utype: "Settlers", x: 5, y: 5),
    ],
)
"#;

fn write(dir: &Path, name: &str, old: bool, body: &str) {
    fs::write(dir.join(name), format!("{}{}", header(old), body)).unwrap();
}

fn ruleset_dir(old: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();
    write(path, "game.toml", old, if old { OLD_GAME } else { GAME });
    write(path, "units.toml", old, if old { OLD_UNITS } else { UNITS });
    write(path, "terrain.toml", old, TERRAIN);
    write(path, "cities.toml", old, CITIES);
    write(path, "effects.toml", old, EFFECTS);
    fs::create_dir(path.join("snapshots")).unwrap();
    fs::write(path.join("snapshots").join("start.ron"), SNAPSHOT).unwrap();
    dir
}

#[test]
fn current_format_loads_without_warnings() {
    let dir = ruleset_dir(false);
    let upgraded = ContentFactory::new(dir.path()).load_ruleset().unwrap();

    assert_eq!(upgraded.stage, UpgradeStage::SanityChecked);
    assert!(upgraded.warnings.is_empty(), "{:?}", upgraded.warnings);
    let context = &upgraded.context;
    assert_eq!(context.ruleset.name, "mini");
    assert_eq!(context.config.citymindist, 2);
    assert_eq!(context.enablers.len(), 2);
    assert_eq!(context.ruleset.effects.len(), 1);
}

#[test]
fn snapshot_queries_against_the_loaded_ruleset() {
    let dir = ruleset_dir(false);
    let factory = ContentFactory::new(dir.path());
    let upgraded = factory.load_ruleset().unwrap();
    let world = factory.load_snapshot("start", &upgraded.context.ruleset).unwrap();

    let engine = ActionEngine::new(&upgraded.context, &world);
    let on_grass = world.unit(UnitId(1)).unwrap();
    let on_glacier = world.unit(UnitId(2)).unwrap();
    assert!(engine.is_action_enabled_unit_on_tile(ActionId::FoundCity, on_grass, TilePos::new(2, 2), None));
    assert!(!engine.is_action_enabled_unit_on_tile(ActionId::FoundCity, on_glacier, TilePos::new(5, 5), None));
}

#[test]
fn old_format_is_upgraded_in_compat_mode() {
    let dir = ruleset_dir(true);
    let upgraded = ContentFactory::new(dir.path())
        .with_compat_mode(true)
        .load_ruleset()
        .unwrap();
    let context = &upgraded.context;

    assert_eq!(context.catalog.get(ActionId::DisbandUnitRecover).ui_name, "%sRecycle Unit%s");
    assert!(context.enablers.enablers_for_action_count(ActionId::FoundCity) > 0);
    assert!(context.catalog.action_would_be_blocked_by(ActionId::Attack, ActionId::CaptureUnits));
    assert!(
        upgraded
            .warnings
            .iter()
            .any(|warning| warning.kind == CompatWarningKind::EnablerSplit)
    );

    let one_move = |enabler: &rules_core::ActionEnabler| {
        !enabler.is_active()
            || enabler
                .actor_reqs
                .iter()
                .any(|req| req.source == Universal::MinMoveFrags(1) && req.present)
    };
    assert!(
        context
            .enablers
            .for_action(ActionId::Paradrop)
            .all(one_move)
    );
}

#[test]
fn old_format_needs_compat_mode() {
    let dir = ruleset_dir(true);
    let err = ContentFactory::new(dir.path()).load_ruleset().unwrap_err();
    let err = err.downcast::<LoadError>().unwrap();
    assert!(
        matches!(
            err,
            LoadError::Compat {
                source: CompatError::Incompatible { .. },
                ..
            }
        ),
        "{}",
        err
    );
}

#[test]
fn old_version_with_current_capabilities_needs_compat_mode() {
    let dir = ruleset_dir(false);
    for name in ["game.toml", "units.toml", "terrain.toml", "cities.toml", "effects.toml"] {
        let path = dir.path().join(name);
        let content = fs::read_to_string(&path).unwrap();
        let content = content.replace(&format!("format_version = {}", RSFORMAT_CURRENT), "format_version = 10");
        fs::write(&path, content).unwrap();
    }
    let err = ContentFactory::new(dir.path()).load_ruleset().unwrap_err();
    let err = err.downcast::<LoadError>().unwrap();
    assert!(matches!(
        err,
        LoadError::Compat {
            source: CompatError::NeedsCompatMode { version: 10 },
            ..
        }
    ));
}

#[test]
fn undeclared_unit_flag_is_an_error() {
    let dir = ruleset_dir(false);
    let units = UNITS.replace("\"Cities\"]", "\"Cities\", \"Horse\"]");
    write(dir.path(), "units.toml", false, &units);

    let err = ContentFactory::new(dir.path()).load_ruleset().unwrap_err();
    let err = err.downcast::<LoadError>().unwrap();
    assert!(matches!(err, LoadError::UnknownName { kind: "unit type flag", .. }), "{}", err);
}

#[test]
fn citymindist_above_the_limit_is_rejected() {
    let dir = ruleset_dir(false);
    write(dir.path(), "game.toml", false, &GAME.replace("citymindist = 2", "citymindist = 4294967295"));

    let err = ContentFactory::new(dir.path()).load_ruleset().unwrap_err();
    let err = err.downcast::<LoadError>().unwrap();
    assert!(
        matches!(err, LoadError::SettingOutOfRange { name: "citymindist", .. }),
        "{}",
        err
    );
}

#[test]
fn missing_file_is_reported_by_path() {
    let dir = ruleset_dir(false);
    fs::remove_file(dir.path().join("effects.toml")).unwrap();
    let err = ContentFactory::new(dir.path()).load_ruleset().unwrap_err();
    assert!(err.to_string().contains("effects.toml"), "{}", err);
}

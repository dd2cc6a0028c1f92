//! Names stage: flags that used to be hard-coded and renamed identifiers.
//!
//! Older formats had engine-known flags for things the current format
//! leaves to enablers. Those flags are re-created as user flags so that
//! old unit type and extra definitions still resolve, and so that the
//! enablers synthesised later have something to require.

use crate::ruleset::{FlagRegistry, Ruleset};

use super::{CompatError, RSFORMAT_3_1};

/// Unit type flags back-filled into user slots, with their help text.
pub const LEGACY_UNIT_FLAGS: &[(&str, &str)] = &[
    ("Capturer", "Can capture some enemy units."),
    ("Capturable", "Can be captured by some enemy units."),
    ("Cities", "Can build new cities."),
    ("AddToCity", "Can join cities."),
    ("Bombarder", "Can bombard."),
    ("Nuclear", "Explodes as a nuclear weapon."),
    ("Paratroopers", "Can be paradropped."),
    ("Marines", "Can launch attack from non-native tiles."),
];

/// Unit class flags back-filled into user slots.
pub const LEGACY_UCLASS_FLAGS: &[(&str, &str)] = &[
    ("Airliftable", "Can be airlifted."),
    ("AttFromNonNative", "Can attack from non-native tiles."),
];

/// Extra flags back-filled into user slots.
pub const LEGACY_EXTRA_FLAGS: &[(&str, &str)] = &[
    ("ParadropFrom", "Units may paradrop from this tile."),
    ("DiplomatDefense", "Diplomatic units get a defense bonus on this tile."),
];

fn back_fill<B, const N: usize>(
    registry: &mut FlagRegistry<B, N>,
    flags: &[(&str, &str)],
) -> Result<(), CompatError>
where
    B: bitflags::Flags + Copy + 'static,
{
    for (name, help) in flags {
        registry.add_user(name, Some((*help).to_owned()))?;
    }
    Ok(())
}

/// Back-fills the legacy user flags of a ruleset older than the current
/// format. Current-format rulesets are left alone.
///
/// # Errors
///
/// [`CompatError::Flag`] when the ruleset already uses a legacy name for
/// something else or has no free slot left. Both abort the load.
pub fn upgrade_flag_names(ruleset: &mut Ruleset, version: u32) -> Result<(), CompatError> {
    if version >= RSFORMAT_3_1 {
        return Ok(());
    }
    back_fill(&mut ruleset.unit_flags, LEGACY_UNIT_FLAGS)?;
    back_fill(&mut ruleset.uclass_flags, LEGACY_UCLASS_FLAGS)?;
    back_fill(&mut ruleset.extra_flags, LEGACY_EXTRA_FLAGS)?;
    Ok(())
}

/// Current rule name of an action named `name` in a ruleset of `version`.
pub fn upgraded_action_name(name: &str, version: u32) -> &str {
    if version >= RSFORMAT_3_1 {
        return name;
    }
    match name {
        "Recycle Unit" => "Disband Unit Recover",
        "Targeted Steal Tech Escape" => "Targeted Steal Tech Escape Expected",
        "Steal Tech Escape" => "Steal Tech Escape Expected",
        _ => name,
    }
}

/// Current name of a requirement kind.
pub fn upgraded_req_kind_name(name: &str, version: u32) -> &str {
    if version >= RSFORMAT_3_1 {
        return name;
    }
    match name {
        "Resource" => "Extra",
        "BaseFlag" | "RoadFlag" => "ExtraFlag",
        "MinMoves" => "MinMoveFrags",
        _ => name,
    }
}

/// Current name of a unit type flag.
pub fn upgraded_unit_flag_name(name: &str, version: u32) -> &str {
    if version >= RSFORMAT_3_1 {
        return name;
    }
    match name {
        "Trireme" => "CoastStrict",
        _ => name,
    }
}
